// tests/notification_loop.rs
//
// Drives the notification loop with synthetic notify events, so ordering and
// filtering can be checked without a real filesystem.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use devloop::types::TriggerOn;
use devloop::watch::{callback, is_restart_event, run_notification_loop, WatchCallback};
use devloop_test_utils::{init_tracing, with_timeout};
use notify::event::{
    AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::{Event, EventKind};
use tokio::sync::{mpsc, Mutex};

fn event(kind: EventKind) -> Event {
    Event::new(kind).add_path(PathBuf::from("src/main.rs"))
}

fn chmod() -> Event {
    event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)))
}

fn write() -> Event {
    event(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
}

fn non_qualifying() -> Vec<Event> {
    vec![
        write(),
        event(EventKind::Create(CreateKind::File)),
        event(EventKind::Remove(RemoveKind::File)),
        event(EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
        event(EventKind::Access(AccessKind::Any)),
    ]
}

fn counting_callback(count: Arc<AtomicUsize>) -> WatchCallback {
    callback(move || {
        let count = Arc::clone(&count);
        async move {
            count.fetch_add(1, Ordering::SeqCst);
        }
    })
}

/// Feed `events` (and `errors`) into a fresh loop and wait for it to drain.
async fn drive(trigger_on: TriggerOn, events: Vec<Event>, errors: usize) -> usize {
    let (event_tx, event_rx) = mpsc::channel(100);
    let (error_tx, error_rx) = mpsc::channel(10);
    let count = Arc::new(AtomicUsize::new(0));

    let handle = tokio::spawn(run_notification_loop(
        0,
        event_rx,
        error_rx,
        trigger_on,
        Arc::new(Mutex::new(())),
        counting_callback(Arc::clone(&count)),
    ));

    for _ in 0..errors {
        error_tx
            .send(notify::Error::generic("simulated watch failure"))
            .await
            .unwrap();
    }
    for ev in events {
        event_tx.send(ev).await.unwrap();
    }
    drop(event_tx);
    drop(error_tx);

    with_timeout(handle).await.unwrap();
    count.load(Ordering::SeqCst)
}

#[test]
fn only_metadata_changes_qualify_by_default() {
    assert!(is_restart_event(&chmod(), TriggerOn::Metadata));
    for ev in non_qualifying() {
        assert!(
            !is_restart_event(&ev, TriggerOn::Metadata),
            "{:?} must not qualify",
            ev.kind
        );
    }
}

#[test]
fn any_mode_accepts_content_changes_but_not_access() {
    assert!(is_restart_event(&chmod(), TriggerOn::Any));
    assert!(is_restart_event(&write(), TriggerOn::Any));
    assert!(is_restart_event(
        &event(EventKind::Create(CreateKind::File)),
        TriggerOn::Any
    ));
    assert!(!is_restart_event(
        &event(EventKind::Access(AccessKind::Any)),
        TriggerOn::Any
    ));
}

#[tokio::test]
async fn content_writes_do_not_invoke_the_callback() {
    init_tracing();
    assert_eq!(drive(TriggerOn::Metadata, non_qualifying(), 0).await, 0);
}

#[tokio::test]
async fn metadata_change_invokes_the_callback() {
    init_tracing();
    let events = vec![write(), chmod(), write(), chmod()];
    assert_eq!(drive(TriggerOn::Metadata, events, 0).await, 2);
}

#[tokio::test]
async fn errors_are_absorbed_and_the_loop_keeps_going() {
    init_tracing();
    assert_eq!(drive(TriggerOn::Metadata, vec![chmod()], 3).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn callbacks_sharing_a_lock_never_overlap() {
    init_tracing();

    let lock = Arc::new(Mutex::new(()));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));

    let make_cb = || {
        let in_flight = Arc::clone(&in_flight);
        let max_in_flight = Arc::clone(&max_in_flight);
        let calls = Arc::clone(&calls);
        callback(move || {
            let in_flight = Arc::clone(&in_flight);
            let max_in_flight = Arc::clone(&max_in_flight);
            let calls = Arc::clone(&calls);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                calls.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let mut senders = Vec::new();
    let mut loops = Vec::new();
    for index in 0..2 {
        let (event_tx, event_rx) = mpsc::channel(100);
        let (error_tx, error_rx) = mpsc::channel(10);
        loops.push(tokio::spawn(run_notification_loop(
            index,
            event_rx,
            error_rx,
            TriggerOn::Metadata,
            Arc::clone(&lock),
            make_cb(),
        )));
        senders.push((event_tx, error_tx));
    }

    for _ in 0..3 {
        for (event_tx, _) in &senders {
            event_tx.send(chmod()).await.unwrap();
        }
    }
    drop(senders);

    for handle in loops {
        with_timeout(handle).await.unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
}
