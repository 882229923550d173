// src/watch/notify_loop.rs

//! Per-registration notification loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use notify::Event;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace, warn};

use crate::types::TriggerOn;
use crate::watch::predicate::is_restart_event;

/// Zero-argument async callback fired on qualifying changes.
pub type WatchCallback =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Wrap an async closure into a [`WatchCallback`].
pub fn callback<F, Fut>(f: F) -> WatchCallback
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || -> Pin<Box<dyn Future<Output = ()> + Send>> { Box::pin(f()) })
}

/// Consume one watch handle's queues until both are closed.
///
/// Errors are logged and never reach the callback. Qualifying events run the
/// callback to completion while holding `lock`, which is shared by every loop
/// of the same watcher.
pub async fn run_notification_loop(
    index: usize,
    mut events: mpsc::Receiver<Event>,
    mut errors: mpsc::Receiver<notify::Error>,
    trigger_on: TriggerOn,
    lock: Arc<Mutex<()>>,
    callback: WatchCallback,
) {
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if !is_restart_event(&event, trigger_on) {
                    trace!(watch = index, kind = ?event.kind, paths = ?event.paths, "ignoring event");
                    continue;
                }

                debug!(watch = index, kind = ?event.kind, paths = ?event.paths, "change detected");

                let _guard = lock.lock().await;
                callback().await;
            }
            Some(err) = errors.recv() => {
                warn!(watch = index, error = %err, "file watch error");
            }
            else => break,
        }
    }

    debug!(watch = index, "notification loop ended");
}
