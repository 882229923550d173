// src/watch/watcher.rs

use std::future::Future;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, trace, warn};

use crate::errors::Result;
use crate::types::TriggerOn;
use crate::watch::notify_loop::{callback, run_notification_loop, WatchCallback};
use crate::watch::patterns::{build_exclude_set, expand_pattern};

/// Default capacity of each handle's change-event queue.
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 100;

/// Default capacity of each handle's error queue.
pub const DEFAULT_ERROR_QUEUE_CAPACITY: usize = 10;

/// Tunables shared by every registration on one [`Watcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherOptions {
    pub event_queue_capacity: usize,
    pub error_queue_capacity: usize,
    pub trigger_on: TriggerOn,
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self {
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            error_queue_capacity: DEFAULT_ERROR_QUEUE_CAPACITY,
            trigger_on: TriggerOn::default(),
        }
    }
}

/// Multiplexes several glob registrations onto serialized callbacks.
///
/// Each [`listen`](Watcher::listen) call gets its own OS watch handle and its
/// own notification loop, but all loops share one lock: no two callbacks of
/// the same watcher ever run at the same time.
///
/// Handles live as long as the `Watcher`. Dropping it stops all watching.
pub struct Watcher {
    /// Append-only; a handle's index never changes.
    watch_set: Vec<RecommendedWatcher>,
    callback_lock: Arc<Mutex<()>>,
    options: WatcherOptions,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("handles", &self.watch_set.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new(WatcherOptions::default())
    }
}

impl Watcher {
    pub fn new(options: WatcherOptions) -> Self {
        Self {
            watch_set: Vec::new(),
            callback_lock: Arc::new(Mutex::new(())),
            options,
        }
    }

    /// Number of registered watch handles.
    pub fn len(&self) -> usize {
        self.watch_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watch_set.is_empty()
    }

    /// Watch every path matching `pattern` and run `cb` on qualifying
    /// changes.
    ///
    /// Returns the stable index of the new watch handle. Must be called from
    /// within a Tokio runtime.
    pub fn listen<F, Fut>(&mut self, pattern: &str, cb: F) -> Result<usize>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.listen_filtered(pattern, &[], callback(cb))
    }

    /// Like [`listen`](Watcher::listen), dropping expanded paths that match
    /// any of the `exclude` globs.
    ///
    /// The pattern is expanded once, now; files created later are not picked
    /// up. A malformed `pattern` or `exclude` glob is an error. Paths that
    /// cannot be watched are logged and skipped.
    pub fn listen_filtered(
        &mut self,
        pattern: &str,
        exclude: &[String],
        callback: WatchCallback,
    ) -> Result<usize> {
        let exclude_set = build_exclude_set(exclude)?;
        let paths = expand_pattern(pattern, exclude_set.as_ref())?;

        let (event_tx, event_rx) =
            mpsc::channel::<Event>(self.options.event_queue_capacity.max(1));
        let (error_tx, error_rx) =
            mpsc::channel::<notify::Error>(self.options.error_queue_capacity.max(1));

        // Runs on the notify backend thread; blocking_send waits for room
        // instead of dropping events when a queue is full.
        let mut handle = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let forwarded = match res {
                    Ok(event) => event_tx.blocking_send(event).is_ok(),
                    Err(err) => error_tx.blocking_send(err).is_ok(),
                };
                if !forwarded {
                    trace!("notification loop gone; dropping notify event");
                }
            },
            Config::default(),
        )?;

        if paths.is_empty() {
            warn!(pattern, "watch pattern matched no paths");
        }

        let mut watched = 0usize;
        for path in &paths {
            match handle.watch(path, RecursiveMode::NonRecursive) {
                Ok(()) => watched += 1,
                Err(err) => {
                    warn!(pattern, path = ?path, error = %err, "failed to watch path");
                }
            }
        }

        let index = self.watch_set.len();
        self.watch_set.push(handle);

        tokio::spawn(run_notification_loop(
            index,
            event_rx,
            error_rx,
            self.options.trigger_on,
            Arc::clone(&self.callback_lock),
            callback,
        ));

        info!(watch = index, pattern, watched, "watch registered");
        Ok(index)
    }
}
