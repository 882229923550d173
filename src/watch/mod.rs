// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Expanding glob patterns into the set of paths to watch.
//! - Owning one `notify` handle per registered pattern, with bounded
//!   event / error queues.
//! - Filtering events through the restart predicate and running callbacks
//!   one at a time per [`Watcher`].
//!
//! It does **not** know about tasks; callers decide what a callback does.

pub mod notify_loop;
pub mod patterns;
pub mod predicate;
pub mod watcher;

pub use notify_loop::{callback, run_notification_loop, WatchCallback};
pub use patterns::{build_exclude_set, expand_pattern};
pub use predicate::is_restart_event;
pub use watcher::{
    Watcher, WatcherOptions, DEFAULT_ERROR_QUEUE_CAPACITY, DEFAULT_EVENT_QUEUE_CAPACITY,
};
