// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`process`] wraps a single OS subprocess in a reusable [`ProcessHandle`].
//! - [`runners`] launches task lists either fire-and-forget ([`start`]) or
//!   one after the other, waiting for each ([`run`]).
//! - [`supervisor`] owns the single-instance table and serializes restarts
//!   through its mailbox.

pub mod process;
pub mod runners;
pub mod supervisor;

pub use process::ProcessHandle;
pub use runners::{run, start};
pub use supervisor::{
    spawn_supervisor, Completion, ControlMessage, InstanceStatus, SupervisorHandle,
    MAILBOX_CAPACITY,
};
