// src/task/mod.rs

//! Task descriptors.
//!
//! A task is an opaque string from the config (e.g. `"cargo run -- --port 80"`)
//! that can be turned into an executable invocation, and rendered for log
//! output with `[vars]` substituted.

pub mod descriptor;

pub use descriptor::{render_display, Invocation, TaskDescriptor, Vars};
