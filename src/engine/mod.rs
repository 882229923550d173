// src/engine/mod.rs

//! Orchestration glue between config, watcher and executors.
//!
//! - [`actions`] resolves `run` / `start` / `restart` task lists into an
//!   executable [`ActionPlan`].
//! - [`runtime`] wires the supervisor, startup plan and watch registrations
//!   together and drives them until shutdown.

pub mod actions;
pub mod runtime;

pub use actions::ActionPlan;
pub use runtime::DevRuntime;
