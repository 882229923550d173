// src/exec/runners.rs

//! Stateless task runners.
//!
//! Neither runner tracks the processes it launches; use the supervisor for
//! tasks that must only ever have one live instance.

use tracing::{debug, error, trace};

use crate::task::TaskDescriptor;

/// Launch every task without waiting for any of them.
///
/// Launch failures are logged and the remaining tasks still start. Calling
/// this twice with the same task yields two independent processes.
pub fn start(tasks: &[TaskDescriptor]) {
    for task in tasks {
        let invocation = match task.invocation() {
            Ok(inv) => inv,
            Err(err) => {
                error!(cmd = %task, error = %err, "cannot parse task; skipping");
                continue;
            }
        };

        trace!(cmd = %task, "starting task");

        match invocation.command().spawn() {
            Ok(child) => {
                debug!(cmd = %task, pid = ?child.id(), "task started");
            }
            Err(err) => {
                error!(cmd = %task, error = %err, "failed to start task");
            }
        }
    }
}

/// Run every task in order, waiting for each to exit before the next.
///
/// A launch failure or non-zero exit is logged and does not stop the
/// remaining tasks.
pub async fn run(tasks: &[TaskDescriptor]) {
    for task in tasks {
        let invocation = match task.invocation() {
            Ok(inv) => inv,
            Err(err) => {
                error!(cmd = %task, error = %err, "cannot parse task; skipping");
                continue;
            }
        };

        trace!(cmd = %task, "running task");

        let mut child = match invocation.command().spawn() {
            Ok(child) => child,
            Err(err) => {
                error!(cmd = %task, error = %err, "failed to start task");
                continue;
            }
        };

        match child.wait().await {
            Ok(status) if status.success() => {
                debug!(cmd = %task, "task finished");
            }
            Ok(status) => {
                error!(
                    cmd = %task,
                    exit_code = status.code().unwrap_or(-1),
                    "task exited with failure"
                );
            }
            Err(err) => {
                error!(cmd = %task, error = %err, "failed waiting for task");
            }
        }
    }
}
