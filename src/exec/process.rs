// src/exec/process.rs

//! A reusable handle around one OS subprocess.

use tokio::process::Child;
use tracing::{debug, trace, warn};

use crate::errors::Result;
use crate::task::{Invocation, TaskDescriptor};
use crate::types::TaskName;

/// One logical task's process slot.
///
/// The handle outlives the processes it launches: after [`terminate`] the
/// child slot is empty again and the same handle can be [`start`]ed with the
/// already-parsed invocation.
///
/// [`terminate`]: ProcessHandle::terminate
/// [`start`]: ProcessHandle::start
#[derive(Debug)]
pub struct ProcessHandle {
    name: TaskName,
    task: TaskDescriptor,
    invocation: Invocation,
    child: Option<Child>,
    // Kept after the child is reaped so termination can still report it.
    launched_pid: Option<u32>,
}

impl ProcessHandle {
    /// Parse `task` and build an empty handle for it.
    pub fn new(name: impl Into<TaskName>, task: TaskDescriptor) -> Result<Self> {
        let invocation = task.invocation()?;
        Ok(Self {
            name: name.into(),
            task,
            invocation,
            child: None,
            launched_pid: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn task(&self) -> &TaskDescriptor {
        &self.task
    }

    /// OS pid of the current child, if one is attached and not yet reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    /// Whether a child is attached and has not exited yet.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Swap in a new task string for the next [`start`](Self::start).
    ///
    /// Re-parsing is skipped when the raw string is unchanged. On a parse
    /// error the previous invocation is kept.
    pub fn replace_task(&mut self, task: TaskDescriptor) -> Result<()> {
        if task.raw() != self.task.raw() {
            self.invocation = task.invocation()?;
            debug!(task = %self.name, cmd = %task, "task descriptor changed");
        }
        self.task = task;
        Ok(())
    }

    /// Launch the invocation with our stdout/stderr attached.
    ///
    /// The slot must be empty; callers terminate the previous child first.
    pub fn start(&mut self) -> Result<u32> {
        trace!(task = %self.name, cmd = %self.task, "launching process");

        let child = self.invocation.command().kill_on_drop(true).spawn()?;
        let pid = child.id().unwrap_or_default();
        self.child = Some(child);
        self.launched_pid = Some(pid);

        Ok(pid)
    }

    /// Kill the current child and wait until it is reaped.
    ///
    /// Returns the pid of the child that occupied the slot, or `None` when the
    /// slot was already empty. The pid is reported even if the child had
    /// exited and been reaped before this call. A rejected kill means the
    /// process is gone already, so the wait is skipped.
    pub async fn terminate(&mut self) -> Option<u32> {
        let mut child = self.child.take()?;
        let pid = child.id().or(self.launched_pid.take());

        match child.start_kill() {
            Ok(()) => {
                if let Err(err) = child.wait().await {
                    warn!(
                        task = %self.name,
                        ?pid,
                        error = %err,
                        "failed to wait for killed process"
                    );
                }
            }
            Err(err) => {
                debug!(
                    task = %self.name,
                    ?pid,
                    error = %err,
                    "kill rejected; process already exited"
                );
            }
        }

        pid
    }
}
