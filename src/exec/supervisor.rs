// src/exec/supervisor.rs

//! Single-instance task supervisor.
//!
//! One Tokio task owns the table of `name -> ProcessHandle` and is the only
//! reader of a capacity-1 mailbox. Every start / restart / shutdown decision
//! goes through that mailbox, so the table needs no lock and a restart
//! request can never observe a half-terminated previous instance.

use std::collections::BTreeMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::errors::{DevloopError, Result};
use crate::exec::process::ProcessHandle;
use crate::task::TaskDescriptor;
use crate::types::TaskName;

/// Mailbox size. A producer posting while a message is still pending waits,
/// which caps the restart rate at what the supervisor can process.
pub const MAILBOX_CAPACITY: usize = 1;

/// Messages understood by the supervisor loop.
#[derive(Debug)]
pub enum ControlMessage {
    /// Start `name`, terminating any previous instance of it first.
    Start { name: TaskName, task: TaskDescriptor },
    /// Report the current instance table.
    Snapshot {
        reply: oneshot::Sender<Vec<InstanceStatus>>,
    },
    /// Terminate every instance, signal completion and stop.
    Exit,
}

/// Point-in-time view of one registered task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceStatus {
    pub name: TaskName,
    pub pid: Option<u32>,
    pub running: bool,
}

/// Cheap, cloneable sender side of the supervisor mailbox.
#[derive(Clone, Debug)]
pub struct SupervisorHandle {
    tx: mpsc::Sender<ControlMessage>,
}

impl SupervisorHandle {
    /// Ask the supervisor to (re)start `name` with `task`.
    ///
    /// Waits while the mailbox is full. Fails only once the supervisor has
    /// processed `Exit`.
    pub async fn start_single_instance(
        &self,
        name: impl Into<TaskName>,
        task: TaskDescriptor,
    ) -> Result<()> {
        self.send(ControlMessage::Start {
            name: name.into(),
            task,
        })
        .await
    }

    /// Fetch the instance table, sorted by task name.
    ///
    /// Messages are handled in order, so the answer reflects every request
    /// posted before this call.
    pub async fn snapshot(&self) -> Result<Vec<InstanceStatus>> {
        let (reply, rx) = oneshot::channel();
        self.send(ControlMessage::Snapshot { reply }).await?;
        rx.await.map_err(|_| DevloopError::SupervisorStopped)
    }

    /// Post `Exit`. Pair with [`Completion::wait`] to know when every
    /// instance is gone.
    pub async fn exit(&self) -> Result<()> {
        self.send(ControlMessage::Exit).await
    }

    async fn send(&self, msg: ControlMessage) -> Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| DevloopError::SupervisorStopped)
    }
}

/// Fires once, after `Exit` has terminated every owned process.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Completion {
    pub async fn wait(self) -> Result<()> {
        self.rx.await.map_err(|_| DevloopError::SupervisorStopped)
    }
}

/// Spawn the supervisor loop on the current Tokio runtime.
pub fn spawn_supervisor() -> (SupervisorHandle, Completion) {
    let (tx, rx) = mpsc::channel::<ControlMessage>(MAILBOX_CAPACITY);
    let (done_tx, done_rx) = oneshot::channel::<()>();

    let supervisor = Supervisor {
        mailbox: rx,
        instances: BTreeMap::new(),
        done: Some(done_tx),
    };
    tokio::spawn(supervisor.run());

    (SupervisorHandle { tx }, Completion { rx: done_rx })
}

struct Supervisor {
    mailbox: mpsc::Receiver<ControlMessage>,
    instances: BTreeMap<TaskName, ProcessHandle>,
    done: Option<oneshot::Sender<()>>,
}

impl Supervisor {
    async fn run(mut self) {
        info!("task supervisor started");

        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                ControlMessage::Start { name, task } => {
                    self.handle_start(name, task).await;
                }
                ControlMessage::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                ControlMessage::Exit => {
                    info!("exit requested; terminating supervised tasks");
                    // Refuse anything posted after exit.
                    self.mailbox.close();
                    self.shutdown().await;
                    return;
                }
            }
        }

        // Every handle was dropped without an explicit exit.
        debug!("supervisor mailbox closed");
        self.shutdown().await;
    }

    async fn handle_start(&mut self, name: TaskName, task: TaskDescriptor) {
        if let Some(handle) = self.instances.get_mut(&name) {
            if let Some(pid) = handle.terminate().await {
                info!(task = %name, pid, "terminated previous instance");
            }

            if let Err(err) = handle.replace_task(task) {
                error!(
                    task = %name,
                    error = %err,
                    "cannot parse new task descriptor; instance left stopped"
                );
                return;
            }

            launch(handle);
            return;
        }

        let mut handle = match ProcessHandle::new(name.clone(), task) {
            Ok(handle) => handle,
            Err(err) => {
                error!(task = %name, error = %err, "cannot parse task descriptor");
                return;
            }
        };

        launch(&mut handle);
        self.instances.insert(name, handle);
    }

    fn snapshot(&mut self) -> Vec<InstanceStatus> {
        self.instances
            .iter_mut()
            .map(|(name, handle)| InstanceStatus {
                name: name.clone(),
                pid: handle.pid(),
                running: handle.is_running(),
            })
            .collect()
    }

    async fn shutdown(&mut self) {
        for (name, handle) in self.instances.iter_mut() {
            if let Some(pid) = handle.terminate().await {
                info!(task = %name, pid, "terminated instance");
            }
        }

        match self.done.take() {
            Some(done) => {
                if done.send(()).is_err() {
                    debug!("nobody is waiting for supervisor completion");
                }
            }
            None => warn!("supervisor completion already signalled"),
        }

        info!("task supervisor finished");
    }
}

fn launch(handle: &mut ProcessHandle) {
    match handle.start() {
        Ok(pid) => {
            info!(task = %handle.name(), pid, cmd = %handle.task(), "started instance");
        }
        Err(err) => {
            error!(
                task = %handle.name(),
                cmd = %handle.task(),
                error = %err,
                "failed to start instance"
            );
        }
    }
}
