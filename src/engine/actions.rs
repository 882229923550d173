// src/engine/actions.rs

use tracing::{debug, warn};

use crate::config::{ActionSet, ConfigFile};
use crate::errors::Result;
use crate::exec::{self, SupervisorHandle};
use crate::task::TaskDescriptor;
use crate::types::TaskName;

/// An [`ActionSet`] with every task name resolved to its descriptor.
///
/// Resolution happens once, up front, so executing a plan from inside a
/// watch callback never touches the config again.
#[derive(Debug, Clone, Default)]
pub struct ActionPlan {
    pub run: Vec<TaskDescriptor>,
    pub start: Vec<TaskDescriptor>,
    pub restart: Vec<(TaskName, TaskDescriptor)>,
}

impl ActionPlan {
    pub fn resolve(cfg: &ConfigFile, actions: &ActionSet) -> Result<Self> {
        let run = actions
            .run
            .iter()
            .map(|name| cfg.descriptor(name))
            .collect::<Result<Vec<_>>>()?;

        let start = actions
            .start
            .iter()
            .map(|name| cfg.descriptor(name))
            .collect::<Result<Vec<_>>>()?;

        let restart = actions
            .restart
            .iter()
            .map(|name| Ok((name.clone(), cfg.descriptor(name)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { run, start, restart })
    }

    pub fn is_empty(&self) -> bool {
        self.run.is_empty() && self.start.is_empty() && self.restart.is_empty()
    }

    /// Blocking runs first, then fire-and-forget starts, then single-instance
    /// restarts.
    pub async fn execute(&self, supervisor: &SupervisorHandle) {
        exec::run(&self.run).await;
        exec::start(&self.start);

        for (name, task) in &self.restart {
            debug!(task = %name, cmd = %task, "requesting restart");
            if let Err(err) = supervisor
                .start_single_instance(name.clone(), task.clone())
                .await
            {
                warn!(task = %name, error = %err, "restart request not delivered");
            }
        }
    }
}
