// src/engine/runtime.rs

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{ConfigFile, WatchConfig};
use crate::errors::Result;
use crate::exec::{spawn_supervisor, Completion, SupervisorHandle};
use crate::watch::{callback, Watcher};

use super::ActionPlan;

/// Owns the supervisor, the watcher and the resolved action plans for one
/// development session.
pub struct DevRuntime {
    supervisor: SupervisorHandle,
    completion: Completion,
    watcher: Watcher,
    startup: ActionPlan,
    watches: Vec<(WatchConfig, Arc<ActionPlan>)>,
}

impl fmt::Debug for DevRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevRuntime")
            .field("watcher", &self.watcher)
            .field("startup", &self.startup)
            .field("watches", &self.watches.len())
            .finish_non_exhaustive()
    }
}

impl DevRuntime {
    /// Resolve every action plan and spawn the supervisor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(cfg: &ConfigFile) -> Result<Self> {
        let startup = ActionPlan::resolve(cfg, &cfg.startup)?;

        let watches = cfg
            .watch
            .iter()
            .map(|entry| {
                let plan = ActionPlan::resolve(cfg, &entry.actions)?;
                Ok((entry.clone(), Arc::new(plan)))
            })
            .collect::<Result<Vec<_>>>()?;

        let (supervisor, completion) = spawn_supervisor();

        Ok(Self {
            supervisor,
            completion,
            watcher: Watcher::new(cfg.watcher_options()),
            startup,
            watches,
        })
    }

    pub fn supervisor(&self) -> &SupervisorHandle {
        &self.supervisor
    }

    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    /// Execute the `[startup]` actions once.
    pub async fn run_startup(&self) {
        if self.startup.is_empty() {
            return;
        }
        info!("running startup actions");
        self.startup.execute(&self.supervisor).await;
    }

    /// Register one watch per `[[watch]]` entry. Returns how many were
    /// registered.
    pub fn register_watches(&mut self) -> Result<usize> {
        for (entry, plan) in &self.watches {
            let plan = Arc::clone(plan);
            let supervisor = self.supervisor.clone();

            let cb = callback(move || {
                let plan = Arc::clone(&plan);
                let supervisor = supervisor.clone();
                async move { plan.execute(&supervisor).await }
            });

            self.watcher
                .listen_filtered(&entry.pattern, &entry.exclude, cb)?;
        }

        Ok(self.watcher.len())
    }

    /// Register the watches (unless `watch` is false), then keep the session
    /// alive until `shutdown_signal` resolves.
    ///
    /// Every supervised instance is terminated before this returns, including
    /// when watch registration fails after startup already launched tasks.
    pub async fn run_until<F>(mut self, watch: bool, shutdown_signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if watch {
            match self.register_watches() {
                Ok(registered) => info!(registered, "file watches active"),
                Err(err) => {
                    error!(error = %err, "failed to register file watches");
                    if let Err(shutdown_err) = self.shutdown().await {
                        warn!(error = %shutdown_err, "shutdown after failed registration");
                    }
                    return Err(err);
                }
            }
        } else {
            info!("--no-watch given; not registering file watches");
        }

        shutdown_signal.await;
        self.shutdown().await
    }

    /// Terminate every supervised instance and wait until they are gone.
    pub async fn shutdown(self) -> Result<()> {
        info!("shutting down");
        self.supervisor.exit().await?;
        self.completion.wait().await?;
        drop(self.watcher);
        Ok(())
    }
}
