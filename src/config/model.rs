// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::config::validate::validate_config;
use crate::errors::{DevloopError, Result};
use crate::task::{TaskDescriptor, Vars};
use crate::types::{TaskName, TriggerOn};
use crate::watch::{WatcherOptions, DEFAULT_ERROR_QUEUE_CAPACITY, DEFAULT_EVENT_QUEUE_CAPACITY};

/// Raw configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// trigger_on = "metadata"
///
/// [vars]
/// app = "demo"
///
/// [task.build]
/// cmd = "cargo build"
///
/// [task.server]
/// cmd = "./target/debug/demo"
///
/// [startup]
/// run = ["build"]
/// restart = ["server"]
///
/// [[watch]]
/// pattern = "src/**/*.rs"
/// run = ["build"]
/// restart = ["server"]
/// ```
///
/// All sections are optional at the TOML level; [`ConfigFile::try_from`]
/// performs the semantic checks.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Substitutions applied to task strings when they are logged.
    #[serde(default)]
    pub vars: Vars,

    /// All tasks from `[task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<TaskName, TaskConfig>,

    /// Actions executed once, before any watch is registered.
    #[serde(default)]
    pub startup: ActionSet,

    /// `[[watch]]` entries, registered in file order.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub vars: Vars,
    pub task: BTreeMap<TaskName, TaskConfig>,
    pub startup: ActionSet,
    pub watch: Vec<WatchConfig>,
}

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DevloopError;

    fn try_from(raw: RawConfigFile) -> Result<Self> {
        validate_config(&raw)?;
        Ok(Self {
            config: raw.config,
            vars: raw.vars,
            task: raw.task,
            startup: raw.startup,
            watch: raw.watch,
        })
    }
}

impl ConfigFile {
    pub fn tasks(&self) -> &BTreeMap<TaskName, TaskConfig> {
        &self.task
    }

    /// Descriptor for the named task, rendered with `[vars]`.
    pub fn descriptor(&self, name: &str) -> Result<TaskDescriptor> {
        let task = self
            .task
            .get(name)
            .ok_or_else(|| DevloopError::UnknownTask(name.to_string()))?;
        Ok(TaskDescriptor::new(task.cmd.clone(), &self.vars))
    }

    pub fn watcher_options(&self) -> WatcherOptions {
        WatcherOptions {
            event_queue_capacity: self.config.event_queue_capacity,
            error_queue_capacity: self.config.error_queue_capacity,
            trigger_on: self.config.trigger_on,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Capacity of each watch handle's change-event queue.
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,

    /// Capacity of each watch handle's error queue.
    #[serde(default = "default_error_queue_capacity")]
    pub error_queue_capacity: usize,

    /// `"metadata"` (default) or `"any"`.
    #[serde(default)]
    pub trigger_on: TriggerOn,
}

fn default_event_queue_capacity() -> usize {
    DEFAULT_EVENT_QUEUE_CAPACITY
}

fn default_error_queue_capacity() -> usize {
    DEFAULT_ERROR_QUEUE_CAPACITY
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            event_queue_capacity: default_event_queue_capacity(),
            error_queue_capacity: default_error_queue_capacity(),
            trigger_on: TriggerOn::default(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The command to execute, split with shell word rules.
    pub cmd: String,
}

/// Task names to act on, by kind of action.
///
/// Executed in field order: `run` (blocking, in sequence), then `start`
/// (fire-and-forget), then `restart` (single-instance via the supervisor).
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ActionSet {
    #[serde(default)]
    pub run: Vec<TaskName>,

    #[serde(default)]
    pub start: Vec<TaskName>,

    #[serde(default)]
    pub restart: Vec<TaskName>,
}

impl ActionSet {
    pub fn is_empty(&self) -> bool {
        self.run.is_empty() && self.start.is_empty() && self.restart.is_empty()
    }

    /// Every referenced task name, in execution order.
    pub fn names(&self) -> impl Iterator<Item = &TaskName> {
        self.run.iter().chain(&self.start).chain(&self.restart)
    }
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Glob expanded once at registration time.
    pub pattern: String,

    /// Globs removing paths from the expanded set.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(flatten)]
    pub actions: ActionSet,
}
