#![allow(dead_code)]

use devloop::config::{ActionSet, ConfigFile, RawConfigFile, TaskConfig, WatchConfig};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_task(mut self, name: &str, cmd: &str) -> Self {
        self.config.task.insert(
            name.to_string(),
            TaskConfig {
                cmd: cmd.to_string(),
            },
        );
        self
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.config.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_startup(mut self, actions: ActionSet) -> Self {
        self.config.startup = actions;
        self
    }

    pub fn with_watch(mut self, watch: WatchConfig) -> Self {
        self.config.watch.push(watch);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ActionSet`.
#[derive(Default)]
pub struct ActionSetBuilder {
    actions: ActionSet,
}

impl ActionSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(mut self, task: &str) -> Self {
        self.actions.run.push(task.to_string());
        self
    }

    pub fn start(mut self, task: &str) -> Self {
        self.actions.start.push(task.to_string());
        self
    }

    pub fn restart(mut self, task: &str) -> Self {
        self.actions.restart.push(task.to_string());
        self
    }

    pub fn build(self) -> ActionSet {
        self.actions
    }
}

/// Builder for `WatchConfig`.
pub struct WatchConfigBuilder {
    watch: WatchConfig,
}

impl WatchConfigBuilder {
    pub fn new(pattern: &str) -> Self {
        Self {
            watch: WatchConfig {
                pattern: pattern.to_string(),
                exclude: vec![],
                actions: ActionSet::default(),
            },
        }
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn actions(mut self, actions: ActionSet) -> Self {
        self.watch.actions = actions;
        self
    }

    pub fn build(self) -> WatchConfig {
        self.watch
    }
}
