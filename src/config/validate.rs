// src/config/validate.rs

use crate::config::model::{ActionSet, RawConfigFile};
use crate::errors::{DevloopError, Result};
use crate::task::Invocation;
use crate::watch::build_exclude_set;

/// Run semantic validation against a raw configuration.
///
/// This checks:
/// - there is at least one task
/// - queue capacities are `>= 1`
/// - every task `cmd` splits into a non-empty invocation
/// - every task referenced from `[startup]` / `[[watch]]` exists
/// - every watch entry has a well-formed pattern and at least one action
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_tasks(cfg)?;
    validate_references(cfg, "[startup]", &cfg.startup)?;
    validate_watch_entries(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> DevloopError {
    DevloopError::Config(msg.into())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(config_error(
            "config must contain at least one [task.<name>] section",
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.event_queue_capacity == 0 {
        return Err(config_error(
            "[config].event_queue_capacity must be >= 1 (got 0)",
        ));
    }
    if cfg.config.error_queue_capacity == 0 {
        return Err(config_error(
            "[config].error_queue_capacity must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

fn validate_tasks(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if Invocation::parse(&task.cmd).is_err() {
            return Err(config_error(format!(
                "task '{}' has an invalid cmd: {:?}",
                name, task.cmd
            )));
        }
    }
    Ok(())
}

fn validate_references(cfg: &RawConfigFile, section: &str, actions: &ActionSet) -> Result<()> {
    for name in actions.names() {
        if !cfg.task.contains_key(name) {
            return Err(config_error(format!(
                "{} references unknown task '{}'",
                section, name
            )));
        }
    }
    Ok(())
}

fn validate_watch_entries(cfg: &RawConfigFile) -> Result<()> {
    for (i, entry) in cfg.watch.iter().enumerate() {
        let section = format!("[[watch]] #{} ({:?})", i + 1, entry.pattern);

        if entry.pattern.trim().is_empty() {
            return Err(config_error(format!("{section} has an empty pattern")));
        }

        glob::Pattern::new(&entry.pattern).map_err(|source| DevloopError::Pattern {
            pattern: entry.pattern.clone(),
            source,
        })?;

        build_exclude_set(&entry.exclude)?;

        if entry.actions.is_empty() {
            return Err(config_error(format!(
                "{section} has no run/start/restart actions"
            )));
        }

        validate_references(cfg, &section, &entry.actions)?;
    }
    Ok(())
}
