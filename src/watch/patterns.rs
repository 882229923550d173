// src/watch/patterns.rs

use std::path::PathBuf;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;

use crate::errors::{DevloopError, Result};

/// Expand a glob pattern into the concrete paths to watch.
///
/// A malformed pattern is an error. Individual entries that cannot be read
/// while walking are logged and skipped. Paths matching `exclude` are
/// dropped.
pub fn expand_pattern(pattern: &str, exclude: Option<&GlobSet>) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|source| DevloopError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if exclude.is_some_and(|set| set.is_match(&path)) {
                    continue;
                }
                paths.push(path);
            }
            Err(err) => {
                warn!(pattern, error = %err, "skipping unreadable path");
            }
        }
    }

    Ok(paths)
}

/// Build a GlobSet from simple string patterns. `None` when there are none.
pub fn build_exclude_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(Some(builder.build()?))
}
