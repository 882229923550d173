// src/task/descriptor.rs

use std::collections::BTreeMap;
use std::fmt;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tokio::process::Command;

use crate::errors::{DevloopError, Result};

/// Named substitutions used when rendering a task for humans.
pub type Vars = BTreeMap<String, String>;

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("variable pattern is a valid regex")
});

/// An opaque task string as written in the config, plus its display form.
///
/// The display form has `$name` / `${name}` placeholders replaced from the
/// config's `[vars]`. It is only ever used for logging; the process
/// invocation is always parsed from the raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    raw: String,
    display: String,
}

impl TaskDescriptor {
    pub fn new(raw: impl Into<String>, vars: &Vars) -> Self {
        let raw = raw.into();
        let display = render_display(&raw, vars);
        Self { raw, display }
    }

    /// Descriptor without any variable substitution.
    pub fn plain(raw: impl Into<String>) -> Self {
        Self::new(raw, &Vars::new())
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Parse the raw task string into an executable invocation.
    pub fn invocation(&self) -> Result<Invocation> {
        Invocation::parse(&self.raw)
    }
}

impl fmt::Display for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Executable name plus ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Split a task string with POSIX shell word rules.
    ///
    /// Quoting is honoured (`sh -c "echo hi"` yields three words) but no
    /// expansion is performed.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut words = shlex::split(raw)
            .ok_or_else(|| DevloopError::InvalidTask(raw.to_string()))?
            .into_iter();

        let program = words
            .next()
            .ok_or_else(|| DevloopError::InvalidTask(raw.to_string()))?;

        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Build a command with our own stdout/stderr attached and no stdin.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

/// Substitute `$name` and `${name}` from `vars`. Unknown names are kept
/// verbatim.
pub fn render_display(raw: &str, vars: &Vars) -> String {
    if vars.is_empty() {
        return raw.to_string();
    }

    VAR_RE
        .replace_all(raw, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match vars.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
