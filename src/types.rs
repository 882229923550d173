use serde::Deserialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Which filesystem events count as a reason to fire a watch callback.
///
/// - `Metadata`: only permission / metadata changes (the historical
///   behaviour, and the default).
/// - `Any`: any create, modify or remove event. Pure access events are still
///   ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerOn {
    Metadata,
    Any,
}

impl Default for TriggerOn {
    fn default() -> Self {
        TriggerOn::Metadata
    }
}
