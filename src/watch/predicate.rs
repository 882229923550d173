// src/watch/predicate.rs

use notify::event::ModifyKind;
use notify::{Event, EventKind};

use crate::types::TriggerOn;

/// Decide whether a filesystem event should fire the watch callback.
///
/// With [`TriggerOn::Metadata`] only permission / metadata changes qualify;
/// content writes, creates, removes and renames are ignored.
pub fn is_restart_event(event: &Event, trigger_on: TriggerOn) -> bool {
    match trigger_on {
        TriggerOn::Metadata => {
            matches!(event.kind, EventKind::Modify(ModifyKind::Metadata(_)))
        }
        TriggerOn::Any => matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ),
    }
}
