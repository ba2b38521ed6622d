//! Configuration audit log
//!
//! Every change a configuration object makes on its own (variant forcing,
//! cascade overrides, derived fields) is recorded here next to the explicit
//! assignments that caused it. Events are logged in the order they happen.
//!
//! # Example
//!
//! ```rust
//! use particle_tracking_core_rs::models::event::{CascadeLog, ConfigEvent};
//! use particle_tracking_core_rs::models::value::ParamValue;
//!
//! let mut log = CascadeLog::new();
//! log.log(ConfigEvent::CascadeOverride {
//!     rule: "surface_only",
//!     trigger: "surface_only".to_string(),
//!     trigger_value: ParamValue::Bool(true),
//!     field: "do3D".to_string(),
//!     old: ParamValue::Bool(true),
//!     new: ParamValue::Bool(false),
//! });
//!
//! assert_eq!(log.events_for_field("do3D").len(), 1);
//! ```

use crate::models::value::ParamValue;
use crate::models::variant::DriftModel;

/// One recorded change
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    /// Caller assigned a field through construction input or `set`
    UserAssignment {
        field: String,
        old: ParamValue,
        new: ParamValue,
    },

    /// Variant pinned a field
    VariantForced {
        model: DriftModel,
        field: String,
        old: ParamValue,
        new: ParamValue,
    },

    /// A cascade rule overrode a dependent field
    CascadeOverride {
        rule: &'static str,
        trigger: String,
        trigger_value: ParamValue,
        field: String,
        old: ParamValue,
        new: ParamValue,
    },

    /// A field was computed from others (time window)
    Derived {
        field: String,
        value: ParamValue,
        basis: String,
    },
}

impl ConfigEvent {
    /// Field this event changed
    pub fn field(&self) -> &str {
        match self {
            ConfigEvent::UserAssignment { field, .. }
            | ConfigEvent::VariantForced { field, .. }
            | ConfigEvent::CascadeOverride { field, .. }
            | ConfigEvent::Derived { field, .. } => field,
        }
    }

    /// Value the field holds after the event
    pub fn new_value(&self) -> &ParamValue {
        match self {
            ConfigEvent::UserAssignment { new, .. }
            | ConfigEvent::VariantForced { new, .. }
            | ConfigEvent::CascadeOverride { new, .. } => new,
            ConfigEvent::Derived { value, .. } => value,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            ConfigEvent::UserAssignment { .. } => "UserAssignment",
            ConfigEvent::VariantForced { .. } => "VariantForced",
            ConfigEvent::CascadeOverride { .. } => "CascadeOverride",
            ConfigEvent::Derived { .. } => "Derived",
        }
    }
}

/// Ordered event log owned by one configuration object
#[derive(Debug, Clone, Default)]
pub struct CascadeLog {
    events: Vec<ConfigEvent>,
}

impl CascadeLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: ConfigEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[ConfigEvent] {
        &self.events
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&ConfigEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_field(&self, field: &str) -> Vec<&ConfigEvent> {
        self.events.iter().filter(|e| e.field() == field).collect()
    }

    /// Cascade overrides only
    pub fn overrides(&self) -> Vec<&ConfigEvent> {
        self.events_of_type("CascadeOverride")
    }

    /// Drop events past `len` (rollback of a failed mutation)
    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters() {
        let mut log = CascadeLog::new();
        log.log(ConfigEvent::UserAssignment {
            field: "z".to_string(),
            old: ParamValue::Float(0.0),
            new: ParamValue::Float(-10.0),
        });
        log.log(ConfigEvent::Derived {
            field: "steps".to_string(),
            value: ParamValue::Int(24),
            basis: "start_time, end_time".to_string(),
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.events_of_type("Derived").len(), 1);
        assert_eq!(log.events_for_field("z")[0].new_value(), &ParamValue::Float(-10.0));
        assert!(log.overrides().is_empty());

        log.truncate(1);
        assert_eq!(log.len(), 1);
    }
}
