//! Configuration errors
//!
//! Every failure surfaced by the configuration engine is one of these kinds.
//! Errors are raised at the first violation found; nothing is buffered.

use thiserror::Error;

use crate::core::time::TimeError;

/// Errors raised while building or mutating a drift configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Numeric value or enum option out of bounds
    #[error("Range violation on '{field}': {reason}")]
    RangeViolation { field: String, reason: String },

    /// Two fields (or a field and a mode flag) that cannot hold together
    #[error("Mutual exclusion violation on {}: {reason}", .fields.join(", "))]
    MutualExclusionViolation { fields: Vec<String>, reason: String },

    /// Time basis incomplete
    #[error("Required-together violation on {}: {reason}", .fields.join(", "))]
    RequiredTogetherViolation { fields: Vec<String>, reason: String },

    /// All supplied time fields disagree with each other
    #[error("Time consistency error on '{field}': supplied {supplied}, computed {computed}")]
    TimeConsistencyError {
        field: String,
        supplied: String,
        computed: String,
    },

    /// Drift-model variant pins this field
    #[error("Forbidden field '{field}' for {model}: {reason}")]
    ForbiddenFieldViolation {
        field: String,
        model: String,
        reason: String,
    },

    /// Key not recognised for this configuration
    #[error("Unknown field '{0}'")]
    UnknownFieldError(String),

    /// drift_model is fixed once selected
    #[error("Cannot change drift_model from {current} to {requested}; construct a new configuration instead")]
    VariantReassignmentError { current: String, requested: String },

    /// Value does not fit the field's declared type
    #[error("Type mismatch on '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// Dependent-field propagation did not settle
    #[error("Cascade error from '{trigger}': {reason}")]
    CascadeError { trigger: String, reason: String },

    /// drift_model tag is not one of the known variants
    #[error("Unknown drift model '{0}'. Options are OceanDrift, LarvalFish, OpenOil, Leeway")]
    UnknownDriftModel(String),
}

impl ConfigError {
    /// Short stable name of the error kind (used by FFI and CLI output)
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::RangeViolation { .. } => "RangeViolation",
            ConfigError::MutualExclusionViolation { .. } => "MutualExclusionViolation",
            ConfigError::RequiredTogetherViolation { .. } => "RequiredTogetherViolation",
            ConfigError::TimeConsistencyError { .. } => "TimeConsistencyError",
            ConfigError::ForbiddenFieldViolation { .. } => "ForbiddenFieldViolation",
            ConfigError::UnknownFieldError(_) => "UnknownFieldError",
            ConfigError::VariantReassignmentError { .. } => "VariantReassignmentError",
            ConfigError::TypeMismatch { .. } => "TypeMismatch",
            ConfigError::UnknownDriftModel(_) => "UnknownDriftModel",
            ConfigError::CascadeError { .. } => "CascadeError",
        }
    }

    /// Field name(s) the error refers to
    pub fn fields(&self) -> Vec<String> {
        match self {
            ConfigError::RangeViolation { field, .. }
            | ConfigError::TimeConsistencyError { field, .. }
            | ConfigError::ForbiddenFieldViolation { field, .. }
            | ConfigError::TypeMismatch { field, .. } => vec![field.clone()],
            ConfigError::MutualExclusionViolation { fields, .. }
            | ConfigError::RequiredTogetherViolation { fields, .. } => fields.clone(),
            ConfigError::UnknownFieldError(field) => vec![field.clone()],
            ConfigError::CascadeError { trigger, .. } => vec![trigger.clone()],
            ConfigError::VariantReassignmentError { .. } | ConfigError::UnknownDriftModel(_) => {
                vec!["drift_model".to_string()]
            }
        }
    }

    pub(crate) fn range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::RangeViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn exclusive(fields: &[&str], reason: impl Into<String>) -> Self {
        ConfigError::MutualExclusionViolation {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            reason: reason.into(),
        }
    }
}

impl From<TimeError> for ConfigError {
    fn from(err: TimeError) -> Self {
        match err {
            TimeError::Inconsistent {
                field,
                supplied,
                computed,
            } => ConfigError::TimeConsistencyError {
                field: field.to_string(),
                supplied,
                computed,
            },
            TimeError::DirectionMismatch { .. } => ConfigError::TimeConsistencyError {
                field: "end_time".to_string(),
                supplied: err.to_string(),
                computed: "end_time on the run direction side of start_time".to_string(),
            },
            TimeError::InvalidTimeStep(_) => ConfigError::range("time_step", err.to_string()),
            TimeError::OutOfRange(field) => ConfigError::range(field, err.to_string()),
            TimeError::Underdetermined { .. } | TimeError::MissingAnchor { .. } => ConfigError::RequiredTogetherViolation {
                fields: vec![
                    "start_time".to_string(),
                    "end_time".to_string(),
                    "duration".to_string(),
                    "steps".to_string(),
                ],
                reason: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_fields() {
        let err = ConfigError::exclusive(&["z", "seed_seafloor"], "z must be null");
        assert_eq!(err.kind(), "MutualExclusionViolation");
        assert_eq!(err.fields(), vec!["z".to_string(), "seed_seafloor".to_string()]);
        assert!(err.to_string().contains("z, seed_seafloor"));
    }
}
