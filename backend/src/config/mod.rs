//! Drift configuration engine
//!
//! - **namespace**: layered namespaces and the merged view
//! - **cascade**: dependent-field rules
//! - **validation**: invariant checks
//! - **manager**: the mutable [`DriftConfig`] object
//! - **reader**: run artefacts (reader plan, output paths, cache, seeding)
//! - **frozen**: the immutable [`FrozenConfig`]

pub mod cascade;
pub mod frozen;
pub mod manager;
pub mod namespace;
pub mod reader;
pub mod validation;

pub use cascade::{CascadeRule, Effect, RULES};
pub use frozen::{compute_config_hash, to_json_text, FrozenConfig, RunWindow};
pub use manager::{DiffusivityOrigin, DriftConfig, TIME_FIELDS};
pub use namespace::{
    ConfigQuery, FieldMeta, Layer, MergeError, MergedEntry, MergedView, Namespace,
    NamespaceMerger, ParamMetadata, Parameter, TranslationTable,
};
pub use reader::{OutputPaths, ReaderPlan};
pub use validation::{ConstraintValidator, FieldSource};
