//! Domain models for the configuration engine

pub mod event;
pub mod ocean_model;
pub mod schema;
pub mod seed;
pub mod value;
pub mod variant;

// Re-exports
pub use event::{CascadeLog, ConfigEvent};
pub use ocean_model::OceanModel;
pub use schema::{ExposureTier, FieldLayer, ParamKind, ParamSpec, ParameterSchema};
pub use seed::{RadiusType, SeedFlag, SeedSpec};
pub use value::ParamValue;
pub use variant::{DriftModel, VariantProfile};
