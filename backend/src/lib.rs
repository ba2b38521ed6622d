//! Particle Tracking Core - Rust Engine
//!
//! Configuration engine for Lagrangian particle-tracking runs: a typed,
//! layered configuration that keeps its dependent fields consistent.
//!
//! # Architecture
//!
//! - **core**: Time window resolution and ISO-8601 durations
//! - **models**: Domain types (values, schema, variants, seeding, ocean models, events)
//! - **engine**: Engine-native key catalogue
//! - **config**: Namespaces, cascade, validation, the configuration object
//!
//! # Critical Invariants
//!
//! 1. drift_model is fixed for the lifetime of a configuration
//! 2. A failed mutation leaves the configuration unchanged
//! 3. Every self-initiated change is recorded in the event log
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod models;

// Re-exports for convenience
pub use config::{ConfigQuery, DriftConfig, FrozenConfig, MergedView};
pub use core::time::{Direction, ResolvedWindow, TimeResolver, TimeWindow};
pub use engine::{EngineCatalog, EngineLevel, EngineParam, OpenDriftCatalog};
pub use error::ConfigError;
pub use models::{
    event::{CascadeLog, ConfigEvent},
    schema::{ExposureTier, ParameterSchema},
    value::ParamValue,
    variant::DriftModel,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn particle_tracking_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::PyDriftConfig>()?;
    m.add_function(wrap_pyfunction!(ffi::get_parameter_schema, m)?)?;
    Ok(())
}
