//! Python bindings (behind the `pyo3` feature)

pub mod config;
pub mod types;

pub use config::{get_parameter_schema, PyDriftConfig};
