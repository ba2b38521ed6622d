//! PyO3 wrapper for DriftConfig
//!
//! Exposes the configuration object to Python. Errors surface as
//! `ValueError("<Kind>: <message>")`; structured results (introspection,
//! engine export, frozen run record) come back as JSON text.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{config_err, json_to_py, param_to_py, py_dict_to_inputs, py_to_param};
use crate::config::frozen::to_json_text;
use crate::config::namespace::ConfigQuery;
use crate::config::DriftConfig as RustDriftConfig;
use crate::engine::EngineLevel;
use crate::models::schema::{ExposureTier, ParameterSchema};

/// Python wrapper for DriftConfig
///
/// # Example (from Python)
/// ```python
/// from particle_tracking_core_rs import DriftConfig
///
/// config = DriftConfig({"drift_model": "OpenOil", "steps": 24})
/// config.set("surface_only", True)
/// print(config.get("do3D"))              # False
/// print(config.show_config(key="seed:z"))
/// ```
#[pyclass(name = "DriftConfig")]
pub struct PyDriftConfig {
    inner: RustDriftConfig,
}

#[pymethods]
impl PyDriftConfig {
    /// Create a configuration from keyword values
    ///
    /// # Errors
    ///
    /// Raises ValueError with the first violation found.
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let inputs = match config {
            Some(dict) => py_dict_to_inputs(dict)?,
            None => Default::default(),
        };
        let inner = RustDriftConfig::new(inputs).map_err(config_err)?;
        Ok(PyDriftConfig { inner })
    }

    /// Configuration id (UUID string)
    #[getter]
    fn config_id(&self) -> String {
        self.inner.id().to_string()
    }

    #[getter]
    fn drift_model(&self) -> &'static str {
        self.inner.drift_model().as_str()
    }

    /// Resolved value by semantic name or engine key
    fn get(&self, py: Python, name: &str) -> PyResult<PyObject> {
        let value = self.inner.get(name).map_err(config_err)?;
        param_to_py(py, &value)
    }

    /// Assign a field; the configuration is unchanged if this raises
    fn set(&mut self, name: &str, value: &Bound<'_, PyAny>) -> PyResult<()> {
        let value = py_to_param(value)?;
        self.inner.set(name, value).map_err(config_err)?;
        Ok(())
    }

    /// Introspect the merged configuration
    ///
    /// Returns JSON text `{name: metadata}`. `key` matching an entry
    /// exactly returns only that entry.
    #[pyo3(signature = (key=None, prefix=None, level=None, exposure_tier=None, substring=None, exclude_substring=None))]
    fn show_config(
        &self,
        key: Option<String>,
        prefix: Option<String>,
        level: Option<Vec<u8>>,
        exposure_tier: Option<Vec<u8>>,
        substring: Option<String>,
        exclude_substring: Option<String>,
    ) -> PyResult<String> {
        let query = ConfigQuery {
            key,
            prefix,
            substring,
            exclude_substring,
            levels: level.map(|ls| ls.into_iter().filter_map(EngineLevel::from_u8).collect()),
            exposure_tiers: exposure_tier
                .map(|ts| ts.into_iter().filter_map(ExposureTier::from_u8).collect()),
        };
        to_json_text(&self.inner.show_config(&query)).map_err(config_err)
    }

    /// Flat engine configuration as JSON text for the given exposure tiers
    /// (default all)
    #[pyo3(signature = (tier=None))]
    fn drift_model_config(&self, tier: Option<Vec<u8>>) -> PyResult<String> {
        let tiers: Vec<ExposureTier> = match tier {
            Some(ts) => ts.into_iter().filter_map(ExposureTier::from_u8).collect(),
            None => ExposureTier::ALL.to_vec(),
        };
        to_json_text(&self.inner.drift_model_config(&tiers)).map_err(config_err)
    }

    /// Number of recorded configuration events
    fn event_count(&self) -> usize {
        self.inner.events().len()
    }

    /// Validate and return the frozen run record as JSON text
    fn freeze(&self) -> PyResult<String> {
        let frozen = self.inner.freeze().map_err(config_err)?;
        frozen.to_json_string().map_err(config_err)
    }
}

/// Documentation of every configurable field
#[pyfunction]
pub fn get_parameter_schema(py: Python) -> PyResult<PyObject> {
    json_to_py(py, &ParameterSchema::global().documentation())
}
