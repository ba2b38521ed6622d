//! Type conversion utilities for FFI boundary
//!
//! Converts between Python objects and [`ParamValue`]. Datetimes and
//! timedeltas cross as their ISO-8601 text so the binding does not depend
//! on PyO3's chrono integration.

use indexmap::IndexMap;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};
use serde_json::Value;

use crate::core::duration::format_iso;
use crate::error::ConfigError;
use crate::models::value::ParamValue;

// ========================================================================
// Errors
// ========================================================================

/// Map a configuration error to `ValueError`, prefixed with its kind
pub fn config_err(err: ConfigError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}: {}", err.kind(), err))
}

// ========================================================================
// Python -> Rust
// ========================================================================

/// Convert one Python value
///
/// # Errors
/// Returns PyValueError for objects with no configuration equivalent.
pub fn py_to_param(obj: &Bound<'_, PyAny>) -> PyResult<ParamValue> {
    if obj.is_none() {
        return Ok(ParamValue::Null);
    }
    // bool before int: Python bools are ints
    if obj.is_instance_of::<PyBool>() {
        return Ok(ParamValue::Bool(obj.extract()?));
    }
    if obj.is_instance_of::<PyInt>() {
        return Ok(ParamValue::Int(obj.extract()?));
    }
    if obj.is_instance_of::<PyFloat>() {
        return Ok(ParamValue::Float(obj.extract()?));
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(ParamValue::Str(obj.extract()?));
    }
    if obj.is_instance_of::<PyList>() || obj.is_instance_of::<PyTuple>() {
        let items = obj
            .iter()?
            .map(|item| py_to_param(&item?))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(ParamValue::List(items));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = serde_json::Map::new();
        for (key, value) in dict.iter() {
            map.insert(key.extract::<String>()?, py_to_param(&value)?.to_json());
        }
        return Ok(ParamValue::Object(Value::Object(map)));
    }
    // datetime.datetime / datetime.date: let the schema parse the ISO text
    if obj.hasattr("isoformat")? {
        let text: String = obj.call_method0("isoformat")?.extract()?;
        return Ok(ParamValue::Str(text));
    }
    // datetime.timedelta
    if obj.hasattr("total_seconds")? {
        let seconds: f64 = obj.call_method0("total_seconds")?.extract()?;
        let delta = chrono::TimeDelta::microseconds((seconds * 1_000_000.0).round() as i64);
        return Ok(ParamValue::Str(format_iso(delta)));
    }
    Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
        "Unsupported configuration value of type '{}'",
        obj.get_type().name()?
    )))
}

/// Convert a keyword dict into ordered inputs
pub fn py_dict_to_inputs(dict: &Bound<'_, PyDict>) -> PyResult<IndexMap<String, ParamValue>> {
    let mut inputs = IndexMap::new();
    for (key, value) in dict.iter() {
        inputs.insert(key.extract::<String>()?, py_to_param(&value)?);
    }
    Ok(inputs)
}

// ========================================================================
// Rust -> Python
// ========================================================================

/// Convert a JSON value to native Python objects
pub fn json_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    Ok(match value {
        Value::Null => py.None(),
        Value::Bool(b) => b.into_py(py),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.into_py(py),
            None => n.as_f64().unwrap_or(f64::NAN).into_py(py),
        },
        Value::String(s) => s.into_py(py),
        Value::Array(items) => {
            let converted = items
                .iter()
                .map(|item| json_to_py(py, item))
                .collect::<PyResult<Vec<_>>>()?;
            PyList::new_bound(py, converted).into_py(py)
        }
        Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (k, v) in map {
                dict.set_item(k, json_to_py(py, v)?)?;
            }
            dict.into_py(py)
        }
    })
}

/// Convert a parameter value (timestamps and durations as ISO text)
pub fn param_to_py(py: Python<'_>, value: &ParamValue) -> PyResult<PyObject> {
    json_to_py(py, &value.to_json())
}
