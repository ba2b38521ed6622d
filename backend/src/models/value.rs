//! Typed parameter values
//!
//! Every configuration slot holds a [`ParamValue`]. Values serialize to JSON
//! with timestamps as ISO-8601 datetimes and durations in canonical ISO-8601
//! duration form, so an exported configuration is stable text.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::core::duration::format_iso;

/// A parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Timestamp(NaiveDateTime),
    Duration(TimeDelta),
    List(Vec<ParamValue>),
    Object(Value),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view; ints widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            ParamValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            ParamValue::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Short name of the value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
            ParamValue::Timestamp(_) => "timestamp",
            ParamValue::Duration(_) => "duration",
            ParamValue::List(_) => "list",
            ParamValue::Object(_) => "object",
        }
    }

    /// JSON representation
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Int(i) => Value::from(*i),
            ParamValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::Timestamp(t) => Value::String(format_timestamp(*t)),
            ParamValue::Duration(d) => Value::String(format_iso(*d)),
            ParamValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            ParamValue::Object(v) => v.clone(),
        }
    }

    /// Untyped conversion from JSON; strings stay strings until coerced by the schema
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => n.as_f64().map(ParamValue::Float).unwrap_or(ParamValue::Null),
            },
            Value::String(s) => ParamValue::Str(s.clone()),
            Value::Array(items) => ParamValue::List(items.iter().map(ParamValue::from_json).collect()),
            Value::Object(_) => ParamValue::Object(value.clone()),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Null => write!(f, "None"),
            ParamValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Timestamp(t) => write!(f, "{}", format_timestamp(*t)),
            ParamValue::Duration(d) => write!(f, "{}", format_iso(*d)),
            ParamValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            ParamValue::Object(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Int(i as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(t: NaiveDateTime) -> Self {
        ParamValue::Timestamp(t)
    }
}

impl From<TimeDelta> for ParamValue {
    fn from(d: TimeDelta) -> Self {
        ParamValue::Duration(d)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

/// ISO-8601 text for a naive timestamp (fractional seconds only when present)
pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 date or datetime; a trailing `Z` is accepted and dropped
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2022-01-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2022-01-01 12:30"), Some(expected));
        assert_eq!(parse_timestamp("2022-01-01T12:30:00Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2022-01-01").map(|t| t.date()),
            Some(expected.date())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_json_forms() {
        let t = parse_timestamp("2022-01-01").unwrap();
        assert_eq!(ParamValue::Timestamp(t).to_json(), json!("2022-01-01T00:00:00"));
        assert_eq!(ParamValue::Duration(TimeDelta::hours(2)).to_json(), json!("P0DT2H0M0S"));
        assert_eq!(
            ParamValue::List(vec![ParamValue::Int(1), ParamValue::Null]).to_json(),
            json!([1, null])
        );
    }

    #[test]
    fn test_from_json() {
        assert_eq!(ParamValue::from_json(&json!(3)), ParamValue::Int(3));
        assert_eq!(ParamValue::from_json(&json!(0.5)), ParamValue::Float(0.5));
        assert_eq!(ParamValue::from_json(&json!("x")), ParamValue::Str("x".into()));
        assert!(matches!(
            ParamValue::from_json(&json!({"type": "Polygon"})),
            ParamValue::Object(_)
        ));
    }

    #[test]
    fn test_display_matches_cli_spelling() {
        assert_eq!(ParamValue::Null.to_string(), "None");
        assert_eq!(ParamValue::Bool(true).to_string(), "True");
        assert_eq!(ParamValue::Float(-10.0).to_string(), "-10");
    }
}
