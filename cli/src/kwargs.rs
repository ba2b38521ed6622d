//! `key=value` argument parsing
//!
//! Values are typed by trying, in order: integer, float, `None`, ISO-8601
//! duration, ISO-8601 timestamp, `True`/`False`, and finally a plain string.
//! `[a,b,c]` is a list of values parsed the same way. The schema coerces
//! whatever comes out of here to each field's declared kind.

use anyhow::{bail, Result};
use particle_tracking_core_rs::core::duration::parse_iso;
use particle_tracking_core_rs::models::value::parse_timestamp;
use particle_tracking_core_rs::ParamValue;

/// Split `key=value` at the first `=`
pub fn parse_pair(arg: &str) -> Result<(String, ParamValue)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("expected key=value, got '{}'", arg);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("missing key in '{}'", arg);
    }
    Ok((key.to_string(), parse_value(value)))
}

pub fn parse_value(text: &str) -> ParamValue {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if inner.trim().is_empty() {
            return ParamValue::List(Vec::new());
        }
        return ParamValue::List(inner.split(',').map(parse_scalar).collect());
    }
    parse_scalar(text)
}

fn parse_scalar(text: &str) -> ParamValue {
    let text = text.trim().trim_matches(|c: char| c == '"' || c == '\'');

    if let Ok(i) = text.parse::<i64>() {
        return ParamValue::Int(i);
    }
    // Reject "inf"/"NaN" spellings; those are names, not numbers here
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() {
            return ParamValue::Float(f);
        }
    }
    if text == "None" {
        return ParamValue::Null;
    }
    if let Ok(d) = parse_iso(text) {
        return ParamValue::Duration(d);
    }
    if let Some(t) = parse_timestamp(text) {
        return ParamValue::Timestamp(t);
    }
    match text {
        "True" | "true" => ParamValue::Bool(true),
        "False" | "false" => ParamValue::Bool(false),
        _ => ParamValue::Str(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    #[test]
    fn test_scalar_detection() {
        assert_eq!(parse_value("24"), ParamValue::Int(24));
        assert_eq!(parse_value("-151.5"), ParamValue::Float(-151.5));
        assert_eq!(parse_value("None"), ParamValue::Null);
        assert_eq!(parse_value("PT6H"), ParamValue::Duration(TimeDelta::hours(6)));
        assert_eq!(parse_value("True"), ParamValue::Bool(true));
        assert_eq!(parse_value("False"), ParamValue::Bool(false));
        assert_eq!(parse_value("CIOFSOP"), ParamValue::from("CIOFSOP"));
        assert_eq!(parse_value("inf"), ParamValue::from("inf"));
    }

    #[test]
    fn test_timestamp_detection() {
        let expected = NaiveDate::from_ymd_opt(2022, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();
        assert_eq!(parse_value("2022-01-01T12:00:00"), ParamValue::Timestamp(expected));
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            parse_value("[1, 2.5,None]"),
            ParamValue::List(vec![ParamValue::Int(1), ParamValue::Float(2.5), ParamValue::Null])
        );
        assert_eq!(parse_value("[]"), ParamValue::List(Vec::new()));
    }

    #[test]
    fn test_pairs_split_at_first_equals() {
        let (key, value) = parse_pair("output_file=runs/a=b").unwrap();
        assert_eq!(key, "output_file");
        assert_eq!(value, ParamValue::from("runs/a=b"));

        assert!(parse_pair("steps").is_err());
        assert!(parse_pair("=24").is_err());
    }
}
