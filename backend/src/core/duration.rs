//! ISO-8601 durations
//!
//! Durations are exchanged as ISO-8601 strings. The canonical form written by
//! [`format_iso`] is always `P{days}DT{hours}H{minutes}M{seconds}S`, with
//! fractional seconds trimmed of trailing zeros, so two equal durations always
//! produce byte-identical text.

use chrono::TimeDelta;
use thiserror::Error;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Errors parsing ISO-8601 duration text
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,

    #[error("duration '{0}' must start with 'P'")]
    MissingDesignator(String),

    #[error("invalid number '{0}' in duration")]
    InvalidNumber(String),

    #[error("unsupported duration unit '{0}' (years and months have no fixed length)")]
    UnsupportedUnit(char),

    #[error("duration '{0}' has no components")]
    NoComponents(String),

    #[error("duration '{0}' is out of range")]
    Overflow(String),
}

/// Format a duration in canonical ISO-8601 form
///
/// # Example
/// ```
/// use chrono::TimeDelta;
/// use particle_tracking_core_rs::core::duration::format_iso;
///
/// assert_eq!(format_iso(TimeDelta::hours(24)), "P1DT0H0M0S");
/// assert_eq!(format_iso(TimeDelta::minutes(90)), "P0DT1H30M0S");
/// assert_eq!(format_iso(TimeDelta::milliseconds(600)), "P0DT0H0M0.6S");
/// ```
pub fn format_iso(delta: TimeDelta) -> String {
    let sign = if delta < TimeDelta::zero() { "-" } else { "" };
    let magnitude = delta.abs();
    let total_seconds = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let seconds_text = if nanos == 0 {
        seconds.to_string()
    } else {
        let fraction = format!("{:09}", nanos);
        format!("{}.{}", seconds, fraction.trim_end_matches('0'))
    };

    format!(
        "{}P{}DT{}H{}M{}S",
        sign, days, hours, minutes, seconds_text
    )
}

/// Parse ISO-8601 duration text such as `P2D`, `PT48H`, `P1DT0H30M0.5S` or `P1W`
///
/// Years and months are rejected because their length depends on the calendar.
pub fn parse_iso(text: &str) -> Result<TimeDelta, DurationParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let upper = body.to_ascii_uppercase();
    let rest = upper
        .strip_prefix('P')
        .ok_or_else(|| DurationParseError::MissingDesignator(text.to_string()))?;

    let mut total_nanos: i128 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut components = 0usize;

    for c in rest.chars() {
        match c {
            '0'..='9' | '.' | ',' => number.push(if c == ',' { '.' } else { c }),
            'T' => {
                if !number.is_empty() {
                    return Err(DurationParseError::InvalidNumber(number));
                }
                in_time = true;
            }
            unit => {
                let unit_nanos: i128 = match (in_time, unit) {
                    (false, 'W') => 7 * 86_400 * NANOS_PER_SECOND,
                    (false, 'D') => 86_400 * NANOS_PER_SECOND,
                    (true, 'H') => 3_600 * NANOS_PER_SECOND,
                    (true, 'M') => 60 * NANOS_PER_SECOND,
                    (true, 'S') => NANOS_PER_SECOND,
                    (_, other) => return Err(DurationParseError::UnsupportedUnit(other)),
                };
                total_nanos = total_nanos
                    .checked_add(scaled_component(&number, unit_nanos)?)
                    .ok_or_else(|| DurationParseError::Overflow(text.to_string()))?;
                number.clear();
                components += 1;
            }
        }
    }

    if !number.is_empty() {
        return Err(DurationParseError::InvalidNumber(number));
    }
    if components == 0 {
        return Err(DurationParseError::NoComponents(text.to_string()));
    }

    if negative {
        total_nanos = -total_nanos;
    }
    delta_from_nanos(total_nanos).ok_or_else(|| DurationParseError::Overflow(text.to_string()))
}

/// Convert a time step in (possibly fractional) minutes to a duration,
/// rounded to the microsecond
pub fn minutes_to_delta(minutes: f64) -> TimeDelta {
    TimeDelta::microseconds((minutes * 60_000_000.0).round() as i64)
}

/// Multiply a duration by a step count
pub fn scale(delta: TimeDelta, factor: u64) -> Option<TimeDelta> {
    let micros = delta.num_microseconds()? as i128 * factor as i128;
    i64::try_from(micros).ok().map(TimeDelta::microseconds)
}

fn scaled_component(number: &str, unit_nanos: i128) -> Result<i128, DurationParseError> {
    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(DurationParseError::InvalidNumber(number.to_string()));
    }

    let whole_value: i128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| DurationParseError::InvalidNumber(number.to_string()))?
    };

    let mut nanos = whole_value
        .checked_mul(unit_nanos)
        .ok_or_else(|| DurationParseError::Overflow(number.to_string()))?;

    if !fraction.is_empty() {
        let digits = &fraction[..fraction.len().min(18)];
        let numerator: i128 = digits
            .parse()
            .map_err(|_| DurationParseError::InvalidNumber(number.to_string()))?;
        let denominator = 10i128.pow(digits.len() as u32);
        nanos = numerator
            .checked_mul(unit_nanos)
            .map(|n| n / denominator)
            .and_then(|n| nanos.checked_add(n))
            .ok_or_else(|| DurationParseError::Overflow(number.to_string()))?;
    }

    Ok(nanos)
}

fn delta_from_nanos(nanos: i128) -> Option<TimeDelta> {
    let seconds = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok()?;
    let remainder = nanos.rem_euclid(NANOS_PER_SECOND) as u32;
    TimeDelta::new(seconds, remainder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_canonical() {
        assert_eq!(format_iso(TimeDelta::zero()), "P0DT0H0M0S");
        assert_eq!(format_iso(TimeDelta::days(3) + TimeDelta::seconds(61)), "P3DT0H1M1S");
        assert_eq!(format_iso(-TimeDelta::hours(1)), "-P0DT1H0M0S");
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_iso("PT48H").unwrap(), TimeDelta::hours(48));
        assert_eq!(parse_iso("P2D").unwrap(), TimeDelta::days(2));
        assert_eq!(parse_iso("P1W").unwrap(), TimeDelta::days(7));
        assert_eq!(parse_iso("p0dt1h30m0s").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_iso("PT0.5S").unwrap(), TimeDelta::milliseconds(500));
        assert_eq!(parse_iso("-PT1H").unwrap(), -TimeDelta::hours(1));
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(parse_iso(""), Err(DurationParseError::Empty));
        assert!(matches!(parse_iso("48H"), Err(DurationParseError::MissingDesignator(_))));
        assert!(matches!(parse_iso("P1Y"), Err(DurationParseError::UnsupportedUnit('Y'))));
        assert!(matches!(parse_iso("P1M"), Err(DurationParseError::UnsupportedUnit('M'))));
        assert!(matches!(parse_iso("PT"), Err(DurationParseError::NoComponents(_))));
        assert!(matches!(parse_iso("PT5"), Err(DurationParseError::InvalidNumber(_))));
    }

    #[test]
    fn test_parse_overflow_is_an_error() {
        let huge = "P200000000000000000000000W1000000000000000000000000D";
        assert!(matches!(parse_iso(huge), Err(DurationParseError::Overflow(_))));
        assert!(matches!(parse_iso("PT99999999999999999999S"), Err(DurationParseError::Overflow(_))));
    }

    #[test]
    fn test_format_parse_agree() {
        let delta = TimeDelta::days(1) + TimeDelta::minutes(7) + TimeDelta::milliseconds(250);
        assert_eq!(parse_iso(&format_iso(delta)).unwrap(), delta);
    }

    #[test]
    fn test_minutes_to_delta() {
        assert_eq!(minutes_to_delta(5.0), TimeDelta::minutes(5));
        assert_eq!(minutes_to_delta(0.01), TimeDelta::milliseconds(600));
    }
}
