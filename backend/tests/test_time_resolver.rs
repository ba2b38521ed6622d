//! Tests for run-window resolution
//!
//! Any two of start_time, end_time, duration, steps (one of them a
//! timestamp) determine the rest; supplying more must be consistent.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use particle_tracking_core_rs::core::duration::{format_iso, parse_iso};
use particle_tracking_core_rs::core::time::{Direction, TimeError, TimeResolver, TimeWindow};
use particle_tracking_core_rs::{ConfigError, DriftConfig, ParamValue};
use proptest::prelude::*;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn resolver(minutes: i64, direction: Direction) -> TimeResolver {
    TimeResolver::new(TimeDelta::minutes(minutes), direction).unwrap()
}

// ============================================================================
// Resolver
// ============================================================================

#[test]
fn test_start_and_duration_forward() {
    let resolved = resolver(60, Direction::Forward)
        .resolve(&TimeWindow {
            start_time: Some(at(1, 0)),
            duration: Some(TimeDelta::days(1)),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(resolved.end_time, at(2, 0));
    assert_eq!(resolved.steps, 24);
}

#[test]
fn test_start_and_steps_backward() {
    let resolved = resolver(60, Direction::Backward)
        .resolve(&TimeWindow {
            start_time: Some(at(2, 0)),
            steps: Some(24),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(resolved.end_time, at(1, 0));
    assert_eq!(resolved.duration, TimeDelta::days(1));
}

#[test]
fn test_end_before_start_forward_is_rejected() {
    let err = resolver(60, Direction::Forward)
        .resolve(&TimeWindow {
            start_time: Some(at(2, 0)),
            end_time: Some(at(1, 0)),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, TimeError::DirectionMismatch { .. }));
}

#[test]
fn test_single_field_is_underdetermined() {
    let err = resolver(60, Direction::Forward)
        .resolve(&TimeWindow {
            start_time: Some(at(1, 0)),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, TimeError::Underdetermined { .. }));
}

#[test]
fn test_duration_and_steps_need_anchor() {
    let err = resolver(60, Direction::Forward)
        .resolve(&TimeWindow {
            duration: Some(TimeDelta::hours(2)),
            steps: Some(2),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, TimeError::MissingAnchor { .. }));
}

#[test]
fn test_steps_round_to_nearest() {
    // 5-minute step: 62 minutes -> 12.4 steps -> 12; 63 minutes -> 12.6 -> 13
    let r = resolver(5, Direction::Forward);
    assert_eq!(r.steps_for(TimeDelta::minutes(62)).unwrap(), 12);
    assert_eq!(r.steps_for(TimeDelta::minutes(63)).unwrap(), 13);
}

#[test]
fn test_three_consistent_fields_accepted() {
    let resolved = resolver(60, Direction::Forward)
        .resolve(&TimeWindow {
            start_time: Some(at(1, 0)),
            end_time: Some(at(2, 0)),
            steps: Some(24),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(format_iso(resolved.duration), "P1DT0H0M0S");
}

// ============================================================================
// Through the configuration object
// ============================================================================

#[test]
fn test_config_inconsistent_steps() {
    let err = DriftConfig::from_pairs([
        ("start_time", ParamValue::from("2022-01-01T00:00:00")),
        ("end_time", ParamValue::from("2022-01-02T00:00:00")),
        ("time_step", ParamValue::Float(60.0)),
        ("steps", ParamValue::Int(23)),
    ])
    .unwrap_err();

    match err {
        ConfigError::TimeConsistencyError {
            field,
            supplied,
            computed,
        } => {
            assert_eq!(field, "steps");
            assert_eq!(supplied, "23");
            assert_eq!(computed, "24");
        }
        other => panic!("expected TimeConsistencyError, got {:?}", other),
    }
}

#[test]
fn test_config_duration_text_derives_end() {
    let config = DriftConfig::from_pairs([
        ("start_time", ParamValue::from("2022-01-01")),
        ("duration", ParamValue::from("P1DT0H0M0S")),
        ("time_step", ParamValue::Float(30.0)),
    ])
    .unwrap();

    assert_eq!(config.get("end_time").unwrap(), ParamValue::Timestamp(at(2, 0)));
    assert_eq!(config.get("steps").unwrap(), ParamValue::Int(48));
}

#[test]
fn test_config_oversized_duration_is_rejected() {
    let err = DriftConfig::from_pairs([
        ("start_time", ParamValue::from("2022-01-01")),
        ("duration", ParamValue::from("P200000000000000000000000W1000000000000000000000000D")),
    ])
    .unwrap_err();
    assert_eq!(err.kind(), "TypeMismatch");
    assert_eq!(err.fields(), vec!["duration".to_string()]);

    assert!(parse_iso("PT99999999999999999999S").is_err());
}

#[test]
fn test_config_only_start_is_incomplete() {
    let err = DriftConfig::from_pairs([("start_time", ParamValue::from("2022-01-01"))]).unwrap_err();
    assert_eq!(err.kind(), "RequiredTogetherViolation");
}

#[test]
fn test_set_end_time_recomputes_steps() {
    let mut config = DriftConfig::from_pairs([("steps", ParamValue::Int(12))]).unwrap();
    config.set("end_time", "2022-01-01T02:00:00").unwrap();

    assert_eq!(config.get("steps").unwrap(), ParamValue::Int(24));
    assert_eq!(config.get("duration").unwrap(), ParamValue::Duration(TimeDelta::hours(2)));
}

#[test]
fn test_set_run_forward_flips_end() {
    let mut config = DriftConfig::from_pairs([("steps", ParamValue::Int(12))]).unwrap();
    let start = at(1, 0);
    assert_eq!(config.get("end_time").unwrap(), ParamValue::Timestamp(start + TimeDelta::hours(1)));

    // CIOFSOP coverage starts in 2021, so running back an hour stays inside it
    config.set("run_forward", false).unwrap();
    assert_eq!(config.get("end_time").unwrap(), ParamValue::Timestamp(start - TimeDelta::hours(1)));
}

// ============================================================================
// Properties
// ============================================================================

/// Input window for one of the five two-field bases
fn basis_window(basis: usize, start: NaiveDateTime, end: NaiveDateTime, span: TimeDelta, steps: u64) -> TimeWindow {
    match basis {
        0 => TimeWindow { start_time: Some(start), end_time: Some(end), ..Default::default() },
        1 => TimeWindow { start_time: Some(start), duration: Some(span), ..Default::default() },
        2 => TimeWindow { start_time: Some(start), steps: Some(steps), ..Default::default() },
        3 => TimeWindow { end_time: Some(end), duration: Some(span), ..Default::default() },
        _ => TimeWindow { end_time: Some(end), steps: Some(steps), ..Default::default() },
    }
}

proptest! {
    /// Every two-field basis, in either direction, yields
    /// end = start +/- steps * time_step, and feeding the resolved window
    /// back in (all four fields) yields the same window.
    #[test]
    fn prop_resolution_is_idempotent(
        basis in 0usize..5,
        step_minutes in 1i64..=120,
        steps in 1u64..=2000,
        forward in any::<bool>(),
        anchor_hours in 0i64..=(24 * 365),
    ) {
        let direction = Direction::from_run_forward(forward);
        let r = resolver(step_minutes, direction);
        let span = TimeDelta::minutes(step_minutes * steps as i64);
        let start = at(1, 0) + TimeDelta::hours(anchor_hours);
        let end = if forward { start + span } else { start - span };

        let first = r.resolve(&basis_window(basis, start, end, span, steps)).unwrap();
        prop_assert_eq!(first.start_time, start);
        prop_assert_eq!(first.end_time, end);
        prop_assert_eq!(first.steps, steps);
        prop_assert_eq!(first.duration, span);
        prop_assert_eq!(first.direction, direction);
        prop_assert_eq!(
            first.end_time - first.start_time,
            TimeDelta::minutes(direction.sign() as i64 * step_minutes * steps as i64)
        );

        let again = r.resolve(&first.as_window()).unwrap();
        prop_assert_eq!(&again, &first);
    }

    /// Canonical duration text parses back to the same span
    #[test]
    fn prop_duration_text_round_trips(seconds in 0i64..=(86_400 * 400)) {
        let delta = TimeDelta::seconds(seconds);
        prop_assert_eq!(parse_iso(&format_iso(delta)).unwrap(), delta);
    }
}
