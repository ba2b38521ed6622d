//! Tests for dependent-field propagation
//!
//! Assignments that imply other values (surface-only mode, seafloor
//! seeding, seeding form, diffusivity) are applied as recorded overrides,
//! and a failing assignment is rolled back completely.

use chrono::TimeDelta;
use particle_tracking_core_rs::config::cascade::{rules_for, MAX_DEPTH};
use particle_tracking_core_rs::config::DiffusivityOrigin;
use particle_tracking_core_rs::models::seed::SeedFlag;
use particle_tracking_core_rs::{ConfigEvent, DriftConfig, ParamValue};
use serde_json::json;

const TRUNCATE: &str = "drift:truncate_ocean_model_below_m";

fn base() -> DriftConfig {
    DriftConfig::from_pairs([("steps", ParamValue::Int(24))]).unwrap()
}

fn polygon() -> ParamValue {
    ParamValue::Object(json!({
        "type": "Polygon",
        "coordinates": [[[-151.0, 58.0], [-150.0, 58.0], [-150.0, 59.0], [-151.0, 58.0]]]
    }))
}

// ============================================================================
// Surface-only mode
// ============================================================================

#[test]
fn test_surface_only_sets_dependents() {
    let mut config = base();
    config.set("surface_only", true).unwrap();

    assert_eq!(config.get("do3D").unwrap(), ParamValue::Bool(false));
    assert_eq!(config.get("seed:z").unwrap(), ParamValue::Float(0.0));
    assert_eq!(config.get("vertical_mixing").unwrap(), ParamValue::Bool(false));
    assert_eq!(config.get(TRUNCATE).unwrap(), ParamValue::Float(0.5));

    let truncation = config.events().events_for_field(TRUNCATE);
    match truncation.last() {
        Some(ConfigEvent::CascadeOverride { rule, trigger, .. }) => {
            assert_eq!(*rule, "surface_only");
            assert_eq!(trigger, "surface_only");
        }
        other => panic!("expected a cascade override, got {:?}", other),
    }
}

fn last_override(config: &DriftConfig, field: &str) -> (&'static str, ParamValue, ParamValue) {
    match config.events().events_for_field(field).last() {
        Some(ConfigEvent::CascadeOverride { rule, old, new, .. }) => (*rule, old.clone(), new.clone()),
        other => panic!("expected a cascade override of {}, got {:?}", field, other),
    }
}

#[test]
fn test_surface_only_flattens_a_3d_run() {
    let mut config = DriftConfig::from_pairs([
        ("steps", ParamValue::Int(24)),
        ("do3D", ParamValue::Bool(true)),
        ("z", ParamValue::Float(-10.0)),
        ("vertical_mixing", ParamValue::Bool(true)),
    ])
    .unwrap();
    assert_eq!(config.get("drift:vertical_advection").unwrap(), ParamValue::Bool(true));

    config.set("surface_only", true).unwrap();

    assert_eq!(config.get("do3D").unwrap(), ParamValue::Bool(false));
    assert_eq!(config.get("z").unwrap(), ParamValue::Float(0.0));
    assert_eq!(config.get("vertical_mixing").unwrap(), ParamValue::Bool(false));
    assert_eq!(config.get("drift:vertical_advection").unwrap(), ParamValue::Bool(false));

    assert_eq!(
        last_override(&config, "do3D"),
        ("surface_only", ParamValue::Bool(true), ParamValue::Bool(false))
    );
    assert_eq!(
        last_override(&config, "z"),
        ("surface_only", ParamValue::Float(-10.0), ParamValue::Float(0.0))
    );
    assert_eq!(
        last_override(&config, "vertical_mixing"),
        ("surface_only", ParamValue::Bool(true), ParamValue::Bool(false))
    );
    assert_eq!(last_override(&config, TRUNCATE).0, "surface_only");
    assert_eq!(last_override(&config, "drift:vertical_advection").0, "do3D");
    assert!(config.validate().is_ok());
}

#[test]
fn test_surface_only_blocks_3d() {
    let mut config = base();
    config.set("surface_only", true).unwrap();
    let events = config.events().len();

    let err = config.set("do3D", true).unwrap_err();
    assert_eq!(err.kind(), "MutualExclusionViolation");
    assert_eq!(config.get("do3D").unwrap(), ParamValue::Bool(false));
    assert_eq!(config.events().len(), events);

    let err = config.set("z", -5.0).unwrap_err();
    assert_eq!(err.kind(), "MutualExclusionViolation");
    assert_eq!(config.get("z").unwrap(), ParamValue::Float(0.0));
}

#[test]
fn test_leaving_surface_only_releases_truncation() {
    let mut config = base();
    config.set("surface_only", true).unwrap();
    config.set("surface_only", ParamValue::Null).unwrap();

    assert!(config.get(TRUNCATE).unwrap().is_null());
    config.set("do3D", true).unwrap();
    config.set("z", -5.0).unwrap();
    assert_eq!(config.get("seed:z").unwrap(), ParamValue::Float(-5.0));
}

// ============================================================================
// Vertical motion
// ============================================================================

#[test]
fn test_do3d_toggles_vertical_advection() {
    let mut config = base();
    assert_eq!(config.get("drift:vertical_advection").unwrap(), ParamValue::Bool(false));

    config.set("do3D", true).unwrap();
    assert_eq!(config.get("drift:vertical_advection").unwrap(), ParamValue::Bool(true));

    config.set("vertical_mixing", true).unwrap();
    config.set("mixed_layer_depth", 45.0).unwrap();

    config.set("do3D", false).unwrap();
    assert_eq!(config.get("vertical_mixing").unwrap(), ParamValue::Bool(false));
    assert_eq!(config.get("drift:vertical_advection").unwrap(), ParamValue::Bool(false));
    // Mixing parameters return to their defaults once mixing is off
    assert_eq!(config.get("mixed_layer_depth").unwrap(), ParamValue::Float(30.0));
    assert!(config.validate().is_ok());
}

// ============================================================================
// Seeding
// ============================================================================

#[test]
fn test_seafloor_and_z_exclude_each_other() {
    let mut config = base();

    config.set("seed_seafloor", true).unwrap();
    assert!(config.get("z").unwrap().is_null());

    config.set("z", -3.0).unwrap();
    assert_eq!(config.get("seed:seafloor").unwrap(), ParamValue::Bool(false));
    assert_eq!(config.get("z").unwrap(), ParamValue::Float(-3.0));
}

#[test]
fn test_geojson_switches_seeding_form() {
    let mut config = base();
    config.set("geojson", polygon()).unwrap();

    assert_eq!(config.get("seed_flag").unwrap(), ParamValue::from("geojson"));
    assert!(config.get("lon").unwrap().is_null());
    assert!(config.get("lat").unwrap().is_null());
    assert_eq!(config.seed_spec().unwrap().flag(), SeedFlag::Geojson);

    config.set("seed_flag", "elements").unwrap();
    assert!(config.get("geojson").unwrap().is_null());
    assert_eq!(config.get("lon").unwrap(), ParamValue::Float(-151.0));
    assert_eq!(config.get("lat").unwrap(), ParamValue::Float(58.0));
    assert_eq!(config.seed_spec().unwrap().flag(), SeedFlag::Elements);
}

#[test]
fn test_geojson_at_construction() {
    let config = DriftConfig::from_pairs([
        ("steps", ParamValue::Int(24)),
        ("geojson", polygon()),
    ])
    .unwrap();
    assert_eq!(config.get("seed_flag").unwrap(), ParamValue::from("geojson"));
    assert!(config.get("lon").unwrap().is_null());
}

// ============================================================================
// Diffusivity
// ============================================================================

#[test]
fn test_diffusivity_derived_from_ocean_model() {
    let mut config = base();
    assert_eq!(config.diffusivity_origin(), DiffusivityOrigin::Derived);

    config.set("ocean_model", "custom_model").unwrap();
    assert_eq!(config.get("horizontal_diffusivity").unwrap(), ParamValue::Float(0.0));

    let last = config.events().overrides().into_iter().last().cloned();
    match last {
        Some(ConfigEvent::CascadeOverride { rule, field, new, .. }) => {
            assert_eq!(rule, "ocean_model_diffusivity");
            assert_eq!(field, "horizontal_diffusivity");
            assert_eq!(new, ParamValue::Float(0.0));
        }
        other => panic!("expected diffusivity override, got {:?}", other),
    }
}

#[test]
fn test_explicit_diffusivity_survives_model_change() {
    let mut config = DriftConfig::from_pairs([
        ("steps", ParamValue::Int(24)),
        ("horizontal_diffusivity", ParamValue::Float(25.0)),
    ])
    .unwrap();
    assert_eq!(config.diffusivity_origin(), DiffusivityOrigin::User);

    config.set("ocean_model", "CIOFS").unwrap();
    assert_eq!(config.get("horizontal_diffusivity").unwrap(), ParamValue::Float(25.0));
}

// ============================================================================
// Time window
// ============================================================================

#[test]
fn test_duration_change_moves_end_and_steps() {
    let mut config = base();
    config.set("duration", "PT6H").unwrap();

    assert_eq!(config.get("steps").unwrap(), ParamValue::Int(72));
    let window = config.time_window().unwrap();
    assert_eq!(window.end_time - window.start_time, TimeDelta::hours(6));

    let derived = config.events().events_of_type("Derived");
    assert!(derived.iter().any(|e| e.field() == "steps"));
}

#[test]
fn test_time_step_change_keeps_endpoints() {
    let mut config = base();
    let before = config.time_window().unwrap();

    config.set("time_step", 10.0).unwrap();
    let after = config.time_window().unwrap();
    assert_eq!(after.end_time, before.end_time);
    assert_eq!(after.steps, 12);
}

// ============================================================================
// Rollback and the rule table
// ============================================================================

#[test]
fn test_failed_cascade_restores_everything() {
    let mut config = base();
    let merged = config.merged();
    let events = config.events().len();
    let origin = config.diffusivity_origin();

    // lon/lat are cleared by the cascade, then validation finds no polygon
    let err = config.set("seed_flag", "geojson").unwrap_err();
    assert_eq!(err.kind(), "MutualExclusionViolation");

    assert_eq!(config.merged(), merged);
    assert_eq!(config.events().len(), events);
    assert_eq!(config.diffusivity_origin(), origin);
}

#[test]
fn test_every_assignment_is_logged() {
    let mut config = base();
    config.set("number", 100).unwrap();

    let events = config.events().events_for_field("number");
    assert_eq!(
        events.last().copied(),
        Some(&ConfigEvent::UserAssignment {
            field: "number".to_string(),
            old: ParamValue::Int(1),
            new: ParamValue::Int(100),
        })
    );
    assert_eq!(config.get("seed:number").unwrap(), ParamValue::Int(100));
}

#[test]
fn test_rule_lookup() {
    let names: Vec<&str> = rules_for("do3D").map(|r| r.name).collect();
    assert_eq!(names, vec!["surface_only", "do3D"]);
    assert_eq!(rules_for("lon").count(), 0);
    assert!(MAX_DEPTH >= 8);
}
