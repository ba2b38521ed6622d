//! Tests for drift-model variants
//!
//! Each variant pins some fields, keeps others at their defaults and adds
//! its own fields. The variant is fixed once a configuration is built.

use particle_tracking_core_rs::models::schema::ExposureTier;
use particle_tracking_core_rs::{ConfigError, DriftConfig, DriftModel, ParameterSchema, ParamValue};

fn build(model: &str, pairs: &[(&str, ParamValue)]) -> Result<DriftConfig, ConfigError> {
    let mut all: Vec<(&str, ParamValue)> = vec![
        ("drift_model", ParamValue::from(model)),
        ("steps", ParamValue::Int(24)),
    ];
    all.extend(pairs.iter().cloned());
    DriftConfig::from_pairs(all)
}

// ============================================================================
// Variant tables
// ============================================================================

#[test]
fn test_extra_fields_only_exist_for_their_variant() {
    let schema = ParameterSchema::global();
    for model in DriftModel::ALL {
        for field in model.profile().extra_fields {
            let spec = schema.get(field).unwrap();
            for other in DriftModel::ALL {
                assert_eq!(spec.is_available(other), other == model, "{} on {}", field, other);
            }
        }
    }
}

#[test]
fn test_unknown_drift_model() {
    let err = build("Plankton", &[]).unwrap_err();
    assert_eq!(err, ConfigError::UnknownDriftModel("Plankton".to_string()));
}

#[test]
fn test_drift_model_is_case_insensitive() {
    let config = build("openoil", &[]).unwrap();
    assert_eq!(config.drift_model(), DriftModel::OpenOil);
    assert_eq!(config.get("drift_model").unwrap(), ParamValue::from("OpenOil"));
}

// ============================================================================
// LarvalFish
// ============================================================================

#[test]
fn test_larval_fish_forces_3d_mixing() {
    let config = build("LarvalFish", &[]).unwrap();

    assert_eq!(config.get("do3D").unwrap(), ParamValue::Bool(true));
    assert_eq!(config.get("drift:vertical_mixing").unwrap(), ParamValue::Bool(true));
    assert_eq!(config.get("drift:vertical_advection").unwrap(), ParamValue::Bool(true));

    let forced = config.events().events_of_type("VariantForced");
    let fields: Vec<&str> = forced.iter().map(|e| e.field()).collect();
    assert_eq!(fields, vec!["do3D", "vertical_mixing"]);
}

#[test]
fn test_larval_fish_rejects_explicit_2d() {
    let err = build("LarvalFish", &[("do3D", ParamValue::Bool(false))]).unwrap_err();
    assert_eq!(err.kind(), "ForbiddenFieldViolation");
    assert_eq!(err.fields(), vec!["do3D".to_string()]);

    // Agreeing with the pin is fine
    assert!(build("LarvalFish", &[("do3D", ParamValue::Bool(true))]).is_ok());
}

#[test]
fn test_larval_fish_pins_hold_after_construction() {
    let mut config = build("LarvalFish", &[]).unwrap();

    let err = config.set("vertical_mixing", false).unwrap_err();
    assert_eq!(err.kind(), "ForbiddenFieldViolation");

    // surface_only would turn 3D off through the cascade
    let err = config.set("surface_only", true).unwrap_err();
    assert_eq!(err.kind(), "ForbiddenFieldViolation");
    assert_eq!(config.get("do3D").unwrap(), ParamValue::Bool(true));
    assert!(config.get("surface_only").unwrap().is_null());
}

#[test]
fn test_larval_fish_fields() {
    let mut config = build("LarvalFish", &[("hatched", ParamValue::Float(1.0))]).unwrap();
    assert_eq!(config.get("seed:hatched").unwrap(), ParamValue::Float(1.0));
    assert_eq!(config.get("diameter").unwrap(), ParamValue::Float(0.0014));

    config.set("seed:weight", 0.5).unwrap();
    assert_eq!(config.get("weight").unwrap(), ParamValue::Float(0.5));
}

// ============================================================================
// Leeway
// ============================================================================

#[test]
fn test_leeway_forces_stokes_off() {
    let config = build("Leeway", &[]).unwrap();
    assert_eq!(config.get("stokes_drift").unwrap(), ParamValue::Bool(false));

    let forced = config.events().events_of_type("VariantForced");
    assert_eq!(forced.len(), 1);
    assert_eq!(forced[0].field(), "stokes_drift");
}

#[test]
fn test_leeway_rejects_stokes_drift() {
    let err = build("Leeway", &[("stokes_drift", ParamValue::Bool(true))]).unwrap_err();
    assert_eq!(err.kind(), "ForbiddenFieldViolation");
}

#[test]
fn test_leeway_rejects_windage_changes() {
    let err = build("Leeway", &[("wind_drift_factor", ParamValue::Float(0.5))]).unwrap_err();
    assert_eq!(err.kind(), "ForbiddenFieldViolation");
    assert_eq!(err.fields(), vec!["wind_drift_factor".to_string()]);

    let mut config = build("Leeway", &[]).unwrap();
    assert!(config.set("wind_drift_depth", 1.0).is_err());
    assert_eq!(config.get("wind_drift_depth").unwrap(), ParamValue::Float(0.02));
}

#[test]
fn test_leeway_surface_only_skips_truncation() {
    let mut config = build("Leeway", &[]).unwrap();
    config.set("surface_only", true).unwrap();

    assert_eq!(config.get("do3D").unwrap(), ParamValue::Bool(false));
    assert!(config.get("drift:truncate_ocean_model_below_m").is_err());

    let export = config.drift_model_config(&ExposureTier::ALL);
    assert!(export.contains_key("seed:object_type"));
    assert!(!export.contains_key("drift:vertical_advection"));
    assert!(!export.contains_key("drift:truncate_ocean_model_below_m"));
}

// ============================================================================
// OpenOil
// ============================================================================

#[test]
fn test_open_oil_fields() {
    let config = build("OpenOil", &[("oil_type", ParamValue::from("ALASKA NORTH SLOPE"))]).unwrap();
    assert_eq!(config.get("seed:oil_type").unwrap(), ParamValue::from("ALASKA NORTH SLOPE"));
    assert_eq!(config.get("processes:evaporation").unwrap(), ParamValue::Bool(true));
    assert!(config.events().events_of_type("VariantForced").is_empty());
}

#[test]
fn test_variant_default_beats_engine_default() {
    let config = build("OpenOil", &[]).unwrap();
    let entry = config.entry("seed:oil_type").unwrap();
    assert_eq!(entry.value, ParamValue::from("GENERIC MEDIUM CRUDE"));
    assert_eq!(entry.alias.as_deref(), Some("oil_type"));
}

// ============================================================================
// Reassignment
// ============================================================================

#[test]
fn test_drift_model_cannot_change() {
    let mut config = build("OceanDrift", &[]).unwrap();
    let err = config.set("drift_model", "Leeway").unwrap_err();
    assert_eq!(
        err,
        ConfigError::VariantReassignmentError {
            current: "OceanDrift".to_string(),
            requested: "Leeway".to_string(),
        }
    );
    assert_eq!(config.drift_model(), DriftModel::OceanDrift);

    // Restating the current variant is a no-op
    let events = config.events().len();
    config.set("drift_model", "oceandrift").unwrap();
    assert_eq!(config.events().len(), events);
}
