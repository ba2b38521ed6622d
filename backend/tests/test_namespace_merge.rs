//! Tests for namespace merging
//!
//! Manager values beat variant metadata, which beats engine defaults. Mapped
//! fields answer to both names, and the supply order of the namespaces does
//! not matter.

use particle_tracking_core_rs::config::{
    FieldMeta, Layer, MergeError, Namespace, NamespaceMerger, Parameter, TranslationTable,
};
use particle_tracking_core_rs::engine::EngineParam;
use particle_tracking_core_rs::models::schema::ParamKind;
use particle_tracking_core_rs::{DriftConfig, DriftModel, EngineCatalog, EngineLevel, ParamValue};

fn param(name: &str, value: ParamValue) -> Parameter {
    Parameter {
        name: name.to_string(),
        value,
        meta: FieldMeta::default(),
    }
}

fn layers() -> (Namespace, Namespace, Namespace) {
    let mut engine = Namespace::new(Layer::Engine);
    engine.insert(param("drift:stokes_drift", ParamValue::Bool(false)));
    engine.insert(param("drift:advection_scheme", ParamValue::from("euler")));

    let mut variant = Namespace::new(Layer::Variant);
    variant.insert(param("stokes_drift", ParamValue::Bool(true)));
    variant.insert(param("lon", ParamValue::Float(-151.0)));

    (Namespace::new(Layer::Manager), variant, engine)
}

fn table() -> TranslationTable {
    TranslationTable::new().with("stokes_drift", "drift:stokes_drift")
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_variant_beats_engine_and_manager_beats_both() {
    let (manager, variant, engine) = layers();
    let mut merger = NamespaceMerger::from_namespaces([manager, variant, engine], table()).unwrap();

    assert_eq!(merger.resolve("stokes_drift"), Some(ParamValue::Bool(true)));
    assert_eq!(merger.resolve("drift:stokes_drift"), Some(ParamValue::Bool(true)));
    assert_eq!(merger.resolve_entry("stokes_drift").unwrap().source, Layer::Variant);

    merger.write("stokes_drift", ParamValue::Bool(false));
    assert_eq!(merger.resolve("stokes_drift"), Some(ParamValue::Bool(false)));
    assert_eq!(merger.resolve("drift:stokes_drift"), Some(ParamValue::Bool(false)));
    assert_eq!(merger.resolve_entry("drift:stokes_drift").unwrap().source, Layer::Manager);
}

#[test]
fn test_write_through_engine_key_shows_under_semantic_name() {
    let (manager, variant, engine) = layers();
    let mut merger = NamespaceMerger::from_namespaces([manager, variant, engine], table()).unwrap();

    merger.write("drift:stokes_drift", ParamValue::Bool(false));
    let view = merger.merged();
    assert_eq!(view.value("stokes_drift"), Some(&ParamValue::Bool(false)));
    assert_eq!(view.value("drift:stokes_drift"), Some(&ParamValue::Bool(false)));
    assert_eq!(
        view.get("stokes_drift").unwrap().alias.as_deref(),
        Some("drift:stokes_drift")
    );
}

#[test]
fn test_unmapped_names_resolve_from_their_own_layer() {
    let (manager, variant, engine) = layers();
    let merger = NamespaceMerger::from_namespaces([manager, variant, engine], table()).unwrap();

    assert_eq!(merger.resolve("drift:advection_scheme"), Some(ParamValue::from("euler")));
    assert_eq!(merger.resolve("lon"), Some(ParamValue::Float(-151.0)));
    assert_eq!(merger.resolve("nothing"), None);
}

// ============================================================================
// Order independence
// ============================================================================

#[test]
fn test_supply_order_does_not_matter() {
    let (manager, variant, engine) = layers();
    let orders: [[&Namespace; 3]; 6] = [
        [&manager, &variant, &engine],
        [&manager, &engine, &variant],
        [&variant, &manager, &engine],
        [&variant, &engine, &manager],
        [&engine, &manager, &variant],
        [&engine, &variant, &manager],
    ];

    let views: Vec<_> = orders
        .iter()
        .map(|order| {
            let mut merger =
                NamespaceMerger::from_namespaces(order.iter().map(|ns| (*ns).clone()), table()).unwrap();
            merger.write("lon", ParamValue::Float(-150.0));
            merger.merged()
        })
        .collect();

    for view in &views[1..] {
        assert_eq!(view, &views[0]);
    }
}

#[test]
fn test_missing_layer_rejected() {
    let (manager, variant, _) = layers();
    let err = NamespaceMerger::from_namespaces([manager, variant], table()).unwrap_err();
    assert_eq!(err, MergeError::MissingLayer(Layer::Engine));
}

// ============================================================================
// Custom engine catalogue
// ============================================================================

struct MiniCatalog;

impl EngineCatalog for MiniCatalog {
    fn name(&self) -> &str {
        "mini"
    }

    fn params(&self, _model: DriftModel) -> Vec<EngineParam> {
        vec![
            EngineParam::new("drift:stokes_drift", ParamKind::Bool, false, EngineLevel::Basic,
                "Stokes drift."),
            EngineParam::new("seed:number", ParamKind::Int, 5000, EngineLevel::Essential,
                "Element count.")
                .units("1"),
            EngineParam::new("drift:advection_scheme", ParamKind::Str, "runge-kutta", EngineLevel::Advanced,
                "Advection scheme."),
        ]
    }
}

#[test]
fn test_configuration_over_custom_catalog() {
    let inputs = [("steps".to_string(), ParamValue::Int(24))].into_iter().collect();
    let mut config = DriftConfig::with_catalog(inputs, &MiniCatalog).unwrap();

    // Schema defaults sit above the engine's own
    assert_eq!(config.get("drift:stokes_drift").unwrap(), ParamValue::Bool(true));
    assert_eq!(config.get("seed:number").unwrap(), ParamValue::Int(1));
    assert_eq!(config.get("drift:advection_scheme").unwrap(), ParamValue::from("runge-kutta"));

    let entry = config.entry("seed:number").unwrap();
    assert_eq!(entry.meta.level, Some(EngineLevel::Essential));
    assert_eq!(entry.meta.default, Some(ParamValue::Int(1)));

    config.set("stokes_drift", false).unwrap();
    assert_eq!(config.get("drift:stokes_drift").unwrap(), ParamValue::Bool(false));
    let engine = config.namespaces().namespace(Layer::Engine);
    assert_eq!(engine.get("drift:stokes_drift").unwrap().value, ParamValue::Bool(false));
}
