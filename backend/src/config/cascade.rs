//! Dependent-field cascade
//!
//! Setting some fields implies values for others (surface-only mode turns
//! off 3D motion, seeding at the seafloor clears `z`, ...). The rules live in
//! one declarative table, [`RULES`]. Each rule names the fields that trigger
//! it and computes the effects from the current state; the propagator
//! applies effects in table order, records each override, and recurses on
//! the overridden field.
//!
//! Termination: an effect that leaves a field unchanged is skipped, a
//! `(field, value)` pair already visited in the same cascade is never
//! applied again, and a chain deeper than [`MAX_DEPTH`] fails with
//! `CascadeError` (the caller then rolls back).

use indexmap::IndexMap;

use crate::config::manager::{DiffusivityOrigin, DriftConfig};
use crate::config::validation::{SURFACE_ONLY_TRUNCATION, TRUNCATE_KEY};
use crate::error::ConfigError;
use crate::models::ocean_model;
use crate::models::schema::ParameterSchema;
use crate::models::value::ParamValue;

/// Hard bound on cascade recursion
pub const MAX_DEPTH: usize = 16;

pub(crate) const VERTICAL_ADVECTION_KEY: &str = "drift:vertical_advection";
pub(crate) const TABULARISED_STOKES_KEY: &str = "drift:use_tabularised_stokes_drift";

/// One implied assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub field: &'static str,
    pub value: ParamValue,
}

impl Effect {
    fn new(field: &'static str, value: impl Into<ParamValue>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// A dependency rule
pub struct CascadeRule {
    pub name: &'static str,
    pub triggers: &'static [&'static str],
    /// Effects given the configuration and the trigger's new value
    pub effects: fn(&DriftConfig, &str, &ParamValue) -> Vec<Effect>,
}

impl std::fmt::Debug for CascadeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeRule")
            .field("name", &self.name)
            .field("triggers", &self.triggers)
            .finish()
    }
}

/// Rule table, applied in this order for every trigger
pub static RULES: &[CascadeRule] = &[
    CascadeRule {
        name: "ocean_model_diffusivity",
        triggers: &["ocean_model"],
        effects: derive_diffusivity,
    },
    CascadeRule {
        name: "diffusivity_unset",
        triggers: &["horizontal_diffusivity"],
        effects: rederive_unset_diffusivity,
    },
    CascadeRule {
        name: "seed_flag",
        triggers: &["seed_flag"],
        effects: seed_flag_fields,
    },
    CascadeRule {
        name: "geojson_seed_flag",
        triggers: &["geojson"],
        effects: geojson_selects_seed_flag,
    },
    CascadeRule {
        name: "stokes_drift",
        triggers: &["stokes_drift"],
        effects: tabularised_stokes,
    },
    CascadeRule {
        name: "surface_only",
        triggers: &["surface_only", "do3D", "z", "vertical_mixing", "drift_model"],
        effects: surface_only,
    },
    CascadeRule {
        name: "do3D",
        triggers: &["do3D"],
        effects: vertical_motion,
    },
    CascadeRule {
        name: "seed_seafloor",
        triggers: &["seed_seafloor"],
        effects: seafloor_clears_z,
    },
    CascadeRule {
        name: "concrete_z",
        triggers: &["z"],
        effects: z_disables_seafloor,
    },
    CascadeRule {
        name: "vertical_mixing_off",
        triggers: &[
            "vertical_mixing",
            "vertical_mixing_timestep",
            "diffusivitymodel",
            "mixed_layer_depth",
        ],
        effects: reset_mixing_fields,
    },
    CascadeRule {
        name: "leeway",
        triggers: &["drift_model", "wind_drift_factor", "wind_drift_depth", "stokes_drift"],
        effects: leeway_defaults,
    },
];

/// Rules triggered by `field`
pub fn rules_for(field: &str) -> impl Iterator<Item = &'static CascadeRule> + '_ {
    RULES.iter().filter(move |r| r.triggers.contains(&field))
}

/// Time fields the window is re-resolved from after `field` changes
/// interactively; `None` if `field` does not affect the window
pub fn time_basis_after(field: &str) -> Option<[&'static str; 2]> {
    match field {
        "start_time" | "steps" | "run_forward" => Some(["start_time", "steps"]),
        "end_time" | "time_step" => Some(["start_time", "end_time"]),
        "duration" => Some(["start_time", "duration"]),
        _ => None,
    }
}

/// State of one cascade run
pub(crate) struct Cascade<'a> {
    /// Values the caller asked for in this operation
    explicit: &'a IndexMap<&'static str, ParamValue>,
    visited: Vec<(String, ParamValue)>,
}

impl<'a> Cascade<'a> {
    pub(crate) fn new(explicit: &'a IndexMap<&'static str, ParamValue>) -> Self {
        Self {
            explicit,
            visited: Vec::new(),
        }
    }

    /// Propagate a change of `trigger` to `value`
    pub(crate) fn propagate(
        &mut self,
        config: &mut DriftConfig,
        trigger: &str,
        value: &ParamValue,
    ) -> Result<(), ConfigError> {
        self.step(config, trigger, value, 0)
    }

    fn step(
        &mut self,
        config: &mut DriftConfig,
        trigger: &str,
        value: &ParamValue,
        depth: usize,
    ) -> Result<(), ConfigError> {
        if depth >= MAX_DEPTH {
            tracing::warn!(
                config_id = %config.id(),
                trigger,
                depth,
                "cascade depth bound reached"
            );
            return Err(ConfigError::CascadeError {
                trigger: trigger.to_string(),
                reason: format!("propagation did not settle within {} steps", MAX_DEPTH),
            });
        }
        self.visited.push((trigger.to_string(), value.clone()));

        for rule in rules_for(trigger) {
            for effect in (rule.effects)(config, trigger, value) {
                if config.value(effect.field) == effect.value {
                    continue;
                }
                if self
                    .visited
                    .iter()
                    .any(|(f, v)| f == effect.field && *v == effect.value)
                {
                    tracing::debug!(rule = rule.name, field = effect.field, "cycle short-circuited");
                    continue;
                }
                self.check_conflicts(config, rule, trigger, &effect)?;

                config.record_override(rule.name, trigger, value, effect.field, effect.value.clone());
                self.step(config, effect.field, &effect.value, depth + 1)?;
            }
        }
        Ok(())
    }

    fn check_conflicts(
        &self,
        config: &DriftConfig,
        rule: &CascadeRule,
        trigger: &str,
        effect: &Effect,
    ) -> Result<(), ConfigError> {
        if let Some(requested) = self.explicit.get(effect.field) {
            if *requested != effect.value {
                return Err(ConfigError::exclusive(
                    &[trigger, effect.field],
                    format!(
                        "{} rule sets {} to {} but {} was requested",
                        rule.name, effect.field, effect.value, requested
                    ),
                ));
            }
        }
        let model = config.drift_model();
        if let Some(pinned) = model.profile().forced_value(effect.field) {
            if *pinned != effect.value {
                return Err(ConfigError::ForbiddenFieldViolation {
                    field: effect.field.to_string(),
                    model: model.as_str().to_string(),
                    reason: format!(
                        "{} rule would set {} but the variant forces {}",
                        rule.name, effect.value, pinned
                    ),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Horizontal diffusivity the ocean model implies (0 for custom models)
pub fn diffusivity_for(ocean_model: &ParamValue) -> f64 {
    ocean_model
        .as_str()
        .and_then(ocean_model::lookup)
        .map(|m| m.horizontal_diffusivity())
        .unwrap_or(0.0)
}

fn derive_diffusivity(config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    if config.diffusivity_origin() == DiffusivityOrigin::User {
        return vec![];
    }
    vec![Effect::new("horizontal_diffusivity", diffusivity_for(value))]
}

fn rederive_unset_diffusivity(config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    if !value.is_null() {
        return vec![];
    }
    vec![Effect::new(
        "horizontal_diffusivity",
        diffusivity_for(&config.value("ocean_model")),
    )]
}

fn seed_flag_fields(config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    match value.as_str() {
        Some("geojson") => vec![
            Effect::new("lon", ParamValue::Null),
            Effect::new("lat", ParamValue::Null),
        ],
        Some("elements") => {
            let schema = ParameterSchema::global();
            let mut effects = vec![Effect::new("geojson", ParamValue::Null)];
            for field in ["lon", "lat"] {
                if !config.value(field).is_null() {
                    continue;
                }
                if let Some(spec) = schema.get(field) {
                    effects.push(Effect::new(field, spec.default.clone()));
                }
            }
            effects
        }
        _ => vec![],
    }
}

fn geojson_selects_seed_flag(_config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    if value.is_null() {
        return vec![];
    }
    vec![Effect::new("seed_flag", "geojson")]
}

fn tabularised_stokes(config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    match value.as_bool() {
        Some(on) if !config.drift_model().is_leeway() => vec![Effect::new(TABULARISED_STOKES_KEY, on)],
        _ => vec![],
    }
}

fn surface_only(config: &DriftConfig, trigger: &str, value: &ParamValue) -> Vec<Effect> {
    let leeway = config.drift_model().is_leeway();
    let active = config.value("surface_only").as_bool().unwrap_or(false);

    if active {
        let mut effects = vec![
            Effect::new("do3D", false),
            Effect::new("z", 0.0),
            Effect::new("vertical_mixing", false),
        ];
        if !leeway {
            effects.push(Effect::new(TRUNCATE_KEY, SURFACE_ONLY_TRUNCATION));
        }
        return effects;
    }

    // Leaving surface-only mode releases the truncation it imposed
    if trigger == "surface_only" && value.as_bool() != Some(true) && !leeway {
        if !config.value(TRUNCATE_KEY).is_null() {
            return vec![Effect::new(TRUNCATE_KEY, ParamValue::Null)];
        }
    }
    vec![]
}

fn vertical_motion(config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    let leeway = config.drift_model().is_leeway();
    match value.as_bool() {
        Some(false) => {
            let mut effects = vec![Effect::new("vertical_mixing", false)];
            if !leeway {
                effects.push(Effect::new(VERTICAL_ADVECTION_KEY, false));
            }
            effects
        }
        Some(true) if !leeway => vec![Effect::new(VERTICAL_ADVECTION_KEY, true)],
        _ => vec![],
    }
}

fn seafloor_clears_z(_config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    match value.as_bool() {
        Some(true) => vec![Effect::new("z", ParamValue::Null)],
        _ => vec![],
    }
}

fn z_disables_seafloor(_config: &DriftConfig, _trigger: &str, value: &ParamValue) -> Vec<Effect> {
    if value.is_null() {
        return vec![];
    }
    vec![Effect::new("seed_seafloor", false)]
}

fn reset_mixing_fields(config: &DriftConfig, _trigger: &str, _value: &ParamValue) -> Vec<Effect> {
    if config.value("vertical_mixing").as_bool() != Some(false) {
        return vec![];
    }
    let schema = ParameterSchema::global();
    ["vertical_mixing_timestep", "diffusivitymodel", "mixed_layer_depth"]
        .into_iter()
        .filter_map(|field| schema.get(field).map(|spec| Effect::new(field, spec.default.clone())))
        .collect()
}

fn leeway_defaults(config: &DriftConfig, _trigger: &str, _value: &ParamValue) -> Vec<Effect> {
    let model = config.drift_model();
    if !model.is_leeway() {
        return vec![];
    }
    let schema = ParameterSchema::global();
    let mut effects: Vec<Effect> = ["wind_drift_factor", "wind_drift_depth"]
        .into_iter()
        .filter_map(|field| schema.get(field).map(|spec| Effect::new(field, spec.default.clone())))
        .collect();
    effects.push(Effect::new("stokes_drift", false));
    effects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_bound_fails() {
        let mut config = DriftConfig::from_pairs([("steps", ParamValue::Int(24))]).unwrap();
        let explicit = IndexMap::new();
        let mut cascade = Cascade::new(&explicit);

        let err = cascade
            .step(&mut config, "do3D", &ParamValue::Bool(true), MAX_DEPTH)
            .unwrap_err();
        assert_eq!(err.kind(), "CascadeError");
        assert_eq!(err.fields(), vec!["do3D".to_string()]);

        // No rule fires on lon, so the last allowed level settles
        let mut cascade = Cascade::new(&explicit);
        assert!(cascade
            .step(&mut config, "lon", &ParamValue::Float(-150.0), MAX_DEPTH - 1)
            .is_ok());
    }

    #[test]
    fn test_rule_names_unique() {
        let mut names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        let n = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), n);
    }

    #[test]
    fn test_surface_only_rule_triggers() {
        let triggered: Vec<&str> = rules_for("z").map(|r| r.name).collect();
        assert_eq!(triggered, vec!["surface_only", "concrete_z"]);
    }

    #[test]
    fn test_time_basis_after() {
        assert_eq!(time_basis_after("duration"), Some(["start_time", "duration"]));
        assert_eq!(time_basis_after("end_time"), Some(["start_time", "end_time"]));
        assert_eq!(time_basis_after("lon"), None);
    }

    #[test]
    fn test_diffusivity_for() {
        assert_eq!(diffusivity_for(&ParamValue::Str("NWGOA".into())), 150.0);
        assert_eq!(diffusivity_for(&ParamValue::Str("MY_MODEL".into())), 0.0);
        assert_eq!(diffusivity_for(&ParamValue::Null), 0.0);
    }
}
