//! Post-change invariant checks
//!
//! Runs after construction and after every successful cascade. Stages run
//! in a fixed order (ranges, exclusivity and completeness, forced-field
//! invariants, variant pins) and the first violation is returned. The
//! validator never mutates; reads go through [`FieldSource`] so any
//! read-only view of a configuration can be checked.

use chrono::NaiveDateTime;

use crate::core::duration::minutes_to_delta;
use crate::core::time::{Direction, TimeResolver, TimeWindow};
use crate::error::ConfigError;
use crate::models::ocean_model;
use crate::models::schema::{ParamKind, ParameterSchema};
use crate::models::seed::{RadiusType, SeedFlag, SeedSpec};
use crate::models::value::ParamValue;
use crate::models::variant::DriftModel;

/// Engine key the surface-only mode pins for non-Leeway variants
pub const TRUNCATE_KEY: &str = "drift:truncate_ocean_model_below_m";

/// Depth (m) below which the ocean model is truncated in surface-only mode
pub const SURFACE_ONLY_TRUNCATION: f64 = 0.5;

/// Read access to resolved configuration values
pub trait FieldSource {
    fn drift_model(&self) -> DriftModel;

    /// Resolved value by semantic name or engine key; `Null` if unknown
    fn value(&self, name: &str) -> ParamValue;
}

/// Stateless checker over a [`FieldSource`]
pub struct ConstraintValidator;

impl ConstraintValidator {
    /// Run every stage; first violation wins
    pub fn validate(source: &dyn FieldSource) -> Result<(), ConfigError> {
        Self::check_ranges(source)?;
        Self::check_exclusivity(source)?;
        Self::check_forced_invariants(source)?;
        Self::check_variant(source)?;
        Ok(())
    }

    // ========================================================================
    // Stage 1: ranges
    // ========================================================================

    pub fn check_ranges(source: &dyn FieldSource) -> Result<(), ConfigError> {
        let model = source.drift_model();
        for spec in ParameterSchema::global().fields_for(model) {
            let value = source.value(spec.name);
            if value.is_null() {
                if !spec.nullable {
                    return Err(ConfigError::TypeMismatch {
                        field: spec.name.to_string(),
                        expected: spec.kind.name().to_string(),
                        found: "None".to_string(),
                    });
                }
                continue;
            }
            if let (ParamKind::Enum(options), Some(text)) = (spec.kind, value.as_str()) {
                if !options.contains(&text) {
                    return Err(ConfigError::range(
                        spec.name,
                        format!("'{}' is not one of {}", text, options.join(", ")),
                    ));
                }
            }
            spec.check_range(&value)?;
        }

        let time_step = float(source, "time_step");
        let output_step = float(source, "time_step_output");
        if let (Some(step), Some(output)) = (time_step, output_step) {
            if output < step {
                return Err(ConfigError::range(
                    "time_step_output",
                    format!("{} minutes is shorter than time_step ({} minutes)", output, step),
                ));
            }
            let ratio = output / step;
            if (ratio - ratio.round()).abs() > 1e-9 {
                return Err(ConfigError::range(
                    "time_step_output",
                    format!("{} minutes is not a multiple of time_step ({} minutes)", output, step),
                ));
            }
        }

        let start = source.value("start_time").as_timestamp();
        if let (Some(start), Some(release_end)) = (start, source.value("start_time_end").as_timestamp()) {
            if release_end < start {
                return Err(ConfigError::range(
                    "start_time_end",
                    "release window ends before start_time",
                ));
            }
        }

        Self::check_ocean_model(source, start, source.value("end_time").as_timestamp())
    }

    fn check_ocean_model(
        source: &dyn FieldSource,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<(), ConfigError> {
        let name = source.value("ocean_model");
        let Some(known) = name.as_str().and_then(ocean_model::lookup) else {
            return Ok(());
        };
        if known.local_only && !flag(source, "ocean_model_local") {
            return Err(ConfigError::range(
                "ocean_model_local",
                format!("{} is only available locally", known.name),
            ));
        }
        if let Some(start) = start {
            known.check_coverage("start_time", start)?;
        }
        if let Some(end) = end {
            known.check_coverage("end_time", end)?;
        }
        Ok(())
    }

    // ========================================================================
    // Stage 2: exclusivity and completeness
    // ========================================================================

    pub fn check_exclusivity(source: &dyn FieldSource) -> Result<(), ConfigError> {
        Self::seed_spec(source)?;

        if !flag(source, "use_cache") && !source.value("interpolator_filename").is_null() {
            return Err(ConfigError::exclusive(
                &["use_cache", "interpolator_filename"],
                "interpolator_filename is only used when use_cache is True",
            ));
        }

        Self::check_time_window(source)
    }

    /// Active seeding form
    pub fn seed_spec(source: &dyn FieldSource) -> Result<SeedSpec, ConfigError> {
        let seed_flag: SeedFlag = text(source, "seed_flag")
            .as_deref()
            .unwrap_or("elements")
            .parse()?;
        let radius_type: RadiusType = text(source, "radius_type")
            .as_deref()
            .unwrap_or("gaussian")
            .parse()?;
        let geojson = match source.value("geojson") {
            ParamValue::Object(v) => Some(v),
            _ => None,
        };
        SeedSpec::from_fields(
            seed_flag,
            float(source, "lon"),
            float(source, "lat"),
            geojson.as_ref(),
            float(source, "radius").unwrap_or(0.0),
            radius_type,
        )
    }

    /// All four time fields present and mutually consistent
    fn check_time_window(source: &dyn FieldSource) -> Result<(), ConfigError> {
        let window = TimeWindow {
            start_time: source.value("start_time").as_timestamp(),
            end_time: source.value("end_time").as_timestamp(),
            duration: source.value("duration").as_duration(),
            steps: source
                .value("steps")
                .as_i64()
                .and_then(|s| u64::try_from(s).ok()),
        };
        let supplied = window.supplied();
        if supplied.len() < 4 {
            let missing: Vec<&str> = ["start_time", "end_time", "duration", "steps"]
                .into_iter()
                .filter(|f| !supplied.contains(f))
                .collect();
            return Err(ConfigError::RequiredTogetherViolation {
                fields: missing.iter().map(|f| f.to_string()).collect(),
                reason: format!("run window is incomplete; missing {}", missing.join(", ")),
            });
        }

        let resolver = TimeResolver::new(
            minutes_to_delta(float(source, "time_step").unwrap_or(0.0)),
            Direction::from_run_forward(flag(source, "run_forward")),
        )?;
        resolver.resolve(&window)?;
        Ok(())
    }

    // ========================================================================
    // Stage 3: forced-field invariants
    // ========================================================================

    pub fn check_forced_invariants(source: &dyn FieldSource) -> Result<(), ConfigError> {
        let model = source.drift_model();
        let z = source.value("z");

        if flag(source, "seed_seafloor") && !z.is_null() {
            return Err(ConfigError::exclusive(
                &["z", "seed_seafloor"],
                "z must be None when seed_seafloor is True",
            ));
        }
        if !flag(source, "seed_seafloor") && z.is_null() {
            return Err(ConfigError::exclusive(
                &["z", "seed_seafloor"],
                "z needs a value unless seed_seafloor is True",
            ));
        }

        if !flag(source, "do3D") && flag(source, "vertical_mixing") {
            return Err(ConfigError::exclusive(
                &["do3D", "vertical_mixing"],
                "vertical_mixing requires do3D",
            ));
        }

        if !flag(source, "vertical_mixing") {
            let schema = ParameterSchema::global();
            for field in ["vertical_mixing_timestep", "diffusivitymodel", "mixed_layer_depth"] {
                let Some(spec) = schema.get(field) else { continue };
                if source.value(field) != spec.default {
                    return Err(ConfigError::exclusive(
                        &["vertical_mixing", field],
                        format!("{} is only used when vertical_mixing is True", field),
                    ));
                }
            }
        }

        if flag(source, "surface_only") {
            if flag(source, "do3D") {
                return Err(surface_only_conflict("do3D", "do3D must be False"));
            }
            if z != ParamValue::Float(0.0) {
                return Err(surface_only_conflict("z", "z must be 0"));
            }
            if flag(source, "vertical_mixing") {
                return Err(surface_only_conflict("vertical_mixing", "vertical_mixing must be False"));
            }
            if !model.is_leeway() && float(source, TRUNCATE_KEY) != Some(SURFACE_ONLY_TRUNCATION) {
                return Err(surface_only_conflict(
                    TRUNCATE_KEY,
                    "ocean model must be truncated below 0.5 m",
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Stage 4: variant pins
    // ========================================================================

    pub fn check_variant(source: &dyn FieldSource) -> Result<(), ConfigError> {
        let model = source.drift_model();
        if let Some(tag) = text(source, "drift_model") {
            if tag != model.as_str() {
                return Err(ConfigError::VariantReassignmentError {
                    current: model.as_str().to_string(),
                    requested: tag,
                });
            }
        }

        let profile = model.profile();
        for forced in profile.forced {
            let actual = source.value(forced.field);
            if actual != forced.value {
                return Err(ConfigError::ForbiddenFieldViolation {
                    field: forced.field.to_string(),
                    model: model.as_str().to_string(),
                    reason: format!("must be {} but is {}", forced.value, actual),
                });
            }
        }
        let schema = ParameterSchema::global();
        for field in profile.forbidden {
            let Some(spec) = schema.get(field) else { continue };
            let actual = source.value(field);
            if actual != spec.default {
                return Err(ConfigError::ForbiddenFieldViolation {
                    field: field.to_string(),
                    model: model.as_str().to_string(),
                    reason: format!("must stay at its default {}", spec.default),
                });
            }
        }
        Ok(())
    }
}

fn surface_only_conflict(field: &str, reason: &str) -> ConfigError {
    ConfigError::exclusive(
        &["surface_only", field],
        format!("{} when surface_only is True", reason),
    )
}

fn float(source: &dyn FieldSource, name: &str) -> Option<f64> {
    source.value(name).as_f64()
}

/// Boolean flag; `None` reads as false
fn flag(source: &dyn FieldSource, name: &str) -> bool {
    source.value(name).as_bool().unwrap_or(false)
}

fn text(source: &dyn FieldSource, name: &str) -> Option<String> {
    match source.value(name) {
        ParamValue::Str(s) => Some(s),
        _ => None,
    }
}
