//! Parameter schema
//!
//! Static declarative description of every configurable field: type, default,
//! bounds, units, exposure tier, owning layer and the engine-native key it
//! translates to. The schema is built once per process and never mutated;
//! configuration objects hold their own value copies.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::core::duration::parse_iso;
use crate::error::ConfigError;
use crate::models::value::{parse_timestamp, ParamValue};
use crate::models::variant::DriftModel;

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Application-facing exposure tier (1 surfaced, 2 medium, 3 buried)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExposureTier {
    Surface = 1,
    Medium = 2,
    Buried = 3,
}

impl ExposureTier {
    pub const ALL: [ExposureTier; 3] = [ExposureTier::Surface, ExposureTier::Medium, ExposureTier::Buried];

    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            1 => Some(ExposureTier::Surface),
            2 => Some(ExposureTier::Medium),
            3 => Some(ExposureTier::Buried),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Serialize for ExposureTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Which namespace owns a field's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLayer {
    /// Run-level settings owned by the manager
    Manager,
    /// Settings whose defaults come from the drift-model variant
    Variant,
}

/// Variants a field exists for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Availability {
    All,
    Only(&'static [DriftModel]),
}

/// Declared value kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Str,
    Timestamp,
    Duration,
    Enum(&'static [&'static str]),
    List,
    Object,
}

impl ParamKind {
    pub fn name(&self) -> &'static str {
        match self {
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Str => "string",
            ParamKind::Timestamp => "timestamp",
            ParamKind::Duration => "duration",
            ParamKind::Enum(_) => "enum",
            ParamKind::List => "list",
            ParamKind::Object => "object",
        }
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// Declaration of one configurable field
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub nullable: bool,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<&'static str>,
    pub description: &'static str,
    pub exposure_tier: ExposureTier,
    pub engine_key: Option<&'static str>,
    pub layer: FieldLayer,
    pub availability: Availability,
    uppercase: bool,
}

impl ParamSpec {
    fn new(
        name: &'static str,
        kind: ParamKind,
        default: impl Into<ParamValue>,
        tier: ExposureTier,
        description: &'static str,
    ) -> Self {
        let default = default.into();
        Self {
            name,
            kind,
            nullable: default.is_null(),
            default,
            min: None,
            max: None,
            units: None,
            description,
            exposure_tier: tier,
            engine_key: None,
            layer: FieldLayer::Manager,
            availability: Availability::All,
            uppercase: false,
        }
    }

    fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    fn at_least(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    fn units(mut self, units: &'static str) -> Self {
        self.units = Some(units);
        self
    }

    fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn engine(mut self, key: &'static str) -> Self {
        self.engine_key = Some(key);
        self
    }

    fn variant_level(mut self) -> Self {
        self.layer = FieldLayer::Variant;
        self
    }

    fn only(mut self, models: &'static [DriftModel]) -> Self {
        self.availability = Availability::Only(models);
        self.layer = FieldLayer::Variant;
        self
    }

    fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    pub fn is_available(&self, model: DriftModel) -> bool {
        match self.availability {
            Availability::All => true,
            Availability::Only(models) => models.contains(&model),
        }
    }

    /// Coerce an input value to the declared kind
    ///
    /// Only type conversion happens here; bounds are checked by the validator.
    pub fn coerce(&self, value: ParamValue) -> Result<ParamValue, ConfigError> {
        let value = match value {
            ParamValue::Str(s) if s == "None" && self.kind != ParamKind::Str => ParamValue::Null,
            other => other,
        };

        if value.is_null() {
            return if self.nullable {
                Ok(ParamValue::Null)
            } else {
                Err(self.mismatch(&value))
            };
        }

        match (self.kind, value) {
            (ParamKind::Bool, ParamValue::Bool(b)) => Ok(ParamValue::Bool(b)),
            (ParamKind::Bool, ParamValue::Str(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(ParamValue::Bool(true)),
                "false" => Ok(ParamValue::Bool(false)),
                _ => Err(self.mismatch(&ParamValue::Str(s))),
            },

            (ParamKind::Int, ParamValue::Int(i)) => Ok(ParamValue::Int(i)),
            (ParamKind::Int, ParamValue::Float(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Ok(ParamValue::Int(f as i64))
            }
            (ParamKind::Int, ParamValue::Str(s)) => s
                .trim()
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| self.mismatch(&ParamValue::Str(s))),

            (ParamKind::Float, ParamValue::Int(i)) => Ok(ParamValue::Float(i as f64)),
            (ParamKind::Float, ParamValue::Float(f)) => Ok(ParamValue::Float(f)),
            (ParamKind::Float, ParamValue::Str(s)) => s
                .trim()
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|_| self.mismatch(&ParamValue::Str(s))),

            (ParamKind::Str, ParamValue::Str(s)) => Ok(ParamValue::Str(if self.uppercase {
                s.to_uppercase()
            } else {
                s
            })),
            (ParamKind::Str, ParamValue::Int(i)) => Ok(ParamValue::Str(i.to_string())),

            (ParamKind::Enum(options), ParamValue::Str(s)) => self.match_option(options, &s),
            (ParamKind::Enum(options), ParamValue::Int(i)) => self.match_option(options, &i.to_string()),

            (ParamKind::Timestamp, ParamValue::Timestamp(t)) => Ok(ParamValue::Timestamp(t)),
            (ParamKind::Timestamp, ParamValue::Str(s)) => parse_timestamp(&s)
                .map(ParamValue::Timestamp)
                .ok_or_else(|| self.mismatch(&ParamValue::Str(s))),

            (ParamKind::Duration, ParamValue::Duration(d)) => Ok(ParamValue::Duration(d)),
            (ParamKind::Duration, ParamValue::Str(s)) => {
                parse_iso(&s)
                    .map(ParamValue::Duration)
                    .map_err(|err| ConfigError::TypeMismatch {
                        field: self.name.to_string(),
                        expected: "ISO-8601 duration".to_string(),
                        found: err.to_string(),
                    })
            }

            (ParamKind::List, ParamValue::List(items)) => Ok(ParamValue::List(items)),

            (ParamKind::Object, ParamValue::Object(v)) => Ok(ParamValue::Object(v)),
            (ParamKind::Object, ParamValue::Str(s)) => match serde_json::from_str::<Value>(&s) {
                Ok(v @ Value::Object(_)) => Ok(ParamValue::Object(v)),
                _ => Err(self.mismatch(&ParamValue::Str(s))),
            },

            (_, other) => Err(self.mismatch(&other)),
        }
    }

    /// Check numeric bounds
    pub fn check_range(&self, value: &ParamValue) -> Result<(), ConfigError> {
        let Some(x) = value.as_f64() else {
            return Ok(());
        };
        if let Some(min) = self.min {
            if x < min {
                return Err(ConfigError::range(
                    self.name,
                    format!("{} is below the minimum {}", x, min),
                ));
            }
        }
        if let Some(max) = self.max {
            if x > max {
                return Err(ConfigError::range(
                    self.name,
                    format!("{} is above the maximum {}", x, max),
                ));
            }
        }
        Ok(())
    }

    /// Enum options, if the field is an enum
    pub fn options(&self) -> Option<&'static [&'static str]> {
        match self.kind {
            ParamKind::Enum(options) => Some(options),
            _ => None,
        }
    }

    fn match_option(&self, options: &'static [&'static str], text: &str) -> Result<ParamValue, ConfigError> {
        options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(text.trim()))
            .map(|o| ParamValue::Str(o.to_string()))
            .ok_or_else(|| {
                ConfigError::range(
                    self.name,
                    format!("'{}' is not one of {}", text, options.join(", ")),
                )
            })
    }

    fn mismatch(&self, found: &ParamValue) -> ConfigError {
        ConfigError::TypeMismatch {
            field: self.name.to_string(),
            expected: self.kind.name().to_string(),
            found: format!("{} ({})", found, found.type_name()),
        }
    }

    /// JSON documentation entry
    pub fn documentation(&self) -> Value {
        let variants: Vec<&str> = DriftModel::ALL
            .into_iter()
            .filter(|m| self.is_available(*m))
            .map(|m| m.as_str())
            .collect();

        json!({
            "name": self.name,
            "type": self.kind.name(),
            "options": self.options(),
            "nullable": self.nullable,
            "default": self.default.to_json(),
            "min": self.min,
            "max": self.max,
            "units": self.units,
            "description": self.description,
            "exposure_tier": self.exposure_tier,
            "engine_key": self.engine_key,
            "layer": self.layer,
            "drift_models": variants,
        })
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// The complete field catalogue
#[derive(Debug)]
pub struct ParameterSchema {
    specs: IndexMap<&'static str, ParamSpec>,
    by_engine_key: HashMap<&'static str, &'static str>,
}

static SCHEMA: LazyLock<ParameterSchema> = LazyLock::new(ParameterSchema::build);

impl ParameterSchema {
    /// Process-wide read-only schema
    pub fn global() -> &'static ParameterSchema {
        &SCHEMA
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.get(name)
    }

    /// All fields in declaration order
    pub fn specs(&self) -> impl Iterator<Item = &ParamSpec> {
        self.specs.values()
    }

    /// Fields that exist for the given variant, in declaration order
    pub fn fields_for(&self, model: DriftModel) -> impl Iterator<Item = &ParamSpec> {
        self.specs.values().filter(move |s| s.is_available(model))
    }

    /// Position of a field in declaration order (used for deterministic replay)
    pub fn position(&self, name: &str) -> Option<usize> {
        self.specs.get_index_of(name)
    }

    /// Semantic field name mapped to an engine-native key
    pub fn semantic_for_engine_key(&self, key: &str) -> Option<&'static str> {
        self.by_engine_key.get(key).copied()
    }

    /// Resolve a user-facing name (semantic or mapped engine key) to the semantic name
    pub fn canonical_name(&self, name: &str) -> Option<&'static str> {
        self.specs
            .get_key_value(name)
            .map(|(k, _)| *k)
            .or_else(|| self.semantic_for_engine_key(name))
    }

    /// JSON documentation of every field
    pub fn documentation(&self) -> Value {
        Value::Array(self.specs.values().map(|s| s.documentation()).collect())
    }

    fn build() -> Self {
        let specs: IndexMap<&'static str, ParamSpec> = catalogue()
            .into_iter()
            .map(|spec| (spec.name, spec))
            .collect();
        let by_engine_key = specs
            .values()
            .filter_map(|s| s.engine_key.map(|k| (k, s.name)))
            .collect();
        Self {
            specs,
            by_engine_key,
        }
    }
}

// ============================================================================
// CATALOGUE
// ============================================================================

pub const SEED_FLAGS: &[&str] = &["elements", "geojson"];
pub const OUTPUT_FORMATS: &[&str] = &["netcdf", "parquet"];
pub const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];
pub const RADIUS_TYPES: &[&str] = &["gaussian", "uniform"];
pub const COASTLINE_ACTIONS: &[&str] = &["none", "stranding", "previous"];
pub const SEAFLOOR_ACTIONS: &[&str] = &["none", "lift_to_seafloor", "deactivate", "previous"];
pub const DIFFUSIVITY_MODELS: &[&str] = &[
    "environment",
    "stepfunction",
    "windspeed_Sundby1983",
    "windspeed_Large1994",
    "gls_tke",
    "constant",
];
pub const DROPLET_DISTRIBUTIONS: &[&str] = &["uniform", "normal", "lognormal"];

const LARVAL_FISH: &[DriftModel] = &[DriftModel::LarvalFish];
const OPEN_OIL: &[DriftModel] = &[DriftModel::OpenOil];
const LEEWAY: &[DriftModel] = &[DriftModel::Leeway];

fn catalogue() -> Vec<ParamSpec> {
    use ExposureTier::{Buried, Medium, Surface};
    use ParamKind as K;

    let default_start = NaiveDate::from_ymd_opt(2022, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));

    vec![
        // Manager level
        ParamSpec::new("model", K::Enum(&["opendrift"]), "opendrift", Surface,
            "Lagrangian model software to use for simulation."),
        ParamSpec::new("drift_model", K::Enum(DriftModel::NAMES), "OceanDrift", Surface,
            "Drift model variant. Fixed for the lifetime of a configuration."),
        ParamSpec::new("lon", K::Float, -151.0, Surface,
            "Central longitude for seeding drifters. Only used if seed_flag is \"elements\".")
            .range(-180.0, 180.0).units("degrees_east").nullable(),
        ParamSpec::new("lat", K::Float, 58.0, Surface,
            "Central latitude for seeding drifters. Only used if seed_flag is \"elements\".")
            .range(-90.0, 90.0).units("degrees_north").nullable(),
        ParamSpec::new("geojson", K::Object, ParamValue::Null, Surface,
            "GeoJSON polygon within which to seed drifters. Requires seed_flag \"geojson\"."),
        ParamSpec::new("seed_flag", K::Enum(SEED_FLAGS), "elements", Surface,
            "Seeding method: around a lon/lat point (\"elements\") or inside a GeoJSON polygon (\"geojson\")."),
        ParamSpec::new("start_time", K::Timestamp, default_start, Surface,
            "Start time for drifter simulation.")
            .nullable(),
        ParamSpec::new("start_time_end", K::Timestamp, ParamValue::Null, Medium,
            "If set, drifters are released linearly between start_time and start_time_end."),
        ParamSpec::new("run_forward", K::Bool, true, Medium,
            "Run forward in time."),
        ParamSpec::new("time_step", K::Float, 5.0, Buried,
            "Interval between particle updates.")
            .range(0.01, 1440.0).units("minutes"),
        ParamSpec::new("time_step_output", K::Float, 60.0, Buried,
            "Interval at which element properties are stored. Must be an integer multiple of time_step.")
            .range(1.0, 1440.0).units("minutes"),
        ParamSpec::new("steps", K::Int, ParamValue::Null, Surface,
            "Number of simulation steps.")
            .range(1.0, 10000.0),
        ParamSpec::new("duration", K::Duration, ParamValue::Null, Surface,
            "Length of the simulation as an ISO-8601 duration."),
        ParamSpec::new("end_time", K::Timestamp, ParamValue::Null, Surface,
            "End of the simulation."),
        ParamSpec::new("ocean_model", K::Str, "CIOFSOP", Surface,
            "Name of the ocean model driving the simulation.")
            .uppercase(),
        ParamSpec::new("ocean_model_local", K::Bool, true, Buried,
            "Use the local copy of a known ocean_model instead of the remote one."),
        ParamSpec::new("do3D", K::Bool, false, Surface,
            "Run drifters in 3D."),
        ParamSpec::new("use_static_masks", K::Bool, true, Buried,
            "Use static land masks for known models instead of wet/dry masks."),
        ParamSpec::new("output_file", K::Str, ParamValue::Null, Buried,
            "Name of the output file. Generated from the current time when unset."),
        ParamSpec::new("output_format", K::Enum(OUTPUT_FORMATS), "netcdf", Medium,
            "Output file format."),
        ParamSpec::new("use_cache", K::Bool, true, Buried,
            "Cache interpolators between runs."),
        ParamSpec::new("interpolator_filename", K::Str, ParamValue::Null, Buried,
            "Explicit interpolator cache file. Requires use_cache."),
        ParamSpec::new("horizontal_diffusivity", K::Float, ParamValue::Null, Medium,
            "Horizontal diffusivity (random walk). Derived from the ocean model grid when unset.")
            .range(0.0, 100000.0).units("m2/s").engine("drift:horizontal_diffusivity"),
        ParamSpec::new("log_level", K::Enum(LOG_LEVELS), "INFO", Buried,
            "Log verbosity."),
        ParamSpec::new("stokes_drift", K::Bool, true, Medium,
            "Advect elements with Stokes drift (wave orbital motion).")
            .engine("drift:stokes_drift"),
        ParamSpec::new("z", K::Float, 0.0, Surface,
            "Release depth below sea level. Ignored when seeding at the seafloor.")
            .range(-10000.0, 0.0).units("m").nullable().engine("seed:z"),
        ParamSpec::new("seed_seafloor", K::Bool, false, Medium,
            "Seed elements at the seafloor.")
            .engine("seed:seafloor"),
        ParamSpec::new("surface_only", K::Bool, ParamValue::Null, Surface,
            "Keep drifters at the surface: 2D, no vertical mixing, ocean model truncated below 0.5 m."),
        ParamSpec::new("number", K::Int, 1, Surface,
            "Number of elements released.")
            .at_least(1.0).units("1").engine("seed:number"),
        ParamSpec::new("vertical_mixing", K::Bool, false, Medium,
            "Activate vertical mixing.")
            .engine("drift:vertical_mixing"),
        ParamSpec::new("radius", K::Float, 1000.0, Medium,
            "Radius around the seed point within which elements are placed.")
            .range(0.0, 1_000_000.0).units("m"),
        ParamSpec::new("radius_type", K::Enum(RADIUS_TYPES), "gaussian", Buried,
            "\"gaussian\": radius is the standard deviation; \"uniform\": elements spread evenly inside the radius."),
        ParamSpec::new("export_variables", K::List, ParamValue::Null, Buried,
            "Variables to write to the output file. All when unset."),

        // Shared variant level
        ParamSpec::new("current_uncertainty", K::Float, 0.0, Medium,
            "Standard deviation of gaussian noise added to current components each step.")
            .range(0.0, 5.0).units("m/s").variant_level().engine("drift:current_uncertainty"),
        ParamSpec::new("wind_uncertainty", K::Float, 0.0, Medium,
            "Standard deviation of gaussian noise added to wind components each step.")
            .range(0.0, 5.0).units("m/s").variant_level().engine("drift:wind_uncertainty"),
        ParamSpec::new("use_auto_landmask", K::Bool, false, Buried,
            "Use the general landmask instead of the ocean model's.")
            .variant_level().engine("general:use_auto_landmask"),
        ParamSpec::new("coastline_action", K::Enum(COASTLINE_ACTIONS), "previous", Medium,
            "What happens when an element hits the coastline.")
            .variant_level().engine("general:coastline_action"),
        ParamSpec::new("seafloor_action", K::Enum(SEAFLOOR_ACTIONS), "previous", Medium,
            "What happens when an element hits the seafloor.")
            .variant_level().engine("general:seafloor_action"),
        ParamSpec::new("max_speed", K::Float, 5.0, Buried,
            "Typical maximum element speed, used to size reader buffers.")
            .range(0.0, 100.0).units("m/s").variant_level().engine("drift:max_speed"),
        ParamSpec::new("wind_drift_factor", K::Float, 0.02, Medium,
            "Fraction of the wind vector applied to surface elements.")
            .range(0.0, 1.0).units("1").variant_level().engine("seed:wind_drift_factor"),
        ParamSpec::new("wind_drift_depth", K::Float, 0.02, Buried,
            "Depth at which windage has decreased linearly to zero.")
            .range(0.0, 10.0).units("m").variant_level().engine("drift:wind_drift_depth"),
        ParamSpec::new("diffusivitymodel", K::Enum(DIFFUSIVITY_MODELS), "windspeed_Large1994", Buried,
            "Source of the vertical diffusivity profile. Only used with vertical_mixing.")
            .variant_level().engine("vertical_mixing:diffusivitymodel"),
        ParamSpec::new("mixed_layer_depth", K::Float, 30.0, Buried,
            "Fallback mixed layer thickness when no reader provides it.")
            .range(0.0, 1000.0).units("m").variant_level()
            .engine("environment:fallback:ocean_mixed_layer_thickness"),
        ParamSpec::new("vertical_mixing_timestep", K::Float, 60.0, Buried,
            "Inner-loop time step for vertical mixing.")
            .range(0.1, 3600.0).units("seconds").variant_level().engine("vertical_mixing:timestep"),

        // Leeway
        ParamSpec::new("object_type", K::Str, "Person-in-water (PIW), unknown state (mean values)", Surface,
            "Leeway object category.")
            .only(LEEWAY).engine("seed:object_type"),

        // LarvalFish
        ParamSpec::new("diameter", K::Float, 0.0014, Medium, "Seeding value of egg diameter.")
            .range(0.0, 0.1).units("m").only(LARVAL_FISH).engine("seed:diameter"),
        ParamSpec::new("neutral_buoyancy_salinity", K::Float, 31.25, Medium,
            "Seeding value of neutral buoyancy salinity.")
            .range(5.0, 50.0).units("PSU").only(LARVAL_FISH).engine("seed:neutral_buoyancy_salinity"),
        ParamSpec::new("stage_fraction", K::Float, 0.0, Medium, "Seeding value of stage fraction.")
            .range(0.0, 1.0).only(LARVAL_FISH).engine("seed:stage_fraction"),
        ParamSpec::new("hatched", K::Float, 0.0, Medium, "Seeding value of hatched (0 egg, 1 larva).")
            .range(0.0, 1.0).only(LARVAL_FISH).engine("seed:hatched"),
        ParamSpec::new("length", K::Float, 0.0, Medium, "Seeding value of larval length.")
            .range(0.0, 100.0).units("mm").only(LARVAL_FISH).engine("seed:length"),
        ParamSpec::new("weight", K::Float, 0.08, Medium, "Seeding value of larval weight.")
            .range(0.0, 100.0).units("mg").only(LARVAL_FISH).engine("seed:weight"),

        // OpenOil
        ParamSpec::new("oil_type", K::Str, "GENERIC MEDIUM CRUDE", Surface,
            "Oil type from the NOAA ADIOS database.")
            .only(OPEN_OIL).engine("seed:oil_type"),
        ParamSpec::new("m3_per_hour", K::Float, 1.0, Medium,
            "Volume of oil released per hour (or in total for an instantaneous release).")
            .range(0.0, 1.0e8).units("m3 per hour").only(OPEN_OIL).engine("seed:m3_per_hour"),
        ParamSpec::new("oil_film_thickness", K::Float, 0.001, Buried, "Seeding value of oil film thickness.")
            .range(0.0, 1.0).units("m").only(OPEN_OIL).engine("seed:oil_film_thickness"),
        ParamSpec::new("droplet_size_distribution", K::Enum(DROPLET_DISTRIBUTIONS), "uniform", Buried,
            "Droplet size distribution for a subsea release.")
            .only(OPEN_OIL).engine("seed:droplet_size_distribution"),
        ParamSpec::new("droplet_diameter_mu", K::Float, 0.001, Buried,
            "Mean droplet diameter for normal/lognormal distributions.")
            .range(1.0e-8, 1.0).units("m").only(OPEN_OIL).engine("seed:droplet_diameter_mu"),
        ParamSpec::new("droplet_diameter_sigma", K::Float, 0.0005, Buried,
            "Droplet diameter standard deviation for normal/lognormal distributions.")
            .range(1.0e-8, 1.0).units("m").only(OPEN_OIL).engine("seed:droplet_diameter_sigma"),
        ParamSpec::new("droplet_diameter_min_subsea", K::Float, 0.0005, Buried,
            "Minimum droplet diameter for a uniform distribution.")
            .range(1.0e-8, 1.0).units("m").only(OPEN_OIL).engine("seed:droplet_diameter_min_subsea"),
        ParamSpec::new("droplet_diameter_max_subsea", K::Float, 0.005, Buried,
            "Maximum droplet diameter for a uniform distribution.")
            .range(1.0e-8, 1.0).units("m").only(OPEN_OIL).engine("seed:droplet_diameter_max_subsea"),
        ParamSpec::new("emulsification", K::Bool, true, Medium,
            "Surface oil takes up water through wave mixing.")
            .only(OPEN_OIL).engine("processes:emulsification"),
        ParamSpec::new("dispersion", K::Bool, true, Medium,
            "Oil entrained as very small droplets is removed.")
            .only(OPEN_OIL).engine("processes:dispersion"),
        ParamSpec::new("evaporation", K::Bool, true, Medium, "Surface oil evaporates.")
            .only(OPEN_OIL).engine("processes:evaporation"),
        ParamSpec::new("update_oilfilm_thickness", K::Bool, true, Buried,
            "Recompute oil film thickness every step instead of keeping the seeded value.")
            .only(OPEN_OIL).engine("processes:update_oilfilm_thickness"),
        ParamSpec::new("biodegradation", K::Bool, false, Medium, "Oil mass is biodegraded.")
            .only(OPEN_OIL).engine("processes:biodegradation"),
    ]
}
