//! Drift-model variants
//!
//! A configuration is built for exactly one drift model. Each variant pins
//! some manager fields (forced values), keeps others at their defaults
//! (forbidden fields) and brings its own extra fields. The tables here are
//! closed: adding a variant is an exhaustive-match change, not a string
//! comparison.

use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ConfigError;
use crate::models::value::ParamValue;

/// Supported drift models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DriftModel {
    OceanDrift,
    LarvalFish,
    OpenOil,
    Leeway,
}

impl DriftModel {
    pub const ALL: [DriftModel; 4] = [
        DriftModel::OceanDrift,
        DriftModel::LarvalFish,
        DriftModel::OpenOil,
        DriftModel::Leeway,
    ];

    pub const NAMES: &'static [&'static str] = &["OceanDrift", "LarvalFish", "OpenOil", "Leeway"];

    pub fn as_str(self) -> &'static str {
        match self {
            DriftModel::OceanDrift => "OceanDrift",
            DriftModel::LarvalFish => "LarvalFish",
            DriftModel::OpenOil => "OpenOil",
            DriftModel::Leeway => "Leeway",
        }
    }

    /// Forced, forbidden and extra-field tables for this variant
    pub fn profile(self) -> &'static VariantProfile {
        match self {
            DriftModel::OceanDrift => &OCEAN_DRIFT,
            DriftModel::LarvalFish => &LARVAL_FISH,
            DriftModel::OpenOil => &OPEN_OIL,
            DriftModel::Leeway => &LEEWAY,
        }
    }

    /// Leeway has no vertical physics and handles windage itself
    pub fn is_leeway(self) -> bool {
        matches!(self, DriftModel::Leeway)
    }
}

impl Default for DriftModel {
    fn default() -> Self {
        DriftModel::OceanDrift
    }
}

impl std::fmt::Display for DriftModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriftModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DriftModel::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownDriftModel(s.to_string()))
    }
}

impl Serialize for DriftModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A field pinned to a fixed value by the variant
#[derive(Debug)]
pub struct ForcedValue {
    pub field: &'static str,
    pub value: ParamValue,
}

/// Capability table for one variant
#[derive(Debug)]
pub struct VariantProfile {
    pub model: DriftModel,
    /// Applied unconditionally; explicit user input must agree
    pub forced: &'static [ForcedValue],
    /// Must stay at the schema default
    pub forbidden: &'static [&'static str],
    /// Fields only this variant carries
    pub extra_fields: &'static [&'static str],
}

impl VariantProfile {
    pub fn forced_value(&self, field: &str) -> Option<&ParamValue> {
        self.forced
            .iter()
            .find(|f| f.field == field)
            .map(|f| &f.value)
    }

    pub fn is_forbidden(&self, field: &str) -> bool {
        self.forbidden.contains(&field)
    }

    pub fn is_pinned(&self, field: &str) -> bool {
        self.forced_value(field).is_some() || self.is_forbidden(field)
    }
}

static OCEAN_DRIFT: VariantProfile = VariantProfile {
    model: DriftModel::OceanDrift,
    forced: &[],
    forbidden: &[],
    extra_fields: &[],
};

static LARVAL_FISH: VariantProfile = VariantProfile {
    model: DriftModel::LarvalFish,
    forced: &[
        ForcedValue {
            field: "do3D",
            value: ParamValue::Bool(true),
        },
        ForcedValue {
            field: "vertical_mixing",
            value: ParamValue::Bool(true),
        },
    ],
    forbidden: &[],
    extra_fields: &[
        "diameter",
        "neutral_buoyancy_salinity",
        "stage_fraction",
        "hatched",
        "length",
        "weight",
    ],
};

static OPEN_OIL: VariantProfile = VariantProfile {
    model: DriftModel::OpenOil,
    forced: &[],
    forbidden: &[],
    extra_fields: &[
        "oil_type",
        "m3_per_hour",
        "oil_film_thickness",
        "droplet_size_distribution",
        "droplet_diameter_mu",
        "droplet_diameter_sigma",
        "droplet_diameter_min_subsea",
        "droplet_diameter_max_subsea",
        "emulsification",
        "dispersion",
        "evaporation",
        "update_oilfilm_thickness",
        "biodegradation",
    ],
};

static LEEWAY: VariantProfile = VariantProfile {
    model: DriftModel::Leeway,
    forced: &[
        ForcedValue {
            field: "stokes_drift",
            value: ParamValue::Bool(false),
        },
        ForcedValue {
            field: "do3D",
            value: ParamValue::Bool(false),
        },
    ],
    forbidden: &["wind_drift_factor", "wind_drift_depth"],
    extra_fields: &["object_type"],
};
