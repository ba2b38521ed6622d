//! Where and when drifters are released
//!
//! Drifters are seeded either around a point or inside a GeoJSON polygon.
//! Exactly one form is active and the fields of the other must be unset.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;

/// Seeding method selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedFlag {
    Elements,
    Geojson,
}

impl FromStr for SeedFlag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "elements" => Ok(SeedFlag::Elements),
            "geojson" => Ok(SeedFlag::Geojson),
            other => Err(ConfigError::range(
                "seed_flag",
                format!("'{}' is not one of elements, geojson", other),
            )),
        }
    }
}

/// Spread of elements around the seed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusType {
    Gaussian,
    Uniform,
}

impl RadiusType {
    pub fn as_str(self) -> &'static str {
        match self {
            RadiusType::Gaussian => "gaussian",
            RadiusType::Uniform => "uniform",
        }
    }
}

impl FromStr for RadiusType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gaussian" => Ok(RadiusType::Gaussian),
            "uniform" => Ok(RadiusType::Uniform),
            other => Err(ConfigError::range(
                "radius_type",
                format!("'{}' is not one of gaussian, uniform", other),
            )),
        }
    }
}

/// Active seeding form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "seed_flag", rename_all = "lowercase")]
pub enum SeedSpec {
    Elements {
        lon: f64,
        lat: f64,
        radius: f64,
        radius_type: RadiusType,
    },
    Geojson {
        polygon: Value,
    },
}

impl SeedSpec {
    /// Build the active form, rejecting fields that belong to the inactive one
    pub fn from_fields(
        flag: SeedFlag,
        lon: Option<f64>,
        lat: Option<f64>,
        geojson: Option<&Value>,
        radius: f64,
        radius_type: RadiusType,
    ) -> Result<Self, ConfigError> {
        match flag {
            SeedFlag::Elements => {
                if geojson.is_some() {
                    return Err(ConfigError::exclusive(
                        &["seed_flag", "geojson"],
                        "geojson must be None when seed_flag is \"elements\"",
                    ));
                }
                match (lon, lat) {
                    (Some(lon), Some(lat)) => Ok(SeedSpec::Elements {
                        lon,
                        lat,
                        radius,
                        radius_type,
                    }),
                    _ => Err(ConfigError::exclusive(
                        &["seed_flag", "lon", "lat"],
                        "lon and lat need non-None values when seed_flag is \"elements\"",
                    )),
                }
            }
            SeedFlag::Geojson => {
                if lon.is_some() || lat.is_some() {
                    return Err(ConfigError::exclusive(
                        &["seed_flag", "lon", "lat"],
                        "lon and lat must be None when seed_flag is \"geojson\"",
                    ));
                }
                match geojson {
                    Some(polygon) => Ok(SeedSpec::Geojson {
                        polygon: polygon.clone(),
                    }),
                    None => Err(ConfigError::exclusive(
                        &["seed_flag", "geojson"],
                        "geojson needs a non-None value when seed_flag is \"geojson\"",
                    )),
                }
            }
        }
    }

    pub fn flag(&self) -> SeedFlag {
        match self {
            SeedSpec::Elements { .. } => SeedFlag::Elements,
            SeedSpec::Geojson { .. } => SeedFlag::Geojson,
        }
    }
}
