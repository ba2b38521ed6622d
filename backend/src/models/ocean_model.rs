//! Known ocean models
//!
//! Grid resolution drives the derived horizontal diffusivity; temporal
//! coverage bounds the run window. Any name not listed here is treated as a
//! user-supplied (custom) model.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ConfigError;
use crate::models::value::format_timestamp;

/// Sub-grid-scale velocity (m/s) missing from model output
pub const SUB_GRIDSCALE_VELOCITY: f64 = 0.1;

/// Registry entry for one ocean model
#[derive(Debug, Clone)]
pub struct OceanModel {
    pub name: &'static str,
    /// Approximate horizontal grid resolution in meters
    pub grid_resolution_m: f64,
    pub coverage_start: Option<NaiveDateTime>,
    pub coverage_end: Option<NaiveDateTime>,
    /// Longitudes run 0..360 instead of -180..180
    pub lon0_360: bool,
    /// Only a local copy exists
    pub local_only: bool,
    pub standard_name_mapping: &'static [(&'static str, &'static str)],
    pub drop_vars: &'static [&'static str],
}

impl OceanModel {
    /// Horizontal diffusivity tuned to the grid
    ///
    /// # Example
    /// ```
    /// use particle_tracking_core_rs::models::ocean_model::lookup;
    ///
    /// assert_eq!(lookup("NWGOA").unwrap().horizontal_diffusivity(), 150.0);
    /// assert_eq!(lookup("CIOFSOP").unwrap().horizontal_diffusivity(), 10.0);
    /// ```
    pub fn horizontal_diffusivity(&self) -> f64 {
        SUB_GRIDSCALE_VELOCITY * self.grid_resolution_m
    }

    /// Check that a run timestamp falls inside the model's coverage
    pub fn check_coverage(&self, field: &str, t: NaiveDateTime) -> Result<(), ConfigError> {
        if let Some(start) = self.coverage_start {
            if t < start {
                return Err(ConfigError::range(
                    field,
                    format!(
                        "{} is before {} coverage starts at {}",
                        format_timestamp(t),
                        self.name,
                        format_timestamp(start)
                    ),
                ));
            }
        }
        if let Some(end) = self.coverage_end {
            if t > end {
                return Err(ConfigError::range(
                    field,
                    format!(
                        "{} is after {} coverage ends at {}",
                        format_timestamp(t),
                        self.name,
                        format_timestamp(end)
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(hour, 0, 0))
}

const NWGOA_NAMES: &[(&str, &str)] = &[
    ("u_eastward", "x_sea_water_velocity"),
    ("v_northward", "y_sea_water_velocity"),
    ("Uwind_eastward", "x_wind"),
    ("Vwind_northward", "y_wind"),
];

const CIOFSOP_NAMES: &[(&str, &str)] = &[
    ("u_eastward", "x_sea_water_velocity"),
    ("v_northward", "y_sea_water_velocity"),
];

static REGISTRY: LazyLock<Vec<OceanModel>> = LazyLock::new(|| {
    vec![
        OceanModel {
            name: "NWGOA",
            grid_resolution_m: 1500.0,
            coverage_start: at(1999, 1, 1, 0),
            coverage_end: at(2009, 1, 1, 0),
            lon0_360: true,
            local_only: false,
            standard_name_mapping: NWGOA_NAMES,
            drop_vars: &["hice", "hraw", "snow_thick"],
        },
        OceanModel {
            name: "CIOFS",
            grid_resolution_m: 100.0,
            coverage_start: at(1999, 1, 1, 0),
            coverage_end: at(2023, 1, 1, 0),
            lon0_360: false,
            local_only: false,
            standard_name_mapping: &[],
            drop_vars: &["wetdry_mask_psi"],
        },
        OceanModel {
            name: "CIOFSOP",
            grid_resolution_m: 100.0,
            coverage_start: at(2021, 8, 31, 19),
            coverage_end: None,
            lon0_360: false,
            local_only: false,
            standard_name_mapping: CIOFSOP_NAMES,
            drop_vars: &["wetdry_mask_psi"],
        },
        OceanModel {
            name: "CIOFSFRESH",
            grid_resolution_m: 100.0,
            coverage_start: None,
            coverage_end: None,
            lon0_360: false,
            local_only: true,
            standard_name_mapping: &[],
            drop_vars: &["wetdry_mask_psi"],
        },
    ]
});

/// Look up a known model by (already upper-cased) name
pub fn lookup(name: &str) -> Option<&'static OceanModel> {
    REGISTRY.iter().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_custom() {
        assert!(lookup("MYMODEL").is_none());
        assert_eq!(REGISTRY.len(), 4);
    }

    #[test]
    fn test_coverage() {
        let nwgoa = lookup("NWGOA").unwrap();
        assert!(nwgoa.check_coverage("start_time", at(2007, 1, 1, 0).unwrap()).is_ok());
        let err = nwgoa
            .check_coverage("start_time", at(2022, 1, 1, 0).unwrap())
            .unwrap_err();
        assert_eq!(err.fields(), vec!["start_time".to_string()]);

        let op = lookup("CIOFSOP").unwrap();
        assert!(op.check_coverage("start_time", at(2021, 8, 31, 18).unwrap()).is_err());
        assert!(op.check_coverage("start_time", at(2030, 1, 1, 0).unwrap()).is_ok());
    }
}
