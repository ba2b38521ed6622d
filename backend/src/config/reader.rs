//! Run artefacts derived from a configuration
//!
//! Everything the run driver needs besides the flat engine configuration:
//! which ocean-model variables to read, output and log file names, the
//! interpolator cache location and the seeding keyword set.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::validation::FieldSource;
use crate::models::ocean_model;
use crate::models::value::{format_timestamp, ParamValue};
use crate::models::variant::DriftModel;

/// Directory under the user cache dir holding interpolator caches
pub const CACHE_DIR_NAME: &str = "particle-tracking-manager";

/// Seed keys consumed elsewhere and never passed through to seeding
const SEED_KWARGS_EXCLUDED: &[&str] = &[
    "seed:number",
    "seed:z",
    "seed:seafloor",
    "seed:droplet_diameter_mu",
    "seed:droplet_diameter_min_subsea",
    "seed:droplet_size_distribution",
    "seed:droplet_diameter_sigma",
    "seed:droplet_diameter_max_subsea",
    "seed:object_type",
    "seed_flag",
    "drift:use_tabularised_stokes_drift",
    "drift:vertical_advection",
    "drift:truncate_ocean_model_below_m",
];

const WIND_VARS: &[&str] = &["Uwind", "Vwind", "Uwind_eastward", "Vwind_northward"];
const ICE_VARS: &[&str] = &["aice", "uice_eastward", "vice_northward"];

// ============================================================================
// Reader plan
// ============================================================================

/// Variables to drop and names to map when opening the ocean model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReaderPlan {
    pub ocean_model: String,
    /// Ocean model is one of the registered ones
    pub known: bool,
    pub drop_vars: Vec<String>,
    pub standard_name_mapping: IndexMap<String, String>,
    pub lon0_360: bool,
    /// Seed longitude in the model's convention
    pub seed_lon: Option<f64>,
}

impl ReaderPlan {
    pub fn from_config(source: &dyn FieldSource) -> Self {
        let model = source.drift_model();
        let name = source.value("ocean_model").as_str().unwrap_or_default().to_string();
        let known = ocean_model::lookup(&name);
        let flag = |field: &str| source.value(field).as_bool().unwrap_or(false);
        let float = |field: &str| source.value(field).as_f64().unwrap_or(0.0);

        let mut drop_vars: Vec<&str> = Vec::new();
        if !flag("do3D") {
            drop_vars.push("w");
        }

        let wind_unused = !flag("stokes_drift")
            && float("wind_drift_factor") == 0.0
            && float("wind_uncertainty") == 0.0
            && !flag("vertical_mixing")
            && model != DriftModel::OpenOil;
        if wind_unused {
            drop_vars.extend_from_slice(WIND_VARS);
        }

        if !matches!(model, DriftModel::LarvalFish | DriftModel::OpenOil) {
            drop_vars.extend_from_slice(&["salt", "temp"]);
        }
        if model != DriftModel::OpenOil {
            drop_vars.extend_from_slice(ICE_VARS);
        }

        let mut standard_name_mapping = IndexMap::new();
        if flag("use_static_masks") {
            standard_name_mapping.insert("mask_rho".to_string(), "land_binary_mask".to_string());
            drop_vars.extend_from_slice(&["wetdry_mask_rho", "wetdry_mask_u", "wetdry_mask_v"]);
        } else {
            standard_name_mapping.insert("wetdry_mask_rho".to_string(), "land_binary_mask".to_string());
            drop_vars.extend_from_slice(&["mask_rho", "mask_u", "mask_v", "mask_psi"]);
        }

        if let Some(known) = known {
            drop_vars.extend_from_slice(known.drop_vars);
            for (var, standard) in known.standard_name_mapping {
                standard_name_mapping.insert(var.to_string(), standard.to_string());
            }
        }

        let mut deduped: Vec<String> = Vec::with_capacity(drop_vars.len());
        for var in drop_vars {
            if !deduped.iter().any(|v| v == var) {
                deduped.push(var.to_string());
            }
        }

        let lon0_360 = known.is_some_and(|m| m.lon0_360);
        let seed_lon = source.value("lon").as_f64().map(|lon| {
            if lon0_360 && lon < 0.0 {
                lon + 360.0
            } else {
                lon
            }
        });

        Self {
            ocean_model: name,
            known: known.is_some(),
            drop_vars: deduped,
            standard_name_mapping,
            lon0_360,
            seed_lon,
        }
    }
}

// ============================================================================
// Output files
// ============================================================================

/// Output, intermediate and log file names for a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputPaths {
    pub output_file: PathBuf,
    /// File the engine writes during the run (netcdf); converted afterwards
    /// when the requested format is parquet
    pub output_file_initial: PathBuf,
    pub log_file: PathBuf,
}

impl OutputPaths {
    /// Names from the configured output file and format; an unset file name
    /// is generated from `now`
    pub fn new(output_file: Option<&str>, output_format: &str, now: DateTime<Utc>) -> Self {
        let suffix = match output_format {
            "parquet" => "parquet",
            _ => "nc",
        };
        let mut output_file = match output_file {
            Some(name) => PathBuf::from(name),
            None => PathBuf::from(format!("output-results_{}", now.format("%Y-%m-%dT%H%M%SZ"))),
        };
        if output_file.extension().is_none() {
            output_file.set_extension(suffix);
        }

        let output_file_initial = if suffix == "parquet" {
            sibling(&output_file, "_initial", "nc")
        } else {
            output_file.clone()
        };
        let log_file = sibling(&output_file, "", "log");

        Self {
            output_file,
            output_file_initial,
            log_file,
        }
    }

    pub fn from_config(source: &dyn FieldSource, now: DateTime<Utc>) -> Self {
        let file = source.value("output_file");
        let format = source.value("output_format");
        Self::new(file.as_str(), format.as_str().unwrap_or("netcdf"), now)
    }
}

/// `<dir>/<stem><tag>.<extension>`
fn sibling(path: &Path, tag: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}.{}", stem, tag, extension))
}

// ============================================================================
// Interpolator cache
// ============================================================================

/// Cache key for an ocean model's interpolator
pub fn cache_key(ocean_model: &str) -> String {
    format!("{}_interpolator", ocean_model)
}

/// Interpolator cache file, or `None` when caching is off (or no cache
/// directory can be found)
pub fn interpolator_path(source: &dyn FieldSource) -> Option<PathBuf> {
    interpolator_path_in(source, dirs::cache_dir().map(|d| d.join(CACHE_DIR_NAME)))
}

/// As [`interpolator_path`], against an explicit cache directory
pub fn interpolator_path_in(source: &dyn FieldSource, cache_dir: Option<PathBuf>) -> Option<PathBuf> {
    if !source.value("use_cache").as_bool().unwrap_or(false) {
        return None;
    }
    if let Some(name) = source.value("interpolator_filename").as_str() {
        return Some(PathBuf::from(name).with_extension("pickle"));
    }
    let model = source.value("ocean_model");
    let key = cache_key(model.as_str().unwrap_or_default());
    match cache_dir {
        Some(dir) => Some(dir.join(key).with_extension("pickle")),
        None => {
            tracing::warn!("no user cache directory; interpolator caching disabled");
            None
        }
    }
}

// ============================================================================
// Seeding keywords
// ============================================================================

/// Keyword set passed to the engine's seeding call
///
/// `export` is the flat engine configuration; its `seed:` keys are passed
/// through minus the ones consumed elsewhere.
pub fn seed_kwargs(source: &dyn FieldSource, export: &IndexMap<String, ParamValue>) -> IndexMap<String, ParamValue> {
    let mut kwargs = IndexMap::new();
    let start = source.value("start_time");
    let release_end = source.value("start_time_end");
    let geojson = source.value("seed_flag").as_str() == Some("geojson");

    let time = match (&start, &release_end) {
        (ParamValue::Timestamp(t), _) if geojson => ParamValue::Str(format_timestamp(*t)),
        (_, ParamValue::Null) => start.clone(),
        _ => ParamValue::List(vec![start.clone(), release_end.clone()]),
    };
    kwargs.insert("time".to_string(), time);
    kwargs.insert("z".to_string(), source.value("z"));

    for (key, value) in export {
        if !key.starts_with("seed:") || SEED_KWARGS_EXCLUDED.contains(&key.as_str()) {
            continue;
        }
        let name = key.trim_start_matches("seed:").to_string();
        kwargs.entry(name).or_insert_with(|| value.clone());
    }

    if !geojson {
        for field in ["lon", "lat", "radius", "radius_type"] {
            kwargs.insert(field.to_string(), source.value(field));
        }
    }
    kwargs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_output_names() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let paths = OutputPaths::new(None, "parquet", now);
        assert_eq!(paths.output_file, PathBuf::from("output-results_2024-03-05T140709Z.parquet"));
        assert_eq!(
            paths.output_file_initial,
            PathBuf::from("output-results_2024-03-05T140709Z_initial.nc")
        );
        assert_eq!(paths.log_file, PathBuf::from("output-results_2024-03-05T140709Z.log"));
    }

    #[test]
    fn test_user_output_name_keeps_directory() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let paths = OutputPaths::new(Some("runs/sim"), "netcdf", now);
        assert_eq!(paths.output_file, PathBuf::from("runs/sim.nc"));
        assert_eq!(paths.output_file_initial, paths.output_file);
        assert_eq!(paths.log_file, PathBuf::from("runs/sim.log"));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("CIOFSOP"), "CIOFSOP_interpolator");
    }
}
