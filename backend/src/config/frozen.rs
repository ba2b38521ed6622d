//! Immutable run configuration
//!
//! Freezing validates once more and then captures everything a run needs:
//! the merged view, the flat engine export, the resolved window, reader
//! plan, output paths and seeding keywords. A [`FrozenConfig`] has no
//! mutation API; hand it to the driver and serialize it for the run record.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::manager::DriftConfig;
use crate::config::namespace::MergedView;
use crate::config::reader::{cache_key, interpolator_path, seed_kwargs, OutputPaths, ReaderPlan};
use crate::core::duration::format_iso;
use crate::core::time::ResolvedWindow;
use crate::error::ConfigError;
use crate::models::schema::ExposureTier;
use crate::models::seed::SeedSpec;
use crate::models::value::{format_timestamp, ParamValue};
use crate::models::variant::DriftModel;

/// Serializable form of the resolved run window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunWindow {
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub steps: u64,
    pub run_forward: bool,
}

impl From<&ResolvedWindow> for RunWindow {
    fn from(w: &ResolvedWindow) -> Self {
        Self {
            start_time: format_timestamp(w.start_time),
            end_time: format_timestamp(w.end_time),
            duration: format_iso(w.duration),
            steps: w.steps,
            run_forward: w.direction.sign() > 0,
        }
    }
}

/// Validated, read-only configuration handed to the run driver
#[derive(Debug, Clone, Serialize)]
pub struct FrozenConfig {
    config_id: Uuid,
    drift_model: DriftModel,
    frozen_at: DateTime<Utc>,
    /// SHA-256 of the canonical engine export
    config_hash: String,
    window: RunWindow,
    seed: SeedSpec,
    export: IndexMap<String, ParamValue>,
    seed_kwargs: IndexMap<String, ParamValue>,
    reader: ReaderPlan,
    output: OutputPaths,
    interpolator_cache_key: String,
    interpolator_file: Option<PathBuf>,
    #[serde(skip)]
    merged: MergedView,
}

impl DriftConfig {
    /// Freeze with the current wall-clock time
    pub fn freeze(&self) -> Result<FrozenConfig, ConfigError> {
        self.freeze_at(Utc::now())
    }

    /// Freeze against a fixed clock (generated file names use `now`)
    pub fn freeze_at(&self, now: DateTime<Utc>) -> Result<FrozenConfig, ConfigError> {
        self.validate()?;
        let window = self.time_window()?;
        let export = self.drift_model_config(&ExposureTier::ALL);
        let config_hash = compute_config_hash(&export)?;
        let ocean_model = self.value("ocean_model");

        let frozen = FrozenConfig {
            config_id: self.id(),
            drift_model: self.drift_model(),
            frozen_at: now,
            config_hash,
            window: RunWindow::from(&window),
            seed: self.seed_spec()?,
            seed_kwargs: seed_kwargs(self, &export),
            export,
            reader: ReaderPlan::from_config(self),
            output: OutputPaths::from_config(self, now),
            interpolator_cache_key: cache_key(ocean_model.as_str().unwrap_or_default()),
            interpolator_file: interpolator_path(self),
            merged: self.merged(),
        };
        tracing::info!(
            config_id = %frozen.config_id,
            config_hash = %frozen.config_hash,
            output_file = %frozen.output.output_file.display(),
            "configuration frozen"
        );
        Ok(frozen)
    }
}

impl FrozenConfig {
    pub fn config_id(&self) -> Uuid {
        self.config_id
    }

    pub fn drift_model(&self) -> DriftModel {
        self.drift_model
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn window(&self) -> &RunWindow {
        &self.window
    }

    pub fn seed(&self) -> &SeedSpec {
        &self.seed
    }

    /// Flat engine configuration (all exposure tiers)
    pub fn export(&self) -> &IndexMap<String, ParamValue> {
        &self.export
    }

    pub fn seed_kwargs(&self) -> &IndexMap<String, ParamValue> {
        &self.seed_kwargs
    }

    pub fn reader(&self) -> &ReaderPlan {
        &self.reader
    }

    pub fn output(&self) -> &OutputPaths {
        &self.output
    }

    pub fn interpolator_cache_key(&self) -> &str {
        &self.interpolator_cache_key
    }

    pub fn interpolator_file(&self) -> Option<&PathBuf> {
        self.interpolator_file.as_ref()
    }

    pub fn merged(&self) -> &MergedView {
        &self.merged
    }

    /// Resolved value by either name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.merged.value(name)
    }

    /// Run record: this structure plus the merged name -> value view
    pub fn to_json(&self) -> Result<serde_json::Value, ConfigError> {
        let mut value = serde_json::to_value(self).map_err(serialize_err)?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("config".to_string(), self.merged.to_json());
        }
        Ok(value)
    }

    /// Run record as JSON text
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        to_json_text(&self.to_json()?)
    }
}

fn serialize_err(err: serde_json::Error) -> ConfigError {
    ConfigError::TypeMismatch {
        field: "config".to_string(),
        expected: "serializable configuration".to_string(),
        found: err.to_string(),
    }
}

/// Compact JSON text of any serializable result
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, ConfigError> {
    serde_json::to_string(value).map_err(serialize_err)
}

/// SHA-256 hex digest of the export with keys sorted
pub fn compute_config_hash(export: &IndexMap<String, ParamValue>) -> Result<String, ConfigError> {
    let mut sorted: Vec<(&String, serde_json::Value)> =
        export.iter().map(|(k, v)| (k, v.to_json())).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let json = to_json_text(&sorted)?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
