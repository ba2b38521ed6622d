//! Drift engine hand-off
//!
//! The particle-tracking engine itself runs outside this process. A
//! [`DriftEngine`] receives the frozen configuration; [`ManifestEngine`]
//! records it as a JSON run manifest next to the output file, which is what
//! the external engine picks up.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use particle_tracking_core_rs::FrozenConfig;

pub trait DriftEngine {
    fn name(&self) -> &str;

    /// Start a run; returns the path of the artefact the run was handed
    fn run(&self, config: &FrozenConfig) -> Result<PathBuf>;
}

#[derive(Debug, Default)]
pub struct ManifestEngine;

impl ManifestEngine {
    /// `<stem>.json` beside the configured output file
    pub fn manifest_path(config: &FrozenConfig) -> PathBuf {
        config.output().output_file.with_extension("json")
    }
}

impl DriftEngine for ManifestEngine {
    fn name(&self) -> &str {
        "manifest"
    }

    fn run(&self, config: &FrozenConfig) -> Result<PathBuf> {
        let path = Self::manifest_path(config);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
        }

        let record = config.to_json().context("serializing run manifest")?;
        let text = serde_json::to_string_pretty(&record)?;
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;

        tracing::info!(
            engine = self.name(),
            config_id = %config.config_id(),
            manifest = %path.display(),
            "run manifest written"
        );
        Ok(path)
    }
}
