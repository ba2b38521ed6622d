//! ptm - configure a particle-tracking run from the command line
//!
//! ```text
//! ptm [--dry-run] [--config FILE] key=value ...
//! ```
//!
//! Pairs given on the command line override entries from `--config`.

mod engine;
mod kwargs;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use particle_tracking_core_rs::{DriftConfig, ExposureTier, ParamValue};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::engine::{DriftEngine, ManifestEngine};

#[derive(Parser, Debug)]
#[command(name = "ptm")]
#[command(about = "Configure and launch a Lagrangian particle-tracking run")]
struct Cli {
    /// Build the configuration and print the merged view without running
    #[arg(long)]
    dry_run: bool,

    /// JSON object of configuration inputs
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Configuration inputs as key=value (lists as [a,b,c])
    #[arg(value_name = "KEY=VALUE")]
    pairs: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut inputs = match &cli.config {
        Some(path) => load_inputs(path)?,
        None => IndexMap::new(),
    };
    for pair in &cli.pairs {
        let (key, value) = kwargs::parse_pair(pair)?;
        inputs.insert(key, value);
    }

    init_tracing(inputs.get("log_level"));

    let config = DriftConfig::new(inputs).context("invalid configuration")?;

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&config.merged().to_json())?);
        return Ok(());
    }

    let frozen = config.freeze().context("configuration failed final validation")?;
    let export = config.drift_model_config(&ExposureTier::ALL);
    println!("{}", serde_json::to_string_pretty(&export)?);

    let engine = ManifestEngine;
    let manifest = engine
        .run(&frozen)
        .with_context(|| format!("{} engine failed", engine.name()))?;
    println!("{}", manifest.display());
    Ok(())
}

fn load_inputs(path: &Path) -> Result<IndexMap<String, ParamValue>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let serde_json::Value::Object(map) = json else {
        bail!("{} must hold a JSON object", path.display());
    };
    Ok(map
        .iter()
        .map(|(k, v)| (k.clone(), ParamValue::from_json(v)))
        .collect())
}

/// Map the configuration's log level onto a tracing filter; `RUST_LOG` wins
fn filter_directive(log_level: Option<&ParamValue>) -> &'static str {
    let level = log_level
        .and_then(|v| v.as_str())
        .map(str::to_ascii_uppercase)
        .unwrap_or_default();
    match level.as_str() {
        "DEBUG" => "debug",
        "WARNING" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}

fn init_tracing(log_level: Option<&ParamValue>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
