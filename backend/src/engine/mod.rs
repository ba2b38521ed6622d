//! Engine-native configuration catalogue
//!
//! The external drift engine has its own configuration keys (`seed:z`,
//! `drift:stokes_drift`, ...). [`EngineCatalog`] is the narrow interface
//! through which its per-variant defaults and metadata reach the engine
//! namespace of a configuration.

pub mod opendrift;

pub use opendrift::OpenDriftCatalog;

use serde::{Serialize, Serializer};

use crate::models::schema::ParamKind;
use crate::models::value::ParamValue;
use crate::models::variant::DriftModel;

/// Engine configuration level (1 essential, 2 basic, 3 advanced)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EngineLevel {
    Essential = 1,
    Basic = 2,
    Advanced = 3,
}

impl EngineLevel {
    pub const ALL: [EngineLevel; 3] = [EngineLevel::Essential, EngineLevel::Basic, EngineLevel::Advanced];

    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            1 => Some(EngineLevel::Essential),
            2 => Some(EngineLevel::Basic),
            3 => Some(EngineLevel::Advanced),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Serialize for EngineLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// One engine-native configuration key
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParam {
    pub key: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<&'static str>,
    pub description: &'static str,
    pub level: EngineLevel,
}

impl EngineParam {
    pub fn new(
        key: &'static str,
        kind: ParamKind,
        default: impl Into<ParamValue>,
        level: EngineLevel,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            kind,
            default: default.into(),
            min: None,
            max: None,
            units: None,
            description,
            level,
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn units(mut self, units: &'static str) -> Self {
        self.units = Some(units);
        self
    }
}

/// Source of engine-native keys and defaults for each variant
pub trait EngineCatalog {
    /// Engine name (informational)
    fn name(&self) -> &str;

    /// Keys available for `model`, in a stable order
    fn params(&self, model: DriftModel) -> Vec<EngineParam>;
}
