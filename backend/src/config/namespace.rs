//! Layered configuration namespaces
//!
//! A configuration keeps three namespaces:
//!
//! - **Manager**: values assigned on this configuration object (explicit
//!   input, cascade overrides, derived time fields)
//! - **Variant**: the drift-model variant's view of the schema (defaults,
//!   forced values, bounds, tiers)
//! - **Engine**: the engine's own keys and defaults
//!
//! [`NamespaceMerger`] resolves names through them in that precedence order,
//! translating semantic names to engine-native keys with a declarative
//! [`TranslationTable`]. Lookups go by name, so the result does not depend
//! on the order the namespaces were supplied in.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::engine::{EngineLevel, EngineParam};
use crate::models::schema::{ExposureTier, ParamKind, ParamSpec, ParameterSchema};
use crate::models::value::ParamValue;

/// Namespace layer, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Manager,
    Variant,
    Engine,
}

impl Layer {
    pub const PRECEDENCE: [Layer; 3] = [Layer::Manager, Layer::Variant, Layer::Engine];
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MergeError {
    #[error("namespace layer {0:?} supplied more than once")]
    DuplicateLayer(Layer),

    #[error("namespace layer {0:?} missing")]
    MissingLayer(Layer),
}

/// Descriptive metadata for one parameter; every attribute is optional so
/// layers can contribute partially
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMeta {
    pub kind: Option<ParamKind>,
    pub default: Option<ParamValue>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: Option<&'static [&'static str]>,
    pub units: Option<&'static str>,
    pub description: Option<&'static str>,
    pub exposure_tier: Option<ExposureTier>,
    pub level: Option<EngineLevel>,
}

impl FieldMeta {
    /// Attribute-wise merge: `self` wins wherever it has a value
    pub fn overlay(&self, lower: &FieldMeta) -> FieldMeta {
        FieldMeta {
            kind: self.kind.or(lower.kind),
            default: self.default.clone().or_else(|| lower.default.clone()),
            min: self.min.or(lower.min),
            max: self.max.or(lower.max),
            options: self.options.or(lower.options),
            units: self.units.or(lower.units),
            description: self.description.or(lower.description),
            exposure_tier: self.exposure_tier.or(lower.exposure_tier),
            level: self.level.or(lower.level),
        }
    }

    pub fn from_spec(spec: &ParamSpec, default: ParamValue) -> Self {
        FieldMeta {
            kind: Some(spec.kind),
            default: Some(default),
            min: spec.min,
            max: spec.max,
            options: spec.options(),
            units: spec.units,
            description: Some(spec.description),
            exposure_tier: Some(spec.exposure_tier),
            level: None,
        }
    }

    pub fn from_engine(param: &EngineParam) -> Self {
        FieldMeta {
            kind: Some(param.kind),
            default: Some(param.default.clone()),
            min: param.min,
            max: param.max,
            options: match param.kind {
                ParamKind::Enum(options) => Some(options),
                _ => None,
            },
            units: param.units,
            description: Some(param.description),
            exposure_tier: None,
            level: Some(param.level),
        }
    }
}

/// A named value with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
    pub meta: FieldMeta,
}

/// Ordered mapping of parameters owned by one layer
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    layer: Layer,
    params: IndexMap<String, Parameter>,
}

impl Namespace {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            params: IndexMap::new(),
        }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn insert(&mut self, param: Parameter) {
        self.params.insert(param.name.clone(), param);
    }

    /// Set a value, keeping existing metadata
    pub fn set_value(&mut self, name: &str, value: ParamValue) {
        match self.params.get_mut(name) {
            Some(param) => param.value = value,
            None => self.insert(Parameter {
                name: name.to_string(),
                value,
                meta: FieldMeta::default(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.params.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Declarative semantic-name <-> engine-key mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationTable {
    to_engine: IndexMap<String, String>,
    to_semantic: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mapped field of the schema
    pub fn from_schema(schema: &ParameterSchema) -> Self {
        schema
            .specs()
            .filter_map(|s| s.engine_key.map(|k| (s.name, k)))
            .fold(Self::new(), |table, (name, key)| table.with(name, key))
    }

    pub fn with(mut self, semantic: &str, engine_key: &str) -> Self {
        self.to_engine
            .insert(semantic.to_string(), engine_key.to_string());
        self.to_semantic
            .insert(engine_key.to_string(), semantic.to_string());
        self
    }

    pub fn engine_key(&self, semantic: &str) -> Option<&str> {
        self.to_engine.get(semantic).map(String::as_str)
    }

    pub fn semantic(&self, engine_key: &str) -> Option<&str> {
        self.to_semantic.get(engine_key).map(String::as_str)
    }

    /// (semantic, engine key) pairs in declaration order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.to_engine.iter().map(|(s, e)| (s.as_str(), e.as_str()))
    }
}

/// One resolved entry of the merged view
#[derive(Debug, Clone, PartialEq)]
pub struct MergedEntry {
    pub name: String,
    pub value: ParamValue,
    /// Layer the value came from
    pub source: Layer,
    /// The other name for the same field, if mapped
    pub alias: Option<String>,
    pub meta: FieldMeta,
}

impl MergedEntry {
    pub fn is_engine_key(&self) -> bool {
        self.name.contains(':')
    }

    /// Serializable metadata record
    pub fn metadata(&self) -> ParamMetadata {
        ParamMetadata {
            value: self.value.clone(),
            default: self.meta.default.clone(),
            kind: self.meta.kind.map(|k| k.name()),
            min: self.meta.min,
            max: self.meta.max,
            options: self.meta.options,
            units: self.meta.units,
            description: self.meta.description,
            exposure_tier: self.meta.exposure_tier,
            level: self.meta.level,
            alias: self.alias.clone(),
            source: self.source,
        }
    }
}

/// Introspection record returned by `show_config`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamMetadata {
    pub value: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_tier: Option<ExposureTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<EngineLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub source: Layer,
}

/// Combines the three namespaces into one queryable view
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceMerger {
    manager: Namespace,
    variant: Namespace,
    engine: Namespace,
    table: TranslationTable,
}

impl NamespaceMerger {
    pub fn new(table: TranslationTable) -> Self {
        Self {
            manager: Namespace::new(Layer::Manager),
            variant: Namespace::new(Layer::Variant),
            engine: Namespace::new(Layer::Engine),
            table,
        }
    }

    /// Slot namespaces by their layer; each layer must appear exactly once
    pub fn from_namespaces(
        namespaces: impl IntoIterator<Item = Namespace>,
        table: TranslationTable,
    ) -> Result<Self, MergeError> {
        let mut slots: [Option<Namespace>; 3] = [None, None, None];
        for ns in namespaces {
            let slot = &mut slots[ns.layer() as usize];
            if slot.is_some() {
                return Err(MergeError::DuplicateLayer(ns.layer()));
            }
            *slot = Some(ns);
        }
        let [manager, variant, engine] = slots;
        Ok(Self {
            manager: manager.ok_or(MergeError::MissingLayer(Layer::Manager))?,
            variant: variant.ok_or(MergeError::MissingLayer(Layer::Variant))?,
            engine: engine.ok_or(MergeError::MissingLayer(Layer::Engine))?,
            table,
        })
    }

    pub fn namespace(&self, layer: Layer) -> &Namespace {
        match layer {
            Layer::Manager => &self.manager,
            Layer::Variant => &self.variant,
            Layer::Engine => &self.engine,
        }
    }

    pub(crate) fn namespace_mut(&mut self, layer: Layer) -> &mut Namespace {
        match layer {
            Layer::Manager => &mut self.manager,
            Layer::Variant => &mut self.variant,
            Layer::Engine => &mut self.engine,
        }
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    /// (semantic name, engine key) for any accepted name
    fn names<'a>(&'a self, name: &'a str) -> (&'a str, Option<&'a str>) {
        match self.table.semantic(name) {
            Some(semantic) => (semantic, Some(name)),
            None => (name, self.table.engine_key(name)),
        }
    }

    fn lookup(&self, ns: &Namespace, semantic: &str, engine_key: Option<&str>) -> Option<Parameter> {
        ns.get(semantic)
            .or_else(|| engine_key.and_then(|k| ns.get(k)))
            .cloned()
    }

    /// Resolved value through either name
    pub fn resolve(&self, name: &str) -> Option<ParamValue> {
        self.resolve_entry(name).map(|e| e.value)
    }

    /// Resolved entry through either name, with merged metadata
    pub fn resolve_entry(&self, name: &str) -> Option<MergedEntry> {
        let (semantic, engine_key) = self.names(name);

        let mut found: Option<(Layer, ParamValue)> = None;
        let mut meta = FieldMeta::default();
        for layer in Layer::PRECEDENCE {
            if let Some(param) = self.lookup(self.namespace(layer), semantic, engine_key) {
                if found.is_none() {
                    found = Some((layer, param.value.clone()));
                }
                meta = meta.overlay(&param.meta);
            }
        }

        let (source, value) = found?;
        let alias = if name == semantic {
            engine_key.map(str::to_string)
        } else {
            Some(semantic.to_string())
        };
        Some(MergedEntry {
            name: name.to_string(),
            value,
            source,
            alias,
            meta,
        })
    }

    /// Write a value into the manager layer through either name
    pub fn write(&mut self, name: &str, value: ParamValue) {
        let semantic = self.names(name).0.to_string();
        self.manager.set_value(&semantic, value);
    }

    /// Remove a manager-layer assignment so lower layers show through again
    pub fn clear(&mut self, name: &str) {
        let (semantic, engine_key) = self.names(name);
        let (semantic, engine_key) = (semantic.to_string(), engine_key.map(str::to_string));
        self.manager.remove(&semantic);
        if let Some(key) = engine_key {
            self.manager.remove(&key);
        }
    }

    /// Full merged view; mapped fields appear under both names
    pub fn merged(&self) -> MergedView {
        let mut order: IndexMap<String, ()> = IndexMap::new();
        for layer in [Layer::Variant, Layer::Manager, Layer::Engine] {
            for param in self.namespace(layer).iter() {
                let (semantic, engine_key) = self.names(&param.name);
                order.entry(semantic.to_string()).or_default();
                if let Some(key) = engine_key {
                    order.entry(key.to_string()).or_default();
                }
            }
        }

        let entries = order
            .into_keys()
            .filter_map(|name| self.resolve_entry(&name).map(|e| (name, e)))
            .collect();
        MergedView { entries }
    }
}

/// Introspection filter
///
/// `key` acts as a prefix; when an entry matches it exactly, only that
/// entry is returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigQuery {
    pub key: Option<String>,
    pub prefix: Option<String>,
    pub substring: Option<String>,
    pub exclude_substring: Option<String>,
    pub levels: Option<Vec<EngineLevel>>,
    pub exposure_tiers: Option<Vec<ExposureTier>>,
}

impl ConfigQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_substring(mut self, substring: impl Into<String>) -> Self {
        self.substring = Some(substring.into());
        self
    }

    pub fn excluding(mut self, substring: impl Into<String>) -> Self {
        self.exclude_substring = Some(substring.into());
        self
    }

    pub fn with_levels(mut self, levels: &[EngineLevel]) -> Self {
        self.levels = Some(levels.to_vec());
        self
    }

    pub fn with_tiers(mut self, tiers: &[ExposureTier]) -> Self {
        self.exposure_tiers = Some(tiers.to_vec());
        self
    }

    fn matches(&self, entry: &MergedEntry) -> bool {
        let name = entry.name.as_str();
        let prefix = self.key.as_deref().or(self.prefix.as_deref()).unwrap_or("");
        if !name.starts_with(prefix) {
            return false;
        }
        if let Some(sub) = &self.substring {
            if !name.contains(sub.as_str()) {
                return false;
            }
        }
        if let Some(excluded) = &self.exclude_substring {
            if name.contains(excluded.as_str()) {
                return false;
            }
        }
        if let Some(levels) = &self.levels {
            match entry.meta.level {
                Some(level) if levels.contains(&level) => {}
                _ => return false,
            }
        }
        if let Some(tiers) = &self.exposure_tiers {
            match entry.meta.exposure_tier {
                Some(tier) if tiers.contains(&tier) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Read-only merged configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MergedView {
    entries: IndexMap<String, MergedEntry>,
}

impl MergedView {
    pub fn get(&self, name: &str) -> Option<&MergedEntry> {
        self.entries.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name).map(|e| &e.value)
    }

    pub fn entries(&self) -> impl Iterator<Item = &MergedEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filtered introspection
    pub fn query(&self, query: &ConfigQuery) -> IndexMap<String, ParamMetadata> {
        if let Some(key) = &query.key {
            if let Some(entry) = self.entries.get(key.as_str()) {
                if query.matches(entry) {
                    return IndexMap::from([(key.clone(), entry.metadata())]);
                }
            }
        }
        self.entries
            .values()
            .filter(|e| query.matches(e))
            .map(|e| (e.name.clone(), e.metadata()))
            .collect()
    }

    /// name -> value JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .values()
                .map(|e| (e.name.clone(), e.value.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, value: ParamValue) -> Parameter {
        Parameter {
            name: name.to_string(),
            value,
            meta: FieldMeta::default(),
        }
    }

    #[test]
    fn test_meta_overlay() {
        let upper = FieldMeta {
            units: Some("m"),
            ..Default::default()
        };
        let lower = FieldMeta {
            units: Some("km"),
            level: Some(EngineLevel::Basic),
            ..Default::default()
        };
        let merged = upper.overlay(&lower);
        assert_eq!(merged.units, Some("m"));
        assert_eq!(merged.level, Some(EngineLevel::Basic));
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let result = NamespaceMerger::from_namespaces(
            [Namespace::new(Layer::Manager), Namespace::new(Layer::Manager)],
            TranslationTable::new(),
        );
        assert_eq!(result.unwrap_err(), MergeError::DuplicateLayer(Layer::Manager));
    }

    #[test]
    fn test_clear_restores_lower_layer() {
        let table = TranslationTable::new().with("z", "seed:z");
        let mut engine = Namespace::new(Layer::Engine);
        engine.insert(param("seed:z", ParamValue::Float(0.0)));
        let mut merger = NamespaceMerger::from_namespaces(
            [Namespace::new(Layer::Manager), Namespace::new(Layer::Variant), engine],
            table,
        )
        .unwrap();

        merger.write("seed:z", ParamValue::Float(-5.0));
        assert_eq!(merger.resolve("z"), Some(ParamValue::Float(-5.0)));
        assert_eq!(merger.namespace(Layer::Manager).get("z").unwrap().value, ParamValue::Float(-5.0));

        merger.clear("z");
        assert_eq!(merger.resolve("seed:z"), Some(ParamValue::Float(0.0)));
    }

    #[test]
    fn test_key_query_exact_match_alone() {
        let mut variant = Namespace::new(Layer::Variant);
        variant.insert(param("seed:z", ParamValue::Float(0.0)));
        variant.insert(param("seed:zeta", ParamValue::Float(1.0)));
        let merger = NamespaceMerger::from_namespaces(
            [Namespace::new(Layer::Engine), variant, Namespace::new(Layer::Manager)],
            TranslationTable::new(),
        )
        .unwrap();
        let view = merger.merged();

        assert_eq!(view.query(&ConfigQuery::key("seed:z")).len(), 1);
        assert_eq!(view.query(&ConfigQuery::key("seed:")).len(), 2);
    }
}
