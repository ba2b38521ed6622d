//! The drift configuration object
//!
//! [`DriftConfig`] owns the three namespaces of one run configuration, its
//! audit log and its identity. Construction fixes the drift-model variant,
//! applies the variant's forced values, replays every field through the
//! cascade, applies the caller's explicit values, resolves the time window
//! and validates. Every later [`DriftConfig::set`] is transactional: the
//! assignment, its cascade, time re-resolution and validation either all
//! succeed or the object is left exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use particle_tracking_core_rs::config::DriftConfig;
//! use particle_tracking_core_rs::models::value::ParamValue;
//!
//! # fn main() -> Result<(), particle_tracking_core_rs::error::ConfigError> {
//! let mut config = DriftConfig::from_pairs([("steps", ParamValue::Int(24))])?;
//! config.set("surface_only", true)?;
//!
//! assert_eq!(config.get("do3D")?, ParamValue::Bool(false));
//! assert_eq!(config.get("seed:z")?, ParamValue::Float(0.0));
//! # Ok(())
//! # }
//! ```

use indexmap::IndexMap;
use uuid::Uuid;

use crate::config::cascade::{time_basis_after, Cascade, TABULARISED_STOKES_KEY, VERTICAL_ADVECTION_KEY};
use crate::config::namespace::{
    ConfigQuery, FieldMeta, Layer, MergedEntry, MergedView, NamespaceMerger, ParamMetadata,
    Parameter, TranslationTable,
};
use crate::config::validation::{ConstraintValidator, FieldSource, TRUNCATE_KEY};
use crate::core::duration::minutes_to_delta;
use crate::core::time::{Direction, ResolvedWindow, TimeResolver, TimeWindow};
use crate::engine::{EngineCatalog, OpenDriftCatalog};
use crate::error::ConfigError;
use crate::models::event::{CascadeLog, ConfigEvent};
use crate::models::schema::{ExposureTier, ParameterSchema};
use crate::models::seed::SeedSpec;
use crate::models::value::ParamValue;
use crate::models::variant::DriftModel;

/// The four run-window fields
pub const TIME_FIELDS: [&str; 4] = ["start_time", "end_time", "duration", "steps"];

/// Engine flags the configuration sets on its own; exported whenever set
const DERIVED_ENGINE_KEYS: [&str; 3] = [VERTICAL_ADVECTION_KEY, TRUNCATE_KEY, TABULARISED_STOKES_KEY];

/// Where the current horizontal diffusivity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffusivityOrigin {
    Unset,
    User,
    Derived,
}

/// Mutable run configuration for one drift-model variant
#[derive(Debug, Clone)]
pub struct DriftConfig {
    id: Uuid,
    model: DriftModel,
    merger: NamespaceMerger,
    log: CascadeLog,
    diffusivity: DiffusivityOrigin,
}

struct Snapshot {
    merger: NamespaceMerger,
    log_len: usize,
    diffusivity: DiffusivityOrigin,
}

impl DriftConfig {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Build from user inputs against the built-in OpenDrift catalogue
    ///
    /// Keys may be semantic names or mapped engine keys.
    ///
    /// # Errors
    /// The first violation found: unknown keys, type mismatches, pinned
    /// fields contradicted, cascade conflicts, time inconsistencies or any
    /// validator stage.
    pub fn new(inputs: IndexMap<String, ParamValue>) -> Result<Self, ConfigError> {
        Self::with_catalog(inputs, &OpenDriftCatalog)
    }

    /// Convenience constructor from `(name, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError>
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build with an explicit engine catalogue
    pub fn with_catalog(
        inputs: IndexMap<String, ParamValue>,
        catalog: &dyn EngineCatalog,
    ) -> Result<Self, ConfigError> {
        let schema = ParameterSchema::global();
        let model = select_model(&inputs)?;
        let explicit = canonicalize(schema, model, inputs)?;

        let mut config = Self {
            id: Uuid::new_v4(),
            model,
            merger: build_merger(schema, model, catalog),
            log: CascadeLog::new(),
            diffusivity: DiffusivityOrigin::Unset,
        };
        tracing::info!(
            config_id = %config.id,
            drift_model = %model,
            engine = catalog.name(),
            inputs = explicit.len(),
            "building drift configuration"
        );

        config.log_forced_values(schema);
        for (field, value) in &explicit {
            config.check_pin(schema, field, value)?;
        }
        if explicit
            .get("horizontal_diffusivity")
            .is_some_and(|v| !v.is_null())
        {
            config.diffusivity = DiffusivityOrigin::User;
        }

        // A null horizontal_diffusivity asks for derivation, so it never
        // conflicts with the derived value.
        let requested: IndexMap<&'static str, ParamValue> = explicit
            .iter()
            .filter(|(f, v)| !(**f == "horizontal_diffusivity" && v.is_null()))
            .map(|(f, v)| (*f, v.clone()))
            .collect();

        // Replay current values so derived fields start consistent
        let fields: Vec<&'static str> = schema.fields_for(model).map(|s| s.name).collect();
        for field in fields {
            let value = config.value(field);
            Cascade::new(&requested).propagate(&mut config, field, &value)?;
        }

        for (field, value) in &explicit {
            if *field == "drift_model" {
                continue;
            }
            config.assign(field, value.clone());
            Cascade::new(&requested).propagate(&mut config, field, value)?;
        }

        let mut basis: Vec<&'static str> = TIME_FIELDS
            .into_iter()
            .filter(|f| explicit.get(*f).is_some_and(|v| !v.is_null()))
            .collect();
        if basis.len() < 2 && !explicit.contains_key("start_time") {
            basis.insert(0, "start_time");
        }
        config.resolve_time(&basis)?;

        config.validate()?;
        Ok(config)
    }

    fn log_forced_values(&mut self, schema: &ParameterSchema) {
        let model = self.model;
        for forced in model.profile().forced {
            let Some(spec) = schema.get(forced.field) else { continue };
            let old = spec.default.clone();
            if old == forced.value {
                continue;
            }
            tracing::info!(
                config_id = %self.id,
                drift_model = %model,
                field = forced.field,
                value = %forced.value,
                "variant forced value"
            );
            self.log.log(ConfigEvent::VariantForced {
                model,
                field: forced.field.to_string(),
                old,
                new: forced.value.clone(),
            });
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Identifier carried through logs and the frozen configuration
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn drift_model(&self) -> DriftModel {
        self.model
    }

    /// Audit log of everything this configuration changed
    pub fn events(&self) -> &CascadeLog {
        &self.log
    }

    pub fn diffusivity_origin(&self) -> DiffusivityOrigin {
        self.diffusivity
    }

    /// Resolved value by either name; `Null` for names this configuration
    /// does not carry
    pub fn value(&self, name: &str) -> ParamValue {
        self.merger.resolve(name).unwrap_or(ParamValue::Null)
    }

    /// Resolved value by either name
    ///
    /// # Errors
    /// `UnknownFieldError` for names this configuration does not carry.
    pub fn get(&self, name: &str) -> Result<ParamValue, ConfigError> {
        self.merger
            .resolve(name)
            .ok_or_else(|| ConfigError::UnknownFieldError(name.to_string()))
    }

    /// Resolved entry with merged metadata
    pub fn entry(&self, name: &str) -> Option<MergedEntry> {
        self.merger.resolve_entry(name)
    }

    pub fn namespaces(&self) -> &NamespaceMerger {
        &self.merger
    }

    /// Read-only merged view of all three namespaces
    pub fn merged(&self) -> MergedView {
        self.merger.merged()
    }

    /// Filtered introspection of the merged view
    pub fn show_config(&self, query: &ConfigQuery) -> IndexMap<String, ParamMetadata> {
        self.merged().query(query)
    }

    /// Fully resolved run window
    pub fn time_window(&self) -> Result<ResolvedWindow, ConfigError> {
        let window = TimeWindow {
            start_time: self.value("start_time").as_timestamp(),
            end_time: self.value("end_time").as_timestamp(),
            duration: self.value("duration").as_duration(),
            steps: self
                .value("steps")
                .as_i64()
                .and_then(|s| u64::try_from(s).ok()),
        };
        Ok(self.resolver()?.resolve(&window)?)
    }

    /// Active seeding form
    pub fn seed_spec(&self) -> Result<SeedSpec, ConfigError> {
        ConstraintValidator::seed_spec(self)
    }

    /// Re-run every validator stage
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConstraintValidator::validate(self)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Assign one field, cascading to its dependents
    ///
    /// # Errors
    /// Any violation rolls the configuration back to its state before the
    /// call. Changing `drift_model` is always a `VariantReassignmentError`.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<&mut Self, ConfigError> {
        self.set_many([(name, value.into())])
    }

    /// Assign several fields in order, validating once at the end
    ///
    /// Each assignment cascades and re-resolves the time window exactly as
    /// [`set`](Self::set) does, but only the final state has to be valid.
    /// Use it for changes no single assignment can make on its own, such as
    /// moving `time_step` and `time_step_output` together.
    ///
    /// # Errors
    /// Any violation rolls back every assignment of the batch.
    pub fn set_many<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<&mut Self, ConfigError>
    where
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        let snapshot = self.snapshot();
        if let Err(err) = self.apply_all(pairs) {
            tracing::warn!(
                config_id = %self.id,
                fields = ?err.fields(),
                error = %err,
                "assignment rejected; configuration restored"
            );
            self.restore(snapshot);
            return Err(err);
        }
        Ok(self)
    }

    fn apply_all<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<(), ConfigError>
    where
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        for (name, value) in pairs {
            if let Some((field, value)) = self.prepare(name.as_ref(), value.into())? {
                self.apply(field, value)?;
            }
        }
        self.validate()
    }

    /// Canonical field and coerced value; `None` when restating `drift_model`
    fn prepare(&self, name: &str, value: ParamValue) -> Result<Option<(&'static str, ParamValue)>, ConfigError> {
        let schema = ParameterSchema::global();
        let field = self.canonical(schema, name)?;
        let spec = schema
            .get(field)
            .ok_or_else(|| ConfigError::UnknownFieldError(name.to_string()))?;
        let value = spec.coerce(value)?;

        if field == "drift_model" {
            let requested = value.as_str().unwrap_or_default();
            if requested != self.model.as_str() {
                return Err(ConfigError::VariantReassignmentError {
                    current: self.model.as_str().to_string(),
                    requested: requested.to_string(),
                });
            }
            return Ok(None);
        }
        self.check_pin(schema, field, &value)?;
        Ok(Some((field, value)))
    }

    fn apply(&mut self, field: &'static str, value: ParamValue) -> Result<(), ConfigError> {
        self.assign(field, value.clone());

        let requested = if field == "horizontal_diffusivity" && value.is_null() {
            IndexMap::new()
        } else {
            IndexMap::from([(field, value.clone())])
        };
        Cascade::new(&requested).propagate(self, field, &value)?;

        if let Some(basis) = time_basis_after(field) {
            self.resolve_time(&basis)?;
        }
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            merger: self.merger.clone(),
            log_len: self.log.len(),
            diffusivity: self.diffusivity,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.merger = snapshot.merger;
        self.log.truncate(snapshot.log_len);
        self.diffusivity = snapshot.diffusivity;
    }

    /// Explicit assignment into the manager layer
    fn assign(&mut self, field: &str, value: ParamValue) {
        let old = self.value(field);
        if field == "horizontal_diffusivity" {
            self.diffusivity = if value.is_null() {
                DiffusivityOrigin::Unset
            } else {
                DiffusivityOrigin::User
            };
        }
        tracing::debug!(config_id = %self.id, field, old = %old, new = %value, "assignment");
        self.merger.write(field, value.clone());
        self.log.log(ConfigEvent::UserAssignment {
            field: field.to_string(),
            old,
            new: value,
        });
    }

    /// Cascade-driven assignment into the manager layer
    pub(crate) fn record_override(
        &mut self,
        rule: &'static str,
        trigger: &str,
        trigger_value: &ParamValue,
        field: &str,
        value: ParamValue,
    ) {
        let old = self.value(field);
        if field == "horizontal_diffusivity" {
            self.diffusivity = DiffusivityOrigin::Derived;
        }
        tracing::info!(
            config_id = %self.id,
            rule,
            trigger,
            field,
            old = %old,
            new = %value,
            "cascade override"
        );
        self.merger.write(field, value.clone());
        self.log.log(ConfigEvent::CascadeOverride {
            rule,
            trigger: trigger.to_string(),
            trigger_value: trigger_value.clone(),
            field: field.to_string(),
            old,
            new: value,
        });
    }

    fn resolver(&self) -> Result<TimeResolver, ConfigError> {
        let minutes = self.value("time_step").as_f64().unwrap_or(0.0);
        let direction = Direction::from_run_forward(self.value("run_forward").as_bool().unwrap_or(true));
        Ok(TimeResolver::new(minutes_to_delta(minutes), direction)?)
    }

    /// Resolve the window from `basis` and write the other time fields
    fn resolve_time(&mut self, basis: &[&str]) -> Result<ResolvedWindow, ConfigError> {
        let pick = |field: &str| basis.contains(&field);
        let window = TimeWindow {
            start_time: pick("start_time")
                .then(|| self.value("start_time").as_timestamp())
                .flatten(),
            end_time: pick("end_time")
                .then(|| self.value("end_time").as_timestamp())
                .flatten(),
            duration: pick("duration")
                .then(|| self.value("duration").as_duration())
                .flatten(),
            steps: pick("steps")
                .then(|| self.value("steps").as_i64())
                .flatten()
                .and_then(|s| u64::try_from(s).ok()),
        };
        let resolved = self.resolver()?.resolve(&window)?;
        let steps = i64::try_from(resolved.steps)
            .map_err(|_| ConfigError::range("steps", "step count does not fit a 64-bit integer"))?;

        let basis_text = basis.join(", ");
        let derived = [
            ("start_time", ParamValue::Timestamp(resolved.start_time)),
            ("end_time", ParamValue::Timestamp(resolved.end_time)),
            ("duration", ParamValue::Duration(resolved.duration)),
            ("steps", ParamValue::Int(steps)),
        ];
        for (field, value) in derived {
            if pick(field) || self.value(field) == value {
                continue;
            }
            tracing::info!(config_id = %self.id, field, value = %value, basis = %basis_text, "derived time field");
            self.merger.write(field, value.clone());
            self.log.log(ConfigEvent::Derived {
                field: field.to_string(),
                value,
                basis: basis_text.clone(),
            });
        }
        Ok(resolved)
    }

    /// Semantic name for a user-facing key, if this variant has it
    fn canonical(&self, schema: &ParameterSchema, name: &str) -> Result<&'static str, ConfigError> {
        schema
            .canonical_name(name)
            .filter(|f| schema.get(f).is_some_and(|s| s.is_available(self.model)))
            .ok_or_else(|| ConfigError::UnknownFieldError(name.to_string()))
    }

    /// Explicit values must agree with the variant's pins
    fn check_pin(&self, schema: &ParameterSchema, field: &str, value: &ParamValue) -> Result<(), ConfigError> {
        let profile = self.model.profile();
        if !profile.is_pinned(field) {
            return Ok(());
        }
        if let Some(forced) = profile.forced_value(field) {
            if forced != value {
                return Err(ConfigError::ForbiddenFieldViolation {
                    field: field.to_string(),
                    model: self.model.as_str().to_string(),
                    reason: format!("{} forces {} = {}", self.model, field, forced),
                });
            }
        }
        if profile.is_forbidden(field) {
            let default = schema
                .get(field)
                .map(|s| s.default.clone())
                .unwrap_or(ParamValue::Null);
            if default != *value {
                return Err(ConfigError::ForbiddenFieldViolation {
                    field: field.to_string(),
                    model: self.model.as_str().to_string(),
                    reason: format!("{} is not adjustable for {}; it stays {}", field, self.model, default),
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Flat engine-ready configuration
    ///
    /// Order: engine keys the engine knows (exposure tier in `tiers`), then
    /// the engine flags this configuration derives, then unmapped manager
    /// fields in `tiers`. Null values are left out.
    pub fn drift_model_config(&self, tiers: &[ExposureTier]) -> IndexMap<String, ParamValue> {
        let view = self.merged();
        let in_tiers = |e: &MergedEntry| e.meta.exposure_tier.is_some_and(|t| tiers.contains(&t));
        let mut out = IndexMap::new();

        for entry in view.entries() {
            if entry.is_engine_key() && entry.meta.level.is_some() && in_tiers(entry) && !entry.value.is_null() {
                out.insert(entry.name.clone(), entry.value.clone());
            }
        }
        for key in DERIVED_ENGINE_KEYS {
            if let Some(value) = view.value(key).filter(|v| !v.is_null()) {
                out.entry(key.to_string()).or_insert_with(|| value.clone());
            }
        }
        for entry in view.entries() {
            if !entry.is_engine_key() && entry.alias.is_none() && in_tiers(entry) && !entry.value.is_null() {
                out.insert(entry.name.clone(), entry.value.clone());
            }
        }
        out
    }
}

impl FieldSource for DriftConfig {
    fn drift_model(&self) -> DriftModel {
        self.model
    }

    fn value(&self, name: &str) -> ParamValue {
        DriftConfig::value(self, name)
    }
}

// ============================================================================
// Construction helpers
// ============================================================================

/// Variant from the `drift_model` input (default OceanDrift)
fn select_model(inputs: &IndexMap<String, ParamValue>) -> Result<DriftModel, ConfigError> {
    match inputs.get("drift_model") {
        None | Some(ParamValue::Null) => Ok(DriftModel::default()),
        Some(ParamValue::Str(name)) => name.parse(),
        Some(other) => Err(ConfigError::TypeMismatch {
            field: "drift_model".to_string(),
            expected: "enum".to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

/// Semantic names and coerced values, in schema order
fn canonicalize(
    schema: &ParameterSchema,
    model: DriftModel,
    inputs: IndexMap<String, ParamValue>,
) -> Result<IndexMap<&'static str, ParamValue>, ConfigError> {
    let mut explicit: IndexMap<&'static str, ParamValue> = IndexMap::new();
    for (name, value) in inputs {
        let spec = schema
            .canonical_name(&name)
            .and_then(|field| schema.get(field))
            .filter(|spec| spec.is_available(model))
            .ok_or_else(|| ConfigError::UnknownFieldError(name.clone()))?;
        let value = spec.coerce(value)?;
        if let Some(previous) = explicit.get(spec.name) {
            if *previous != value {
                return Err(ConfigError::exclusive(
                    &[spec.name, name.as_str()],
                    "same field supplied under both names with different values",
                ));
            }
        }
        explicit.insert(spec.name, value);
    }
    let position = |field: &str| schema.position(field).unwrap_or(usize::MAX);
    explicit.sort_by(|a, _, b, _| position(a).cmp(&position(b)));
    Ok(explicit)
}

fn build_merger(schema: &ParameterSchema, model: DriftModel, catalog: &dyn EngineCatalog) -> NamespaceMerger {
    let mut merger = NamespaceMerger::new(TranslationTable::from_schema(schema));
    let profile = model.profile();

    let variant = merger.namespace_mut(Layer::Variant);
    for spec in schema.fields_for(model) {
        let default = spec.default.clone();
        let value = profile
            .forced_value(spec.name)
            .cloned()
            .unwrap_or_else(|| default.clone());
        variant.insert(Parameter {
            name: spec.name.to_string(),
            value,
            meta: FieldMeta::from_spec(spec, default),
        });
    }

    let engine = merger.namespace_mut(Layer::Engine);
    for param in catalog.params(model) {
        engine.insert(Parameter {
            name: param.key.to_string(),
            value: param.default.clone(),
            meta: FieldMeta::from_engine(&param),
        });
    }

    merger.write("drift_model", ParamValue::Str(model.as_str().to_string()));
    merger
}
