//! # Schema Definition
//!
//! A [`Schema`] is an ordered, immutable list of [`FieldSpec`]s plus the
//! per-schema [`ModelConfig`]. Declaration order is serialization order.
//!
//! Schemas are built once through [`SchemaBuilder`] and handed out as
//! `Arc<Schema>` so that nested field types, instances and any number of
//! concurrent readers share one definition.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::field::FieldSpec;

/// What to do with input keys that name no field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPolicy {
    /// Drop them silently.
    #[default]
    Ignore,
    /// Report each one as an `extra_field` error.
    Forbid,
}

/// Per-schema validation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Accept the canonical name as well as the alias on input.
    pub populate_by_name: bool,
    /// Handling of undeclared keys.
    pub extra: ExtraPolicy,
    /// Disable every cross-type coercion.
    pub strict: bool,
}

/// An immutable, ordered entity description.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
    config: ModelConfig,
}

impl Schema {
    /// Start declaring a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Look up a field by canonical name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Position of a field by canonical name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Canonical names of required fields, in declaration order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .map(FieldSpec::name)
            .collect()
    }
}

/// Builder for creating schemas fluently.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: Schema {
                name: name.into(),
                description: None,
                fields: Vec::new(),
                config: ModelConfig::default(),
            },
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.schema.description = Some(desc.into());
        self
    }

    /// Append a field. Redeclaring a name replaces the earlier declaration
    /// in its original position.
    pub fn field(mut self, field: FieldSpec) -> Self {
        match self.schema.position(field.name()) {
            Some(idx) => self.schema.fields[idx] = field,
            None => self.schema.fields.push(field),
        }
        self
    }

    pub fn config(mut self, config: ModelConfig) -> Self {
        self.schema.config = config;
        self
    }

    pub fn populate_by_name(mut self, yes: bool) -> Self {
        self.schema.config.populate_by_name = yes;
        self
    }

    pub fn extra(mut self, policy: ExtraPolicy) -> Self {
        self.schema.config.extra = policy;
        self
    }

    pub fn strict(mut self, yes: bool) -> Self {
        self.schema.config.strict = yes;
        self
    }

    pub fn build(self) -> Arc<Schema> {
        Arc::new(self.schema)
    }
}
