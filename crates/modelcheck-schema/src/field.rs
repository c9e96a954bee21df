//! # Field Declarations
//!
//! A [`FieldSpec`] is one attribute of a schema: its canonical name, its
//! declared [`FieldType`], an ordered list of [`Constraint`]s, an optional
//! default and an optional alias.
//!
//! A field is required exactly when it has no default. Declaring a field
//! never fails; constraints (including regex patterns) are only evaluated
//! when input is validated.

use std::fmt;
use std::sync::{Arc, OnceLock};

use modelcheck_core::{Timestamp, Value};
use regex::Regex;

use crate::instance::{FieldValue, Instance};
use crate::schema::Schema;

/// Declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    /// A nested schema.
    Model(Arc<Schema>),
    /// A sequence of values of the inner type.
    List(Box<FieldType>),
    /// The inner type, or null.
    Optional(Box<FieldType>),
}

impl FieldType {
    pub fn list(inner: FieldType) -> Self {
        FieldType::List(Box::new(inner))
    }

    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    /// Name used in error messages: `string`, `Address`, `list[Address]`,
    /// `optional[string]`.
    pub fn type_name(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::DateTime => "datetime".to_string(),
            FieldType::Model(schema) => schema.name().to_string(),
            FieldType::List(inner) => format!("list[{}]", inner.type_name()),
            FieldType::Optional(inner) => format!("optional[{}]", inner.type_name()),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, FieldType::Optional(_))
    }
}

/// A predicate on a coerced value.
///
/// Length constraints apply to strings (counted in characters) and lists.
/// Numeric bounds apply to integers and floats. Patterns apply to strings
/// and match anywhere in the value unless anchored.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    MinLength(usize),
    MaxLength(usize),
    Ge(f64),
    Le(f64),
    Gt(f64),
    Lt(f64),
    Pattern(Pattern),
}

impl Constraint {
    /// Stable snake_case name reported in violations.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::MinLength(_) => "min_length",
            Constraint::MaxLength(_) => "max_length",
            Constraint::Ge(_) => "ge",
            Constraint::Le(_) => "le",
            Constraint::Gt(_) => "gt",
            Constraint::Lt(_) => "lt",
            Constraint::Pattern(_) => "pattern",
        }
    }

    /// The declared bound, rendered.
    pub fn bound(&self) -> String {
        match self {
            Constraint::MinLength(n) | Constraint::MaxLength(n) => n.to_string(),
            Constraint::Ge(b) | Constraint::Le(b) | Constraint::Gt(b) | Constraint::Lt(b) => {
                b.to_string()
            }
            Constraint::Pattern(p) => p.as_str().to_string(),
        }
    }
}

/// A regular expression, compiled on first use and cached.
///
/// An invalid expression is not an error at declaration; it surfaces as a
/// violation when a value is checked against it.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: OnceLock<Result<Regex, regex::Error>>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> Result<&Regex, &regex::Error> {
        self.compiled
            .get_or_init(|| Regex::new(&self.source))
            .as_ref()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Pattern::new(source)
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Pattern::new(source)
    }
}

/// Value used when a field is absent from the input.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A fixed value, already in validated form. Model-typed fields hold
    /// a nested [`Instance`].
    Static(FieldValue),
    /// The current UTC time, taken at validation.
    Now,
}

impl DefaultValue {
    pub fn resolve(&self) -> FieldValue {
        match self {
            DefaultValue::Static(v) => v.clone(),
            DefaultValue::Now => FieldValue::Scalar(Value::DateTime(Timestamp::now())),
        }
    }
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    field_type: FieldType,
    constraints: Vec<Constraint>,
    default: Option<DefaultValue>,
    alias: Option<String>,
    description: Option<String>,
}

impl FieldSpec {
    /// Create a required field with no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            constraints: Vec::new(),
            default: None,
            alias: None,
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    pub fn model(name: impl Into<String>, schema: &Arc<Schema>) -> Self {
        Self::new(name, FieldType::Model(Arc::clone(schema)))
    }

    pub fn list(name: impl Into<String>, inner: FieldType) -> Self {
        Self::new(name, FieldType::list(inner))
    }

    /// Make the field nullable and default it to null unless a default has
    /// already been declared.
    pub fn optional(mut self) -> Self {
        if !self.field_type.is_optional() {
            self.field_type = FieldType::optional(self.field_type);
        }
        if self.default.is_none() {
            self.default = Some(DefaultValue::Static(FieldValue::Scalar(Value::Null)));
        }
        self
    }

    /// Set a static scalar default. The field is no longer required.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Static(FieldValue::Scalar(value.into())));
        self
    }

    /// Default a model-typed field to an already validated instance.
    pub fn default_instance(mut self, instance: Instance) -> Self {
        self.default = Some(DefaultValue::Static(FieldValue::Model(instance)));
        self
    }

    /// Default to the current time at validation.
    pub fn default_now(mut self) -> Self {
        self.default = Some(DefaultValue::Now);
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn min_length(self, n: usize) -> Self {
        self.constraint(Constraint::MinLength(n))
    }

    pub fn max_length(self, n: usize) -> Self {
        self.constraint(Constraint::MaxLength(n))
    }

    pub fn ge(self, bound: f64) -> Self {
        self.constraint(Constraint::Ge(bound))
    }

    pub fn le(self, bound: f64) -> Self {
        self.constraint(Constraint::Le(bound))
    }

    pub fn gt(self, bound: f64) -> Self {
        self.constraint(Constraint::Gt(bound))
    }

    pub fn lt(self, bound: f64) -> Self {
        self.constraint(Constraint::Lt(bound))
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.constraint(Constraint::Pattern(Pattern::new(pattern)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// No default ⇒ required.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Input keys accepted for this field, in lookup order.
    ///
    /// With an alias, the alias comes first and the canonical name is only
    /// accepted when `populate_by_name` is set. Without an alias, only the
    /// canonical name is accepted.
    pub fn input_keys(&self, populate_by_name: bool) -> Vec<&str> {
        match &self.alias {
            Some(alias) if populate_by_name => vec![alias.as_str(), self.name.as_str()],
            Some(alias) => vec![alias.as_str()],
            None => vec![self.name.as_str()],
        }
    }

    /// Whether `key` names this field on input.
    pub fn accepts(&self, key: &str, populate_by_name: bool) -> bool {
        self.input_keys(populate_by_name).contains(&key)
    }

    /// Key emitted on output.
    pub fn output_key(&self, by_alias: bool) -> &str {
        match (&self.alias, by_alias) {
            (Some(alias), true) => alias,
            _ => &self.name,
        }
    }
}
