//! # Schema Documents
//!
//! Schemas can be declared as data in YAML or JSON documents and loaded
//! into a [`SchemaRegistry`]:
//!
//! ```yaml
//! schemas:
//!   - name: Patient
//!     config: { populate_by_name: true }
//!     fields:
//!       - { name: full_name, type: string, alias: name }
//!       - { name: age, type: integer, ge: 0, le: 120 }
//!       - { name: address, type: { model: Address } }
//!       - { name: phone, type: { optional: string }, default: null }
//!   - name: Address
//!     fields:
//!       - { name: pin, type: string, min_length: 5, max_length: 6 }
//! ```
//!
//! ## Resolution
//!
//! Schemas may appear in any order. `model` references are resolved by
//! name into shared `Arc<Schema>` handles, so every schema that nests
//! `Address` points at the same definition. Unknown names, duplicate
//! names and reference cycles are rejected at load time.
//!
//! Constraints declared as flat keys are applied in a fixed order:
//! `min_length`, `max_length`, `ge`, `gt`, `le`, `lt`, `pattern`.
//!
//! Declared defaults are validated against their field type at load time.
//! A `model` default becomes a nested instance, so a bad default is a
//! load error rather than a silently malformed instance.
//!
//! YAML is deserialized by `serde_yaml` straight into a JSON value tree,
//! so both formats share one set of document types.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use modelcheck_core::{ErrorReport, FieldPath, ModelcheckError};
use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;
use tracing::debug;

use crate::field::{Constraint, DefaultValue, FieldSpec, FieldType, Pattern};
use crate::instance::Instance;
use crate::schema::{ModelConfig, Schema};
use crate::validate::{validate, validate_default};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    schemas: Vec<SchemaDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDecl {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    config: ModelConfig,
    fields: Vec<FieldDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDecl {
    name: String,
    #[serde(rename = "type")]
    ty: TypeDecl,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    min_length: Option<usize>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    ge: Option<f64>,
    #[serde(default)]
    gt: Option<f64>,
    #[serde(default)]
    le: Option<f64>,
    #[serde(default)]
    lt: Option<f64>,
    #[serde(default)]
    pattern: Option<String>,
    /// `Some(Json::Null)` for an explicit `default: null`.
    #[serde(default, deserialize_with = "present")]
    default: Option<Json>,
    #[serde(default)]
    default_factory: Option<DefaultFactory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TypeDecl {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Model(String),
    List(Box<TypeDecl>),
    Optional(Box<TypeDecl>),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DefaultFactory {
    Now,
}

/// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TypeDecl {
    fn references(&self) -> Vec<&str> {
        match self {
            TypeDecl::Model(name) => vec![name.as_str()],
            TypeDecl::List(inner) | TypeDecl::Optional(inner) => inner.references(),
            _ => Vec::new(),
        }
    }
}

/// Named, resolved schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document, choosing the format from the file extension
    /// (`.yaml`/`.yml` for YAML, anything else JSON).
    ///
    /// # Errors
    ///
    /// Returns `ModelcheckError::Io` if the file cannot be read, and the
    /// errors of [`from_yaml_str`](Self::from_yaml_str) /
    /// [`from_json_str`](Self::from_json_str) otherwise.
    pub fn load(path: &Path) -> Result<Self, ModelcheckError> {
        let content = std::fs::read_to_string(path)?;
        let source_name = path.display().to_string();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "yaml" | "yml" => Self::from_yaml_str(&content, &source_name),
            _ => Self::from_json_str(&content, &source_name),
        }
    }

    /// Parse a YAML schema document.
    pub fn from_yaml_str(content: &str, source_name: &str) -> Result<Self, ModelcheckError> {
        let json: Json = serde_yaml::from_str(content)
            .map_err(|e| document_error(source_name, format!("invalid YAML: {e}")))?;
        Self::from_json_value(json, source_name)
    }

    /// Parse a JSON schema document.
    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self, ModelcheckError> {
        let json: Json = serde_json::from_str(content)
            .map_err(|e| document_error(source_name, format!("invalid JSON: {e}")))?;
        Self::from_json_value(json, source_name)
    }

    fn from_json_value(json: Json, source_name: &str) -> Result<Self, ModelcheckError> {
        let doc: SchemaDocument = serde_json::from_value(json)
            .map_err(|e| document_error(source_name, e.to_string()))?;

        let mut decls: HashMap<&str, &SchemaDecl> = HashMap::new();
        for decl in &doc.schemas {
            if decls.insert(decl.name.as_str(), decl).is_some() {
                return Err(ModelcheckError::Registry {
                    schema: decl.name.clone(),
                    reason: "declared more than once".to_string(),
                });
            }
        }

        let mut resolved = HashMap::new();
        for decl in &doc.schemas {
            resolve(&decl.name, &decls, &mut Vec::new(), &mut resolved)?;
        }

        debug!(source = source_name, schemas = resolved.len(), "schema document loaded");
        Ok(Self {
            schemas: resolved.into_iter().collect(),
        })
    }

    /// Add a schema defined in code. Replaces any schema of the same name.
    pub fn insert(&mut self, schema: Arc<Schema>) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Like [`get`](Self::get), failing with `UnknownModel`.
    pub fn require(&self, name: &str) -> Result<&Arc<Schema>, ModelcheckError> {
        self.get(name)
            .ok_or_else(|| ModelcheckError::UnknownModel(name.to_string()))
    }

    /// Names of all schemas, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate `raw` against the named schema.
    ///
    /// # Errors
    ///
    /// `UnknownModel` for an unregistered name, `Validation` carrying the
    /// full report when the input does not conform.
    pub fn validate(&self, model: &str, raw: &Json) -> Result<Instance, ModelcheckError> {
        let schema = self.require(model)?;
        validate(schema, raw).map_err(|report: ErrorReport| ModelcheckError::Validation {
            schema: model.to_string(),
            report,
        })
    }
}

fn document_error(source_name: &str, reason: String) -> ModelcheckError {
    ModelcheckError::Document {
        source_name: source_name.to_string(),
        reason,
    }
}

/// Depth-first resolution; `stack` holds the schemas being resolved so
/// that a reference back into it is reported as a cycle.
fn resolve(
    name: &str,
    decls: &HashMap<&str, &SchemaDecl>,
    stack: &mut Vec<String>,
    resolved: &mut HashMap<String, Arc<Schema>>,
) -> Result<Arc<Schema>, ModelcheckError> {
    if let Some(schema) = resolved.get(name) {
        return Ok(Arc::clone(schema));
    }
    if stack.iter().any(|s| s == name) {
        let mut cycle = stack.clone();
        cycle.push(name.to_string());
        return Err(ModelcheckError::Registry {
            schema: name.to_string(),
            reason: format!("reference cycle: {}", cycle.join(" -> ")),
        });
    }
    let decl = decls.get(name).ok_or_else(|| ModelcheckError::Registry {
        schema: stack.last().cloned().unwrap_or_else(|| name.to_string()),
        reason: format!("references unknown model '{name}'"),
    })?;

    stack.push(name.to_string());
    for field in &decl.fields {
        for reference in field.ty.references() {
            resolve(reference, decls, stack, resolved)?;
        }
    }
    stack.pop();

    let mut builder = Schema::builder(&decl.name).config(decl.config);
    if let Some(desc) = &decl.description {
        builder = builder.description(desc);
    }
    for field in &decl.fields {
        builder = builder.field(build_field(&decl.name, field, resolved)?);
    }
    let schema = builder.build();
    resolved.insert(decl.name.clone(), Arc::clone(&schema));
    Ok(schema)
}

fn build_type(ty: &TypeDecl, resolved: &HashMap<String, Arc<Schema>>) -> Option<FieldType> {
    Some(match ty {
        TypeDecl::String => FieldType::String,
        TypeDecl::Integer => FieldType::Integer,
        TypeDecl::Float => FieldType::Float,
        TypeDecl::Boolean => FieldType::Boolean,
        TypeDecl::Datetime => FieldType::DateTime,
        TypeDecl::Model(name) => FieldType::Model(Arc::clone(resolved.get(name)?)),
        TypeDecl::List(inner) => FieldType::list(build_type(inner, resolved)?),
        TypeDecl::Optional(inner) => FieldType::optional(build_type(inner, resolved)?),
    })
}

fn build_field(
    schema_name: &str,
    decl: &FieldDecl,
    resolved: &HashMap<String, Arc<Schema>>,
) -> Result<FieldSpec, ModelcheckError> {
    let field_type = build_type(&decl.ty, resolved).ok_or_else(|| ModelcheckError::Registry {
        schema: schema_name.to_string(),
        reason: format!("field '{}' references an unresolved model", decl.name),
    })?;

    let mut spec = FieldSpec::new(&decl.name, field_type);

    let constraints = [
        decl.min_length.map(Constraint::MinLength),
        decl.max_length.map(Constraint::MaxLength),
        decl.ge.map(Constraint::Ge),
        decl.gt.map(Constraint::Gt),
        decl.le.map(Constraint::Le),
        decl.lt.map(Constraint::Lt),
        decl.pattern.as_deref().map(|p| Constraint::Pattern(Pattern::new(p))),
    ];
    for constraint in constraints.into_iter().flatten() {
        spec = spec.constraint(constraint);
    }

    if let Some(alias) = &decl.alias {
        spec = spec.alias(alias);
    }
    if let Some(desc) = &decl.description {
        spec = spec.description(desc);
    }

    match (&decl.default, decl.default_factory) {
        (Some(_), Some(_)) => {
            return Err(ModelcheckError::Registry {
                schema: schema_name.to_string(),
                reason: format!(
                    "field '{}' declares both default and default_factory",
                    decl.name
                ),
            })
        }
        (Some(raw), None) => {
            let value = validate_default(spec.field_type(), raw).map_err(|nested| {
                let mut report = ErrorReport::new();
                report.merge_nested(&FieldPath::field(decl.name.as_str()), nested);
                ModelcheckError::Registry {
                    schema: schema_name.to_string(),
                    reason: format!("invalid default for field '{}':\n{report}", decl.name),
                }
            })?;
            spec = spec.with_default(DefaultValue::Static(value));
        }
        (None, Some(DefaultFactory::Now)) => spec = spec.default_now(),
        (None, None) => {}
    }

    Ok(spec)
}
