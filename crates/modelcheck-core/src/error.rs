//! # Error Types: Structured Error Hierarchy
//!
//! Two families of errors live here:
//!
//! - [`ErrorReport`], the accumulated result of one failed validation call.
//!   A report lists every violation found in the input, each with the
//!   dotted path of the offending field, its [`ErrorKind`], and a
//!   human-readable message.
//! - [`ModelcheckError`], the crate-level error for the surfaces that fail
//!   outside validation: schema documents, model references, file I/O.
//!
//! ## Design
//!
//! - Validation never stops at the first problem. Callers get the whole
//!   report in one go.
//! - A report is never returned alongside a partially-built instance.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::path::FieldPath;

/// Top-level error type for modelcheck.
#[derive(Error, Debug)]
pub enum ModelcheckError {
    /// Input did not conform to a schema.
    #[error("{} validation error(s) for {schema}:\n{report}", .report.len())]
    Validation {
        /// Name of the schema validated against.
        schema: String,
        /// Every violation found.
        report: ErrorReport,
    },

    /// A schema document could not be parsed.
    #[error("schema document error in '{source_name}': {reason}")]
    Document {
        /// File path or other label of the document.
        source_name: String,
        /// Parser or structural failure.
        reason: String,
    },

    /// A schema in a registry could not be resolved.
    #[error("schema registry error for '{schema}': {reason}")]
    Registry {
        /// Schema being resolved.
        schema: String,
        /// Unknown reference, cycle, duplicate name or invalid default.
        reason: String,
    },

    /// No schema with this name is registered.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// A datetime string or number could not be interpreted.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of a single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required field (no default) was absent.
    MissingField,

    /// The value could not be coerced to the declared type, or the input
    /// at this path was not a mapping.
    TypeError {
        /// Declared type name.
        expected: String,
        /// Type name of the supplied value.
        actual: String,
    },

    /// The coerced value broke a declared constraint.
    ConstraintViolation {
        /// Constraint name, e.g. `min_length`.
        constraint: String,
        /// The declared bound, rendered.
        bound: String,
        /// The offending measurement or value, rendered.
        actual: String,
    },

    /// A key not declared by the schema, under a forbidding extra policy.
    ExtraField,
}

impl ErrorKind {
    /// Stable snake_case name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "missing_field",
            ErrorKind::TypeError { .. } => "type_error",
            ErrorKind::ConstraintViolation { .. } => "constraint_violation",
            ErrorKind::ExtraField => "extra_field",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One violation at one field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the field.
    pub field_path: FieldPath,
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl FieldError {
    pub fn missing(path: FieldPath) -> Self {
        Self {
            field_path: path,
            kind: ErrorKind::MissingField,
            message: "Field required".to_string(),
        }
    }

    pub fn type_error(
        path: FieldPath,
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field_path: path,
            kind: ErrorKind::TypeError {
                expected: expected.into(),
                actual: actual.into(),
            },
            message: message.into(),
        }
    }

    pub fn constraint(
        path: FieldPath,
        constraint: impl Into<String>,
        bound: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field_path: path,
            kind: ErrorKind::ConstraintViolation {
                constraint: constraint.into(),
                bound: bound.into(),
                actual: actual.into(),
            },
            message: message.into(),
        }
    }

    pub fn extra(path: FieldPath) -> Self {
        Self {
            field_path: path,
            kind: ErrorKind::ExtraField,
            message: "Extra inputs are not permitted".to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {} [{}]", self.field_path, self.message, self.kind)
    }
}

/// Every violation found by one validation call, in discovery order.
///
/// Discovery order is schema declaration order, depth first, so the report
/// for a nested schema lists parent fields around the nested block in the
/// same order they are declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    errors: Vec<FieldError>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one violation.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Merge a nested report, namespacing every path beneath `parent`.
    pub fn merge_nested(&mut self, parent: &FieldPath, nested: ErrorReport) {
        self.errors.extend(nested.errors.into_iter().map(|mut e| {
            e.field_path = e.field_path.nested_under(parent);
            e
        }));
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Violations recorded at exactly this dotted path.
    pub fn at<'a>(&'a self, dotted: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field_path.dotted() == dotted)
    }

    /// Number of violations of the given kind name (`missing_field`, ...).
    pub fn count_kind(&self, name: &str) -> usize {
        self.errors.iter().filter(|e| e.kind.name() == name).count()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorReport {}
