//! # Field Paths
//!
//! Location of a value inside nested input. Paths render dotted, outermost
//! segment first: `address.pin`, `visits.0.pin`. The empty path is the
//! root of the input and renders as `(root)` in reports.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field of a schema.
    Field(String),
    /// An element of a list field.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Dotted path from the top-level input to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The root of the input.
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-segment path naming a top-level field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Extend this path with a field name.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Extend this path with a list index.
    pub fn index(&self, idx: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(idx));
        Self { segments }
    }

    /// Re-root this path beneath `parent`, e.g. `pin` under `address`
    /// becomes `address.pin`.
    pub fn nested_under(&self, parent: &FieldPath) -> Self {
        let mut segments = parent.segments.clone();
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Dotted rendering without the `(root)` placeholder.
    pub fn dotted(&self) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.dotted())
        }
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dotted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert_eq!(FieldPath::root().to_string(), "(root)");
        assert_eq!(FieldPath::root().dotted(), "");
    }

    #[test]
    fn test_nested_display() {
        let path = FieldPath::field("visits").index(0).child("pin");
        assert_eq!(path.to_string(), "visits.0.pin");
    }

    #[test]
    fn test_nested_under() {
        let inner = FieldPath::field("pin");
        let outer = inner.nested_under(&FieldPath::field("address"));
        assert_eq!(outer.dotted(), "address.pin");
        assert_eq!(outer.segments().len(), 2);
    }

    #[test]
    fn test_serializes_as_dotted_string() {
        let path = FieldPath::field("address").child("city");
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""address.city""#);
    }
}
