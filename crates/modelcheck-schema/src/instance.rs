//! # Validated Instances
//!
//! An [`Instance`] is the immutable result of one successful validation
//! call. It holds a handle to its schema and, for every declared field, the
//! validated [`FieldValue`] together with its [`Origin`]: whether the
//! caller supplied it or it was filled from a default.

use std::sync::Arc;

use modelcheck_core::{Record, Timestamp, Value};

use crate::dump::{self, Dumped};
use crate::field::FieldSpec;
use crate::options::DumpOptions;
use crate::schema::Schema;

/// How a field got its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Present in the input.
    Set,
    /// Absent from the input and filled from the field default.
    Defaulted,
}

/// A validated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A primitive value, or null.
    Scalar(Value),
    /// A nested validated instance.
    Model(Instance),
    /// A validated list.
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Scalar(Value::Null))
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        self.as_scalar().and_then(Value::as_timestamp)
    }

    pub fn as_model(&self) -> Option<&Instance> {
        match self {
            FieldValue::Model(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Slot {
    pub(crate) value: FieldValue,
    pub(crate) origin: Origin,
}

/// A validated value conforming to its schema.
///
/// Slots align one-to-one with `schema.fields()`.
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    slots: Vec<Slot>,
}

impl Instance {
    pub(crate) fn new(schema: Arc<Schema>, slots: Vec<Slot>) -> Self {
        Self { schema, slots }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Value of a field by canonical name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.slot(name).map(|slot| &slot.value)
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.slot(name).map(|slot| slot.origin)
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.schema
            .position(name)
            .and_then(|idx| self.slots.get(idx))
    }

    /// True when the field was present in the input.
    pub fn is_set(&self, name: &str) -> bool {
        self.origin(name) == Some(Origin::Set)
    }

    /// Canonical names of explicitly supplied fields, in declaration order.
    pub fn fields_set(&self) -> Vec<&str> {
        self.entries()
            .filter(|(_, _, origin)| *origin == Origin::Set)
            .map(|(spec, _, _)| spec.name())
            .collect()
    }

    /// Every field with its value and origin, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&FieldSpec, &FieldValue, Origin)> {
        self.schema
            .fields()
            .iter()
            .zip(self.slots.iter())
            .map(|(spec, slot)| (spec, &slot.value, slot.origin))
    }

    /// Serialize according to `options.mode`.
    pub fn dump(&self, options: &DumpOptions) -> Dumped {
        dump::dump(self, options)
    }

    /// Native record, ignoring `options.mode`.
    pub fn dump_native(&self, options: &DumpOptions) -> Record {
        dump::dump_record(self, options)
    }

    /// JSON-compatible value, ignoring `options.mode`.
    pub fn dump_text(&self, options: &DumpOptions) -> serde_json::Value {
        Value::Record(self.dump_native(options)).to_json()
    }

    /// JSON text, ignoring `options.mode`.
    pub fn dump_json(&self, options: &DumpOptions) -> String {
        dump::render_json(&self.dump_text(options), options.pretty)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.slots == other.slots
    }
}
