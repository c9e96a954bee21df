//! # Scalar Coercion
//!
//! Converts one raw JSON value to the declared primitive type. The set of
//! accepted conversions is closed and listed here; anything else is a
//! type error.
//!
//! | declared | accepted (lax)                                              |
//! |----------|-------------------------------------------------------------|
//! | string   | string                                                      |
//! | integer  | integer, float without fraction, integer string             |
//! | float    | integer, float, finite float string                         |
//! | boolean  | bool, 0/1, `true/false/yes/no/on/off/1/0` strings           |
//! | datetime | RFC 3339 / naive ISO-8601 string, integer epoch seconds     |
//!
//! Booleans never become numbers. In strict mode only the first entry of
//! each row (the same JSON type) is accepted, plus integer → float and
//! ISO strings → datetime, which have no other JSON spelling.

use modelcheck_core::{Timestamp, Value};
use serde_json::Value as Json;

use crate::field::FieldType;

/// Why a raw value could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub actual: &'static str,
    pub message: String,
}

impl Mismatch {
    fn new(expected: &str, raw: &Json, message: impl Into<String>) -> Self {
        Self {
            expected: expected.to_string(),
            actual: json_type_name(raw),
            message: message.into(),
        }
    }
}

/// Type name of a raw JSON value as used in error reports.
pub fn json_type_name(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) if n.is_f64() => "float",
        Json::Number(_) => "integer",
        Json::String(_) => "string",
        Json::Array(_) => "list",
        Json::Object(_) => "object",
    }
}

/// Coerce `raw` to a primitive field type.
///
/// Non-primitive types (model, list, optional) are handled by the
/// validator; passing one here is a mismatch.
pub fn coerce_scalar(ty: &FieldType, raw: &Json, strict: bool) -> Result<Value, Mismatch> {
    match ty {
        FieldType::String => coerce_string(raw),
        FieldType::Integer => coerce_integer(raw, strict),
        FieldType::Float => coerce_float(raw, strict),
        FieldType::Boolean => coerce_boolean(raw, strict),
        FieldType::DateTime => coerce_datetime(raw, strict),
        other => Err(Mismatch::new(
            &other.type_name(),
            raw,
            format!("Input should be a valid {}", other.type_name()),
        )),
    }
}

fn coerce_string(raw: &Json) -> Result<Value, Mismatch> {
    match raw {
        Json::String(s) => Ok(Value::Str(s.clone())),
        _ => Err(Mismatch::new("string", raw, "Input should be a valid string")),
    }
}

fn coerce_integer(raw: &Json, strict: bool) -> Result<Value, Mismatch> {
    const INVALID: &str = "Input should be a valid integer";
    match raw {
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::Int(i));
            }
            if n.is_u64() {
                return Err(Mismatch::new(
                    "integer",
                    raw,
                    "Input should be a valid integer, out of range",
                ));
            }
            match n.as_f64() {
                Some(f) if !strict && f.fract() == 0.0 && in_i64_range(f) => {
                    Ok(Value::Int(f as i64))
                }
                Some(f) if f.is_finite() && f.fract() != 0.0 => Err(Mismatch::new(
                    "integer",
                    raw,
                    "Input should be a valid integer, got a number with a fractional part",
                )),
                _ => Err(Mismatch::new("integer", raw, INVALID)),
            }
        }
        Json::String(s) if !strict => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            Mismatch::new(
                "integer",
                raw,
                "Input should be a valid integer, unable to parse string as an integer",
            )
        }),
        _ => Err(Mismatch::new("integer", raw, INVALID)),
    }
}

fn coerce_float(raw: &Json, strict: bool) -> Result<Value, Mismatch> {
    const INVALID: &str = "Input should be a valid number";
    match raw {
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Float(i as f64)),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| Mismatch::new("float", raw, INVALID)),
        },
        Json::String(s) if !strict => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            _ => Err(Mismatch::new(
                "float",
                raw,
                "Input should be a valid number, unable to parse string as a number",
            )),
        },
        _ => Err(Mismatch::new("float", raw, INVALID)),
    }
}

fn coerce_boolean(raw: &Json, strict: bool) -> Result<Value, Mismatch> {
    const INVALID: &str = "Input should be a valid boolean";
    match raw {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) if !strict => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(Mismatch::new("boolean", raw, INVALID)),
        },
        Json::String(s) if !strict => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(Mismatch::new(
                "boolean",
                raw,
                "Input should be a valid boolean, unable to interpret input",
            )),
        },
        _ => Err(Mismatch::new("boolean", raw, INVALID)),
    }
}

fn coerce_datetime(raw: &Json, strict: bool) -> Result<Value, Mismatch> {
    const INVALID: &str = "Input should be a valid datetime";
    match raw {
        Json::String(s) => Timestamp::parse(s).map(Value::DateTime).map_err(|_| {
            Mismatch::new(
                "datetime",
                raw,
                "Input should be a valid datetime, invalid ISO-8601 format",
            )
        }),
        Json::Number(n) if !strict => n
            .as_i64()
            .and_then(|secs| Timestamp::from_epoch_secs(secs).ok())
            .map(Value::DateTime)
            .ok_or_else(|| Mismatch::new("datetime", raw, INVALID)),
        _ => Err(Mismatch::new("datetime", raw, INVALID)),
    }
}

fn in_i64_range(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lax(ty: FieldType, raw: Json) -> Result<Value, Mismatch> {
        coerce_scalar(&ty, &raw, false)
    }

    fn strict(ty: FieldType, raw: Json) -> Result<Value, Mismatch> {
        coerce_scalar(&ty, &raw, true)
    }

    #[test]
    fn test_string_accepts_only_strings() {
        assert_eq!(lax(FieldType::String, json!("Austin")), Ok(Value::from("Austin")));
        let err = lax(FieldType::String, json!(73301)).unwrap_err();
        assert_eq!(err.actual, "integer");
        assert_eq!(err.message, "Input should be a valid string");
    }

    #[test]
    fn test_integer_lax_conversions() {
        assert_eq!(lax(FieldType::Integer, json!(24)), Ok(Value::Int(24)));
        assert_eq!(lax(FieldType::Integer, json!(24.0)), Ok(Value::Int(24)));
        assert_eq!(lax(FieldType::Integer, json!(" 24 ")), Ok(Value::Int(24)));
    }

    #[test]
    fn test_integer_rejections() {
        assert!(lax(FieldType::Integer, json!(true)).is_err());
        assert!(lax(FieldType::Integer, json!("24.5")).is_err());
        let frac = lax(FieldType::Integer, json!(24.5)).unwrap_err();
        assert!(frac.message.contains("fractional part"));
        let big = lax(FieldType::Integer, json!(u64::MAX)).unwrap_err();
        assert!(big.message.contains("out of range"));
    }

    #[test]
    fn test_integer_strict() {
        assert_eq!(strict(FieldType::Integer, json!(24)), Ok(Value::Int(24)));
        assert!(strict(FieldType::Integer, json!("24")).is_err());
        assert!(strict(FieldType::Integer, json!(24.0)).is_err());
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(lax(FieldType::Float, json!(98.4)), Ok(Value::Float(98.4)));
        assert_eq!(lax(FieldType::Float, json!(98)), Ok(Value::Float(98.0)));
        assert_eq!(lax(FieldType::Float, json!("98.6")), Ok(Value::Float(98.6)));
        assert!(lax(FieldType::Float, json!("NaN")).is_err());
        assert!(lax(FieldType::Float, json!(false)).is_err());
        assert_eq!(strict(FieldType::Float, json!(98)), Ok(Value::Float(98.0)));
        assert!(strict(FieldType::Float, json!("98.6")).is_err());
    }

    #[test]
    fn test_boolean_conversions() {
        assert_eq!(lax(FieldType::Boolean, json!(true)), Ok(Value::Bool(true)));
        assert_eq!(lax(FieldType::Boolean, json!(0)), Ok(Value::Bool(false)));
        assert_eq!(lax(FieldType::Boolean, json!("Yes")), Ok(Value::Bool(true)));
        assert_eq!(lax(FieldType::Boolean, json!("off")), Ok(Value::Bool(false)));
        assert!(lax(FieldType::Boolean, json!(2)).is_err());
        assert!(lax(FieldType::Boolean, json!("maybe")).is_err());
        assert!(strict(FieldType::Boolean, json!(1)).is_err());
    }

    #[test]
    fn test_datetime_conversions() {
        let v = lax(FieldType::DateTime, json!("2026-01-15T12:00:00Z")).unwrap();
        assert_eq!(v.as_timestamp().unwrap().to_iso8601(), "2026-01-15T12:00:00Z");

        let epoch = lax(FieldType::DateTime, json!(0)).unwrap();
        assert_eq!(epoch.as_timestamp().unwrap().to_iso8601(), "1970-01-01T00:00:00Z");

        assert!(lax(FieldType::DateTime, json!("yesterday")).is_err());
        assert!(strict(FieldType::DateTime, json!(0)).is_err());
        assert!(strict(FieldType::DateTime, json!("2026-01-15T12:00:00")).is_ok());
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "integer");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!([])), "list");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
