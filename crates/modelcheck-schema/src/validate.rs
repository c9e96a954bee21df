//! # Validation
//!
//! Turns raw, untyped input into an [`Instance`] or a complete
//! [`ErrorReport`].
//!
//! ## Algorithm
//!
//! Fields are visited in declaration order. For each one the raw value is
//! looked up by alias first (and by canonical name when the field has no
//! alias or `populate_by_name` is set). An absent field takes its default
//! and is marked `Defaulted`; an absent required field is a
//! `missing_field` error. A present field is marked `Set`, coerced, and
//! then checked against every declared constraint. Nested schemas recurse
//! and their errors are re-rooted under the parent field (`address.pin`).
//!
//! Errors accumulate; validation never stops at the first one. The caller
//! gets either an instance or the full report, never both.

use std::sync::Arc;

use modelcheck_core::{ErrorReport, FieldError, FieldPath, Value};
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::coerce::{coerce_scalar, json_type_name};
use crate::constraint::check_all;
use crate::field::{FieldSpec, FieldType};
use crate::instance::{FieldValue, Instance, Origin, Slot};
use crate::schema::{ExtraPolicy, ModelConfig, Schema};

/// Validate `raw` against `schema` using the schema's own configuration.
pub fn validate(schema: &Arc<Schema>, raw: &Json) -> Result<Instance, ErrorReport> {
    Validator::new(schema).validate(raw)
}

/// A validation call bound to one schema and one top-level configuration.
///
/// Nested schemas are always validated with their own configuration.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    schema: &'a Arc<Schema>,
    config: ModelConfig,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Arc<Schema>) -> Self {
        Self {
            schema,
            config: *schema.config(),
        }
    }

    /// Override the top-level configuration.
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validate(&self, raw: &Json) -> Result<Instance, ErrorReport> {
        let result = validate_object(self.schema, &self.config, raw);
        match &result {
            Ok(_) => debug!(schema = %self.schema.name(), "validation succeeded"),
            Err(report) => debug!(
                schema = %self.schema.name(),
                errors = report.len(),
                "validation failed"
            ),
        }
        result
    }
}

fn validate_object(
    schema: &Arc<Schema>,
    config: &ModelConfig,
    raw: &Json,
) -> Result<Instance, ErrorReport> {
    let mut report = ErrorReport::new();

    let Some(input) = raw.as_object() else {
        report.push(FieldError::type_error(
            FieldPath::root(),
            schema.name(),
            json_type_name(raw),
            "Input should be a valid dictionary or instance",
        ));
        return Err(report);
    };

    let mut slots = Vec::with_capacity(schema.fields().len());

    for spec in schema.fields() {
        let path = FieldPath::field(spec.name());
        match resolve_input(spec, input, config.populate_by_name) {
            Some((key, raw_value)) => {
                trace!(schema = %schema.name(), field = %spec.name(), key, "field supplied");
                match validate_value(spec.field_type(), raw_value, config.strict) {
                    Ok(value) => {
                        for error in check_all(spec.constraints(), &value, &path) {
                            report.push(error);
                        }
                        slots.push(Slot {
                            value,
                            origin: Origin::Set,
                        });
                    }
                    Err(nested) => report.merge_nested(&path, nested),
                }
            }
            None => match spec.default_value() {
                Some(default) => {
                    trace!(schema = %schema.name(), field = %spec.name(), "field defaulted");
                    slots.push(Slot {
                        value: default.resolve(),
                        origin: Origin::Defaulted,
                    });
                }
                None => report.push(FieldError::missing(path)),
            },
        }
    }

    if config.extra == ExtraPolicy::Forbid {
        for key in input.keys() {
            let declared = schema
                .fields()
                .iter()
                .any(|f| f.accepts(key, config.populate_by_name));
            if !declared {
                report.push(FieldError::extra(FieldPath::field(key.as_str())));
            }
        }
    }

    if report.is_empty() {
        Ok(Instance::new(Arc::clone(schema), slots))
    } else {
        Err(report)
    }
}

/// Find the raw value for a field, returning the key it was found under.
fn resolve_input<'m>(
    spec: &FieldSpec,
    input: &'m Map<String, Json>,
    populate_by_name: bool,
) -> Option<(&'m str, &'m Json)> {
    spec.input_keys(populate_by_name)
        .into_iter()
        .find_map(|key| input.get_key_value(key))
        .map(|(k, v)| (k.as_str(), v))
}

/// Validate a declared default against its field type in lax mode.
/// `null` is accepted for every type. Model and list defaults come back as
/// nested instances and validated lists.
pub(crate) fn validate_default(ty: &FieldType, raw: &Json) -> Result<FieldValue, ErrorReport> {
    if raw.is_null() {
        return Ok(FieldValue::Scalar(Value::Null));
    }
    validate_value(ty, raw, false)
}

/// Validate one raw value against a declared type. Error paths in the
/// returned report are relative to the value itself.
fn validate_value(ty: &FieldType, raw: &Json, strict: bool) -> Result<FieldValue, ErrorReport> {
    match ty {
        FieldType::Optional(_) if raw.is_null() => Ok(FieldValue::Scalar(Value::Null)),
        FieldType::Optional(inner) => validate_value(inner, raw, strict),
        FieldType::Model(schema) => {
            validate_object(schema, schema.config(), raw).map(FieldValue::Model)
        }
        FieldType::List(inner) => {
            let Some(items) = raw.as_array() else {
                let mut report = ErrorReport::new();
                report.push(FieldError::type_error(
                    FieldPath::root(),
                    ty.type_name(),
                    json_type_name(raw),
                    "Input should be a valid list",
                ));
                return Err(report);
            };
            let mut report = ErrorReport::new();
            let mut values = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                match validate_value(inner, item, strict) {
                    Ok(v) => values.push(v),
                    Err(nested) => report.merge_nested(&FieldPath::root().index(idx), nested),
                }
            }
            if report.is_empty() {
                Ok(FieldValue::List(values))
            } else {
                Err(report)
            }
        }
        scalar => coerce_scalar(scalar, raw, strict)
            .map(FieldValue::Scalar)
            .map_err(|m| {
                let mut report = ErrorReport::new();
                report.push(FieldError::type_error(
                    FieldPath::root(),
                    m.expected,
                    m.actual,
                    m.message,
                ));
                report
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use modelcheck_core::ErrorKind;
    use serde_json::json;

    fn address() -> Arc<Schema> {
        Schema::builder("Address")
            .field(FieldSpec::string("city").min_length(2))
            .field(FieldSpec::string("state").min_length(2))
            .field(FieldSpec::string("pin").min_length(5).max_length(6))
            .build()
    }

    fn patient(address: &Arc<Schema>) -> Arc<Schema> {
        Schema::builder("Patient")
            .field(FieldSpec::string("name"))
            .field(FieldSpec::string("gender").default("Male"))
            .field(FieldSpec::integer("age").ge(0.0).le(120.0))
            .field(FieldSpec::model("address", address))
            .field(FieldSpec::string("phone").optional())
            .build()
    }

    #[test]
    fn test_valid_address() {
        let inst = validate(
            &address(),
            &json!({"city": "Austin", "state": "Texas", "pin": "73301"}),
        )
        .unwrap();
        assert_eq!(inst.get("city").and_then(FieldValue::as_str), Some("Austin"));
        assert_eq!(inst.fields_set(), vec!["city", "state", "pin"]);
    }

    #[test]
    fn test_invalid_address_three_violations() {
        let report = validate(&address(), &json!({"city": "A", "state": "T", "pin": "123"}))
            .unwrap_err();
        assert_eq!(report.len(), 3);
        assert_eq!(report.count_kind("constraint_violation"), 3);
        assert_eq!(report.count_kind("missing_field"), 0);
        let paths: Vec<String> = report.errors().iter().map(|e| e.field_path.dotted()).collect();
        assert_eq!(paths, vec!["city", "state", "pin"]);
    }

    #[test]
    fn test_non_mapping_input() {
        let report = validate(&address(), &json!(["Austin"])).unwrap_err();
        assert_eq!(report.len(), 1);
        let e = &report.errors()[0];
        assert!(e.field_path.is_root());
        assert_eq!(
            e.kind,
            ErrorKind::TypeError {
                expected: "Address".into(),
                actual: "list".into()
            }
        );
    }

    #[test]
    fn test_missing_fields_accumulate() {
        let addr = address();
        let report = validate(&patient(&addr), &json!({"gender": "Female"})).unwrap_err();
        let missing: Vec<String> = report
            .errors()
            .iter()
            .filter(|e| e.kind == ErrorKind::MissingField)
            .map(|e| e.field_path.dotted())
            .collect();
        assert_eq!(missing, vec!["name", "age", "address"]);
    }

    #[test]
    fn test_nested_errors_namespaced() {
        let addr = address();
        let report = validate(
            &patient(&addr),
            &json!({"name": "P", "age": 150, "address": {"city": "Austin", "state": "TX"}}),
        )
        .unwrap_err();
        assert_eq!(report.at("age").count(), 1);
        let pin: Vec<_> = report.at("address.pin").collect();
        assert_eq!(pin.len(), 1);
        assert_eq!(pin[0].kind, ErrorKind::MissingField);
    }

    #[test]
    fn test_defaults_marked_defaulted() {
        let addr = address();
        let inst = validate(
            &patient(&addr),
            &json!({
                "name": "Prajwal_G",
                "age": 24,
                "address": {"city": "Austin", "state": "Texas", "pin": "73301"}
            }),
        )
        .unwrap();
        assert_eq!(inst.origin("gender"), Some(Origin::Defaulted));
        assert_eq!(inst.get("gender").and_then(FieldValue::as_str), Some("Male"));
        assert!(inst.get("phone").is_some_and(FieldValue::is_null));
        assert!(!inst.is_set("phone"));
        assert!(inst.is_set("address"));
    }

    #[test]
    fn test_explicit_null_on_optional_is_set() {
        let addr = address();
        let inst = validate(
            &patient(&addr),
            &json!({
                "name": "N",
                "age": 1,
                "phone": null,
                "address": {"city": "Austin", "state": "Texas", "pin": "73301"}
            }),
        )
        .unwrap();
        assert!(inst.is_set("phone"));
    }

    #[test]
    fn test_type_error_skips_constraints() {
        let report = validate(
            &Schema::builder("S").field(FieldSpec::integer("age").ge(0.0)).build(),
            &json!({"age": "old"}),
        )
        .unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.count_kind("type_error"), 1);
    }

    #[test]
    fn test_alias_resolution() {
        let schema = Schema::builder("P")
            .field(FieldSpec::string("full_name").alias("name"))
            .build();
        assert!(validate(&schema, &json!({"name": "Michael Chen"})).is_ok());
        let report = validate(&schema, &json!({"full_name": "Michael Chen"})).unwrap_err();
        assert_eq!(report.at("full_name").count(), 1);

        let by_name = ModelConfig {
            populate_by_name: true,
            ..ModelConfig::default()
        };
        let inst = Validator::new(&schema)
            .with_config(by_name)
            .validate(&json!({"full_name": "Michael Chen"}))
            .unwrap();
        assert_eq!(inst.get("full_name").and_then(FieldValue::as_str), Some("Michael Chen"));
    }

    #[test]
    fn test_alias_wins_over_name() {
        let schema = Schema::builder("P")
            .populate_by_name(true)
            .field(FieldSpec::string("full_name").alias("name"))
            .build();
        let inst = validate(&schema, &json!({"full_name": "B", "name": "A"})).unwrap();
        assert_eq!(inst.get("full_name").and_then(FieldValue::as_str), Some("A"));
    }

    #[test]
    fn test_extra_policy() {
        let lenient = address();
        let raw = json!({"city": "Austin", "state": "Texas", "pin": "73301", "zip4": "0001"});
        assert!(validate(&lenient, &raw).is_ok());

        let strict = Schema::builder("Address")
            .extra(ExtraPolicy::Forbid)
            .field(FieldSpec::string("city"))
            .field(FieldSpec::string("state"))
            .field(FieldSpec::string("pin"))
            .build();
        let report = validate(&strict, &raw).unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.errors()[0].kind, ErrorKind::ExtraField);
        assert_eq!(report.errors()[0].field_path.dotted(), "zip4");
    }

    #[test]
    fn test_list_of_models() {
        let addr = address();
        let schema = Schema::builder("Clinic")
            .field(FieldSpec::list("sites", FieldType::Model(Arc::clone(&addr))).min_length(1))
            .build();
        let report = validate(
            &schema,
            &json!({"sites": [
                {"city": "Austin", "state": "Texas", "pin": "73301"},
                {"city": "Dallas", "state": "Texas", "pin": "7"}
            ]}),
        )
        .unwrap_err();
        assert_eq!(report.len(), 1);
        assert_eq!(report.errors()[0].field_path.dotted(), "sites.1.pin");

        let report = validate(&schema, &json!({"sites": []})).unwrap_err();
        assert_eq!(report.count_kind("constraint_violation"), 1);

        let report = validate(&schema, &json!({"sites": "Austin"})).unwrap_err();
        assert_eq!(report.count_kind("type_error"), 1);
    }

    #[test]
    fn test_default_now_factory() {
        let schema = Schema::builder("Vitals")
            .field(FieldSpec::datetime("last_checked").default_now())
            .build();
        let inst = validate(&schema, &json!({})).unwrap();
        assert!(inst.get("last_checked").and_then(FieldValue::as_timestamp).is_some());
        assert_eq!(inst.origin("last_checked"), Some(Origin::Defaulted));
    }

    #[test]
    fn test_null_for_required_string_is_type_error() {
        let report = validate(&address(), &json!({"city": null, "state": "Texas", "pin": "73301"}))
            .unwrap_err();
        assert_eq!(
            report.errors()[0].kind,
            ErrorKind::TypeError {
                expected: "string".into(),
                actual: "null".into()
            }
        );
    }

    #[test]
    fn test_schema_shared_across_threads() {
        let addr = address();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let schema = Arc::clone(&addr);
                std::thread::spawn(move || {
                    let raw =
                        json!({"city": "Austin", "state": "Texas", "pin": format!("7330{i}")});
                    validate(&schema, &raw).is_ok()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }

    #[test]
    fn test_scalar_value_preserved() {
        let schema = Schema::builder("S").field(FieldSpec::float("t")).build();
        let inst = validate(&schema, &json!({"t": 98})).unwrap();
        assert_eq!(inst.get("t"), Some(&FieldValue::Scalar(Value::Float(98.0))));
    }

    #[test]
    fn test_validate_default_scalars() {
        let ty = FieldType::optional(FieldType::DateTime);
        let at = validate_default(&ty, &json!("2026-01-01T00:00:00Z")).unwrap();
        assert!(at.as_timestamp().is_some());
        assert!(validate_default(&ty, &json!(null)).unwrap().is_null());
        assert!(validate_default(&FieldType::Integer, &json!("abc")).is_err());
    }

    #[test]
    fn test_validate_default_model_is_instance() {
        let addr = address();
        let ty = FieldType::Model(Arc::clone(&addr));
        let value = validate_default(
            &ty,
            &json!({"city": "Austin", "state": "Texas", "pin": "73301"}),
        )
        .unwrap();
        let nested = value.as_model().unwrap();
        assert!(Arc::ptr_eq(nested.schema(), &addr));

        let report = validate_default(&ty, &json!({"city": "A"})).unwrap_err();
        assert_eq!(report.count_kind("missing_field"), 2);
        assert_eq!(report.count_kind("constraint_violation"), 1);
    }
}
