//! # Serialization
//!
//! Walks an [`Instance`] in declaration order and emits the selected
//! fields. Selection happens per level:
//!
//! 1. `include`, when given, keeps only the named fields; `exclude` is
//!    then ignored at that level, though its nested subsets still apply
//!    to the levels below.
//! 2. Otherwise `exclude` drops whole fields, or hands a nested subset
//!    down to the field's own dump.
//! 3. `exclude_unset` drops fields filled from defaults.
//! 4. `exclude_none` drops fields whose dumped value is null.
//!
//! Selection keys that name no field are ignored. List elements share the
//! sub-selection of their field.

use modelcheck_core::{Record, Value};

use crate::instance::{FieldValue, Instance, Origin};
use crate::options::{DumpMode, DumpOptions, FieldSelection, SubSelection};

/// Result of a dump, shaped by [`DumpMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dumped {
    Native(Value),
    Text(serde_json::Value),
    Json(String),
}

impl Dumped {
    pub fn as_native(&self) -> Option<&Value> {
        match self {
            Dumped::Native(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&serde_json::Value> {
        match self {
            Dumped::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&str> {
        match self {
            Dumped::Json(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dumped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dumped::Native(v) => write!(f, "{v}"),
            Dumped::Text(v) => write!(f, "{v}"),
            Dumped::Json(s) => f.write_str(s),
        }
    }
}

/// Serialize an instance according to `options`.
pub fn dump(instance: &Instance, options: &DumpOptions) -> Dumped {
    let record = Value::Record(dump_record(instance, options));
    match options.mode {
        DumpMode::Native => Dumped::Native(record),
        DumpMode::Text => Dumped::Text(record.to_json()),
        DumpMode::Json => Dumped::Json(render_json(&record.to_json(), options.pretty)),
    }
}

/// Native ordered record for an instance.
pub(crate) fn dump_record(instance: &Instance, options: &DumpOptions) -> Record {
    dump_level(
        instance,
        options.include.as_ref(),
        options.exclude.as_ref(),
        options,
    )
}

pub(crate) fn render_json(value: &serde_json::Value, pretty: bool) -> String {
    if pretty {
        format!("{value:#}")
    } else {
        value.to_string()
    }
}

/// Outcome of applying one level's selections to one field.
enum Pick<'a> {
    Skip,
    Keep {
        include: Option<&'a FieldSelection>,
        exclude: Option<&'a FieldSelection>,
    },
}

fn pick<'a>(
    name: &str,
    include: Option<&'a FieldSelection>,
    exclude: Option<&'a FieldSelection>,
) -> Pick<'a> {
    let excluded = exclude.and_then(|sel| sel.get(name));
    let Some(include) = include else {
        return match excluded {
            Some(SubSelection::Whole) => Pick::Skip,
            Some(SubSelection::Partial(sub)) => Pick::Keep {
                include: None,
                exclude: Some(sub),
            },
            None => Pick::Keep {
                include: None,
                exclude: None,
            },
        };
    };
    // Include decides this level; a nested exclude still applies below it.
    let nested_exclude = match excluded {
        Some(SubSelection::Partial(sub)) => Some(sub),
        _ => None,
    };
    match include.get(name) {
        None => Pick::Skip,
        Some(SubSelection::Whole) => Pick::Keep {
            include: None,
            exclude: nested_exclude,
        },
        Some(SubSelection::Partial(sub)) => Pick::Keep {
            include: Some(sub),
            exclude: nested_exclude,
        },
    }
}

fn dump_level(
    instance: &Instance,
    include: Option<&FieldSelection>,
    exclude: Option<&FieldSelection>,
    options: &DumpOptions,
) -> Record {
    let mut record = Record::new();
    for (spec, value, origin) in instance.entries() {
        if options.exclude_unset && origin == Origin::Defaulted {
            continue;
        }
        let Pick::Keep {
            include: sub_include,
            exclude: sub_exclude,
        } = pick(spec.name(), include, exclude)
        else {
            continue;
        };
        let dumped = dump_value(value, sub_include, sub_exclude, options);
        if options.exclude_none && dumped.is_null() {
            continue;
        }
        record.insert(spec.output_key(options.by_alias), dumped);
    }
    record
}

fn dump_value(
    value: &FieldValue,
    include: Option<&FieldSelection>,
    exclude: Option<&FieldSelection>,
    options: &DumpOptions,
) -> Value {
    match value {
        FieldValue::Scalar(v) => v.clone(),
        FieldValue::Model(inner) => Value::Record(dump_level(inner, include, exclude, options)),
        FieldValue::List(items) => Value::List(
            items
                .iter()
                .map(|item| dump_value(item, include, exclude, options))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::field::{FieldSpec, FieldType};
    use crate::schema::Schema;
    use crate::validate::validate;
    use serde_json::json;

    fn address() -> Arc<Schema> {
        Schema::builder("Address")
            .field(FieldSpec::string("city").min_length(2))
            .field(FieldSpec::string("state").min_length(2))
            .field(FieldSpec::string("pin").min_length(5).max_length(6))
            .build()
    }

    fn patient() -> Arc<Schema> {
        Schema::builder("Patient")
            .field(FieldSpec::string("name"))
            .field(FieldSpec::string("gender").default("Male"))
            .field(FieldSpec::integer("age").ge(0.0).le(120.0))
            .field(FieldSpec::model("address", &address()))
            .field(FieldSpec::string("phone").optional())
            .build()
    }

    fn prajwal() -> Instance {
        validate(
            &patient(),
            &json!({
                "age": 24,
                "name": "Prajwal_G",
                "address": {"pin": "73301", "city": "Austin", "state": "Texas"}
            }),
        )
        .unwrap()
    }

    fn keys(record: &Record) -> Vec<&str> {
        record.keys().collect()
    }

    #[test]
    fn test_default_dump_declaration_order() {
        let rec = prajwal().dump_native(&DumpOptions::new());
        assert_eq!(keys(&rec), vec!["name", "gender", "age", "address", "phone"]);
        let addr = rec.get("address").and_then(Value::as_record).unwrap();
        assert_eq!(keys(addr), vec!["city", "state", "pin"]);
        assert_eq!(rec.get("phone"), Some(&Value::Null));
    }

    #[test]
    fn test_exclude_unset() {
        let rec = prajwal().dump_native(&DumpOptions::new().exclude_unset(true));
        assert_eq!(keys(&rec), vec!["name", "age", "address"]);
    }

    #[test]
    fn test_include_exact_keys() {
        let opts = DumpOptions::new().include(FieldSelection::fields(["name", "age"]));
        let rec = prajwal().dump_native(&opts);
        assert_eq!(keys(&rec), vec!["name", "age"]);
    }

    #[test]
    fn test_exclude_whole_field() {
        let opts = DumpOptions::new().exclude(FieldSelection::fields(["address"]));
        let rec = prajwal().dump_native(&opts);
        assert!(!rec.contains_key("address"));
        assert_eq!(rec.len(), 4);
    }

    #[test]
    fn test_exclude_nested_field() {
        let opts = DumpOptions::new()
            .exclude(FieldSelection::new().nested("address", FieldSelection::fields(["pin"])));
        let rec = prajwal().dump_native(&opts);
        let addr = rec.get("address").and_then(Value::as_record).unwrap();
        assert_eq!(keys(addr), vec!["city", "state"]);
    }

    #[test]
    fn test_include_nested_subset() {
        let opts = DumpOptions::new().include(
            FieldSelection::fields(["name"]).nested("address", FieldSelection::fields(["city"])),
        );
        let text = prajwal().dump_text(&opts);
        assert_eq!(text, json!({"name": "Prajwal_G", "address": {"city": "Austin"}}));
    }

    #[test]
    fn test_include_takes_precedence_over_exclude() {
        let opts = DumpOptions::new()
            .include(FieldSelection::fields(["name", "age"]))
            .exclude(FieldSelection::fields(["age"]));
        let rec = prajwal().dump_native(&opts);
        assert_eq!(keys(&rec), vec!["name", "age"]);
    }

    #[test]
    fn test_nested_exclude_applies_under_include() {
        let opts = DumpOptions::new()
            .include(FieldSelection::fields(["address"]))
            .exclude(FieldSelection::from_paths(["address.pin"]));
        assert_eq!(
            prajwal().dump_text(&opts),
            json!({"address": {"city": "Austin", "state": "Texas"}})
        );

        // Both given for address's fields: include decides that level too.
        let opts = DumpOptions::new()
            .include(FieldSelection::from_paths(["name", "address.city", "address.pin"]))
            .exclude(FieldSelection::from_paths(["address.pin"]));
        assert_eq!(
            prajwal().dump_text(&opts),
            json!({"name": "Prajwal_G", "address": {"city": "Austin", "pin": "73301"}})
        );
    }

    #[test]
    fn test_whole_exclude_ignored_where_include_decides() {
        let opts = DumpOptions::new()
            .include(FieldSelection::fields(["name", "address"]))
            .exclude(FieldSelection::fields(["address"]));
        let rec = prajwal().dump_native(&opts);
        assert_eq!(keys(&rec), vec!["name", "address"]);
        let addr = rec.get("address").and_then(Value::as_record).unwrap();
        assert_eq!(addr.len(), 3);
    }

    #[test]
    fn test_model_default_dumps_as_instance() {
        let address = Schema::builder("Address")
            .field(FieldSpec::string("city"))
            .field(FieldSpec::string("pin").alias("postal_code"))
            .build();
        let fallback = validate(&address, &json!({"city": "Austin", "postal_code": "73301"}))
            .unwrap();
        let clinic = Schema::builder("Clinic")
            .field(FieldSpec::string("name"))
            .field(FieldSpec::model("address", &address).default_instance(fallback))
            .build();
        let inst = validate(&clinic, &json!({"name": "North"})).unwrap();

        let opts = DumpOptions::new()
            .by_alias(true)
            .exclude(FieldSelection::from_paths(["address.city"]));
        assert_eq!(
            inst.dump_text(&opts),
            json!({"name": "North", "address": {"postal_code": "73301"}})
        );
        assert_eq!(
            inst.dump_text(&DumpOptions::new().exclude_unset(true)),
            json!({"name": "North"})
        );
    }

    #[test]
    fn test_unknown_selection_keys_ignored() {
        let opts = DumpOptions::new().exclude(
            FieldSelection::fields(["nope"]).nested("address", FieldSelection::fields(["zip"])),
        );
        let rec = prajwal().dump_native(&opts);
        assert_eq!(rec.len(), 5);

        let opts = DumpOptions::new().include(FieldSelection::fields(["name", "nope"]));
        assert_eq!(keys(&prajwal().dump_native(&opts)), vec!["name"]);
    }

    #[test]
    fn test_exclude_none() {
        let rec = prajwal().dump_native(&DumpOptions::new().exclude_none(true));
        assert!(!rec.contains_key("phone"));
        assert!(rec.contains_key("gender"));
    }

    #[test]
    fn test_by_alias() {
        let schema = Schema::builder("PatientWithAlias")
            .populate_by_name(true)
            .field(FieldSpec::string("full_name").alias("name"))
            .field(FieldSpec::integer("age"))
            .field(FieldSpec::model("location", &address()).alias("address"))
            .build();
        let inst = validate(
            &schema,
            &json!({
                "name": "Michael Chen",
                "age": 28,
                "location": {"city": "Austin", "state": "Texas", "pin": "73301"}
            }),
        )
        .unwrap();
        assert_eq!(
            keys(&inst.dump_native(&DumpOptions::new())),
            vec!["full_name", "age", "location"]
        );
        assert_eq!(
            keys(&inst.dump_native(&DumpOptions::new().by_alias(true))),
            vec!["name", "age", "address"]
        );
    }

    #[test]
    fn test_exclude_by_canonical_name_drops_alias_too() {
        let schema = Schema::builder("P")
            .field(FieldSpec::model("location", &address()).alias("address"))
            .build();
        let inst = validate(
            &schema,
            &json!({"address": {"city": "Austin", "state": "Texas", "pin": "73301"}}),
        )
        .unwrap();
        let opts = DumpOptions::new()
            .by_alias(true)
            .exclude(FieldSelection::fields(["location"]));
        let rec = inst.dump_native(&opts);
        assert!(!rec.contains_key("address"));
        assert!(!rec.contains_key("location"));
    }

    #[test]
    fn test_modes() {
        let inst = validate(
            &address(),
            &json!({"city": "Austin", "state": "Texas", "pin": "73301"}),
        )
        .unwrap();

        let native = inst.dump(&DumpOptions::new());
        assert!(native.as_native().and_then(Value::as_record).is_some());

        let text = inst.dump(&DumpOptions::new().mode(DumpMode::Text));
        assert_eq!(
            text.as_text(),
            Some(&json!({"city": "Austin", "state": "Texas", "pin": "73301"}))
        );

        let json_text = inst.dump(&DumpOptions::new().mode(DumpMode::Json));
        assert_eq!(
            json_text.as_json(),
            Some(r#"{"city":"Austin","state":"Texas","pin":"73301"}"#)
        );
    }

    #[test]
    fn test_pretty_json() {
        let inst = validate(
            &address(),
            &json!({"city": "Austin", "state": "Texas", "pin": "73301"}),
        )
        .unwrap();
        let text = inst.dump_json(&DumpOptions::new().pretty(true));
        assert!(text.starts_with("{\n  \"city\": \"Austin\""));
    }

    #[test]
    fn test_datetime_native_vs_text() {
        let schema = Schema::builder("Vitals")
            .field(FieldSpec::datetime("last_checked"))
            .build();
        let inst =
            validate(&schema, &json!({"last_checked": "2026-01-15T17:00:00+05:00"})).unwrap();
        let native = inst.dump_native(&DumpOptions::new());
        assert!(native.get("last_checked").and_then(Value::as_timestamp).is_some());
        let text = inst.dump_text(&DumpOptions::new());
        assert_eq!(text, json!({"last_checked": "2026-01-15T12:00:00Z"}));
    }

    #[test]
    fn test_list_elements_share_selection() {
        let schema = Schema::builder("Clinic")
            .field(FieldSpec::list("sites", FieldType::Model(address())))
            .build();
        let inst = validate(
            &schema,
            &json!({"sites": [
                {"city": "Austin", "state": "Texas", "pin": "73301"},
                {"city": "Dallas", "state": "Texas", "pin": "75201"}
            ]}),
        )
        .unwrap();
        let opts = DumpOptions::new().exclude(
            FieldSelection::new().nested("sites", FieldSelection::fields(["pin", "state"])),
        );
        assert_eq!(
            inst.dump_text(&opts),
            json!({"sites": [{"city": "Austin"}, {"city": "Dallas"}]})
        );
    }
}
