//! # modelcheck-schema: Schema Validation & Serialization
//!
//! Declare schemas, validate untyped input against them, and dump the
//! resulting instances.
//!
//! ```
//! use modelcheck_schema::{validate, DumpOptions, FieldSpec, Schema};
//! use serde_json::json;
//!
//! let address = Schema::builder("Address")
//!     .field(FieldSpec::string("city").min_length(2))
//!     .field(FieldSpec::string("state").min_length(2))
//!     .field(FieldSpec::string("pin").min_length(5).max_length(6))
//!     .build();
//!
//! let instance = validate(&address, &json!({"city": "Austin", "state": "Texas", "pin": "73301"}))
//!     .expect("valid address");
//! assert_eq!(
//!     instance.dump_json(&DumpOptions::new()),
//!     r#"{"city":"Austin","state":"Texas","pin":"73301"}"#
//! );
//!
//! let report = validate(&address, &json!({"city": "A", "state": "T", "pin": "123"}))
//!     .expect_err("three violations");
//! assert_eq!(report.count_kind("constraint_violation"), 3);
//! ```
//!
//! ## Modules
//!
//! - [`field`] / [`schema`]: declarative field specs and schema builders.
//! - [`validate`](mod@validate): the accumulating validator; [`coerce`] and
//!   [`constraint`] hold its per-value rules.
//! - [`options`] / [`dump`](mod@dump): serializer configuration and output.
//! - [`registry`]: schemas declared in YAML or JSON documents.
//!
//! ## Crate Policy
//!
//! - Depends only on `modelcheck-core` internally.
//! - Schemas and instances are immutable once built and are `Send + Sync`.
//! - Validation returns an instance or a complete report, never both.

pub mod coerce;
pub mod constraint;
pub mod dump;
pub mod field;
pub mod instance;
pub mod options;
pub mod registry;
pub mod schema;
pub mod validate;

pub use dump::{dump, Dumped};
pub use field::{Constraint, DefaultValue, FieldSpec, FieldType, Pattern};
pub use instance::{FieldValue, Instance, Origin};
pub use options::{DumpMode, DumpOptions, FieldSelection, SubSelection};
pub use registry::SchemaRegistry;
pub use schema::{ExtraPolicy, ModelConfig, Schema, SchemaBuilder};
pub use validate::{validate, Validator};
