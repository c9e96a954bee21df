//! # modelcheck-core: Foundational Types
//!
//! Leaf crate of the modelcheck workspace. Defines the types every other
//! crate speaks in:
//!
//! - [`ErrorReport`] / [`FieldError`] / [`ErrorKind`]: the structured,
//!   accumulated outcome of a failed validation call.
//! - [`FieldPath`]: dotted location of a field inside nested data
//!   (`address.pin`, `visits.0.pin`).
//! - [`Timestamp`]: UTC datetime with microsecond precision and an
//!   ISO-8601 rendering.
//! - [`Value`] / [`Record`]: the native, order-preserving value tree
//!   produced by dumping an instance.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `modelcheck-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod path;
pub mod temporal;
pub mod value;

pub use error::{ErrorKind, ErrorReport, FieldError, ModelcheckError};
pub use path::{FieldPath, PathSegment};
pub use temporal::Timestamp;
pub use value::{Record, Value};
