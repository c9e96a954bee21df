//! # modelcheck-cli: Command-Line Interface
//!
//! Validates JSON documents against models declared in a schema file and
//! prints the dumped result under the requested selection options.
//!
//! ## Subcommands
//!
//! - `validate`: validate one input document against a named model
//! - `demo`: walk the patient models through every validation outcome
//!   and serialization view
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `modelcheck-schema`; no validation or
//!   serialization logic lives here.
//! - Handlers write to caller-supplied writers so output is testable.

pub mod demo;
pub mod validate;
