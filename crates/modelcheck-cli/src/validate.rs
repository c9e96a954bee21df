//! # Validate Subcommand
//!
//! Loads a schema document, validates one JSON input against a named model,
//! and prints either the dump or the error report.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, ValueEnum};
use modelcheck_core::ModelcheckError;
use modelcheck_schema::{DumpMode, DumpOptions, FieldSelection, SchemaRegistry};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document (YAML or JSON) declaring the models.
    #[arg(long)]
    pub schemas: PathBuf,

    /// Name of the model to validate against.
    #[arg(long)]
    pub model: String,

    /// JSON document to validate.
    #[arg(long)]
    pub input: PathBuf,

    /// Output shape of the dump.
    #[arg(long, value_enum, default_value_t = ModeArg::Json)]
    pub mode: ModeArg,

    /// Fields to keep, as comma-separated dotted paths (`name,address.city`).
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Fields to drop, as comma-separated dotted paths (`address.pin`).
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Drop fields that were filled from defaults.
    #[arg(long)]
    pub exclude_unset: bool,

    /// Drop fields whose value is null.
    #[arg(long)]
    pub exclude_none: bool,

    /// Use field aliases as output keys.
    #[arg(long)]
    pub by_alias: bool,

    /// Indent JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Print the error report as JSON instead of text.
    #[arg(long)]
    pub report_json: bool,
}

/// Dump mode as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Native,
    Text,
    Json,
}

impl From<ModeArg> for DumpMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Native => DumpMode::Native,
            ModeArg::Text => DumpMode::Text,
            ModeArg::Json => DumpMode::Json,
        }
    }
}

/// Result of a validate run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Valid => ExitCode::SUCCESS,
            Outcome::Invalid => ExitCode::FAILURE,
        }
    }
}

impl ValidateArgs {
    /// Build dump options from the selection flags.
    pub fn dump_options(&self) -> DumpOptions {
        let mut options = DumpOptions::new()
            .exclude_unset(self.exclude_unset)
            .exclude_none(self.exclude_none)
            .by_alias(self.by_alias)
            .mode(self.mode.into())
            .pretty(self.pretty);
        if !self.include.is_empty() {
            options = options.include(FieldSelection::from_paths(&self.include));
        }
        if !self.exclude.is_empty() {
            options = options.exclude(FieldSelection::from_paths(&self.exclude));
        }
        options
    }
}

/// Execute the validate subcommand.
///
/// The dump goes to `out`; a validation failure writes the report to `err`
/// and yields [`Outcome::Invalid`]. Unreadable files and malformed schema
/// documents are returned as errors.
pub fn run(
    args: &ValidateArgs,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let registry = SchemaRegistry::load(&args.schemas)
        .with_context(|| format!("failed to load schemas from {}", args.schemas.display()))?;

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    match registry.validate(&args.model, &raw) {
        Ok(instance) => {
            tracing::info!(model = %args.model, input = %args.input.display(), "input is valid");
            writeln!(out, "{}", instance.dump(&args.dump_options()))?;
            Ok(Outcome::Valid)
        }
        Err(ModelcheckError::Validation { schema, report }) => {
            tracing::warn!(model = %schema, errors = report.len(), "input is invalid");
            if args.report_json {
                let rendered = if args.pretty {
                    serde_json::to_string_pretty(&report)?
                } else {
                    serde_json::to_string(&report)?
                };
                writeln!(err, "{rendered}")?;
            } else {
                writeln!(err, "{} validation error(s) for {schema}:", report.len())?;
                writeln!(err, "{report}")?;
            }
            Ok(Outcome::Invalid)
        }
        Err(other) => Err(other.into()),
    }
}
