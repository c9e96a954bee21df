//! # Demo Subcommand
//!
//! Builds the patient models in code and prints each validation outcome
//! and serialization view: defaults, `exclude_unset`, include/exclude
//! (including a nested exclude), JSON text, datetimes under each mode,
//! and alias output.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use modelcheck_schema::{
    validate, DumpMode, DumpOptions, FieldSelection, FieldSpec, Instance, Schema,
};
use serde_json::json;

/// Arguments for the demo subcommand.
#[derive(Args, Debug, Default)]
pub struct DemoArgs {
    /// Indent JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// The patient models used by the demo.
#[derive(Debug, Clone)]
pub struct PatientModels {
    pub address: Arc<Schema>,
    pub vitals: Arc<Schema>,
    pub patient: Arc<Schema>,
    pub patient_with_alias: Arc<Schema>,
}

impl PatientModels {
    pub fn build() -> Self {
        let address = Schema::builder("Address")
            .description("Address model representing a physical location")
            .field(FieldSpec::string("city").min_length(2).description("City name"))
            .field(FieldSpec::string("state").min_length(2).description("State or province"))
            .field(
                FieldSpec::string("pin")
                    .min_length(5)
                    .max_length(6)
                    .description("Postal code"),
            )
            .build();

        let vitals = Schema::builder("Vitals")
            .description("Patient health metrics")
            .field(
                FieldSpec::string("blood_pressure")
                    .pattern(r"^\d{2,3}/\d{2,3}$")
                    .description("Blood pressure reading"),
            )
            .field(FieldSpec::integer("heart_rate").ge(30.0).le(200.0))
            .field(FieldSpec::float("temperature").ge(95.0).le(105.0))
            .field(
                FieldSpec::datetime("last_checked")
                    .default_now()
                    .description("When vitals were last recorded"),
            )
            .build();

        let patient = Schema::builder("Patient")
            .description("Patient model with nested address")
            .field(FieldSpec::string("name").min_length(2))
            .field(FieldSpec::string("gender").default("Male"))
            .field(FieldSpec::integer("age").ge(0.0).le(120.0))
            .field(FieldSpec::model("address", &address))
            .field(FieldSpec::string("phone").optional())
            .field(FieldSpec::model("vitals", &vitals).optional())
            .build();

        let patient_with_alias = Schema::builder("PatientWithAlias")
            .description("Patient model with field aliases")
            .populate_by_name(true)
            .field(FieldSpec::string("full_name").alias("name"))
            .field(FieldSpec::string("gender").default("Male"))
            .field(FieldSpec::integer("age").ge(0.0).le(120.0))
            .field(FieldSpec::model("location", &address).alias("address"))
            .build();

        Self {
            address,
            vitals,
            patient,
            patient_with_alias,
        }
    }
}

fn austin() -> serde_json::Value {
    json!({"city": "Austin", "state": "Texas", "pin": "73301"})
}

fn section(out: &mut impl Write, title: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "== {title} ==")
}

fn show(
    out: &mut impl Write,
    label: &str,
    instance: &Instance,
    options: &DumpOptions,
) -> std::io::Result<()> {
    writeln!(out, "{label}: {}", instance.dump(options))
}

/// Execute the demo subcommand.
pub fn run(args: &DemoArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let models = PatientModels::build();
    let json_mode = || DumpOptions::new().mode(DumpMode::Json).pretty(args.pretty);

    section(out, "Address")?;
    let address = validate(&models.address, &austin())?;
    show(out, "valid", &address, &DumpOptions::new().mode(DumpMode::Text))?;
    match validate(&models.address, &json!({"city": "A", "state": "T", "pin": "123"})) {
        Ok(_) => writeln!(out, "invalid address was accepted")?,
        Err(report) => writeln!(out, "rejected with {} error(s):\n{report}", report.len())?,
    }

    section(out, "Patient")?;
    let prajwal = validate(
        &models.patient,
        &json!({"name": "Prajwal_G", "age": 24, "address": austin()}),
    )?;
    tracing::debug!(fields_set = ?prajwal.fields_set(), "patient validated");
    show(out, "default", &prajwal, &DumpOptions::new())?;
    show(out, "exclude_unset", &prajwal, &DumpOptions::new().exclude_unset(true))?;
    show(
        out,
        "include {name, age}",
        &prajwal,
        &DumpOptions::new().include(FieldSelection::fields(["name", "age"])),
    )?;
    show(
        out,
        "exclude {address}",
        &prajwal,
        &DumpOptions::new().exclude(FieldSelection::fields(["address"])),
    )?;
    show(
        out,
        "exclude {address: {pin}}",
        &prajwal,
        &DumpOptions::new().exclude(FieldSelection::from_paths(["address.pin"])),
    )?;
    show(out, "json", &prajwal, &json_mode())?;

    let sarah = validate(
        &models.patient,
        &json!({
            "name": "Sarah Johnson",
            "gender": "Female",
            "age": 30,
            "address": austin(),
            "phone": "+1-555-0123"
        }),
    )?;
    show(out, "with phone, exclude_unset", &sarah, &DumpOptions::new().exclude_unset(true))?;

    section(out, "Vitals")?;
    let with_vitals = validate(
        &models.patient,
        &json!({
            "name": "Prawjal Ghotkar",
            "gender": "male",
            "age": 24,
            "address": austin(),
            "vitals": {"blood_pressure": "118/78", "heart_rate": 68, "temperature": 98.4}
        }),
    )?;
    show(out, "native", &with_vitals, &DumpOptions::new())?;
    show(out, "text", &with_vitals, &DumpOptions::new().mode(DumpMode::Text))?;
    show(out, "json", &with_vitals, &json_mode())?;
    show(
        out,
        "vitals without last_checked",
        &with_vitals,
        &DumpOptions::new()
            .include(FieldSelection::fields(["vitals"]))
            .exclude_unset(true)
            .mode(DumpMode::Text),
    )?;

    section(out, "Invalid patient")?;
    match validate(
        &models.patient,
        &json!({"name": "P", "gender": "unknown", "age": 150, "address": austin()}),
    ) {
        Ok(_) => writeln!(out, "invalid patient was accepted")?,
        Err(report) => writeln!(out, "rejected with {} error(s):\n{report}", report.len())?,
    }

    section(out, "Aliases")?;
    let michael = validate(
        &models.patient_with_alias,
        &json!({"name": "Michael Chen", "age": 28, "location": austin()}),
    )?;
    show(out, "by name", &michael, &DumpOptions::new().mode(DumpMode::Text))?;
    show(
        out,
        "by alias",
        &michael,
        &DumpOptions::new().by_alias(true).mode(DumpMode::Text),
    )?;
    show(out, "by alias, json", &michael, &json_mode().by_alias(true))?;

    tracing::info!("demo complete");
    Ok(())
}
