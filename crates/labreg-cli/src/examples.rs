//! # Examples Subcommand
//!
//! Shows what the OpenAPI document would advertise for a schema: the
//! synthesized invalid data and the validation-error examples extracted
//! from it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use labreg_schema::{error_examples, synthesize, SchemaNode};
use serde_json::{json, Value};

/// Arguments for the `labreg examples` subcommand.
#[derive(Args, Debug)]
pub struct ExamplesArgs {
    /// Schema file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(value_name = "SCHEMA")]
    pub path: PathBuf,
}

/// Execute the examples subcommand.
///
/// Returns exit code: 0 on success, 1 if the schema is malformed. Examples
/// are printed either way.
pub fn run_examples(args: &ExamplesArgs) -> Result<u8> {
    let schema = crate::load_schema(&args.path)?;
    let (report, ok) = render(&schema);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if ok { 0 } else { 1 })
}

/// Build the report for `schema`; the flag is false when synthesis failed.
pub fn render(schema: &SchemaNode) -> (Value, bool) {
    let examples = error_examples(schema);
    match synthesize(schema) {
        Ok(data) => (json!({ "data": data, "examples": examples }), true),
        Err(err) => {
            tracing::warn!(error = %err, "schema is malformed");
            (
                json!({ "data": null, "error": err.to_string(), "examples": examples }),
                false,
            )
        }
    }
}
