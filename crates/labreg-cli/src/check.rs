//! # Check Subcommand
//!
//! Validates a JSON or YAML document against a schema file and prints each
//! issue with its path, the way the API would report it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use labreg_schema::{format_path, Issue, SchemaNode, Validator};
use serde_json::Value;

/// Arguments for the `labreg check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema file.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Document to validate.
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the document is valid, 1 otherwise.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let schema = crate::load_schema(&args.schema)?;
    let document = crate::read_document(&args.document)?;
    let issues = check(&schema, &document)
        .with_context(|| format!("schema {} is malformed", args.schema.display()))?;

    if issues.is_empty() {
        println!("OK: {}", args.document.display());
        return Ok(0);
    }
    for issue in &issues {
        println!("  FAIL: {} [{}] {}", format_path(&issue.path), issue.code, issue.message);
    }
    println!("\n{} issue(s) in {}", issues.len(), args.document.display());
    Ok(1)
}

/// Validate `document`, returning every issue found.
pub fn check(schema: &SchemaNode, document: &Value) -> Result<Vec<Issue>> {
    Ok(schema.validate(document)?.issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const SCHEMA: &str = "kind: object\nfields:\n  - name: email\n    schema:\n      kind: string\n      checks: [email]\n";

    #[test]
    fn valid_document_exits_zero() {
        let schema = temp(".yaml", SCHEMA);
        let doc = temp(".json", r#"{"email": "ada@example.edu"}"#);
        let args = CheckArgs {
            schema: schema.path().to_path_buf(),
            document: doc.path().to_path_buf(),
        };
        assert_eq!(run_check(&args).unwrap(), 0);
    }

    #[test]
    fn invalid_document_exits_one() {
        let schema = temp(".yaml", SCHEMA);
        let doc = temp(".yml", "email: nope\n");
        let args = CheckArgs {
            schema: schema.path().to_path_buf(),
            document: doc.path().to_path_buf(),
        };
        assert_eq!(run_check(&args).unwrap(), 1);
    }

    #[test]
    fn malformed_schema_is_an_error() {
        let schema: SchemaNode =
            serde_json::from_str(r#"{"kind": "enum", "values": []}"#).unwrap();
        assert!(check(&schema, &Value::from("x")).is_err());
    }
}
