//! # labreg-cli - CLI Tool for the Laboratory Registry
//!
//! ## Subcommands
//!
//! - `labreg openapi` - write the API's OpenAPI document.
//! - `labreg examples` - show the bad data and validation-error examples
//!   derived from a schema file.
//! - `labreg check` - validate a document against a schema file.
//!
//! ```bash
//! labreg openapi --out openapi.json
//! labreg examples schemas/create-user.yaml
//! labreg check schemas/create-user.yaml request.json
//! ```

pub mod check;
pub mod examples;
pub mod openapi;

use std::path::Path;

use anyhow::{Context, Result};
use labreg_schema::SchemaNode;
use serde_json::Value;

/// Read a JSON or YAML file. `.yaml` / `.yml` select YAML, anything else JSON.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))
    }
}

/// Load a [`SchemaNode`] from a JSON or YAML file.
pub fn load_schema(path: &Path) -> Result<SchemaNode> {
    let raw = read_document(path)?;
    serde_json::from_value(raw)
        .with_context(|| format!("{} is not a valid schema", path.display()))
}
