//! # OpenAPI Subcommand
//!
//! Writes the API's OpenAPI document, including the synthesized 422
//! examples, without starting the server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use utoipa::OpenApi;

/// Arguments for the `labreg openapi` subcommand.
#[derive(Args, Debug)]
pub struct OpenapiArgs {
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

/// Execute the openapi subcommand.
pub fn run_openapi(args: &OpenapiArgs) -> Result<u8> {
    let rendered = render()?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote OpenAPI document");
        }
        None => println!("{rendered}"),
    }
    Ok(0)
}

/// The OpenAPI document as pretty-printed JSON.
pub fn render() -> Result<String> {
    serde_json::to_string_pretty(&labreg_api::openapi::ApiDoc::openapi())
        .context("failed to serialize OpenAPI document")
}
