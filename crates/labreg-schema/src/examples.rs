//! # Validation-Error Examples
//!
//! Produces the short list of issues shown as the example body of every
//! documented 422 response. The schema's bad data (see [`crate::synth`]) is
//! run through a [`Validator`] and the first few issues are kept.
//!
//! Extraction never fails: if the synthesized data unexpectedly passes, the
//! schema is malformed, or the validator panics, a single fixed fallback
//! example is returned instead. Documentation generation must never stop
//! the service from starting.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::issue::{Issue, IssueCode, PathSegment};
use crate::node::SchemaNode;
use crate::synth::synthesize;
use crate::validate::Validator;

/// At most this many examples are extracted per schema.
pub const MAX_EXAMPLE_ISSUES: usize = 3;

const FALLBACK_FIELD: &str = "field";
const FALLBACK_MESSAGE: &str = "Expected string, received number";

/// One example validation error, as embedded in the API docs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExample {
    /// Issue code, e.g. `too_small`.
    pub code: IssueCode,
    /// Location of the offending value.
    pub path: Vec<PathSegment>,
    /// Human-readable message. Never empty.
    pub message: String,
}

impl From<Issue> for ErrorExample {
    fn from(issue: Issue) -> Self {
        let message = if issue.message.is_empty() {
            issue.code.default_message().to_string()
        } else {
            issue.message
        };
        Self {
            code: issue.code,
            path: issue.path,
            message,
        }
    }
}

/// The example used whenever real examples cannot be produced.
pub fn fallback_example() -> ErrorExample {
    ErrorExample {
        code: IssueCode::InvalidType,
        path: vec![PathSegment::Key(FALLBACK_FIELD.to_string())],
        message: FALLBACK_MESSAGE.to_string(),
    }
}

/// Extract up to [`MAX_EXAMPLE_ISSUES`] examples for `schema`, validating
/// the synthesized data with `validator`.
///
/// Always returns at least one example.
pub fn extract_error_examples(schema: &SchemaNode, validator: &dyn Validator) -> Vec<ErrorExample> {
    let attempt = catch_unwind(AssertUnwindSafe(|| collect(schema, validator)));
    match attempt {
        Ok(Ok(examples)) if !examples.is_empty() => examples,
        Ok(Ok(_)) => {
            tracing::debug!(
                schema = schema.kind(),
                "synthesized data passed validation, using fallback example"
            );
            vec![fallback_example()]
        }
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "could not extract validation examples");
            vec![fallback_example()]
        }
        Err(_) => {
            tracing::warn!("validator panicked while extracting validation examples");
            vec![fallback_example()]
        }
    }
}

/// [`extract_error_examples`] with the schema acting as its own validator.
pub fn error_examples(schema: &SchemaNode) -> Vec<ErrorExample> {
    extract_error_examples(schema, schema)
}

fn collect(schema: &SchemaNode, validator: &dyn Validator) -> Result<Vec<ErrorExample>, SchemaError> {
    let data = synthesize(schema)?;
    let outcome = validator.validate(&data)?;
    Ok(outcome
        .issues
        .into_iter()
        .take(MAX_EXAMPLE_ISSUES)
        .map(ErrorExample::from)
        .collect())
}
