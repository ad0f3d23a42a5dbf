//! # Custom Extractors & Validation
//!
//! Request bodies are extracted as raw JSON, checked against the request
//! type's [`SchemaNode`], and only then deserialized. Schema failures become
//! [`AppError::Validation`] carrying every issue, so clients see the same
//! codes and paths the OpenAPI examples advertise.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use labreg_schema::{Issue, SchemaNode, Validator};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// A request DTO validated by a schema before deserialization.
pub trait ValidatedBody: DeserializeOwned {
    /// Schema the raw JSON body must satisfy.
    fn schema() -> &'static SchemaNode;

    /// Cross-field rules the schema cannot express.
    fn check(&self) -> Result<(), Vec<Issue>> {
        Ok(())
    }
}

/// Extract a JSON body, mapping rejections to [`AppError::BadRequest`].
///
/// Handlers take `body: Result<Json<Value>, JsonRejection>` and pass it here.
pub fn extract_json(result: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it against `T`'s schema.
pub fn extract_validated_json<T: ValidatedBody>(
    result: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    validate_value(&value)
}

/// Validate an already-extracted JSON value and deserialize it.
pub fn validate_value<T: ValidatedBody>(value: &Value) -> Result<T, AppError> {
    let outcome = T::schema()
        .validate(value)
        .map_err(|e| AppError::Internal(format!("request schema is malformed: {e}")))?;
    outcome.into_result().map_err(AppError::Validation)?;

    let parsed: T = serde_json::from_value(value.clone())
        .map_err(|e| AppError::Unprocessable(e.to_string()))?;
    parsed.check().map_err(AppError::Validation)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labreg_schema::{number, object, string, IssueCode, PathSegment};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::OnceLock;

    #[derive(Debug, Deserialize)]
    struct Probe {
        label: String,
        low: f64,
        high: f64,
    }

    impl ValidatedBody for Probe {
        fn schema() -> &'static SchemaNode {
            static SCHEMA: OnceLock<SchemaNode> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                object()
                    .field("label", string().min_length(1))
                    .field("low", number())
                    .field("high", number())
                    .into()
            })
        }

        fn check(&self) -> Result<(), Vec<Issue>> {
            if self.low > self.high {
                return Err(vec![Issue {
                    code: IssueCode::Custom("custom".into()),
                    path: vec![PathSegment::Key("low".into())],
                    message: "low must not exceed high".into(),
                }]);
            }
            Ok(())
        }
    }

    #[test]
    fn valid_body_deserializes() {
        let probe: Probe = validate_value(&json!({"label": "t", "low": 1, "high": 2})).unwrap();
        assert_eq!(probe.label, "t");
        assert_eq!(probe.high, 2.0);
    }

    #[test]
    fn schema_issues_become_validation_error() {
        let err = validate_value::<Probe>(&json!({"label": "", "low": "x"})).unwrap_err();
        let issues = match err {
            AppError::Validation(issues) => issues,
            other => panic!("expected Validation, got {other:?}"),
        };
        let codes: Vec<&str> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, ["too_small", "invalid_type", "invalid_type"]);
        assert_eq!(issues[2].message, "Required");
    }

    #[test]
    fn cross_field_check_runs_after_schema() {
        let err = validate_value::<Probe>(&json!({"label": "t", "low": 5, "high": 2})).unwrap_err();
        let issues = match err {
            AppError::Validation(issues) => issues,
            other => panic!("expected Validation, got {other:?}"),
        };
        assert_eq!(issues[0].message, "low must not exceed high");
    }
}
