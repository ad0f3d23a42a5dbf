//! # Validation
//!
//! [`Validator`] is the capability the example extractor and the HTTP layer
//! rely on: given a JSON value, report every [`Issue`] in emission order.
//! [`SchemaNode`] implements it directly.
//!
//! Messages follow the wording API clients of the registry have always seen
//! ("Expected string, received number", "Required", "Invalid email", ...).
//!
//! Structural problems with the schema (an empty enum, a NaN bound) abort
//! validation with a [`SchemaError`] instead of producing issues.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::issue::{format_path, Issue, IssueCode, PathSegment};
use crate::node::{NumberCheck, NumberSchema, ObjectSchema, SchemaNode, StringCheck, StringSchema};

/// Anything that can check a JSON value and report issues.
pub trait Validator {
    /// Validate `value`, returning all issues found.
    fn validate(&self, value: &Value) -> Result<ValidationOutcome, SchemaError>;
}

/// Result of a validation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    /// Issues in the order they were found.
    pub issues: Vec<Issue>,
}

impl ValidationOutcome {
    /// `Ok(())` on success, otherwise the issues.
    pub fn into_result(self) -> Result<(), Vec<Issue>> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues)
        }
    }
}

impl Validator for SchemaNode {
    fn validate(&self, value: &Value) -> Result<ValidationOutcome, SchemaError> {
        let mut cx = Cx::default();
        check(self, value, &mut cx)?;
        Ok(ValidationOutcome { issues: cx.issues })
    }
}

/// Walk state: current path and collected issues.
#[derive(Default)]
struct Cx {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl Cx {
    fn report(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues.push(Issue {
            code,
            path: self.path.clone(),
            message: message.into(),
        });
    }

    fn report_at(&mut self, segment: PathSegment, code: IssueCode, message: impl Into<String>) {
        self.path.push(segment);
        self.report(code, message);
        self.path.pop();
    }

    fn type_mismatch(&mut self, expected: &str, value: &Value) {
        self.report(
            IssueCode::InvalidType,
            format!("Expected {expected}, received {}", received_type(value)),
        );
    }

    fn location(&self) -> String {
        format_path(&self.path)
    }
}

fn check(node: &SchemaNode, value: &Value, cx: &mut Cx) -> Result<(), SchemaError> {
    match node {
        SchemaNode::String(schema) => {
            check_string(schema, value, cx);
            Ok(())
        }
        SchemaNode::Number(schema) => check_number(schema, value, cx),
        SchemaNode::Boolean => {
            if !value.is_boolean() {
                cx.type_mismatch("boolean", value);
            }
            Ok(())
        }
        SchemaNode::Enum { values } => check_enum(values, value, cx),
        SchemaNode::Array { element } => {
            let Some(items) = value.as_array() else {
                cx.type_mismatch("array", value);
                return Ok(());
            };
            for (index, item) in items.iter().enumerate() {
                cx.path.push(PathSegment::Index(index));
                let result = check(element, item, cx);
                cx.path.pop();
                result?;
            }
            Ok(())
        }
        SchemaNode::Object(schema) => check_object(schema, value, cx),
        SchemaNode::Optional { inner } => check(inner, value, cx),
        SchemaNode::Nullable { inner } => {
            if value.is_null() {
                Ok(())
            } else {
                check(inner, value, cx)
            }
        }
        SchemaNode::Union { members } => check_union(members, value, cx),
        SchemaNode::Other { .. } => Ok(()),
    }
}

fn check_string(schema: &StringSchema, value: &Value, cx: &mut Cx) {
    let Some(s) = value.as_str() else {
        cx.type_mismatch("string", value);
        return;
    };
    let len = s.chars().count();
    for check in &schema.checks {
        match check {
            StringCheck::MinLength(min) if len < *min => cx.report(
                IssueCode::TooSmall,
                format!("String must contain at least {min} character(s)"),
            ),
            StringCheck::MaxLength(max) if len > *max => cx.report(
                IssueCode::TooBig,
                format!("String must contain at most {max} character(s)"),
            ),
            StringCheck::Email if !labreg_core::email::is_valid_email(s) => {
                cx.report(IssueCode::InvalidString, "Invalid email")
            }
            StringCheck::Url if url::Url::parse(s).is_err() => {
                cx.report(IssueCode::InvalidString, "Invalid url")
            }
            StringCheck::Uuid if !is_hyphenated_uuid(s) => {
                cx.report(IssueCode::InvalidString, "Invalid uuid")
            }
            _ => {}
        }
    }
}

fn check_number(schema: &NumberSchema, value: &Value, cx: &mut Cx) -> Result<(), SchemaError> {
    for check in &schema.checks {
        if let NumberCheck::Min(bound) | NumberCheck::Max(bound) = check {
            if !bound.is_finite() {
                return Err(SchemaError::NonFiniteBound {
                    path: cx.location(),
                    value: *bound,
                });
            }
        }
    }
    let Some(n) = value.as_f64() else {
        cx.type_mismatch("number", value);
        return Ok(());
    };
    for check in &schema.checks {
        match check {
            NumberCheck::Integer if n.fract() != 0.0 => {
                cx.report(IssueCode::InvalidType, "Expected integer, received float")
            }
            NumberCheck::Min(min) if n < *min => cx.report(
                IssueCode::TooSmall,
                format!("Number must be greater than or equal to {min}"),
            ),
            NumberCheck::Max(max) if n > *max => cx.report(
                IssueCode::TooBig,
                format!("Number must be less than or equal to {max}"),
            ),
            _ => {}
        }
    }
    Ok(())
}

fn check_enum(values: &[String], value: &Value, cx: &mut Cx) -> Result<(), SchemaError> {
    if values.is_empty() {
        return Err(SchemaError::EmptyEnum {
            path: cx.location(),
        });
    }
    let expected = values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    match value.as_str() {
        None => cx.type_mismatch(&expected, value),
        Some(s) if !values.iter().any(|v| v == s) => cx.report(
            IssueCode::InvalidEnumValue,
            format!("Invalid enum value. Expected {expected}, received '{s}'"),
        ),
        Some(_) => {}
    }
    Ok(())
}

fn check_object(schema: &ObjectSchema, value: &Value, cx: &mut Cx) -> Result<(), SchemaError> {
    ensure_unique_fields(schema, &cx.path)?;
    let Some(map) = value.as_object() else {
        cx.type_mismatch("object", value);
        return Ok(());
    };
    for field in &schema.fields {
        match map.get(&field.name) {
            None if field.schema.accepts_missing() => {}
            None => cx.report_at(
                PathSegment::Key(field.name.clone()),
                IssueCode::InvalidType,
                "Required",
            ),
            Some(child) => {
                cx.path.push(PathSegment::Key(field.name.clone()));
                let result = check(&field.schema, child, cx);
                cx.path.pop();
                result?;
            }
        }
    }
    if schema.strict {
        report_unrecognized_keys(schema, map, cx);
    }
    Ok(())
}

fn report_unrecognized_keys(schema: &ObjectSchema, map: &Map<String, Value>, cx: &mut Cx) {
    let unknown: Vec<String> = map
        .keys()
        .filter(|key| schema.get(key).is_none())
        .map(|key| format!("'{key}'"))
        .collect();
    if !unknown.is_empty() {
        cx.report(
            IssueCode::UnrecognizedKeys,
            format!("Unrecognized key(s) in object: {}", unknown.join(", ")),
        );
    }
}

fn check_union(members: &[SchemaNode], value: &Value, cx: &mut Cx) -> Result<(), SchemaError> {
    if members.is_empty() {
        return Err(SchemaError::EmptyUnion {
            path: cx.location(),
        });
    }
    for member in members {
        let mut branch = Cx {
            path: cx.path.clone(),
            issues: Vec::new(),
        };
        check(member, value, &mut branch)?;
        if branch.issues.is_empty() {
            return Ok(());
        }
    }
    cx.report(IssueCode::InvalidUnion, "Invalid input");
    Ok(())
}

/// Reject objects that declare a field name twice.
pub(crate) fn ensure_unique_fields(
    schema: &ObjectSchema,
    path: &[PathSegment],
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                path: format_path(path),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn is_hyphenated_uuid(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::parse_str(s).is_ok()
}

fn received_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
