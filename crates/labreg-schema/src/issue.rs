//! # Validation Issues
//!
//! An [`Issue`] is one violation reported by the validator: a machine-readable
//! [`IssueCode`], the [`PathSegment`]s locating the offending value, and a
//! human-readable message. Codes serialize to the same snake-case strings
//! API clients already match on (`invalid_type`, `too_small`, ...).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Machine-readable category of a validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueCode {
    /// The value has the wrong JSON type, or a required field is missing.
    InvalidType,
    /// A string failed a format check (email, url, uuid).
    InvalidString,
    /// Below a minimum length or value.
    TooSmall,
    /// Above a maximum length or value.
    TooBig,
    /// Not one of the allowed enum values.
    InvalidEnumValue,
    /// A strict object received undeclared keys.
    UnrecognizedKeys,
    /// A required field is missing.
    RequiredError,
    /// No member of a union accepted the value.
    InvalidUnion,
    /// Any other code, kept verbatim.
    Custom(String),
}

impl IssueCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::InvalidString => "invalid_string",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::RequiredError => "required_error",
            Self::InvalidUnion => "invalid_union",
            Self::Custom(code) => code,
        }
    }

    /// Parse a wire code. Unknown codes become [`IssueCode::Custom`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "invalid_type" => Self::InvalidType,
            "invalid_string" => Self::InvalidString,
            "too_small" => Self::TooSmall,
            "too_big" => Self::TooBig,
            "invalid_enum_value" => Self::InvalidEnumValue,
            "unrecognized_keys" => Self::UnrecognizedKeys,
            "required_error" => Self::RequiredError,
            "invalid_union" => Self::InvalidUnion,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Message used when the validator supplied none.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::InvalidType => "Invalid type provided",
            Self::InvalidString => "Invalid string format",
            Self::TooSmall => "Value is too small",
            Self::TooBig => "Value is too large",
            Self::InvalidEnumValue => "Invalid enum value",
            Self::UnrecognizedKeys => "Unrecognized keys in object",
            Self::RequiredError => "Required field is missing",
            Self::InvalidUnion | Self::Custom(_) => "Validation error",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IssueCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IssueCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}

/// One step of a path into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array index.
    Index(usize),
    /// Object key.
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

/// Render a path as `a.0.b`, or `(root)` when empty.
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Category of the failure.
    pub code: IssueCode,
    /// Location of the offending value.
    pub path: Vec<PathSegment>,
    /// Human-readable description. May be empty for third-party validators.
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", format_path(&self.path), self.message, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_round_trip_through_wire_strings() {
        for code in [
            IssueCode::InvalidType,
            IssueCode::InvalidString,
            IssueCode::TooSmall,
            IssueCode::TooBig,
            IssueCode::InvalidEnumValue,
            IssueCode::UnrecognizedKeys,
            IssueCode::RequiredError,
            IssueCode::InvalidUnion,
        ] {
            assert_eq!(IssueCode::from_code(code.as_str()), code);
        }
        assert_eq!(
            IssueCode::from_code("not_multiple_of"),
            IssueCode::Custom("not_multiple_of".into())
        );
    }

    #[test]
    fn default_message_table() {
        assert_eq!(IssueCode::InvalidType.default_message(), "Invalid type provided");
        assert_eq!(IssueCode::InvalidString.default_message(), "Invalid string format");
        assert_eq!(IssueCode::TooSmall.default_message(), "Value is too small");
        assert_eq!(IssueCode::TooBig.default_message(), "Value is too large");
        assert_eq!(IssueCode::InvalidEnumValue.default_message(), "Invalid enum value");
        assert_eq!(
            IssueCode::UnrecognizedKeys.default_message(),
            "Unrecognized keys in object"
        );
        assert_eq!(
            IssueCode::RequiredError.default_message(),
            "Required field is missing"
        );
        assert_eq!(IssueCode::InvalidUnion.default_message(), "Validation error");
        assert_eq!(
            IssueCode::Custom("whatever".into()).default_message(),
            "Validation error"
        );
    }

    #[test]
    fn issue_serializes_with_mixed_path() {
        let issue = Issue {
            code: IssueCode::TooSmall,
            path: vec!["users".into(), PathSegment::Index(0), "age".into()],
            message: "Value is too small".into(),
        };
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({"code": "too_small", "path": ["users", 0, "age"], "message": "Value is too small"})
        );
    }

    #[test]
    fn issue_deserializes_without_message() {
        let issue: Issue =
            serde_json::from_value(json!({"code": "custom_rule", "path": ["a", 2]})).unwrap();
        assert_eq!(issue.code, IssueCode::Custom("custom_rule".into()));
        assert_eq!(issue.path, vec![PathSegment::Key("a".into()), PathSegment::Index(2)]);
        assert!(issue.message.is_empty());
    }

    #[test]
    fn format_path_renders_root_and_nested() {
        assert_eq!(format_path(&[]), "(root)");
        assert_eq!(format_path(&["a".into(), PathSegment::Index(3), "b".into()]), "a.3.b");
    }
}
