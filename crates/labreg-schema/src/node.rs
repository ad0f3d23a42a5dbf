//! # Schema Nodes
//!
//! A schema is a tree of [`SchemaNode`]s, one variant per kind of rule.
//! Constraints on strings and numbers are kept as ordered lists so the order
//! in which they were declared is observable: the validator reports failures
//! in that order and the synthesizer acts on the first one only.
//!
//! Nodes are usually built with the free functions re-exported at the crate
//! root:
//!
//! ```
//! use labreg_schema::{enumeration, number, object, string};
//!
//! let schema = object()
//!     .field("email", string().email())
//!     .field("age", number().int().min(18.0))
//!     .field("role", enumeration(["teacher", "admin"]))
//!     .field("nickname", string().max_length(20).optional());
//! # let _ = schema;
//! ```
//!
//! They also (de)serialize, tagged by `kind`, so schemas can be kept in JSON
//! or YAML files. A `kind` this crate does not know loads as
//! [`SchemaNode::Other`] named after it.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of a validation schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    /// A string, with optional constraints.
    String(StringSchema),
    /// A number, with optional constraints.
    Number(NumberSchema),
    /// `true` or `false`.
    Boolean,
    /// One of a fixed set of string literals.
    Enum {
        /// Allowed values.
        values: Vec<String>,
    },
    /// A homogeneous array.
    Array {
        /// Schema every element must satisfy.
        element: Box<SchemaNode>,
    },
    /// An object with declared fields.
    Object(ObjectSchema),
    /// The wrapped schema, or absent.
    Optional {
        /// Schema applied when the value is present.
        inner: Box<SchemaNode>,
    },
    /// The wrapped schema, or `null`.
    Nullable {
        /// Schema applied when the value is not `null`.
        inner: Box<SchemaNode>,
    },
    /// Any one of the member schemas.
    Union {
        /// Candidate schemas, tried in order.
        members: Vec<SchemaNode>,
    },
    /// A rule this crate cannot introspect. Accepts every value.
    Other {
        /// Free-form description of the opaque rule.
        name: String,
    },
}

impl SchemaNode {
    /// Short name of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Enum { .. } => "enum",
            Self::Array { .. } => "array",
            Self::Object(_) => "object",
            Self::Optional { .. } => "optional",
            Self::Nullable { .. } => "nullable",
            Self::Union { .. } => "union",
            Self::Other { .. } => "other",
        }
    }

    /// Allow the value to be absent.
    pub fn optional(self) -> SchemaNode {
        SchemaNode::Optional {
            inner: Box::new(self),
        }
    }

    /// Allow the value to be `null`.
    pub fn nullable(self) -> SchemaNode {
        SchemaNode::Nullable {
            inner: Box::new(self),
        }
    }

    /// Whether an object field with this schema may be left out entirely.
    pub fn accepts_missing(&self) -> bool {
        matches!(self, Self::Optional { .. } | Self::Other { .. })
    }
}

const KNOWN_KINDS: [&str; 10] = [
    "string", "number", "boolean", "enum", "array", "object", "optional", "nullable", "union",
    "other",
];

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum KnownNode {
    String(StringSchema),
    Number(NumberSchema),
    Boolean,
    Enum { values: Vec<String> },
    Array { element: Box<SchemaNode> },
    Object(ObjectSchema),
    Optional { inner: Box<SchemaNode> },
    Nullable { inner: Box<SchemaNode> },
    Union { members: Vec<SchemaNode> },
    Other {
        #[serde(default)]
        name: String,
    },
}

impl From<KnownNode> for SchemaNode {
    fn from(node: KnownNode) -> Self {
        match node {
            KnownNode::String(s) => Self::String(s),
            KnownNode::Number(n) => Self::Number(n),
            KnownNode::Boolean => Self::Boolean,
            KnownNode::Enum { values } => Self::Enum { values },
            KnownNode::Array { element } => Self::Array { element },
            KnownNode::Object(o) => Self::Object(o),
            KnownNode::Optional { inner } => Self::Optional { inner },
            KnownNode::Nullable { inner } => Self::Nullable { inner },
            KnownNode::Union { members } => Self::Union { members },
            KnownNode::Other { name } => Self::Other { name },
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let kind = match raw.get("kind") {
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "schema kind must be a string, got {other}"
                )))
            }
            None => return Err(de::Error::missing_field("kind")),
        };
        if !KNOWN_KINDS.contains(&kind.as_str()) {
            return Ok(Self::Other { name: kind });
        }
        KnownNode::deserialize(raw)
            .map(Self::from)
            .map_err(de::Error::custom)
    }
}

// -- Strings ------------------------------------------------------------------

/// A single string constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringCheck {
    /// At least this many characters.
    MinLength(usize),
    /// At most this many characters.
    MaxLength(usize),
    /// An email address.
    Email,
    /// An absolute URL.
    Url,
    /// A hyphenated UUID.
    Uuid,
}

/// String schema with constraints in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringSchema {
    /// Constraints, in the order they were declared.
    #[serde(default)]
    pub checks: Vec<StringCheck>,
}

impl StringSchema {
    /// Require at least `n` characters.
    pub fn min_length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::MinLength(n));
        self
    }

    /// Require at most `n` characters.
    pub fn max_length(mut self, n: usize) -> Self {
        self.checks.push(StringCheck::MaxLength(n));
        self
    }

    /// Require an email address.
    pub fn email(mut self) -> Self {
        self.checks.push(StringCheck::Email);
        self
    }

    /// Require an absolute URL.
    pub fn url(mut self) -> Self {
        self.checks.push(StringCheck::Url);
        self
    }

    /// Require a hyphenated UUID.
    pub fn uuid(mut self) -> Self {
        self.checks.push(StringCheck::Uuid);
        self
    }
}

// -- Numbers ------------------------------------------------------------------

/// A single numeric constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberCheck {
    /// Greater than or equal to this bound.
    Min(f64),
    /// Less than or equal to this bound.
    Max(f64),
    /// No fractional part.
    Integer,
}

/// Number schema with constraints in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberSchema {
    /// Constraints, in the order they were declared.
    #[serde(default)]
    pub checks: Vec<NumberCheck>,
}

impl NumberSchema {
    /// Require a value `>= bound`.
    pub fn min(mut self, bound: f64) -> Self {
        self.checks.push(NumberCheck::Min(bound));
        self
    }

    /// Require a value `<= bound`.
    pub fn max(mut self, bound: f64) -> Self {
        self.checks.push(NumberCheck::Max(bound));
        self
    }

    /// Require an integral value.
    pub fn int(mut self) -> Self {
        self.checks.push(NumberCheck::Integer);
        self
    }
}

// -- Objects ------------------------------------------------------------------

/// A declared object field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Key in the JSON object.
    pub name: String,
    /// Schema for the value under `name`.
    pub schema: SchemaNode,
}

/// Object schema with fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Declared fields, in order.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Reject keys that are not declared.
    #[serde(default)]
    pub strict: bool,
}

impl ObjectSchema {
    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<SchemaNode>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            schema: schema.into(),
        });
        self
    }

    /// Report undeclared keys as `unrecognized_keys` issues.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Look up a declared field by name.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.schema)
    }
}

// -- Conversions & builders ---------------------------------------------------

impl From<StringSchema> for SchemaNode {
    fn from(schema: StringSchema) -> Self {
        Self::String(schema)
    }
}

impl From<NumberSchema> for SchemaNode {
    fn from(schema: NumberSchema) -> Self {
        Self::Number(schema)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        Self::Object(schema)
    }
}

macro_rules! wrapper_shorthands {
    ($($ty:ty),*) => {$(
        impl $ty {
            /// Allow the value to be absent.
            pub fn optional(self) -> SchemaNode {
                SchemaNode::from(self).optional()
            }

            /// Allow the value to be `null`.
            pub fn nullable(self) -> SchemaNode {
                SchemaNode::from(self).nullable()
            }
        }
    )*};
}

wrapper_shorthands!(StringSchema, NumberSchema, ObjectSchema);

/// Start a string schema.
pub fn string() -> StringSchema {
    StringSchema::default()
}

/// Start a number schema.
pub fn number() -> NumberSchema {
    NumberSchema::default()
}

/// A boolean schema.
pub fn boolean() -> SchemaNode {
    SchemaNode::Boolean
}

/// An enum of string literals.
pub fn enumeration<I, S>(values: I) -> SchemaNode
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SchemaNode::Enum {
        values: values.into_iter().map(Into::into).collect(),
    }
}

/// An array whose elements satisfy `element`.
pub fn array(element: impl Into<SchemaNode>) -> SchemaNode {
    SchemaNode::Array {
        element: Box::new(element.into()),
    }
}

/// Start an object schema.
pub fn object() -> ObjectSchema {
    ObjectSchema::default()
}

/// A union of the given member schemas.
pub fn union<I>(members: I) -> SchemaNode
where
    I: IntoIterator<Item = SchemaNode>,
{
    SchemaNode::Union {
        members: members.into_iter().collect(),
    }
}

/// An opaque rule that accepts every value.
pub fn other(name: impl Into<String>) -> SchemaNode {
    SchemaNode::Other { name: name.into() }
}
