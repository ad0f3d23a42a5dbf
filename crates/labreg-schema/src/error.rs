//! # Schema Errors
//!
//! Structural problems with a schema itself, as opposed to [`Issue`]s found
//! in the data being validated. A schema that triggers one of these cannot be
//! used for validation at all.
//!
//! [`Issue`]: crate::Issue

use thiserror::Error;

/// A malformed schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// An enum node has no allowed values.
    #[error("enum at {path} declares no values")]
    EmptyEnum {
        /// Location of the node.
        path: String,
    },

    /// A union node has no members.
    #[error("union at {path} declares no members")]
    EmptyUnion {
        /// Location of the node.
        path: String,
    },

    /// A numeric bound is NaN or infinite.
    #[error("numeric bound at {path} is not finite: {value}")]
    NonFiniteBound {
        /// Location of the node.
        path: String,
        /// The offending bound.
        value: f64,
    },

    /// A `max_length` bound too large to synthesize a string beyond.
    #[error("max_length at {path} is {max}, synthesis is limited to {limit} characters")]
    LengthTooLarge {
        /// Location of the node.
        path: String,
        /// The declared maximum.
        max: usize,
        /// Longest bound that can be exceeded.
        limit: usize,
    },

    /// An object declares the same field twice.
    #[error("object at {path} declares field \"{field}\" more than once")]
    DuplicateField {
        /// Location of the object.
        path: String,
        /// The repeated field name.
        field: String,
    },
}
