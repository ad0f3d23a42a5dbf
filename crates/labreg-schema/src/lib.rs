#![deny(missing_docs)]

//! # labreg-schema: Request Validation Schemas
//!
//! One description of a request body drives both sides of the API contract:
//!
//! - [`node`]: the [`SchemaNode`] tagged union and its builder functions.
//! - [`validate`]: the [`Validator`] capability and the built-in
//!   implementation that checks JSON against a [`SchemaNode`], reporting
//!   [`Issue`]s with stable codes and paths.
//! - [`synth`]: [`synthesize`] builds data the schema must reject.
//! - [`examples`]: [`extract_error_examples`] runs that data through a
//!   validator and keeps the first few issues, for the 422 examples in the
//!   OpenAPI document.
//!
//! ## Crate Policy
//!
//! - No I/O. Everything here is a pure function of the schema and input.
//! - A malformed schema is a [`SchemaError`]; bad input is an [`Issue`].
//! - Example extraction never fails. It falls back to a fixed example.

pub mod error;
pub mod examples;
pub mod issue;
pub mod node;
pub mod synth;
pub mod validate;

pub use error::SchemaError;
pub use examples::{
    error_examples, extract_error_examples, fallback_example, ErrorExample, MAX_EXAMPLE_ISSUES,
};
pub use issue::{format_path, Issue, IssueCode, PathSegment};
pub use node::{
    array, boolean, enumeration, number, object, other, string, union, Field, NumberCheck,
    NumberSchema, ObjectSchema, SchemaNode, StringCheck, StringSchema,
};
pub use synth::{synthesize, MAX_EXAMPLE_FIELDS, MAX_SYNTHESIZED_LENGTH};
pub use validate::{ValidationOutcome, Validator};
