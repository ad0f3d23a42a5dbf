//! # Error Hierarchy
//!
//! Errors raised when building domain primitives from untrusted input.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
///
/// Each error carries the rejected input so operators can see exactly what
/// was submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email address is not syntactically valid.
    #[error("invalid email address: \"{0}\"")]
    InvalidEmail(String),

    /// Role name is not one of the registered roles.
    #[error("unknown role: \"{0}\" (expected teacher, technical_staff or admin)")]
    UnknownRole(String),

    /// Identifier string is not a UUID.
    #[error("invalid identifier: \"{0}\"")]
    InvalidId(String),
}
