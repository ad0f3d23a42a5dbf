#![deny(missing_docs)]

//! # labreg-core - Foundational Types for the Laboratory Registry
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies, only `serde`, `thiserror` and `uuid`.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** You cannot pass a [`LaboratoryId`]
//!    where a [`UserId`] is expected.
//!
//! 2. **Validated on construction.** [`Email`] and [`Role`] can only be built
//!    from input that passed their format checks, so a value of either type
//!    is always well-formed.
//!
//! 3. **[`ValidationError`] on rejection.** Structured errors with `thiserror`,
//!    carrying the rejected input.

pub mod email;
pub mod error;
pub mod identity;
pub mod role;

pub use email::Email;
pub use error::ValidationError;
pub use identity::{LaboratoryId, UserId};
pub use role::Role;
