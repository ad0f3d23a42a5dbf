//! # Middleware
//!
//! Tower layers applied around every API route: request tracing and
//! panic recovery.

pub mod panic;
pub mod tracing_layer;
