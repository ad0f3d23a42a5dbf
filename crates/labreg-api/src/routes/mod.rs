//! # API Route Modules
//!
//! - `users` - user registration and lookup (`/v1/users`).

pub mod users;
