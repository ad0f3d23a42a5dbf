//! # Email Addresses
//!
//! [`Email`] accepts the pragmatic subset of RFC 5322 that registration forms
//! see in practice: a dotted local part of unreserved characters, an `@`, and
//! a domain of at least two labels whose last label is alphabetic. Addresses
//! are stored lowercase so uniqueness checks are case-insensitive.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

const MAX_LOCAL_LEN: usize = 64;
const MAX_TOTAL_LEN: usize = 254;

/// A syntactically valid, lowercase email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalize an email address.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if is_valid_email(trimmed) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(ValidationError::InvalidEmail(input.to_string()))
        }
    }

    /// Return the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Email::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Syntax check shared by [`Email::parse`] and the schema validator.
///
/// Does not trim: surrounding whitespace makes the input invalid.
pub fn is_valid_email(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_TOTAL_LEN {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    valid_local_part(local) && valid_domain(domain)
}

fn valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-' | '\''))
}

fn valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    labels_ok && tld_ok
}
