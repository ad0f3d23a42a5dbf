//! # User Roles
//!
//! Every registered user holds exactly one role. Each role owns a dedicated
//! table keyed by the user's ID (`teachers`, `technical_staff`, `admins`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Role of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Teaching staff who book laboratories for classes.
    Teacher,
    /// Technicians responsible for a laboratory's equipment.
    TechnicalStaff,
    /// System administrators.
    Admin,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 3] = [Role::Teacher, Role::TechnicalStaff, Role::Admin];

    /// Return the wire representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::TechnicalStaff => "technical_staff",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Self::Teacher),
            "technical_staff" => Ok(Self::TechnicalStaff),
            "admin" => Ok(Self::Admin),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn from_str_round_trips() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!(matches!(
            "Teacher".parse::<Role>(),
            Err(ValidationError::UnknownRole(_))
        ));
    }
}
