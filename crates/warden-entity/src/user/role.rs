//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a registered account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Administrator, granted by the admin code at registration.
    Admin,
    /// Regular account.
    User,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Granted authorities. Admins hold the user authority as well.
    pub fn authorities(&self) -> &'static [&'static str] {
        match self {
            Self::Admin => &["ROLE_USER", "ROLE_ADMIN"],
            Self::User => &["ROLE_USER"],
        }
    }

    /// Return the role as its stored uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = warden_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            _ => Err(warden_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: ADMIN, USER"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("USER".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("viewer".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_admin_holds_user_authority() {
        assert!(UserRole::Admin.authorities().contains(&"ROLE_USER"));
        assert!(!UserRole::User.authorities().contains(&"ROLE_ADMIN"));
    }

    #[test]
    fn test_serde_uppercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
    }
}
