use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::AuthError;
use crate::error::ApiError;

/// Closed set of user roles. Stored lowercase in the users table and in
/// token claims; unknown strings are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Agent,
    Manager,
    Support,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Manager => "manager",
            Role::Support => "support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Lets FromRow decode the TEXT role column via #[sqlx(try_from = "String")]
impl TryFrom<String> for Role {
    type Error = AuthError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "agent" => Ok(Role::Agent),
            "manager" => Ok(Role::Manager),
            "support" => Ok(Role::Support),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// Resource-actions governed by the policy matrix. Entity CRUD outside the
/// User resource is uniformly open to any authenticated user and shares one
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateUser,
    ReadUsers,
    UpdateUser,
    DeleteUser,
    CrmReadWrite,
    BulkTransfer,
}

fn allowed_roles(action: Action) -> &'static [Role] {
    match action {
        Action::CreateUser | Action::UpdateUser | Action::DeleteUser => &[Role::Admin],
        Action::ReadUsers => &[Role::Admin, Role::Manager],
        Action::CrmReadWrite => &[Role::Admin, Role::Agent, Role::Manager, Role::Support],
        Action::BulkTransfer => &[Role::Admin, Role::Support],
    }
}

/// The single policy gate. Returns Forbidden without revealing whether the
/// target resource exists.
pub fn authorize(role: Role, action: Action) -> Result<(), ApiError> {
    if allowed_roles(action).contains(&role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("You do not have permission to perform this action"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_management_is_admin_only() {
        assert!(authorize(Role::Admin, Action::DeleteUser).is_ok());
        for role in [Role::Agent, Role::Manager, Role::Support] {
            assert!(authorize(role, Action::CreateUser).is_err());
            assert!(authorize(role, Action::UpdateUser).is_err());
            assert!(authorize(role, Action::DeleteUser).is_err());
        }
    }

    #[test]
    fn user_listing_includes_managers() {
        assert!(authorize(Role::Admin, Action::ReadUsers).is_ok());
        assert!(authorize(Role::Manager, Action::ReadUsers).is_ok());
        assert!(authorize(Role::Agent, Action::ReadUsers).is_err());
        assert!(authorize(Role::Support, Action::ReadUsers).is_err());
    }

    #[test]
    fn crm_access_is_open_to_all_roles() {
        for role in [Role::Admin, Role::Agent, Role::Manager, Role::Support] {
            assert!(authorize(role, Action::CrmReadWrite).is_ok());
        }
    }

    #[test]
    fn bulk_transfer_is_admin_and_support() {
        assert!(authorize(Role::Admin, Action::BulkTransfer).is_ok());
        assert!(authorize(Role::Support, Action::BulkTransfer).is_ok());
        assert!(authorize(Role::Agent, Action::BulkTransfer).is_err());
        assert!(authorize(Role::Manager, Action::BulkTransfer).is_err());
    }

    #[test]
    fn role_strings_round_trip() {
        for role in [Role::Admin, Role::Agent, Role::Manager, Role::Support] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
