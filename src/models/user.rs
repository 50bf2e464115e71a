//! Staff user model and related types

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::id::UserId;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Librarian,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Librarian => "LIBRARIAN",
        }
    }

    /// Only administrators may remove catalog entries
    pub fn can_delete_books(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "LIBRARIAN" => Ok(Role::Librarian),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Staff account as stored in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Argon2 PHC string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// Public view of a user (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
        }
    }
}

/// Create user request (out-of-band provisioning and seeding)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub role: Role,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
}

/// Update own profile request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl UpdateProfile {
    pub(crate) fn apply(self, user: &User) -> User {
        User {
            name: self.name.unwrap_or_else(|| user.name.clone()),
            email: self.email.or_else(|| user.email.clone()),
            avatar_url: self.avatar_url.or_else(|| user.avatar_url.clone()),
            bio: self.bio.or_else(|| user.bio.clone()),
            ..user.clone()
        }
    }
}
