//! Member (patron) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::id::MemberId;

/// Member standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    Suspended,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Suspended => "SUSPENDED",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(MemberStatus::Active),
            "SUSPENDED" => Ok(MemberStatus::Suspended),
            _ => Err(format!("Invalid member status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub status: MemberStatus,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Case-insensitive name/email match
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.name.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
    }
}

/// Short member representation for joins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberShort {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub status: MemberStatus,
}

impl From<&Member> for MemberShort {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            email: member.email.clone(),
            status: member.status,
        }
    }
}

/// Registration request. Status and join date are assigned by the roster.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterMember {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: String,
}

impl RegisterMember {
    pub(crate) fn into_member(self, join_date: NaiveDate) -> Member {
        Member {
            id: MemberId::new(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            join_date,
            status: MemberStatus::Active,
        }
    }
}
