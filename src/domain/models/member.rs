use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::models::ledger::SkillLevel;

pub const ROLE_MEMBER: &str = "MEMBER";
pub const ROLE_ADMIN: &str = "ADMIN";

/// A recognised club member, as listed in the member directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Member {
    pub email: String,
    pub name: String,
    pub level: SkillLevel,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(email: &str, name: &str, level: SkillLevel) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            name: name.to_string(),
            level,
            role: ROLE_MEMBER.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
