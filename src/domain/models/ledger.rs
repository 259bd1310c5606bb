use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;

/// Ordinal skill tier gating participation. Ordering is Basic < Medium < Advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SkillLevel {
    #[default]
    Basic,
    Medium,
    Advanced,
}

impl SkillLevel {
    /// Total parse: anything unrecognised is Basic.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "MEDIUM" => SkillLevel::Medium,
            "ADVANCED" => SkillLevel::Advanced,
            _ => SkillLevel::Basic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Basic => "BASIC",
            SkillLevel::Medium => "MEDIUM",
            SkillLevel::Advanced => "ADVANCED",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SkillLevel {
    fn from(s: String) -> Self {
        SkillLevel::parse_lenient(&s)
    }
}

impl From<SkillLevel> for String {
    fn from(level: SkillLevel) -> Self {
        level.as_str().to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Attendee {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, alias = "sign_time")]
    pub signup_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_time: Option<DateTime<Utc>>,
}

impl Attendee {
    pub fn new(name: &str, email: &str, signup_time: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            signup_time,
            paid_time: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Payment {
    pub email: String,
    #[serde(default)]
    pub amount: u32,
    #[serde(default)]
    pub receipt_id: String,
    #[serde(default, alias = "paid_timestamp")]
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(email: &str, amount: u32, receipt_id: &str, paid_at: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            amount,
            receipt_id: receipt_id.to_string(),
            paid_at,
        }
    }
}

/// Booking state of a single occurrence.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,
    pub capacity: u32,
    pub price: u32,
    pub required_level: SkillLevel,
    pub attendees: Vec<Attendee>,
    pub payments: Vec<Payment>,
}

impl EventRecord {
    /// The record an occurrence has before anyone touched it.
    pub fn empty(id: &str, capacity: u32) -> Self {
        Self {
            id: id.to_string(),
            capacity,
            price: 0,
            required_level: SkillLevel::Basic,
            attendees: Vec::new(),
            payments: Vec::new(),
        }
    }

    pub fn attendee_index(&self, email: &str) -> Option<usize> {
        self.attendees.iter().position(|a| emails_match(&a.email, email))
    }

    pub fn is_attending(&self, email: &str) -> bool {
        self.attendee_index(email).is_some()
    }

    pub fn is_full(&self) -> bool {
        self.attendees.len() >= self.capacity as usize
    }

    pub fn spots_left(&self) -> u32 {
        (self.capacity as usize).saturating_sub(self.attendees.len()) as u32
    }

    pub fn requires_payment(&self) -> bool {
        self.price > 0
    }
}

/// Emails are identities; compare them case-insensitively and ignore stray whitespace.
pub fn emails_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(SkillLevel::Basic < SkillLevel::Medium);
        assert!(SkillLevel::Medium < SkillLevel::Advanced);
    }

    #[test]
    fn test_level_parse_is_total() {
        assert_eq!(SkillLevel::parse_lenient("advanced"), SkillLevel::Advanced);
        assert_eq!(SkillLevel::parse_lenient(" Medium "), SkillLevel::Medium);
        assert_eq!(SkillLevel::parse_lenient("BEGINNER"), SkillLevel::Basic);
        assert_eq!(SkillLevel::parse_lenient("pro"), SkillLevel::Basic);
        assert_eq!(SkillLevel::parse_lenient(""), SkillLevel::Basic);
    }

    #[test]
    fn test_attendee_lookup_ignores_case() {
        let mut record = EventRecord::empty("2024-05-01", 2);
        record.attendees.push(Attendee::new("Alice", "Alice@Example.com", Utc::now()));

        assert!(record.is_attending("alice@example.com"));
        assert!(!record.is_attending("bob@example.com"));
        assert_eq!(record.spots_left(), 1);
    }
}
