use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::models::{ledger::Attendee, occurrence::LedgerEntry};

#[derive(Serialize)]
pub struct AttendeeResponse {
    pub name: String,
    pub email: String,
    pub signup_time: DateTime<Utc>,
    pub paid_time: Option<DateTime<Utc>>,
}

impl From<&Attendee> for AttendeeResponse {
    fn from(a: &Attendee) -> Self {
        Self {
            name: a.name.clone(),
            email: a.email.clone(),
            signup_time: a.signup_time,
            paid_time: a.paid_time,
        }
    }
}

#[derive(Serialize)]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub price: u32,
    pub level: String,
    pub max_participants: u32,
    pub spots_left: u32,
    pub attendees: Vec<AttendeeResponse>,
}

impl From<&LedgerEntry> for EventResponse {
    fn from(entry: &LedgerEntry) -> Self {
        let record = &entry.record;
        Self {
            id: record.id.clone(),
            name: entry.occurrence.summary.clone(),
            date: entry.occurrence.start_time,
            end: entry.occurrence.end_time,
            location: entry.occurrence.location.clone(),
            price: record.price,
            level: record.required_level.to_string(),
            max_participants: record.capacity,
            spots_left: record.spots_left(),
            attendees: record.attendees.iter().map(AttendeeResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct PaymentLinkResponse {
    pub event_id: String,
    pub price: u32,
    pub payment_link: String,
}
