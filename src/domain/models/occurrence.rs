use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use crate::domain::models::ledger::EventRecord;

pub const KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar metadata of one dated instance of a recurring event.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub id: String,
    pub key: String,
    pub summary: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Identity plus revision of a stored entry, as handed out by a fetch.
/// A write with an outdated revision is rejected by stores that can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceHandle {
    pub occurrence_id: String,
    pub revision: String,
}

#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub occurrence: Occurrence,
    pub raw_text: String,
    pub handle: OccurrenceHandle,
}

#[derive(Debug, Clone)]
pub struct NewOccurrence {
    pub summary: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: String,
}

/// An occurrence together with its decoded booking record.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub occurrence: Occurrence,
    pub record: EventRecord,
}

/// Date-only key of an occurrence, taken in the calendar's own time zone.
pub fn occurrence_key(start: DateTime<Utc>, tz: Tz) -> String {
    start.with_timezone(&tz).format(KEY_FORMAT).to_string()
}
