use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::{
    ledger::SkillLevel,
    member::Member,
    occurrence::{Occurrence, OccurrenceHandle, StoredRecord},
};

#[derive(Debug, FromRow)]
pub struct OccurrenceRow {
    pub id: String,
    pub event_key: String,
    pub summary: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub description: String,
    pub version: i64,
}

impl From<OccurrenceRow> for StoredRecord {
    fn from(row: OccurrenceRow) -> Self {
        StoredRecord {
            handle: OccurrenceHandle {
                occurrence_id: row.id.clone(),
                revision: row.version.to_string(),
            },
            occurrence: Occurrence {
                id: row.id,
                key: row.event_key,
                summary: row.summary,
                location: row.location,
                start_time: row.start_time,
                end_time: row.end_time,
            },
            raw_text: row.description,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct MemberRow {
    pub email: String,
    pub name: String,
    pub level: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            email: row.email,
            name: row.name,
            level: SkillLevel::parse_lenient(&row.level),
            role: row.role,
            created_at: row.created_at,
        }
    }
}

pub fn parse_revision(handle: &OccurrenceHandle) -> Option<i64> {
    handle.revision.parse().ok()
}
