use crate::domain::models::{
    member::Member,
    occurrence::{NewOccurrence, OccurrenceHandle, StoredRecord},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence of the serialized event records.
///
/// The store only ever sees text: decoding and every booking rule live above it,
/// so a calendar field, a table column or a document store can back it alike.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// `NotFound` when no occurrence matches the key, `Unavailable` on transport failure.
    async fn fetch_record_text(&self, key: &str) -> Result<StoredRecord, AppError>;

    /// `Conflict` when the handle is stale, `Unavailable` on transport failure.
    async fn write_record_text(&self, handle: &OccurrenceHandle, raw_text: &str) -> Result<(), AppError>;

    async fn list_upcoming(&self, from: DateTime<Utc>, limit: u32) -> Result<Vec<StoredRecord>, AppError>;

    async fn create_occurrence(&self, occurrence: &NewOccurrence) -> Result<StoredRecord, AppError>;
}

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Fails with `UserNotFound` for anyone who is not a member.
    async fn resolve_user(&self, email: &str) -> Result<Member, AppError>;
    async fn upsert(&self, member: &Member) -> Result<Member, AppError>;
    async fn list(&self) -> Result<Vec<Member>, AppError>;
}
