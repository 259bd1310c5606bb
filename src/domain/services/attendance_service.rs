use std::sync::Arc;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{error, info};
use crate::domain::{
    models::{
        ledger::{EventRecord, Payment, SkillLevel},
        member::Member,
        occurrence::{LedgerEntry, NewOccurrence, StoredRecord, KEY_FORMAT},
    },
    ports::{LedgerStore, MemberDirectory},
    services::{
        attendance::{apply, AttendanceAction},
        occurrence_locks::OccurrenceLocks,
        record_codec::RecordCodec,
    },
};
use crate::error::AppError;

pub struct NewEventParams {
    pub summary: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<u32>,
    pub price: u32,
    pub required_level: SkillLevel,
}

/// Runs every booking action as lock → fetch → decode → apply → encode → write
/// against the ledger store. Reads skip the lock.
pub struct AttendanceService {
    store: Arc<dyn LedgerStore>,
    directory: Arc<dyn MemberDirectory>,
    codec: RecordCodec,
    locks: OccurrenceLocks,
    upcoming_limit: u32,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        directory: Arc<dyn MemberDirectory>,
        codec: RecordCodec,
        upcoming_limit: u32,
    ) -> Self {
        Self {
            store,
            directory,
            codec,
            locks: OccurrenceLocks::new(),
            upcoming_limit,
        }
    }

    pub async fn list_upcoming(&self) -> Result<Vec<LedgerEntry>, AppError> {
        let stored = self.store.list_upcoming(Utc::now(), self.upcoming_limit).await?;
        stored.into_iter().map(|s| self.decode_entry(s)).collect()
    }

    pub async fn get_event(&self, key: &str) -> Result<LedgerEntry, AppError> {
        let key = canonical_key(key)?;
        let stored = self.store.fetch_record_text(&key).await?;
        self.decode_entry(stored)
    }

    pub async fn join(&self, key: &str, actor: &Member) -> Result<LedgerEntry, AppError> {
        self.mutate(key, AttendanceAction::Join, actor).await
    }

    pub async fn leave(&self, key: &str, actor: &Member) -> Result<LedgerEntry, AppError> {
        self.mutate(key, AttendanceAction::Leave, actor).await
    }

    /// Provider-confirmed payment. The payer must be a member; the name reported by
    /// the provider, when present, replaces the directory name on the attendee entry.
    pub async fn record_payment(
        &self,
        key: &str,
        email: &str,
        name: Option<&str>,
        amount: u32,
        receipt_id: &str,
    ) -> Result<LedgerEntry, AppError> {
        let mut payer = self.directory.resolve_user(email).await?;
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            payer.name = name.to_string();
        }

        let payment = Payment::new(&payer.email, amount, receipt_id, Utc::now());
        self.mutate(key, AttendanceAction::RecordPayment(payment), &payer).await
    }

    pub async fn toggle_paid(&self, key: &str, admin: &Member, email: &str) -> Result<LedgerEntry, AppError> {
        self.mutate(key, AttendanceAction::TogglePaid { email: email.to_string() }, admin).await
    }

    pub async fn create_occurrence(&self, params: NewEventParams) -> Result<LedgerEntry, AppError> {
        if params.end_time <= params.start_time {
            return Err(AppError::Validation("end_time must be after start_time".into()));
        }

        let mut record = EventRecord::empty("", params.capacity.filter(|c| *c > 0).unwrap_or(self.codec.default_capacity()));
        record.price = params.price;
        record.required_level = params.required_level;

        let stored = self.store.create_occurrence(&NewOccurrence {
            summary: params.summary,
            location: params.location,
            start_time: params.start_time,
            end_time: params.end_time,
            description: self.codec.encode(&record)?,
        }).await?;

        info!("Occurrence created: {} ({})", stored.occurrence.key, stored.occurrence.summary);
        self.decode_entry(stored)
    }

    async fn mutate(&self, key: &str, action: AttendanceAction, actor: &Member) -> Result<LedgerEntry, AppError> {
        let key = canonical_key(key)?;

        let _guard = self.locks.acquire(&key).await;

        let stored = self.store.fetch_record_text(&key).await?;
        let current = self.codec.decode(&stored.occurrence.key, &stored.raw_text)?;

        let next = apply(&current, &action, actor, Utc::now())?;

        if next == current {
            return Ok(LedgerEntry { occurrence: stored.occurrence, record: current });
        }

        let raw_text = self.codec.encode(&next)?;
        if let Err(e) = self.store.write_record_text(&stored.handle, &raw_text).await {
            error!(event_id = %key, "failed to write event record: {}", e);
            return Err(e);
        }

        info!(event_id = %key, attendees = next.attendees.len(), "{} applied by {}", action_name(&action), actor.email);
        Ok(LedgerEntry { occurrence: stored.occurrence, record: next })
    }

    fn decode_entry(&self, stored: StoredRecord) -> Result<LedgerEntry, AppError> {
        let record = self.codec.decode(&stored.occurrence.key, &stored.raw_text)?;
        Ok(LedgerEntry { occurrence: stored.occurrence, record })
    }
}

/// `2024-5-1` and `2024-05-01` name the same occurrence; locks and stores only see the padded form.
fn canonical_key(key: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(key.trim(), KEY_FORMAT)
        .map(|date| date.format(KEY_FORMAT).to_string())
        .map_err(|_| AppError::Validation("Invalid event date (expected YYYY-MM-DD)".into()))
}

fn action_name(action: &AttendanceAction) -> &'static str {
    match action {
        AttendanceAction::Join => "join",
        AttendanceAction::Leave => "leave",
        AttendanceAction::RecordPayment(_) => "payment",
        AttendanceAction::TogglePaid { .. } => "paid marker toggle",
    }
}
