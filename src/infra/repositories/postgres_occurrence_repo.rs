use crate::domain::models::occurrence::{occurrence_key, NewOccurrence, OccurrenceHandle, StoredRecord};
use crate::domain::ports::LedgerStore;
use crate::error::AppError;
use crate::infra::repositories::rows::{parse_revision, OccurrenceRow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, event_key, summary, location, start_time, end_time, description, version";

pub struct PostgresOccurrenceRepo {
    pool: PgPool,
    tz: Tz,
}

impl PostgresOccurrenceRepo {
    pub fn new(pool: PgPool, tz: Tz) -> Self {
        Self { pool, tz }
    }
}

#[async_trait]
impl LedgerStore for PostgresOccurrenceRepo {
    async fn fetch_record_text(&self, key: &str) -> Result<StoredRecord, AppError> {
        sqlx::query_as::<_, OccurrenceRow>(&format!(
            "SELECT {COLUMNS} FROM occurrences WHERE event_key = $1 ORDER BY start_time LIMIT 1"
        ))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .map(StoredRecord::from)
            .ok_or_else(|| AppError::NotFound(format!("No event on {}", key)))
    }

    async fn write_record_text(&self, handle: &OccurrenceHandle, raw_text: &str) -> Result<(), AppError> {
        let version = parse_revision(handle)
            .ok_or_else(|| AppError::Conflict("Unknown event record revision".into()))?;

        let result = sqlx::query(
            "UPDATE occurrences SET description = $1, version = version + 1 WHERE id = $2 AND version = $3",
        )
            .bind(raw_text)
            .bind(&handle.occurrence_id)
            .bind(version)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Event record changed since it was read".into()));
        }
        Ok(())
    }

    async fn list_upcoming(&self, from: DateTime<Utc>, limit: u32) -> Result<Vec<StoredRecord>, AppError> {
        let rows = sqlx::query_as::<_, OccurrenceRow>(&format!(
            "SELECT {COLUMNS} FROM occurrences WHERE start_time >= $1 ORDER BY start_time LIMIT $2"
        ))
            .bind(from)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(StoredRecord::from).collect())
    }

    async fn create_occurrence(&self, occurrence: &NewOccurrence) -> Result<StoredRecord, AppError> {
        sqlx::query_as::<_, OccurrenceRow>(&format!(
            r#"INSERT INTO occurrences (id, event_key, summary, location, start_time, end_time, description, version, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8)
               RETURNING {COLUMNS}"#
        ))
            .bind(Uuid::new_v4().to_string())
            .bind(occurrence_key(occurrence.start_time, self.tz))
            .bind(&occurrence.summary)
            .bind(&occurrence.location)
            .bind(occurrence.start_time)
            .bind(occurrence.end_time)
            .bind(&occurrence.description)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map(StoredRecord::from)
            .map_err(AppError::Database)
    }
}
