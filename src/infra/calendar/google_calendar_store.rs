use crate::config::CalendarConfig;
use crate::domain::models::occurrence::{
    occurrence_key, NewOccurrence, Occurrence, OccurrenceHandle, StoredRecord, KEY_FORMAT,
};
use crate::domain::ports::LedgerStore;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

/// Ledger store backed by a Google-Calendar-compatible REST API. Records live in the
/// description of each calendar entry; the entry's ETag is the revision.
pub struct GoogleCalendarStore {
    client: Client,
    api_base: String,
    calendar_id: String,
    access_token: String,
    tz: Tz,
}

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Deserialize)]
struct CalendarEvent {
    id: String,
    etag: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    start: EventTime,
    end: EventTime,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl GoogleCalendarStore {
    pub fn new(config: &CalendarConfig, tz: Tz) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_base: config.api_base.clone(),
            calendar_id: config.calendar_id.clone(),
            access_token: config.access_token.clone(),
            tz,
        }
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| AppError::Internal(format!("Invalid calendar API base: {}", e)))?;
        {
            let mut segments = url.path_segments_mut()
                .map_err(|_| AppError::Internal("Calendar API base cannot hold a path".into()))?;
            segments.pop_if_empty().extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn list(&self, time_min: DateTime<Utc>, time_max: Option<DateTime<Utc>>, limit: u32) -> Result<Vec<CalendarEvent>, AppError> {
        let mut query = vec![
            ("singleEvents", "true".to_string()),
            ("showDeleted", "false".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", limit.to_string()),
            ("timeMin", time_min.to_rfc3339()),
        ];
        if let Some(max) = time_max {
            query.push(("timeMax", max.to_rfc3339()));
        }

        let request = self.client.get(self.events_url(None)?).query(&query);
        let list: EventList = parse_json(send(self.authorize(request)).await?).await?;
        Ok(list.items)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }

    fn to_stored(&self, event: CalendarEvent) -> StoredRecord {
        let start_time = self.resolve_time(&event.start);
        let end_time = self.resolve_time(&event.end);

        StoredRecord {
            handle: OccurrenceHandle {
                occurrence_id: event.id.clone(),
                revision: event.etag,
            },
            occurrence: Occurrence {
                id: event.id,
                key: occurrence_key(start_time, self.tz),
                summary: event.summary,
                location: event.location,
                start_time,
                end_time,
            },
            raw_text: event.description,
        }
    }

    /// All-day entries only carry a date; they start at local midnight.
    fn resolve_time(&self, time: &EventTime) -> DateTime<Utc> {
        match (time.date_time, time.date) {
            (Some(dt), _) => dt,
            (None, Some(date)) => self.local_midnight(date),
            (None, None) => DateTime::<Utc>::default(),
        }
    }

    fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        self.tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }
}

#[async_trait]
impl LedgerStore for GoogleCalendarStore {
    async fn fetch_record_text(&self, key: &str) -> Result<StoredRecord, AppError> {
        let date = NaiveDate::parse_from_str(key, KEY_FORMAT)
            .map_err(|_| AppError::Validation("Invalid event date (expected YYYY-MM-DD)".into()))?;
        let day_start = self.local_midnight(date);

        let events = self.list(day_start, Some(day_start + ChronoDuration::hours(24)), 10).await?;
        debug!("calendar returned {} entries for {}", events.len(), key);

        events.into_iter()
            .next()
            .map(|e| self.to_stored(e))
            .ok_or_else(|| AppError::NotFound(format!("No event on {}", key)))
    }

    async fn write_record_text(&self, handle: &OccurrenceHandle, raw_text: &str) -> Result<(), AppError> {
        let request = self.client.patch(self.events_url(Some(&handle.occurrence_id))?)
            .header("If-Match", &handle.revision)
            .json(&json!({ "description": raw_text }));

        send(self.authorize(request)).await?;
        Ok(())
    }

    async fn list_upcoming(&self, from: DateTime<Utc>, limit: u32) -> Result<Vec<StoredRecord>, AppError> {
        let events = self.list(from, None, limit).await?;
        Ok(events.into_iter().map(|e| self.to_stored(e)).collect())
    }

    async fn create_occurrence(&self, occurrence: &NewOccurrence) -> Result<StoredRecord, AppError> {
        let tz_name = self.tz.name().to_string();
        let body = json!({
            "summary": occurrence.summary,
            "location": occurrence.location,
            "description": occurrence.description,
            "start": EventTime { date_time: Some(occurrence.start_time), date: None, time_zone: Some(tz_name.clone()) },
            "end": EventTime { date_time: Some(occurrence.end_time), date: None, time_zone: Some(tz_name) },
        });

        let request = self.client.post(self.events_url(None)?).json(&body);
        let created: CalendarEvent = parse_json(send(self.authorize(request)).await?).await?;
        Ok(self.to_stored(created))
    }
}

/// Maps transport failures and provider statuses onto the store's error contract.
async fn send(request: RequestBuilder) -> Result<Response, AppError> {
    let res = request.send().await.map_err(|e| {
        let msg = format!("Calendar connection error: {}", e);
        error!("{}", msg);
        AppError::Unavailable(msg)
    })?;

    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let text = res.text().await.unwrap_or_default();
    match status {
        StatusCode::PRECONDITION_FAILED => {
            Err(AppError::Conflict("Calendar entry changed since it was read".into()))
        }
        StatusCode::NOT_FOUND | StatusCode::GONE => {
            Err(AppError::NotFound("Calendar entry not found".into()))
        }
        _ => {
            let msg = format!("Calendar request failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            Err(AppError::Unavailable(msg))
        }
    }
}

async fn parse_json<T: for<'de> Deserialize<'de>>(res: Response) -> Result<T, AppError> {
    res.json::<T>().await.map_err(|e| {
        let msg = format!("Unexpected calendar response: {}", e);
        error!("{}", msg);
        AppError::Unavailable(msg)
    })
}
