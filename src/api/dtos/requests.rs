use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Payment confirmation pushed by the payment provider once checkout completed.
#[derive(Deserialize)]
pub struct PaymentWebhookRequest {
    pub event_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub amount: u32,
    pub receipt_id: String,
}

#[derive(Deserialize)]
pub struct CreateOccurrenceRequest {
    pub summary: String,
    #[serde(default)]
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub capacity: Option<u32>,
    pub price: Option<u32>,
    pub level: Option<String>,
}

#[derive(Deserialize)]
pub struct UpsertMemberRequest {
    pub email: String,
    pub name: String,
    pub level: Option<String>,
    pub role: Option<String>,
}
