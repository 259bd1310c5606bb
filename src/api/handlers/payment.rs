use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::WebhookCaller;
use crate::api::dtos::{requests::PaymentWebhookRequest, responses::EventResponse};
use crate::domain::models::member::Member;
use crate::error::AppError;
use reqwest::Url;
use std::sync::Arc;
use tracing::{info, Span};

/// Checkout link carrying what the webhook needs back: the event and the payer.
pub fn payment_link(base_url: &str, event_id: &str, member: &Member) -> Result<String, AppError> {
    Url::parse_with_params(base_url, &[
        ("event", event_id),
        ("user_email", member.email.as_str()),
        ("user_name", member.name.as_str()),
    ])
        .map(String::from)
        .map_err(|e| AppError::Internal(format!("Invalid payment link base: {}", e)))
}

pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    _caller: WebhookCaller,
    Json(payload): Json<PaymentWebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    Span::current().record("event_id", payload.event_id.as_str());

    // Replays are recognised by receipt; a payment without one can't be told apart.
    if payload.receipt_id.trim().is_empty() {
        return Err(AppError::Validation("receipt_id must not be empty".into()));
    }
    info!("Payment webhook for {} on {} (receipt {})", payload.user_email, payload.event_id, payload.receipt_id);

    let entry = state.attendance.record_payment(
        &payload.event_id,
        &payload.user_email,
        payload.user_name.as_deref(),
        payload.amount,
        &payload.receipt_id,
    ).await?;

    Ok(Json(EventResponse::from(&entry)))
}
