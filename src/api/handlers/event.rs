use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AdminMember, AuthMember};
use crate::api::dtos::{requests::CreateOccurrenceRequest, responses::EventResponse};
use crate::domain::models::ledger::SkillLevel;
use crate::domain::services::attendance_service::NewEventParams;
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, Span};

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _member: AuthMember,
) -> Result<impl IntoResponse, AppError> {
    let entries = state.attendance.list_upcoming().await?;
    let events: Vec<EventResponse> = entries.iter().map(EventResponse::from).collect();
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    _member: AuthMember,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Span::current().record("event_id", date.as_str());

    let entry = state.attendance.get_event(&date).await?;
    Ok(Json(EventResponse::from(&entry)))
}

pub async fn create_occurrence(
    State(state): State<Arc<AppState>>,
    AdminMember(admin): AdminMember,
    Json(payload): Json<CreateOccurrenceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.summary.trim().is_empty() {
        return Err(AppError::Validation("summary must not be empty".into()));
    }

    let entry = state.attendance.create_occurrence(NewEventParams {
        summary: payload.summary,
        location: payload.location,
        start_time: payload.start_time,
        end_time: payload.end_time,
        capacity: payload.capacity,
        price: payload.price.unwrap_or(0),
        required_level: payload.level.as_deref().map(SkillLevel::parse_lenient).unwrap_or_default(),
    }).await?;

    info!("Occurrence {} created by {}", entry.record.id, admin.email);
    Ok((StatusCode::CREATED, Json(EventResponse::from(&entry))))
}
