use axum::{extract::{State, Path}, http::StatusCode, response::{IntoResponse, Response}, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AdminMember, AuthMember};
use crate::api::dtos::responses::{EventResponse, PaymentLinkResponse};
use crate::api::handlers::payment::payment_link;
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, Span};

pub async fn join_event(
    State(state): State<Arc<AppState>>,
    AuthMember(member): AuthMember,
    Path(date): Path<String>,
) -> Result<Response, AppError> {
    Span::current().record("event_id", date.as_str());

    match state.attendance.join(&date, &member).await {
        Ok(entry) => Ok((StatusCode::CREATED, Json(EventResponse::from(&entry))).into_response()),
        Err(AppError::RequiresPayment) => {
            let entry = state.attendance.get_event(&date).await?;
            let link = payment_link(&state.config.payment_link_base_url, &entry.record.id, &member)?;

            info!("Payment required for {} on {}", member.email, entry.record.id);
            Ok((StatusCode::PAYMENT_REQUIRED, Json(PaymentLinkResponse {
                event_id: entry.record.id,
                price: entry.record.price,
                payment_link: link,
            })).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn leave_event(
    State(state): State<Arc<AppState>>,
    AuthMember(member): AuthMember,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Span::current().record("event_id", date.as_str());

    let entry = state.attendance.leave(&date, &member).await?;
    Ok((StatusCode::ACCEPTED, Json(EventResponse::from(&entry))))
}

pub async fn toggle_paid(
    State(state): State<Arc<AppState>>,
    AdminMember(admin): AdminMember,
    Path((date, email)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    Span::current().record("event_id", date.as_str());

    let entry = state.attendance.toggle_paid(&date, &admin, &email).await?;
    Ok(Json(EventResponse::from(&entry)))
}
