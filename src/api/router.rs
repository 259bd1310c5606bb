use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{attendance, event, health, member, payment};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Members
        .route("/api/v1/me", get(member::me))

        // Events
        .route("/api/v1/events", get(event::list_events))
        .route("/api/v1/events/{date}", get(event::get_event))
        .route("/api/v1/events/{date}/attendance", post(attendance::join_event).delete(attendance::leave_event))

        // Payment provider
        .route("/api/v1/payments/webhook", post(payment::payment_webhook))

        // Admin
        .route("/api/v1/admin/occurrences", post(event::create_occurrence))
        .route("/api/v1/admin/events/{date}/attendees/{email}/paid", post(attendance::toggle_paid))
        .route("/api/v1/admin/members", get(member::list_members).post(member::upsert_member))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        member_email = tracing::field::Empty,
                        event_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
