use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Malformed event record: {0}")]
    MalformedRecord(String),
    #[error("Skill level too low for this event")]
    LevelTooLow,
    #[error("Payment required to join this event")]
    RequiresPayment,
    #[error("Event is full")]
    CapacityExceeded,
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable, please retry".to_string())
            }
            AppError::MalformedRecord(msg) => {
                error!("Malformed event record: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Event record is corrupted".to_string())
            }
            AppError::LevelTooLow => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::RequiresPayment => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            AppError::CapacityExceeded => (StatusCode::CONFLICT, self.to_string()),
            AppError::UserNotFound(msg) => (StatusCode::NOT_FOUND, format!("User not found: {}", msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => {
                warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }
            AppError::Unavailable(msg) => {
                error!("Backing store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Backing store unavailable, please retry".to_string())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
