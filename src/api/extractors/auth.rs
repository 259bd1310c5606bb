use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::{auth::Claims, member::Member};
use crate::error::AppError;
use std::sync::Arc;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use constant_time_eq::constant_time_eq;
use tracing::{debug, error, Span};

/// A signed-in member, resolved against the member directory on every request.
pub struct AuthMember(pub Member);

/// A signed-in member holding the admin role.
pub struct AdminMember(pub Member);

/// The payment provider, authenticated by the shared webhook secret.
pub struct WebhookCaller;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts.headers.get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

impl<S> FromRequestParts<S> for AuthMember
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_secret(app_state.config.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| {
                debug!("Rejected member token: {}", e);
                StatusCode::UNAUTHORIZED
            })?;

        let mut member = match app_state.member_directory.resolve_user(&token_data.claims.email).await {
            Ok(member) => member,
            Err(AppError::UserNotFound(email)) => {
                debug!("Token holder {} is not a member", email);
                return Err(StatusCode::UNAUTHORIZED);
            }
            Err(e) => {
                error!("Member lookup failed: {}", e);
                return Err(StatusCode::SERVICE_UNAVAILABLE);
            }
        };

        if !token_data.claims.name.trim().is_empty() {
            member.name = token_data.claims.name;
        }

        Span::current().record("member_email", member.email.as_str());

        Ok(AuthMember(member))
    }
}

impl<S> FromRequestParts<S> for AdminMember
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthMember(member) = AuthMember::from_request_parts(parts, state).await?;

        if !member.is_admin() {
            return Err(StatusCode::FORBIDDEN);
        }

        Ok(AdminMember(member))
    }
}

impl<S> FromRequestParts<S> for WebhookCaller
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        match bearer_token(parts) {
            Some(token) if constant_time_eq(token.as_bytes(), app_state.config.webhook_secret.as_bytes()) => Ok(WebhookCaller),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}
