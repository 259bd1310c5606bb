use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::{AdminMember, AuthMember};
use crate::api::dtos::requests::UpsertMemberRequest;
use crate::domain::models::{ledger::SkillLevel, member::{Member, ROLE_ADMIN, ROLE_MEMBER}};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn me(AuthMember(member): AuthMember) -> impl IntoResponse {
    Json(member)
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    _admin: AdminMember,
) -> Result<impl IntoResponse, AppError> {
    let members = state.member_directory.list().await?;
    Ok(Json(members))
}

pub async fn upsert_member(
    State(state): State<Arc<AppState>>,
    AdminMember(admin): AdminMember,
    Json(payload): Json<UpsertMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.email.contains('@') {
        return Err(AppError::Validation("Invalid email".into()));
    }

    let role = payload.role.unwrap_or_else(|| ROLE_MEMBER.to_string()).to_uppercase();
    if role != ROLE_MEMBER && role != ROLE_ADMIN {
        return Err(AppError::Validation("Invalid role".into()));
    }

    let mut member = Member::new(
        &payload.email,
        &payload.name,
        payload.level.as_deref().map(SkillLevel::parse_lenient).unwrap_or_default(),
    );
    member.role = role;

    let saved = state.member_directory.upsert(&member).await?;
    info!("Member {} saved by {}", saved.email, admin.email);
    Ok(Json(saved))
}
