use crate::domain::{models::member::Member, ports::MemberDirectory};
use crate::error::AppError;
use crate::infra::repositories::rows::MemberRow;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteMemberRepo {
    pool: SqlitePool,
}

impl SqliteMemberRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectory for SqliteMemberRepo {
    async fn resolve_user(&self, email: &str) -> Result<Member, AppError> {
        sqlx::query_as::<_, MemberRow>(
            "SELECT email, name, level, role, created_at FROM members WHERE email = ?",
        )
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .map(Member::from)
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))
    }

    async fn upsert(&self, member: &Member) -> Result<Member, AppError> {
        sqlx::query_as::<_, MemberRow>(
            r#"INSERT INTO members (email, name, level, role, created_at) VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(email) DO UPDATE SET name = excluded.name, level = excluded.level, role = excluded.role
               RETURNING email, name, level, role, created_at"#,
        )
            .bind(member.email.trim().to_lowercase())
            .bind(&member.name)
            .bind(member.level.as_str())
            .bind(&member.role)
            .bind(member.created_at)
            .fetch_one(&self.pool)
            .await
            .map(Member::from)
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT email, name, level, role, created_at FROM members ORDER BY email",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows.into_iter().map(Member::from).collect())
    }
}
