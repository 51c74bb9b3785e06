//! PostgreSQL implementation of the session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::parse_column;
use crate::domain::entities::{NewSession, Role, Session};
use crate::domain::repositories::SessionRepository;
use crate::error::AppError;

const SESSION_COLUMNS: &str =
    "id, token_hash, role, subject_id, created_at, expires_at, last_used_at, revoked_at";

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i64,
    token_hash: String,
    role: String,
    subject_id: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(r: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            id: r.id,
            token_hash: r.token_hash,
            role: parse_column("sessions.role", &r.role)?,
            subject_id: r.subject_id,
            created_at: r.created_at,
            expires_at: r.expires_at,
            last_used_at: r.last_used_at,
            revoked_at: r.revoked_at,
        })
    }
}

/// PostgreSQL repository for bearer-token sessions.
pub struct PgSessionRepository {
    pool: Arc<PgPool>,
}

impl PgSessionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, s: NewSession) -> Result<Session, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            INSERT INTO sessions (token_hash, role, subject_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(&s.token_hash)
        .bind(s.role.as_str())
        .bind(s.subject_id)
        .bind(s.expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn touch(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE sessions SET last_used_at = NOW() WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(token_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all(&self, role: Role, subject_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET revoked_at = NOW()
            WHERE role = $1 AND subject_id = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(role.as_str())
        .bind(subject_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}
