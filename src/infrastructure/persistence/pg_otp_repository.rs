//! PostgreSQL implementation of the OTP challenge repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::OtpChallenge;
use crate::domain::repositories::OtpRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct OtpRow {
    phone: String,
    code_hash: String,
    attempts: i32,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

pub struct PgOtpRepository {
    pool: Arc<PgPool>,
}

impl PgOtpRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for PgOtpRepository {
    async fn upsert(
        &self,
        phone: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO otp_challenges (phone, code_hash, attempts, expires_at, created_at)
            VALUES ($1, $2, 0, $3, NOW())
            ON CONFLICT (phone) DO UPDATE SET
                code_hash  = EXCLUDED.code_hash,
                attempts   = 0,
                expires_at = EXCLUDED.expires_at,
                created_at = NOW()
            "#,
        )
        .bind(phone)
        .bind(code_hash)
        .bind(expires_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn find(&self, phone: &str) -> Result<Option<OtpChallenge>, AppError> {
        let row = sqlx::query_as::<_, OtpRow>(
            "SELECT phone, code_hash, attempts, expires_at, created_at FROM otp_challenges WHERE phone = $1",
        )
        .bind(phone)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| OtpChallenge {
            phone: r.phone,
            code_hash: r.code_hash,
            attempts: r.attempts,
            expires_at: r.expires_at,
            created_at: r.created_at,
        }))
    }

    async fn record_failed_attempt(&self, phone: &str) -> Result<Option<i32>, AppError> {
        let attempts: Option<i32> = sqlx::query_scalar(
            "UPDATE otp_challenges SET attempts = attempts + 1 WHERE phone = $1 RETURNING attempts",
        )
        .bind(phone)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(attempts)
    }

    async fn delete(&self, phone: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM otp_challenges WHERE phone = $1")
            .bind(phone)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
