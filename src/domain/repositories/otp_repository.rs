//! Repository trait for pending OTP challenges.

use crate::domain::entities::OtpChallenge;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage for one outstanding OTP challenge per phone number.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Stores a challenge, replacing any previous one for the phone and
    /// resetting its attempt counter.
    async fn upsert(
        &self,
        phone: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    async fn find(&self, phone: &str) -> Result<Option<OtpChallenge>, AppError>;

    /// Increments the failed-attempt counter and returns the new value, or
    /// `None` when the challenge no longer exists.
    async fn record_failed_attempt(&self, phone: &str) -> Result<Option<i32>, AppError>;

    async fn delete(&self, phone: &str) -> Result<(), AppError>;
}
