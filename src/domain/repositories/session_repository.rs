//! Repository trait for bearer-token sessions.

use crate::domain::entities::{NewSession, Role, Session};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for sessions.
///
/// Tokens are never stored in clear text; every method takes the keyed hash.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSessionRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, new_session: NewSession) -> Result<Session, AppError>;

    /// Looks up a session by token hash, including revoked and expired ones.
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Updates `last_used_at` to now.
    async fn touch(&self, token_hash: &str) -> Result<(), AppError>;

    /// Revokes one session. Returns false if it was unknown or already revoked.
    async fn revoke(&self, token_hash: &str) -> Result<bool, AppError>;

    /// Revokes every live session of an account. Returns the number revoked.
    async fn revoke_all(&self, role: Role, subject_id: i64) -> Result<u64, AppError>;
}
