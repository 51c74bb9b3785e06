//! Bearer-token sessions for admins, vendors and users.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{NewSession, Principal, Role};
use crate::domain::repositories::SessionRepository;
use crate::error::AppError;
use crate::utils::token::{generate_token, keyed_hash};

/// A freshly issued bearer token. The raw token is only ever seen here.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Service for issuing and validating opaque session tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<R: SessionRepository> {
    repository: Arc<R>,
    signing_secret: String,
    session_ttl: Duration,
}

impl<R: SessionRepository> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - session repository for DB operations
    /// - `signing_secret` - HMAC key; rotating it invalidates every session
    /// - `session_ttl` - lifetime of newly issued tokens
    pub fn new(repository: Arc<R>, signing_secret: String, session_ttl: Duration) -> Self {
        Self {
            repository,
            signing_secret,
            session_ttl,
        }
    }

    fn hash_token(&self, token: &str) -> String {
        keyed_hash(&self.signing_secret, token)
    }

    /// Issues a new session token for `role`/`subject_id`.
    pub async fn issue(&self, role: Role, subject_id: i64) -> Result<IssuedToken, AppError> {
        let token = generate_token();
        let expires_at = Utc::now() + self.session_ttl;

        self.repository
            .create(NewSession {
                token_hash: self.hash_token(&token),
                role,
                subject_id,
                expires_at,
            })
            .await?;

        tracing::info!(role = %role, subject_id, "Session issued");

        Ok(IssuedToken { token, expires_at })
    }

    /// Resolves a raw token into the principal it was issued to.
    ///
    /// On success the session's `last_used_at` is refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown, revoked or
    /// expired. Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let token_hash = self.hash_token(token);

        let session = self
            .repository
            .find_by_hash(&token_hash)
            .await?
            .filter(|s| s.is_valid())
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "Invalid, expired or revoked token"}),
                )
            })?;

        let _ = self.repository.touch(&token_hash).await;

        Ok(session.principal())
    }

    /// Revokes a single token (logout). Unknown tokens are ignored.
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.repository.revoke(&self.hash_token(token)).await?;
        Ok(())
    }

    /// Revokes every live session of an account, e.g. after deactivation.
    pub async fn revoke_all(&self, role: Role, subject_id: i64) -> Result<u64, AppError> {
        let revoked = self.repository.revoke_all(role, subject_id).await?;
        if revoked > 0 {
            tracing::info!(role = %role, subject_id, revoked, "Sessions revoked");
        }
        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Session;
    use crate::domain::repositories::MockSessionRepository;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn session(hash: &str, expires_at: DateTime<Utc>, revoked: bool) -> Session {
        Session {
            id: 1,
            token_hash: hash.to_string(),
            role: Role::Vendor,
            subject_id: 42,
            created_at: Utc::now(),
            expires_at,
            last_used_at: None,
            revoked_at: revoked.then(Utc::now),
        }
    }

    fn service(repo: MockSessionRepository) -> AuthService<MockSessionRepository> {
        AuthService::new(Arc::new(repo), test_secret(), Duration::hours(1))
    }

    #[tokio::test]
    async fn test_issue_stores_only_hash() {
        let mut mock_repo = MockSessionRepository::new();

        mock_repo
            .expect_create()
            .withf(|s| s.role == Role::User && s.subject_id == 7 && s.token_hash.len() == 64)
            .times(1)
            .returning(|s| {
                Ok(Session {
                    id: 1,
                    token_hash: s.token_hash,
                    role: s.role,
                    subject_id: s.subject_id,
                    created_at: Utc::now(),
                    expires_at: s.expires_at,
                    last_used_at: None,
                    revoked_at: None,
                })
            });

        let issued = service(mock_repo).issue(Role::User, 7).await.unwrap();

        assert_eq!(issued.token.len(), 43);
        assert!(issued.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockSessionRepository::new();

        let token = "valid-token";
        let expected_hash = keyed_hash(&test_secret(), token);
        let stored = session(&expected_hash, Utc::now() + Duration::hours(1), false);

        mock_repo
            .expect_find_by_hash()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        mock_repo.expect_touch().times(1).returning(|_| Ok(()));

        let principal = service(mock_repo).authenticate(token).await.unwrap();

        assert_eq!(principal, Principal::vendor(42));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let mut mock_repo = MockSessionRepository::new();

        mock_repo
            .expect_find_by_hash()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(mock_repo).authenticate("invalid-token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_expired_token() {
        let mut mock_repo = MockSessionRepository::new();
        let stored = session("h", Utc::now() - Duration::minutes(1), false);

        mock_repo
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(stored.clone())));
        mock_repo.expect_touch().never();

        let result = service(mock_repo).authenticate("old-token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_revoked_token() {
        let mut mock_repo = MockSessionRepository::new();
        let stored = session("h", Utc::now() + Duration::hours(1), true);

        mock_repo
            .expect_find_by_hash()
            .returning(move |_| Ok(Some(stored.clone())));

        let result = service(mock_repo).authenticate("revoked-token").await;

        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_revoke_uses_hash() {
        let mut mock_repo = MockSessionRepository::new();
        let expected_hash = keyed_hash(&test_secret(), "logout-token");

        mock_repo
            .expect_revoke()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(mock_repo).revoke("logout-token").await.is_ok());
    }

    #[tokio::test]
    async fn test_hash_token_secret_matters() {
        let svc1 = AuthService::new(
            Arc::new(MockSessionRepository::new()),
            "secret-a".to_string(),
            Duration::hours(1),
        );
        let svc2 = AuthService::new(
            Arc::new(MockSessionRepository::new()),
            "secret-b".to_string(),
            Duration::hours(1),
        );

        assert_ne!(svc1.hash_token("token"), svc2.hash_token("token"));
    }
}
