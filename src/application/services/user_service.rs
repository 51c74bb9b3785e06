//! Customers: OTP login and profiles.

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{UpdateUser, User};
use crate::domain::page::{PageRequest, Paged};
use crate::domain::repositories::{OtpRepository, UserRepository};
use crate::error::AppError;
use crate::infrastructure::otp::OtpSender;
use crate::utils::token::{generate_otp, keyed_hash, keyed_hash_matches};
use crate::utils::validation::PHONE_RE;

/// OTP issuing limits.
#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    pub ttl: Duration,
    pub max_attempts: i32,
    pub resend_interval: Duration,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(300),
            max_attempts: 5,
            resend_interval: Duration::seconds(30),
        }
    }
}

/// Result of a successful OTP verification.
#[derive(Debug, Clone)]
pub struct OtpLogin {
    pub user: User,
    pub is_new_user: bool,
}

pub struct UserService<U: UserRepository, O: OtpRepository> {
    users: Arc<U>,
    otps: Arc<O>,
    sender: Arc<dyn OtpSender>,
    secret: String,
    policy: OtpPolicy,
}

impl<U: UserRepository, O: OtpRepository> UserService<U, O> {
    /// Creates a new user service.
    ///
    /// - `secret` - HMAC key used to hash stored codes
    pub fn new(
        users: Arc<U>,
        otps: Arc<O>,
        sender: Arc<dyn OtpSender>,
        secret: String,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            users,
            otps,
            sender,
            secret,
            policy,
        }
    }

    /// Codes are bound to the phone they were issued for.
    fn code_hash(&self, phone: &str, code: &str) -> String {
        keyed_hash(&self.secret, &format!("{phone}:{code}"))
    }

    /// Issues a login code for `phone`, replacing any pending one.
    ///
    /// Returns the code lifetime in seconds.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed phone number
    /// - [`AppError::TooManyRequests`] when asked again within the resend interval
    /// - [`AppError::BadGateway`] if the code cannot be delivered
    pub async fn send_otp(&self, phone: &str) -> Result<i64, AppError> {
        validate_phone(phone)?;

        if let Some(pending) = self.otps.find(phone).await? {
            let wait = pending.created_at + self.policy.resend_interval - Utc::now();
            if wait > Duration::zero() {
                return Err(AppError::too_many_requests(
                    "OTP recently sent, try again later",
                    json!({"retry_after_seconds": wait.num_seconds().max(1)}),
                ));
            }
        }

        let code = generate_otp();
        let expires_at = Utc::now() + self.policy.ttl;
        self.otps
            .upsert(phone, &self.code_hash(phone, &code), expires_at)
            .await?;

        self.sender.send(phone, &code).await.map_err(|e| {
            tracing::error!(error = %e, "OTP delivery failed");
            AppError::bad_gateway("Could not deliver OTP", json!({}))
        })?;

        Ok(self.policy.ttl.num_seconds())
    }

    /// Checks a login code and returns the (possibly new) user.
    ///
    /// Wrong codes count as attempts; once the limit is reached the challenge
    /// is discarded and a new code must be requested.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] when there is no pending code, it expired,
    ///   or it does not match
    /// - [`AppError::Forbidden`] if the user account is deactivated
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<OtpLogin, AppError> {
        validate_phone(phone)?;

        let challenge = self.otps.find(phone).await?.ok_or_else(no_pending_otp)?;

        if challenge.is_expired() {
            self.otps.delete(phone).await?;
            return Err(AppError::bad_request("OTP expired", json!({})));
        }

        if !keyed_hash_matches(&self.secret, &format!("{phone}:{code}"), &challenge.code_hash) {
            // A concurrent attempt may have used up or replaced the challenge.
            let attempts = self
                .otps
                .record_failed_attempt(phone)
                .await?
                .ok_or_else(no_pending_otp)?;
            let remaining = (self.policy.max_attempts - attempts).max(0);
            if remaining == 0 {
                self.otps.delete(phone).await?;
            }
            tracing::warn!(attempts, "OTP mismatch");
            return Err(AppError::bad_request(
                "Invalid OTP",
                json!({"attempts_remaining": remaining}),
            ));
        }

        self.otps.delete(phone).await?;

        let (user, is_new_user) = self.users.find_or_create(phone).await?;
        if !user.is_active {
            return Err(AppError::forbidden(
                "Account is deactivated",
                json!({"user_id": user.id}),
            ));
        }

        if is_new_user {
            tracing::info!(user_id = user.id, "User registered");
        }

        Ok(OtpLogin { user, is_new_user })
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({"id": id})))
    }

    /// Loads the user behind a session, refusing deactivated accounts.
    pub async fn ensure_active(&self, id: i64) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unauthorized", json!({})))?;

        if !user.is_active {
            return Err(AppError::forbidden(
                "Account is deactivated",
                json!({"user_id": id}),
            ));
        }

        Ok(user)
    }

    pub async fn update_profile(&self, id: i64, update: UpdateUser) -> Result<User, AppError> {
        self.users.update(id, update).await
    }

    pub async fn list_users(&self, page: PageRequest) -> Result<Paged<User>, AppError> {
        self.users.list(page).await
    }

    pub async fn set_user_active(&self, id: i64, is_active: bool) -> Result<User, AppError> {
        self.get(id).await?;
        let user = self.users.set_active(id, is_active).await?;
        tracing::info!(user_id = id, is_active, "User status changed");
        Ok(user)
    }
}

fn no_pending_otp() -> AppError {
    AppError::bad_request("No pending OTP for this phone", json!({}))
}

fn validate_phone(phone: &str) -> Result<(), AppError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Invalid phone number",
            json!({"phone": phone}),
        ))
    }
}
