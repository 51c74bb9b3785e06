//! Customer account and OTP challenge entities.

use chrono::{DateTime, Utc};

/// A customer, identified by phone number.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. `Some(None)` clears a field.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<Option<String>>,
    pub email: Option<Option<String>>,
}

/// A pending one-time-password challenge for a phone number.
///
/// Only the keyed hash of the code is stored.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub phone: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
