//! Authentication sessions and the authenticated principal.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// The kind of account a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Vendor,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "vendor" => Ok(Role::Vendor),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// The authenticated caller, inserted into request extensions by the auth
/// middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub role: Role,
    pub subject_id: i64,
}

impl Principal {
    pub fn admin(id: i64) -> Self {
        Self {
            role: Role::Admin,
            subject_id: id,
        }
    }

    pub fn vendor(id: i64) -> Self {
        Self {
            role: Role::Vendor,
            subject_id: id,
        }
    }

    pub fn user(id: i64) -> Self {
        Self {
            role: Role::User,
            subject_id: id,
        }
    }
}

/// A stored bearer-token session. Only the token hash is persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub token_hash: String,
    pub role: Role,
    pub subject_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns true if the session can still authenticate requests.
    pub fn is_valid(&self) -> bool {
        self.revoked_at.is_none() && Utc::now() < self.expires_at
    }

    pub fn principal(&self) -> Principal {
        Principal {
            role: self.role,
            subject_id: self.subject_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub token_hash: String,
    pub role: Role,
    pub subject_id: i64,
    pub expires_at: DateTime<Utc>,
}
