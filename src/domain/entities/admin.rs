//! Back-office administrator account.

use chrono::{DateTime, Utc};

/// An administrator able to manage modules, vendors, users and orders.
///
/// Super admins can additionally manage other admin accounts.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_super: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating an admin. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_super: bool,
}
