//! Delivery address entity.

use chrono::{DateTime, Utc};

/// A delivery address in a user's address book.
#[derive(Debug, Clone)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: i64,
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: bool,
}

/// Partial address update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct UpdateAddress {
    pub label: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
}
