//! Marketplace module (vertical) entity.

use chrono::{DateTime, Utc};

/// A vertical of the marketplace such as "Food" or "Grocery".
///
/// Every vendor belongs to exactly one module.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewModule {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i32,
}

/// Partial update for a module.
///
/// `description`/`image`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateModule {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub image: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
