//! DTOs for admin account management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::AdminRegistration;
use crate::domain::entities::Admin;

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_super: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            is_super: admin.is_super,
            is_active: admin.is_active,
            created_at: admin.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub is_super: bool,
}

impl From<CreateAdminRequest> for AdminRegistration {
    fn from(req: CreateAdminRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            email: req.email,
            password: req.password,
            is_super: req.is_super,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub items: Vec<AdminResponse>,
}
