//! PostgreSQL implementation of the admin repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Admin, NewAdmin};
use crate::domain::repositories::AdminRepository;
use crate::error::AppError;

const ADMIN_COLUMNS: &str =
    "id, name, email, password_hash, is_super, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    is_super: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AdminRow> for Admin {
    fn from(r: AdminRow) -> Self {
        Admin {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            is_super: r.is_super,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for admin accounts.
pub struct PgAdminRepository {
    pool: Arc<PgPool>,
}

impl PgAdminRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for PgAdminRepository {
    async fn create(&self, new_admin: NewAdmin) -> Result<Admin, AppError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            INSERT INTO admins (name, email, password_hash, is_super)
            VALUES ($1, $2, $3, $4)
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(&new_admin.name)
        .bind(&new_admin.email)
        .bind(&new_admin.password_hash)
        .bind(new_admin.is_super)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, AppError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Admin>, AppError> {
        let rows = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at, id"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<Admin, AppError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            UPDATE admins SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Admin not found", json!({ "id": id })))
    }
}
