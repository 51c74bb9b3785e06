//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{UpdateUser, User};
use crate::domain::page::{PageRequest, Paged};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

const USER_COLUMNS: &str = "id, phone, name, email, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    phone: String,
    name: Option<String>,
    email: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UpsertedUserRow {
    #[sqlx(flatten)]
    user: UserRow,
    inserted: bool,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            phone: r.phone,
            name: r.name,
            email: r.email,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_or_create(&self, phone: &str) -> Result<(User, bool), AppError> {
        // `xmax = 0` only holds for a row inserted by this statement.
        let row = sqlx::query_as::<_, UpsertedUserRow>(&format!(
            r#"
            INSERT INTO users (phone)
            VALUES ($1)
            ON CONFLICT (phone) DO UPDATE SET phone = EXCLUDED.phone
            RETURNING {USER_COLUMNS}, (xmax = 0) AS inserted
            "#
        ))
        .bind(phone)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok((row.user.into(), row.inserted))
    }

    async fn update(&self, id: i64, update: UpdateUser) -> Result<User, AppError> {
        let update_name = update.name.is_some();
        let update_email = update.email.is_some();

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                name       = CASE WHEN $2 THEN $3::TEXT ELSE name END,
                email      = CASE WHEN $4 THEN $5::TEXT ELSE email END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update_name)
        .bind(update.name.flatten())
        .bind(update_email)
        .bind(update.email.flatten())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))
    }

    async fn list(&self, page: PageRequest) -> Result<Paged<User>, AppError> {
        let list_sql =
            format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2");

        let rows = sqlx::query_as::<_, UserRow>(&list_sql)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref());

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(self.pool.as_ref());

        let (rows, total) = tokio::try_join!(rows, total)?;

        Ok(Paged {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("User not found", json!({ "id": id })))
    }
}
