//! PostgreSQL implementation of the module repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Module, NewModule, UpdateModule};
use crate::domain::repositories::ModuleRepository;
use crate::error::AppError;

const MODULE_COLUMNS: &str =
    "id, name, description, image, sort_order, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ModuleRow {
    id: i64,
    name: String,
    description: Option<String>,
    image: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ModuleRow> for Module {
    fn from(r: ModuleRow) -> Self {
        Module {
            id: r.id,
            name: r.name,
            description: r.description,
            image: r.image,
            sort_order: r.sort_order,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for marketplace modules.
pub struct PgModuleRepository {
    pool: Arc<PgPool>,
}

impl PgModuleRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModuleRepository for PgModuleRepository {
    async fn create(&self, new_module: NewModule) -> Result<Module, AppError> {
        let row = sqlx::query_as::<_, ModuleRow>(&format!(
            r#"
            INSERT INTO modules (name, description, image, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(&new_module.name)
        .bind(&new_module.description)
        .bind(&new_module.image)
        .bind(new_module.sort_order)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Module>, AppError> {
        let row = sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, only_active: bool) -> Result<Vec<Module>, AppError> {
        let rows = sqlx::query_as::<_, ModuleRow>(&format!(
            r#"
            SELECT {MODULE_COLUMNS}
            FROM modules
            WHERE ($1::boolean IS NULL OR is_active = $1)
            ORDER BY sort_order, name
            "#
        ))
        .bind(if only_active { Some(true) } else { None })
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, update: UpdateModule) -> Result<Module, AppError> {
        let update_description = update.description.is_some();
        let update_image = update.image.is_some();

        let row = sqlx::query_as::<_, ModuleRow>(&format!(
            r#"
            UPDATE modules SET
                name        = COALESCE($2::TEXT, name),
                description = CASE WHEN $3 THEN $4::TEXT ELSE description END,
                image       = CASE WHEN $5 THEN $6::TEXT ELSE image END,
                sort_order  = COALESCE($7::INTEGER, sort_order),
                is_active   = COALESCE($8::BOOLEAN, is_active),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update_description)
        .bind(update.description.flatten())
        .bind(update_image)
        .bind(update.image.flatten())
        .bind(update.sort_order)
        .bind(update.is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Module not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Module not found", json!({ "id": id })));
        }

        Ok(())
    }

    async fn count_vendors(&self, id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vendors WHERE module_id = $1")
            .bind(id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
