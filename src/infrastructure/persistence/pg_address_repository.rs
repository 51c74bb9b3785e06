//! PostgreSQL implementation of the address repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Address, NewAddress, UpdateAddress};
use crate::domain::repositories::AddressRepository;
use crate::error::AppError;

const ADDRESS_COLUMNS: &str = r#"
    id, user_id, label, line1, line2, city, state, pincode, latitude, longitude,
    is_default, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i64,
    user_id: i64,
    label: String,
    line1: String,
    line2: Option<String>,
    city: String,
    state: String,
    pincode: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(r: AddressRow) -> Self {
        Address {
            id: r.id,
            user_id: r.user_id,
            label: r.label,
            line1: r.line1,
            line2: r.line2,
            city: r.city,
            state: r.state,
            pincode: r.pincode,
            latitude: r.latitude,
            longitude: r.longitude,
            is_default: r.is_default,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for the address book.
///
/// Default switching runs in a transaction; the partial unique index
/// `addresses_one_default_per_user` backs the single-default invariant.
pub struct PgAddressRepository {
    pool: Arc<PgPool>,
}

impl PgAddressRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn create(&self, a: NewAddress) -> Result<Address, AppError> {
        let mut tx = self.pool.begin().await?;

        if a.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default")
                .bind(a.user_id)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            INSERT INTO addresses (
                user_id, label, line1, line2, city, state, pincode, latitude, longitude, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(a.user_id)
        .bind(&a.label)
        .bind(&a.line1)
        .bind(&a.line2)
        .bind(&a.city)
        .bind(&a.state)
        .bind(&a.pincode)
        .bind(a.latitude)
        .bind(a.longitude)
        .bind(a.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Address>, AppError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, user_id: i64) -> Result<Vec<Address>, AppError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            SELECT {ADDRESS_COLUMNS}
            FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, user_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        u: UpdateAddress,
    ) -> Result<Option<Address>, AppError> {
        let update_line2 = u.line2.is_some();
        let update_latitude = u.latitude.is_some();
        let update_longitude = u.longitude.is_some();

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            UPDATE addresses SET
                label      = COALESCE($3::TEXT, label),
                line1      = COALESCE($4::TEXT, line1),
                line2      = CASE WHEN $5 THEN $6::TEXT ELSE line2 END,
                city       = COALESCE($7::TEXT, city),
                state      = COALESCE($8::TEXT, state),
                pincode    = COALESCE($9::TEXT, pincode),
                latitude   = CASE WHEN $10 THEN $11::FLOAT8 ELSE latitude END,
                longitude  = CASE WHEN $12 THEN $13::FLOAT8 ELSE longitude END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(u.label)
        .bind(u.line1)
        .bind(update_line2)
        .bind(u.line2.flatten())
        .bind(u.city)
        .bind(u.state)
        .bind(u.pincode)
        .bind(update_latitude)
        .bind(u.latitude.flatten())
        .bind(update_longitude)
        .bind(u.longitude.flatten())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let was_default: Option<bool> = sqlx::query_scalar(
            "DELETE FROM addresses WHERE id = $1 AND user_id = $2 RETURNING is_default",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_default) = was_default else {
            tx.rollback().await?;
            return Ok(false);
        };

        if was_default {
            sqlx::query(
                r#"
                UPDATE addresses SET is_default = TRUE, updated_at = NOW()
                WHERE id = (
                    SELECT id FROM addresses
                    WHERE user_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                )
                "#,
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn set_default(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default AND id <> $2",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE addresses SET is_default = TRUE, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
