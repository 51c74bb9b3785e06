//! PostgreSQL implementation of the vendor repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NearbyVendor, NewVendor, UpdateVendor, Vendor};
use crate::domain::page::{PageRequest, Paged};
use crate::domain::repositories::{NearbyQuery, VendorRepository};
use crate::error::AppError;

const VENDOR_COLUMNS: &str = r#"
    id, module_id, name, email, phone, password_hash, address, latitude, longitude,
    image, is_active, is_open, packaging_charge, delivery_charge, free_delivery_above,
    min_order_amount, delivery_radius_km, created_at, updated_at
"#;

/// Great-circle distance in kilometres between the vendor and `($1, $2)`.
const HAVERSINE_KM: &str = r#"
    6371.0 * 2 * ASIN(LEAST(1.0, SQRT(
        POWER(SIN(RADIANS(v.latitude - $1) / 2), 2)
        + COS(RADIANS($1)) * COS(RADIANS(v.latitude))
          * POWER(SIN(RADIANS(v.longitude - $2) / 2), 2)
    )))
"#;

#[derive(sqlx::FromRow)]
struct VendorRow {
    id: i64,
    module_id: i64,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    address: String,
    latitude: f64,
    longitude: f64,
    image: Option<String>,
    is_active: bool,
    is_open: bool,
    packaging_charge: Decimal,
    delivery_charge: Decimal,
    free_delivery_above: Option<Decimal>,
    min_order_amount: Decimal,
    delivery_radius_km: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct NearbyRow {
    #[sqlx(flatten)]
    vendor: VendorRow,
    distance_km: f64,
}

impl From<VendorRow> for Vendor {
    fn from(r: VendorRow) -> Self {
        Vendor {
            id: r.id,
            module_id: r.module_id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            password_hash: r.password_hash,
            address: r.address,
            latitude: r.latitude,
            longitude: r.longitude,
            image: r.image,
            is_active: r.is_active,
            is_open: r.is_open,
            packaging_charge: r.packaging_charge,
            delivery_charge: r.delivery_charge,
            free_delivery_above: r.free_delivery_above,
            min_order_amount: r.min_order_amount,
            delivery_radius_km: r.delivery_radius_km,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for vendors.
///
/// Nearest-vendor search computes haversine distance in SQL so no spatial
/// extension is required.
pub struct PgVendorRepository {
    pool: Arc<PgPool>,
}

impl PgVendorRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VendorRepository for PgVendorRepository {
    async fn create(&self, v: NewVendor) -> Result<Vendor, AppError> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            r#"
            INSERT INTO vendors (
                module_id, name, email, phone, password_hash, address, latitude, longitude,
                image, packaging_charge, delivery_charge, free_delivery_above,
                min_order_amount, delivery_radius_km
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(v.module_id)
        .bind(&v.name)
        .bind(&v.email)
        .bind(&v.phone)
        .bind(&v.password_hash)
        .bind(&v.address)
        .bind(v.latitude)
        .bind(v.longitude)
        .bind(&v.image)
        .bind(v.packaging_charge)
        .bind(v.delivery_charge)
        .bind(v.free_delivery_above)
        .bind(v.min_order_amount)
        .bind(v.delivery_radius_km)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Vendor>, AppError> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, AppError> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list(
        &self,
        module_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Paged<Vendor>, AppError> {
        let list_sql = format!(
            r#"
            SELECT {VENDOR_COLUMNS}
            FROM vendors
            WHERE ($1::BIGINT IS NULL OR module_id = $1)
            ORDER BY name, id
            OFFSET $2 LIMIT $3
            "#
        );

        let rows = sqlx::query_as::<_, VendorRow>(&list_sql)
            .bind(module_id)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref());

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM vendors WHERE ($1::BIGINT IS NULL OR module_id = $1)",
        )
        .bind(module_id)
        .fetch_one(self.pool.as_ref());

        let (rows, total) = tokio::try_join!(rows, total)?;

        Ok(Paged {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn update(&self, id: i64, u: UpdateVendor) -> Result<Vendor, AppError> {
        let update_image = u.image.is_some();
        let update_free_delivery = u.free_delivery_above.is_some();

        let row = sqlx::query_as::<_, VendorRow>(&format!(
            r#"
            UPDATE vendors SET
                module_id           = COALESCE($2::BIGINT, module_id),
                name                = COALESCE($3::TEXT, name),
                phone               = COALESCE($4::TEXT, phone),
                address             = COALESCE($5::TEXT, address),
                latitude            = COALESCE($6::FLOAT8, latitude),
                longitude           = COALESCE($7::FLOAT8, longitude),
                image               = CASE WHEN $8 THEN $9::TEXT ELSE image END,
                is_active           = COALESCE($10::BOOLEAN, is_active),
                is_open             = COALESCE($11::BOOLEAN, is_open),
                packaging_charge    = COALESCE($12::NUMERIC, packaging_charge),
                delivery_charge     = COALESCE($13::NUMERIC, delivery_charge),
                free_delivery_above = CASE WHEN $14 THEN $15::NUMERIC ELSE free_delivery_above END,
                min_order_amount    = COALESCE($16::NUMERIC, min_order_amount),
                delivery_radius_km  = COALESCE($17::FLOAT8, delivery_radius_km),
                updated_at          = NOW()
            WHERE id = $1
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(u.module_id)
        .bind(u.name)
        .bind(u.phone)
        .bind(u.address)
        .bind(u.latitude)
        .bind(u.longitude)
        .bind(update_image)
        .bind(u.image.flatten())
        .bind(u.is_active)
        .bind(u.is_open)
        .bind(u.packaging_charge)
        .bind(u.delivery_charge)
        .bind(update_free_delivery)
        .bind(u.free_delivery_above.flatten())
        .bind(u.min_order_amount)
        .bind(u.delivery_radius_km)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Vendor not found", json!({ "id": id })))
    }

    async fn find_nearby(&self, query: NearbyQuery) -> Result<Vec<NearbyVendor>, AppError> {
        let sql = format!(
            r#"
            SELECT *
            FROM (
                SELECT v.*, {HAVERSINE_KM} AS distance_km
                FROM vendors v
                JOIN modules m ON m.id = v.module_id
                WHERE v.is_active AND v.is_open AND m.is_active
                  AND ($3::BIGINT IS NULL OR v.module_id = $3)
            ) nearby
            WHERE distance_km <= delivery_radius_km
              AND ($4::FLOAT8 IS NULL OR distance_km <= $4)
            ORDER BY distance_km, id
            LIMIT $5
            "#
        );

        let rows = sqlx::query_as::<_, NearbyRow>(&sql)
            .bind(query.latitude)
            .bind(query.longitude)
            .bind(query.module_id)
            .bind(query.radius_km)
            .bind(query.limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| NearbyVendor {
                vendor: r.vendor.into(),
                distance_km: r.distance_km,
            })
            .collect())
    }
}
