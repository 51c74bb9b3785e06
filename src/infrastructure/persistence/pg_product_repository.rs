//! PostgreSQL implementation of the product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewProduct, Product, UpdateProduct};
use crate::domain::page::{PageRequest, Paged};
use crate::domain::repositories::ProductRepository;
use crate::error::AppError;

const PRODUCT_COLUMNS: &str = r#"
    id, vendor_id, name, description, image, price, selling_price,
    in_stock, is_active, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    vendor_id: i64,
    name: String,
    description: Option<String>,
    image: Option<String>,
    price: Decimal,
    selling_price: Decimal,
    in_stock: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            vendor_id: r.vendor_id,
            name: r.name,
            description: r.description,
            image: r.image,
            price: r.price,
            selling_price: r.selling_price,
            in_stock: r.in_stock,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for products.
///
/// Rows are soft deleted: `deleted_at IS NOT NULL` means deleted. Order lines keep
/// referencing deleted products.
pub struct PgProductRepository {
    pool: Arc<PgPool>,
}

impl PgProductRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, p: NewProduct) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (vendor_id, name, description, image, price, selling_price, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(p.vendor_id)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.image)
        .bind(p.price)
        .bind(p.selling_price)
        .bind(p.in_stock)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_vendor(
        &self,
        vendor_id: i64,
        only_active: bool,
        page: PageRequest,
    ) -> Result<Paged<Product>, AppError> {
        let active_filter = if only_active { Some(true) } else { None };

        let list_sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE vendor_id = $1 AND deleted_at IS NULL
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
            ORDER BY name, id
            OFFSET $3 LIMIT $4
            "#
        );

        let rows = sqlx::query_as::<_, ProductRow>(&list_sql)
            .bind(vendor_id)
            .bind(active_filter)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE vendor_id = $1 AND deleted_at IS NULL
              AND ($2::BOOLEAN IS NULL OR is_active = $2)
            "#,
        )
        .bind(vendor_id)
        .bind(active_filter)
        .fetch_one(self.pool.as_ref());

        let (rows, total) = tokio::try_join!(rows, total)?;

        Ok(Paged {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn update(&self, id: i64, u: UpdateProduct) -> Result<Product, AppError> {
        let update_description = u.description.is_some();
        let update_image = u.image.is_some();

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products SET
                name          = COALESCE($2::TEXT, name),
                description   = CASE WHEN $3 THEN $4::TEXT ELSE description END,
                image         = CASE WHEN $5 THEN $6::TEXT ELSE image END,
                price         = COALESCE($7::NUMERIC, price),
                selling_price = COALESCE($8::NUMERIC, selling_price),
                in_stock      = COALESCE($9::BOOLEAN, in_stock),
                is_active     = COALESCE($10::BOOLEAN, is_active),
                updated_at    = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(u.name)
        .bind(update_description)
        .bind(u.description.flatten())
        .bind(update_image)
        .bind(u.image.flatten())
        .bind(u.price)
        .bind(u.selling_price)
        .bind(u.in_stock)
        .bind(u.is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Product not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET deleted_at = NOW(), is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
