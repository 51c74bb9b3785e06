//! PostgreSQL implementation of the order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::parse_column;
use crate::domain::entities::{CartLine, Order, OrderFilter, OrderItem, OrderTotals};
use crate::domain::order_status::OrderStatus;
use crate::domain::page::{PageRequest, Paged};
use crate::domain::repositories::OrderRepository;
use crate::error::AppError;

const ORDER_COLUMNS: &str = r#"
    id, order_number, user_id, vendor_id, address_id, status, payment_mode, payment_status,
    subtotal, discount, packaging_charge, delivery_charge, convenience_fee, payable,
    gateway_order_id, gateway_payment_id, note, cancel_reason,
    placed_at, delivered_at, cancelled_at, refunded_at, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: i64,
    vendor_id: i64,
    address_id: Option<i64>,
    status: String,
    payment_mode: Option<String>,
    payment_status: String,
    subtotal: Decimal,
    discount: Decimal,
    packaging_charge: Decimal,
    delivery_charge: Decimal,
    convenience_fee: Decimal,
    payable: Decimal,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    note: Option<String>,
    cancel_reason: Option<String>,
    placed_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: r.id,
            order_number: r.order_number,
            user_id: r.user_id,
            vendor_id: r.vendor_id,
            address_id: r.address_id,
            status: parse_column("orders.status", &r.status)?,
            payment_mode: r
                .payment_mode
                .as_deref()
                .map(|m| parse_column("orders.payment_mode", m))
                .transpose()?,
            payment_status: parse_column("orders.payment_status", &r.payment_status)?,
            subtotal: r.subtotal,
            discount: r.discount,
            packaging_charge: r.packaging_charge,
            delivery_charge: r.delivery_charge,
            convenience_fee: r.convenience_fee,
            payable: r.payable,
            gateway_order_id: r.gateway_order_id,
            gateway_payment_id: r.gateway_payment_id,
            note: r.note,
            cancel_reason: r.cancel_reason,
            placed_at: r.placed_at,
            delivered_at: r.delivered_at,
            cancelled_at: r.cancelled_at,
            refunded_at: r.refunded_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: i64,
    name: String,
    image: Option<String>,
    price: Decimal,
    selling_price: Decimal,
    quantity: i32,
    in_stock: bool,
    is_active: bool,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    name: String,
    price: Decimal,
    selling_price: Decimal,
    quantity: i32,
}

fn convert_all(rows: Vec<OrderRow>) -> Result<Vec<Order>, AppError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

/// Locks the order row. Returns false unless it is still a cart.
async fn lock_cart(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: i64,
) -> Result<bool, AppError> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut **tx)
            .await?;

    Ok(status.as_deref() == Some(OrderStatus::New.as_str()))
}

fn not_a_cart(order_id: i64) -> AppError {
    AppError::conflict("Order is no longer a cart", json!({ "id": order_id }))
}

/// PostgreSQL repository for carts and orders.
///
/// Status changes are compare-and-set on the current status, so two actors
/// racing on the same order cannot both succeed.
pub struct PgOrderRepository {
    pool: Arc<PgPool>,
}

impl PgOrderRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_cart(&self, user_id: i64, vendor_id: i64) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1 AND vendor_id = $2 AND status = 'new'
            "#
        ))
        .bind(user_id)
        .bind(vendor_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_or_create_cart(
        &self,
        user_id: i64,
        vendor_id: i64,
        order_number: String,
    ) -> Result<Order, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (order_number, user_id, vendor_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, vendor_id) WHERE status = 'new'
            DO UPDATE SET updated_at = NOW()
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_number)
        .bind(user_id)
        .bind(vendor_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn list_carts(&self, user_id: i64) -> Result<Vec<Order>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            WHERE o.user_id = $1 AND o.status = 'new'
              AND EXISTS (SELECT 1 FROM order_items oi WHERE oi.order_id = o.id)
            ORDER BY o.updated_at DESC, o.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        convert_all(rows)
    }

    async fn cart_lines(&self, order_id: i64) -> Result<Vec<CartLine>, AppError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT oi.product_id, p.name, p.image, p.price, p.selling_price, oi.quantity,
                   p.in_stock, (p.is_active AND p.deleted_at IS NULL) AS is_active
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.created_at, oi.id
            "#,
        )
        .bind(order_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CartLine {
                product_id: r.product_id,
                name: r.name,
                image: r.image,
                price: r.price,
                selling_price: r.selling_price,
                quantity: r.quantity,
                in_stock: r.in_stock,
                is_active: r.is_active,
            })
            .collect())
    }

    async fn add_item(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<i32, AppError> {
        let mut tx = self.pool.begin().await?;

        if !lock_cart(&mut tx, order_id).await? {
            tx.rollback().await?;
            return Err(not_a_cart(order_id));
        }

        let new_quantity: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, product_id)
            DO UPDATE SET quantity = order_items.quantity + EXCLUDED.quantity
            RETURNING quantity
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE orders SET updated_at = NOW() WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(new_quantity)
    }

    async fn set_item_quantity(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE order_items SET quantity = $3
            WHERE order_id = $1 AND product_id = $2
              AND EXISTS (SELECT 1 FROM orders WHERE id = $1 AND status = 'new')
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_item(&self, order_id: i64, product_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM order_items
            WHERE order_id = $1 AND product_id = $2
              AND EXISTS (SELECT 1 FROM orders WHERE id = $1 AND status = 'new')
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_items(&self, order_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            DELETE FROM order_items
            WHERE order_id = $1
              AND EXISTS (SELECT 1 FROM orders WHERE id = $1 AND status = 'new')
            "#,
        )
        .bind(order_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn abandon_payment(&self, order_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE orders SET
                payment_status   = 'unpaid',
                payment_mode     = NULL,
                gateway_order_id = NULL,
                updated_at       = NOW()
            WHERE id = $1 AND status = 'new' AND payment_status = 'pending'
            "#,
        )
        .bind(order_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn checkout(
        &self,
        order_id: i64,
        totals: OrderTotals,
        lines: Vec<CartLine>,
        gateway_order_id: Option<String>,
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        if !lock_cart(&mut tx, order_id).await? {
            tx.rollback().await?;
            return Err(not_a_cart(order_id));
        }

        let mut current: Vec<(i64, i32)> = sqlx::query_as(
            "SELECT product_id, quantity FROM order_items WHERE order_id = $1 ORDER BY product_id",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;
        current.sort_unstable();

        let mut priced: Vec<(i64, i32)> =
            lines.iter().map(|l| (l.product_id, l.quantity)).collect();
        priced.sort_unstable();

        if current != priced {
            tx.rollback().await?;
            return Err(AppError::conflict(
                "Cart changed during checkout",
                json!({ "id": order_id }),
            ));
        }

        for line in &lines {
            sqlx::query(
                r#"
                UPDATE order_items SET name = $3, price = $4, selling_price = $5, quantity = $6
                WHERE order_id = $1 AND product_id = $2
                "#,
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.name)
            .bind(line.price)
            .bind(line.selling_price)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders SET
                address_id       = $2,
                payment_mode     = $3,
                subtotal         = $4,
                discount         = $5,
                packaging_charge = $6,
                delivery_charge  = $7,
                convenience_fee  = $8,
                payable          = $9,
                note             = $10,
                gateway_order_id = $11,
                status           = CASE WHEN $11::TEXT IS NULL THEN 'placed' ELSE 'new' END,
                payment_status   = CASE WHEN $11::TEXT IS NULL THEN 'unpaid' ELSE 'pending' END,
                placed_at        = CASE WHEN $11::TEXT IS NULL THEN NOW() ELSE NULL END,
                updated_at       = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(totals.address_id)
        .bind(totals.payment_mode.as_str())
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.packaging_charge)
        .bind(totals.delivery_charge)
        .bind(totals.convenience_fee)
        .bind(totals.payable)
        .bind(&totals.note)
        .bind(gateway_order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    async fn confirm_payment(
        &self,
        order_id: i64,
        gateway_payment_id: String,
    ) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders SET
                status             = 'placed',
                payment_status     = 'paid',
                gateway_payment_id = $2,
                placed_at          = NOW(),
                updated_at         = NOW()
            WHERE id = $1 AND status = 'new' AND payment_status = 'pending'
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(gateway_payment_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn items(&self, order_id: i64) -> Result<Vec<OrderItem>, AppError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, name, price, selling_price, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| OrderItem {
                id: r.id,
                order_id: r.order_id,
                product_id: r.product_id,
                name: r.name,
                price: r.price,
                selling_price: r.selling_price,
                quantity: r.quantity,
            })
            .collect())
    }

    async fn list(&self, filter: OrderFilter, page: PageRequest) -> Result<Paged<Order>, AppError> {
        const WHERE_CLAUSE: &str = r#"
            WHERE status <> 'new'
              AND ($1::BIGINT IS NULL OR user_id = $1)
              AND ($2::BIGINT IS NULL OR vendor_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
        "#;

        let status = filter.status.map(|s| s.as_str());

        let list_sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            {WHERE_CLAUSE}
            ORDER BY placed_at DESC NULLS LAST, id DESC
            OFFSET $4 LIMIT $5
            "#
        );
        let count_sql = format!("SELECT COUNT(*) FROM orders {WHERE_CLAUSE}");

        let rows = sqlx::query_as::<_, OrderRow>(&list_sql)
            .bind(filter.user_id)
            .bind(filter.vendor_id)
            .bind(status)
            .bind(page.offset)
            .bind(page.limit)
            .fetch_all(self.pool.as_ref());

        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.user_id)
            .bind(filter.vendor_id)
            .bind(status)
            .fetch_one(self.pool.as_ref());

        let (rows, total) = tokio::try_join!(rows, total)?;

        Ok(Paged {
            items: convert_all(rows)?,
            total,
        })
    }

    async fn transition(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
        reason: Option<String>,
    ) -> Result<Option<Order>, AppError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders SET
                status         = $3,
                delivered_at   = CASE WHEN $3 = 'delivered' THEN NOW() ELSE delivered_at END,
                cancelled_at   = CASE WHEN $3 = 'cancelled' THEN NOW() ELSE cancelled_at END,
                cancel_reason  = CASE WHEN $3 = 'cancelled' THEN $4::TEXT ELSE cancel_reason END,
                refunded_at    = CASE WHEN $3 = 'refunded' THEN NOW() ELSE refunded_at END,
                payment_status = CASE WHEN $3 = 'refunded' THEN 'refunded' ELSE payment_status END,
                updated_at     = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(reason)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
