//! Repository trait for carts and orders.

use crate::domain::entities::{CartLine, Order, OrderFilter, OrderItem, OrderTotals};
use crate::domain::order_status::OrderStatus;
use crate::domain::page::{PageRequest, Paged};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for carts and orders.
///
/// A cart is the single `new` order of a `(user, vendor)` pair; the database
/// enforces that at most one exists.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgOrderRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Returns the user's cart for a vendor, if one exists.
    async fn find_cart(&self, user_id: i64, vendor_id: i64) -> Result<Option<Order>, AppError>;

    /// Returns the user's cart for a vendor, creating it if needed.
    ///
    /// - `order_number` - Number assigned if a new cart is created
    async fn find_or_create_cart(
        &self,
        user_id: i64,
        vendor_id: i64,
        order_number: String,
    ) -> Result<Order, AppError>;

    /// Lists the user's carts that contain at least one line.
    async fn list_carts(&self, user_id: i64) -> Result<Vec<Order>, AppError>;

    /// Cart lines joined with current product data, ordered by insertion.
    async fn cart_lines(&self, order_id: i64) -> Result<Vec<CartLine>, AppError>;

    /// Adds `quantity` units of a product, returning the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the order is no longer a cart.
    async fn add_item(&self, order_id: i64, product_id: i64, quantity: i32)
    -> Result<i32, AppError>;

    /// Sets a line's quantity. Returns false if the line does not exist or the
    /// order is no longer a cart.
    async fn set_item_quantity(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<bool, AppError>;

    /// Removes a line. Returns false if the line does not exist.
    async fn remove_item(&self, order_id: i64, product_id: i64) -> Result<bool, AppError>;

    async fn clear_items(&self, order_id: i64) -> Result<(), AppError>;

    /// Drops a started online payment so the cart can be edited and checked
    /// out again. No-op unless the cart is awaiting payment.
    async fn abandon_payment(&self, order_id: i64) -> Result<(), AppError>;

    /// Freezes cart lines and totals onto the order.
    ///
    /// With `gateway_order_id: None` the order becomes `placed` immediately
    /// (cash on delivery). Otherwise it stays `new` with payment `pending`
    /// until [`OrderRepository::confirm_payment`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the order is no longer a cart, or if
    /// its lines differ from `lines` (edited after they were priced).
    async fn checkout(
        &self,
        order_id: i64,
        totals: OrderTotals,
        lines: Vec<CartLine>,
        gateway_order_id: Option<String>,
    ) -> Result<Order, AppError>;

    /// Marks a pending online payment as paid and places the order.
    ///
    /// Returns `None` if the order is not awaiting payment.
    async fn confirm_payment(
        &self,
        order_id: i64,
        gateway_payment_id: String,
    ) -> Result<Option<Order>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, AppError>;

    /// Frozen lines of an order.
    async fn items(&self, order_id: i64) -> Result<Vec<OrderItem>, AppError>;

    /// Lists non-cart orders matching the filter, newest first.
    async fn list(&self, filter: OrderFilter, page: PageRequest) -> Result<Paged<Order>, AppError>;

    /// Moves an order from `from` to `to` if it is still in `from`.
    ///
    /// Stamps the matching timestamp; refunding also marks the payment refunded.
    /// Returns `None` when the order was concurrently moved elsewhere.
    async fn transition(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
        reason: Option<String>,
    ) -> Result<Option<Order>, AppError>;
}
