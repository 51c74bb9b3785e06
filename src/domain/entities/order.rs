//! Order entity. An order in status `new` is the user's cart for one vendor.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::domain::order_status::OrderStatus;

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// Cash on delivery.
    Cod,
    /// Hosted online payment.
    Online,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cod => "cod",
            PaymentMode::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMode::Cod),
            "online" => Ok(PaymentMode::Online),
            other => Err(format!("unknown payment mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    /// Gateway order created, waiting for the customer to pay.
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// A cart or an order.
///
/// Monetary totals are only meaningful once the order has been checked out;
/// for carts they are computed on the fly from [`CartLine`]s.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub vendor_id: i64,
    pub address_id: Option<i64>,
    pub status: OrderStatus,
    pub payment_mode: Option<PaymentMode>,
    pub payment_status: PaymentStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub convenience_fee: Decimal,
    pub payable: Decimal,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub note: Option<String>,
    pub cancel_reason: Option<String>,
    pub placed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of a checked-out order, with prices frozen at checkout time.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.selling_price * Decimal::from(self.quantity)
    }
}

/// A cart line joined with the product's current catalog data.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i32,
    pub in_stock: bool,
    pub is_active: bool,
}

impl CartLine {
    pub fn is_orderable(&self) -> bool {
        self.is_active && self.in_stock
    }
}

/// Totals and payment details written to an order at checkout.
#[derive(Debug, Clone)]
pub struct OrderTotals {
    pub address_id: i64,
    pub payment_mode: PaymentMode,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub convenience_fee: Decimal,
    pub payable: Decimal,
    pub note: Option<String>,
}

/// Filter for order listings. `None` fields are not filtered on.
///
/// Listings never include carts (`new` orders) regardless of `status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub user_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub status: Option<OrderStatus>,
}
