//! DTOs for carts, checkout and payment verification.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::order::OrderResponse;
use crate::application::services::{CartView, CheckoutOutcome, CheckoutRequest, PaymentIntent};
use crate::domain::entities::{CartLine, PaymentMode};
use crate::domain::pricing::PriceBreakdown;

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: i64,
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    pub quantity: i32,
}

/// New quantity of a line; 0 removes it.
#[derive(Debug, Deserialize, Validate)]
pub struct SetQuantityRequest {
    #[validate(range(min = 0, max = 1000, message = "Quantity must be between 0 and 1000"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub product_id: i64,
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
    pub available: bool,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            line_total: line.selling_price * Decimal::from(line.quantity),
            available: line.is_orderable(),
            product_id: line.product_id,
            name: line.name,
            image: line.image,
            price: line.price,
            selling_price: line.selling_price,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PricingResponse {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub item_total: Decimal,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub convenience_fee: Decimal,
    pub payable: Decimal,
}

impl From<PriceBreakdown> for PricingResponse {
    fn from(p: PriceBreakdown) -> Self {
        Self {
            subtotal: p.subtotal,
            discount: p.discount,
            item_total: p.item_total,
            packaging_charge: p.packaging_charge,
            delivery_charge: p.delivery_charge,
            convenience_fee: p.convenience_fee,
            payable: p.payable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub vendor_id: i64,
    pub vendor_name: String,
    /// `null` until the first item is added.
    pub cart_id: Option<i64>,
    pub items: Vec<CartLineResponse>,
    pub pricing: PricingResponse,
    pub min_order_amount: Decimal,
    pub meets_minimum: bool,
    pub vendor_open: bool,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            vendor_id: view.vendor.id,
            meets_minimum: view.pricing.meets_minimum(view.vendor.min_order_amount),
            min_order_amount: view.vendor.min_order_amount,
            vendor_open: view.vendor.accepts_orders(),
            vendor_name: view.vendor.name,
            cart_id: view.cart.map(|c| c.id),
            items: view.lines.into_iter().map(Into::into).collect(),
            pricing: view.pricing.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartListResponse {
    pub items: Vec<CartResponse>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutBody {
    pub address_id: i64,
    /// `cod` or `online`.
    pub payment_mode: String,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl CheckoutBody {
    /// Parses the payment mode into a service request.
    pub fn into_request(self) -> Result<CheckoutRequest, String> {
        let payment_mode: PaymentMode = self.payment_mode.trim().parse()?;
        Ok(CheckoutRequest {
            address_id: self.address_id,
            payment_mode,
            note: self
                .note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub gateway_order_id: String,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub key_id: Option<String>,
}

impl From<PaymentIntent> for PaymentIntentResponse {
    fn from(p: PaymentIntent) -> Self {
        Self {
            gateway_order_id: p.gateway_order_id,
            amount: p.amount,
            currency: p.currency,
            key_id: p.key_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentIntentResponse>,
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            order: outcome.order.into(),
            payment: outcome.payment.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, max = 100))]
    pub gateway_payment_id: String,
    #[validate(length(min = 1, max = 200))]
    pub signature: String,
}
