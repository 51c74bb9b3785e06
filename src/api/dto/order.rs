//! DTOs for order listing, detail and status changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::api::dto::pagination::PaginationParams;
use crate::application::services::OrderDetail;
use crate::domain::entities::{Order, OrderFilter, OrderItem};
use crate::domain::order_status::OrderStatus;

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub user_id: i64,
    pub vendor_id: i64,
    pub address_id: Option<i64>,
    pub status: &'static str,
    pub payment_mode: Option<&'static str>,
    pub payment_status: &'static str,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub convenience_fee: Decimal,
    pub payable: Decimal,
    pub gateway_order_id: Option<String>,
    pub note: Option<String>,
    pub cancel_reason: Option<String>,
    pub placed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            vendor_id: o.vendor_id,
            address_id: o.address_id,
            status: o.status.as_str(),
            payment_mode: o.payment_mode.map(|m| m.as_str()),
            payment_status: o.payment_status.as_str(),
            subtotal: o.subtotal,
            discount: o.discount,
            packaging_charge: o.packaging_charge,
            delivery_charge: o.delivery_charge,
            convenience_fee: o.convenience_fee,
            payable: o.payable,
            gateway_order_id: o.gateway_order_id,
            note: o.note,
            cancel_reason: o.cancel_reason,
            placed_at: o.placed_at,
            delivered_at: o.delivered_at,
            cancelled_at: o.cancelled_at,
            refunded_at: o.refunded_at,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            line_total: item.line_total(),
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            selling_price: item.selling_price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            order: detail.order.into(),
            items: detail.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query of the order listings. Role scoping is applied on top of it.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub status: Option<OrderStatus>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub vendor_id: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl OrderListParams {
    pub fn filter(&self) -> OrderFilter {
        OrderFilter {
            user_id: self.user_id,
            vendor_id: self.vendor_id,
            status: self.status,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct StatusChangeRequest {
    #[serde_as(as = "DisplayFromStr")]
    pub status: OrderStatus,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_change_parses_status() {
        let req: StatusChangeRequest =
            serde_json::from_str(r#"{"status": "delivered"}"#).unwrap();
        assert_eq!(req.status, OrderStatus::Delivered);

        assert!(serde_json::from_str::<StatusChangeRequest>(r#"{"status": "lost"}"#).is_err());
    }

    #[test]
    fn test_list_params_filter() {
        let params: OrderListParams =
            serde_json::from_str(r#"{"status": "placed", "vendor_id": "4", "page": "2"}"#)
                .unwrap();
        let filter = params.filter();
        assert_eq!(filter.status, Some(OrderStatus::Placed));
        assert_eq!(filter.vendor_id, Some(4));
        assert_eq!(filter.user_id, None);
        assert_eq!(params.pagination.page, Some(2));
    }
}
