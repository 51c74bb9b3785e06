//! Order visibility and lifecycle transitions.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Order, OrderFilter, OrderItem, Principal, Role};
use crate::domain::order_status::{OrderStatus, TransitionError, check_transition};
use crate::domain::page::{PageRequest, Paged};
use crate::domain::repositories::OrderRepository;
use crate::error::AppError;

/// An order together with its frozen lines.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Service for reading and moving orders on behalf of a principal.
///
/// Users see their own orders, vendors the orders placed with them, admins
/// everything. Carts (`new` orders) are never listed here.
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists orders visible to `principal`.
    ///
    /// The scope of the principal always wins over the requested filter: a
    /// vendor asking for another vendor's orders gets its own.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when filtering on the `new` status.
    pub async fn list_for(
        &self,
        principal: Principal,
        requested: OrderFilter,
        page: PageRequest,
    ) -> Result<Paged<Order>, AppError> {
        if requested.status == Some(OrderStatus::New) {
            return Err(AppError::bad_request(
                "Carts are not listed as orders",
                json!({"status": "new"}),
            ));
        }

        let filter = scope(principal, requested);
        self.repository.list(filter, page).await
    }

    /// Returns an order with its items.
    ///
    /// Orders outside the principal's scope are reported as not found.
    pub async fn get_for(&self, principal: Principal, id: i64) -> Result<OrderDetail, AppError> {
        let order = self.visible_order(principal, id).await?;
        let items = self.repository.items(order.id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Moves an order to `target` on behalf of `principal`.
    ///
    /// `reason` is kept for cancellations.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the order is not visible to the principal
    /// - [`AppError::Conflict`] for an illegal transition, an unpaid refund,
    ///   or when the order changed concurrently
    /// - [`AppError::Forbidden`] if the principal's role may not perform it
    pub async fn transition(
        &self,
        principal: Principal,
        id: i64,
        target: OrderStatus,
        reason: Option<String>,
    ) -> Result<Order, AppError> {
        let order = self.visible_order(principal, id).await?;

        check_transition(order.status, target, principal.role, order.payment_status).map_err(
            |e| {
                let details = json!({
                    "id": id,
                    "from": order.status.as_str(),
                    "to": target.as_str(),
                });
                match e {
                    TransitionError::NotPermitted { .. } => {
                        AppError::forbidden(e.to_string(), details)
                    }
                    TransitionError::Illegal { .. } | TransitionError::NotPaid => {
                        AppError::conflict(e.to_string(), details)
                    }
                }
            },
        )?;

        let reason = reason.filter(|_| target == OrderStatus::Cancelled);

        let updated = self
            .repository
            .transition(id, order.status, target, reason)
            .await?
            .ok_or_else(|| {
                AppError::conflict(
                    "Order status changed concurrently",
                    json!({"id": id, "expected": order.status.as_str()}),
                )
            })?;

        tracing::info!(
            order_id = id,
            from = %order.status,
            to = %target,
            actor = %principal.role,
            actor_id = principal.subject_id,
            "Order status changed"
        );

        Ok(updated)
    }

    async fn visible_order(&self, principal: Principal, id: i64) -> Result<Order, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|o| o.status != OrderStatus::New && is_visible(principal, o))
            .ok_or_else(|| AppError::not_found("Order not found", json!({"id": id})))
    }
}

fn is_visible(principal: Principal, order: &Order) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Vendor => order.vendor_id == principal.subject_id,
        Role::User => order.user_id == principal.subject_id,
    }
}

fn scope(principal: Principal, requested: OrderFilter) -> OrderFilter {
    match principal.role {
        Role::Admin => requested,
        Role::Vendor => OrderFilter {
            vendor_id: Some(principal.subject_id),
            ..requested
        },
        Role::User => OrderFilter {
            user_id: Some(principal.subject_id),
            ..requested
        },
    }
}
