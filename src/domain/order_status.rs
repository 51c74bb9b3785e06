//! Order lifecycle state machine.
//!
//! ```text
//!            checkout              deliver
//!   New ─────────────▶ Placed ─────────────▶ Delivered ──┐
//!                        │                               │ refund (admin, paid only)
//!                        │ cancel                        ▼
//!                        └──────────────▶ Cancelled ──▶ Refunded
//!                                                 refund (admin, paid only)
//! ```
//!
//! `New` is the cart state. Leaving it only happens through checkout, never
//! through the generic status endpoint.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::entities::{PaymentStatus, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    New,
    Placed,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::Placed,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Placed => "placed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Refunded)
    }

    /// Returns true if `self -> to` is an edge of the lifecycle graph.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (New, Placed)
                | (Placed, Delivered)
                | (Placed, Cancelled)
                | (Cancelled, Refunded)
                | (Delivered, Refunded)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

/// Reasons a requested status change is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot move order from {from} to {to}")]
    Illegal { from: OrderStatus, to: OrderStatus },

    #[error("A {actor} cannot move an order to {to}")]
    NotPermitted { actor: Role, to: OrderStatus },

    #[error("Only paid orders can be refunded")]
    NotPaid,
}

/// Validates a status change requested through the order status endpoints.
///
/// Checkout (`New -> Placed`) has its own flow and is rejected here for
/// every actor.
///
/// # Errors
///
/// - [`TransitionError::Illegal`] if the edge does not exist or is the checkout edge
/// - [`TransitionError::NotPermitted`] if `actor` may not perform it
/// - [`TransitionError::NotPaid`] when refunding an order that was never paid
pub fn check_transition(
    from: OrderStatus,
    to: OrderStatus,
    actor: Role,
    payment_status: PaymentStatus,
) -> Result<(), TransitionError> {
    if !from.can_transition_to(to) || from == OrderStatus::New {
        return Err(TransitionError::Illegal { from, to });
    }

    let permitted = match to {
        OrderStatus::Delivered => matches!(actor, Role::Vendor | Role::Admin),
        OrderStatus::Cancelled => true,
        OrderStatus::Refunded => actor == Role::Admin,
        OrderStatus::New | OrderStatus::Placed => false,
    };

    if !permitted {
        return Err(TransitionError::NotPermitted { actor, to });
    }

    if to == OrderStatus::Refunded && payment_status != PaymentStatus::Paid {
        return Err(TransitionError::NotPaid);
    }

    Ok(())
}
