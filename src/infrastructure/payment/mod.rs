//! Hosted payment gateway integration.
//!
//! Provides a [`PaymentGateway`] trait with two implementations:
//! - [`HostedPaymentGateway`] - REST client for an orders-API style provider
//! - [`DisabledPaymentGateway`] - Used when no credentials are configured

mod disabled;
mod hosted;
mod service;

pub use disabled::DisabledPaymentGateway;
pub use hosted::{HostedPaymentGateway, sign_payment};
pub use service::{GatewayOrder, PaymentError, PaymentGateway, PaymentResult};
