//! Payment gateway used when online payments are not configured.

use super::service::{GatewayOrder, PaymentError, PaymentGateway, PaymentResult};
use async_trait::async_trait;
use tracing::debug;

/// A gateway that refuses every online payment.
///
/// Cash-on-delivery checkout keeps working.
pub struct DisabledPaymentGateway {
    currency: String,
}

impl DisabledPaymentGateway {
    pub fn new(currency: impl Into<String>) -> Self {
        debug!("Using DisabledPaymentGateway (online payments off)");
        Self {
            currency: currency.into(),
        }
    }
}

impl Default for DisabledPaymentGateway {
    fn default() -> Self {
        Self::new("INR")
    }
}

#[async_trait]
impl PaymentGateway for DisabledPaymentGateway {
    fn is_enabled(&self) -> bool {
        false
    }

    fn key_id(&self) -> Option<&str> {
        None
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    async fn create_order(&self, _amount: i64, _receipt: &str) -> PaymentResult<GatewayOrder> {
        Err(PaymentError::Disabled)
    }

    fn verify_signature(&self, _order_id: &str, _payment_id: &str, _signature: &str) -> bool {
        false
    }
}
