//! Payment gateway trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Online payments are not configured")]
    Disabled,

    #[error("Payment provider request failed: {0}")]
    Request(String),

    #[error("Payment provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

impl PaymentError {
    /// Returns true for failures worth retrying (network errors and 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Disabled | Self::InvalidResponse(_) => false,
        }
    }
}

/// Result type for payment operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// An order created on the provider side, which the client pays against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor units (paise, cents).
    pub amount: i64,
    pub currency: String,
}

/// Trait for hosted payment providers.
///
/// The flow is: the server creates a provider order for the payable amount,
/// the client pays on the provider's hosted page, and the provider returns a
/// payment id plus a signature that the server verifies before placing the
/// order.
///
/// # Implementations
///
/// - [`crate::infrastructure::payment::HostedPaymentGateway`] - HTTP provider client
/// - [`crate::infrastructure::payment::DisabledPaymentGateway`] - Rejects online payments
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Whether online checkout is available.
    fn is_enabled(&self) -> bool;

    /// Public key id handed to clients to open the hosted checkout.
    fn key_id(&self) -> Option<&str>;

    /// ISO currency code used for every order.
    fn currency(&self) -> &str;

    /// Creates a provider order.
    ///
    /// # Arguments
    ///
    /// - `amount` - Amount in minor units
    /// - `receipt` - Merchant reference, the marketplace order number
    async fn create_order(&self, amount: i64, receipt: &str) -> PaymentResult<GatewayOrder>;

    /// Verifies the signature returned by the provider after payment.
    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool;
}
