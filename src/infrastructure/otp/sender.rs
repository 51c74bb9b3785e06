use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to deliver OTP: {0}")]
pub struct OtpSendError(pub String);

/// Delivers a freshly generated login code to a phone number.
///
/// # Implementations
///
/// - [`crate::infrastructure::otp::LogOtpSender`] - Writes the code to the log
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send(&self, phone: &str, code: &str) -> Result<(), OtpSendError>;
}
