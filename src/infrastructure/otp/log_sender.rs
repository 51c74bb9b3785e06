use super::sender::{OtpSendError, OtpSender};
use async_trait::async_trait;
use tracing::info;

/// Sender that logs codes instead of delivering them.
///
/// Intended for development; production deployments plug an SMS provider
/// in behind [`OtpSender`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send(&self, phone: &str, code: &str) -> Result<(), OtpSendError> {
        info!(phone, code, "OTP issued");
        Ok(())
    }
}
