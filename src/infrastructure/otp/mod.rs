//! Delivery of one-time login codes.

mod log_sender;
mod sender;

pub use log_sender::LogOtpSender;
pub use sender::{OtpSendError, OtpSender};
