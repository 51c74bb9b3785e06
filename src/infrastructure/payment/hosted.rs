//! HTTP client for a hosted payment provider.

use super::service::{GatewayOrder, PaymentError, PaymentGateway, PaymentResult};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Number of attempts made for a provider order before giving up.
const CREATE_ORDER_ATTEMPTS: usize = 3;

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Computes the hex HMAC-SHA256 signature of `"{order_id}|{payment_id}"`.
pub fn sign_payment(secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{gateway_order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Orders-API payment provider client.
///
/// Creates orders with `POST {base_url}/orders` using HTTP basic auth
/// (`key_id:key_secret`). Transient failures are retried with jittered
/// exponential backoff.
pub struct HostedPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    currency: String,
}

impl HostedPaymentGateway {
    /// Builds a client for the provider.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Request`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        currency: impl Into<String>,
    ) -> PaymentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            currency: currency.into(),
        })
    }

    async fn try_create_order(&self, amount: i64, receipt: &str) -> PaymentResult<GatewayOrder> {
        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount,
                currency: &self.currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let order: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }
}

#[async_trait]
impl PaymentGateway for HostedPaymentGateway {
    fn is_enabled(&self) -> bool {
        true
    }

    fn key_id(&self) -> Option<&str> {
        Some(&self.key_id)
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    async fn create_order(&self, amount: i64, receipt: &str) -> PaymentResult<GatewayOrder> {
        let strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(CREATE_ORDER_ATTEMPTS - 1);

        let order = RetryIf::start(
            strategy,
            || self.try_create_order(amount, receipt),
            |e: &PaymentError| {
                let retry = e.is_transient();
                if retry {
                    warn!(error = %e, receipt, "Payment provider call failed, retrying");
                }
                retry
            },
        )
        .await?;

        info!(gateway_order_id = %order.id, amount, receipt, "Payment provider order created");
        Ok(order)
    }

    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };

        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(format!("{gateway_order_id}|{payment_id}").as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn gateway() -> HostedPaymentGateway {
        HostedPaymentGateway::new("https://pay.example.com/v1/", "key_123", "s3cret", "INR")
            .unwrap()
    }

    /// Provider stub answering `status` to the first `failures` calls.
    async fn provider(failures: usize, status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));

        let app = Router::new()
            .route(
                "/orders",
                axum::routing::post(
                    move |State(calls): State<Arc<AtomicUsize>>| async move {
                        if calls.fetch_add(1, Ordering::SeqCst) < failures {
                            return (status, "busy").into_response();
                        }
                        Json(serde_json::json!({
                            "id": "order_abc",
                            "amount": 28500,
                            "currency": "INR"
                        }))
                        .into_response()
                    },
                ),
            )
            .with_state(calls.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), calls)
    }

    #[tokio::test]
    async fn test_create_order_retries_transient_failures() {
        let (url, calls) = provider(2, StatusCode::SERVICE_UNAVAILABLE).await;
        let gateway = HostedPaymentGateway::new(url, "key_123", "s3cret", "INR").unwrap();

        let order = gateway.create_order(28500, "ORD-250101-AAAAAA").await.unwrap();

        assert_eq!(order.id, "order_abc");
        assert_eq!(order.amount, 28500);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_create_order_gives_up_after_attempts() {
        let (url, calls) = provider(usize::MAX, StatusCode::BAD_GATEWAY).await;
        let gateway = HostedPaymentGateway::new(url, "key_123", "s3cret", "INR").unwrap();

        let result = gateway.create_order(28500, "ORD-250101-AAAAAA").await;

        assert!(matches!(result, Err(PaymentError::Rejected { status: 502, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), CREATE_ORDER_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_create_order_does_not_retry_client_errors() {
        let (url, calls) = provider(usize::MAX, StatusCode::BAD_REQUEST).await;
        let gateway = HostedPaymentGateway::new(url, "key_123", "s3cret", "INR").unwrap();

        let result = gateway.create_order(28500, "ORD-250101-AAAAAA").await;

        assert!(matches!(result, Err(PaymentError::Rejected { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(gateway().base_url, "https://pay.example.com/v1");
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign_payment("s3cret", "order_abc", "pay_xyz");
        assert!(gateway().verify_signature("order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn test_signature_bound_to_payment() {
        let signature = sign_payment("s3cret", "order_abc", "pay_xyz");
        assert!(!gateway().verify_signature("order_abc", "pay_other", &signature));
        assert!(!gateway().verify_signature("order_other", "pay_xyz", &signature));
    }

    #[test]
    fn test_signature_with_wrong_secret_rejected() {
        let signature = sign_payment("other-secret", "order_abc", "pay_xyz");
        assert!(!gateway().verify_signature("order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(!gateway().verify_signature("order_abc", "pay_xyz", "not-hex!"));
    }

    #[test]
    fn test_transient_errors() {
        assert!(PaymentError::Request("timeout".into()).is_transient());
        assert!(
            PaymentError::Rejected {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !PaymentError::Rejected {
                status: 400,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!PaymentError::Disabled.is_transient());
    }
}
