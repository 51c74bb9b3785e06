//! Rate limiting middleware using token bucket algorithm.

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::net::IpAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Per-client-IP key extractor.
///
/// Behind a trusted reverse proxy the client IP is read from
/// `X-Forwarded-For` / `X-Real-IP` / `Forwarded`; otherwise the socket peer
/// address is used and forwarding headers are ignored.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    behind_proxy: bool,
}

impl ClientIpKeyExtractor {
    pub fn new(behind_proxy: bool) -> Self {
        Self { behind_proxy }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.behind_proxy {
            SmartIpKeyExtractor.extract(req)
        } else {
            PeerIpKeyExtractor.extract(req)
        }
    }
}

pub type RateLimitLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Creates the general rate limiter for the API.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
pub fn layer(behind_proxy: bool) -> RateLimitLayer {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor::new(behind_proxy))
            .per_second(2)
            .burst_size(100)
            .finish()
            .expect("rate limiter config with per_second(2) and burst_size(100) is valid"),
    );

    GovernorLayer::new(governor_conf)
}

/// Creates a stricter rate limiter for login and OTP endpoints.
///
/// # Limits
///
/// - **Rate**: 1 token every 6 seconds (~10 per minute)
/// - **Burst**: 5 requests
pub fn strict_layer(behind_proxy: bool) -> RateLimitLayer {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor::new(behind_proxy))
            .per_second(6)
            .burst_size(5)
            .finish()
            .expect("rate limiter config with per_second(6) and burst_size(5) is valid"),
    );

    GovernorLayer::new(governor_conf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ConnectInfo;
    use std::net::SocketAddr;

    fn request(forwarded_for: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/api/catalog/modules");
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        let mut req = builder.body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));
        req
    }

    #[test]
    fn test_peer_ip_ignores_forwarded_header() {
        let key = ClientIpKeyExtractor::new(false)
            .extract(&request(Some("203.0.113.7")))
            .unwrap();
        assert_eq!(key, "10.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_behind_proxy_uses_forwarded_header() {
        let key = ClientIpKeyExtractor::new(true)
            .extract(&request(Some("203.0.113.7")))
            .unwrap();
        assert_eq!(key, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_behind_proxy_falls_back_to_peer() {
        let key = ClientIpKeyExtractor::new(true).extract(&request(None)).unwrap();
        assert_eq!(key, "10.0.0.1".parse::<IpAddr>().unwrap());
    }
}
