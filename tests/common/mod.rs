#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use chrono::Duration;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};

use marketplace::api::routes::router;
use marketplace::application::services::OtpPolicy;
use marketplace::domain::entities::Role;
use marketplace::infrastructure::otp::{LogOtpSender, OtpSendError, OtpSender};
use marketplace::infrastructure::payment::{
    DisabledPaymentGateway, GatewayOrder, PaymentGateway, PaymentResult, sign_payment,
};
use marketplace::state::{AppState, ServiceSettings};
use marketplace::utils::password::hash_password;

pub const TEST_PASSWORD: &str = "password123";
pub const GATEWAY_SECRET: &str = "gateway-test-secret";

/// Bengaluru city centre; every seeded vendor sits here.
pub const LAT: f64 = 12.9716;
pub const LNG: f64 = 77.5946;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Reads a decimal field serialized as a JSON string.
pub fn json_dec(value: &serde_json::Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        token_signing_secret: "test-signing-secret".to_string(),
        session_ttl: Duration::hours(1),
        otp_policy: OtpPolicy {
            ttl: Duration::minutes(5),
            max_attempts: 3,
            resend_interval: Duration::seconds(30),
        },
        convenience_fee: dec("5.00"),
        upload_dir: std::env::temp_dir()
            .join("marketplace-test-uploads")
            .to_string_lossy()
            .into_owned(),
        upload_max_bytes: 1024 * 1024,
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    create_test_state_with(
        pool,
        Arc::new(DisabledPaymentGateway::new("INR")),
        Arc::new(LogOtpSender),
    )
}

pub fn create_test_state_with(
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    otp_sender: Arc<dyn OtpSender>,
) -> AppState {
    AppState::new(Arc::new(pool), test_settings(), gateway, otp_sender)
}

/// Mounts the API under `/api` the way the server does, without rate limits.
pub fn test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .nest("/api", router(state.clone()))
        .with_state(state);
    TestServer::new(app).unwrap()
}

pub async fn token_for(state: &AppState, role: Role, id: i64) -> String {
    state.auth_service.issue(role, id).await.unwrap().token
}

/// OTP sender that keeps codes in memory.
#[derive(Default)]
pub struct CapturingOtpSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingOtpSender {
    pub fn last_code(&self, phone: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == phone)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl OtpSender for CapturingOtpSender {
    async fn send(&self, phone: &str, code: &str) -> Result<(), OtpSendError> {
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), code.to_string()));
        Ok(())
    }
}

/// Gateway that creates orders locally and checks signatures with
/// [`GATEWAY_SECRET`].
pub struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn is_enabled(&self) -> bool {
        true
    }

    fn key_id(&self) -> Option<&str> {
        Some("key_test")
    }

    fn currency(&self) -> &str {
        "INR"
    }

    async fn create_order(&self, amount: i64, receipt: &str) -> PaymentResult<GatewayOrder> {
        Ok(GatewayOrder {
            id: format!("gw_{receipt}"),
            amount,
            currency: "INR".to_string(),
        })
    }

    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool {
        sign_payment(GATEWAY_SECRET, gateway_order_id, payment_id) == signature
    }
}

// ─── Seed helpers ────────────────────────────────────────────────────────────

pub async fn seed_admin(pool: &PgPool, email: &str, is_super: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO admins (name, email, password_hash, is_super) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Test Admin")
    .bind(email)
    .bind(hash_password(TEST_PASSWORD).unwrap())
    .bind(is_super)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_module(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO modules (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Vendor at [`LAT`]/[`LNG`] with packaging 10, delivery 30 (free from 500),
/// minimum order 100 and a 5 km radius.
pub async fn seed_vendor(pool: &PgPool, module_id: i64, email: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO vendors (module_id, name, email, phone, password_hash, address,
                             latitude, longitude, packaging_charge, delivery_charge,
                             free_delivery_above, min_order_amount, delivery_radius_km)
        VALUES ($1, $2, $3, '9876543210', $4, 'MG Road', $5, $6, $7, $8, $9, $10, 5)
        RETURNING id
        "#,
    )
    .bind(module_id)
    .bind(format!("Vendor {email}"))
    .bind(email)
    .bind(hash_password(TEST_PASSWORD).unwrap())
    .bind(LAT)
    .bind(LNG)
    .bind(dec("10.00"))
    .bind(dec("30.00"))
    .bind(Some(dec("500.00")))
    .bind(dec("100.00"))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_product(
    pool: &PgPool,
    vendor_id: i64,
    name: &str,
    price: &str,
    selling_price: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (vendor_id, name, price, selling_price) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(vendor_id)
    .bind(name)
    .bind(dec(price))
    .bind(dec(selling_price))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_user(pool: &PgPool, phone: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (phone) VALUES ($1) RETURNING id")
        .bind(phone)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_address(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO addresses (user_id, label, line1, city, state, pincode, latitude, longitude, is_default)
        VALUES ($1, 'Home', '12 Residency Road', 'Bengaluru', 'KA', '560025', $2, $3,
                NOT EXISTS (SELECT 1 FROM addresses WHERE user_id = $1))
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(LAT)
    .bind(LNG)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn order_status(pool: &PgPool, order_id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Everything a shopping test needs: a vendor with two products and a user
/// with one address.
pub struct Shop {
    pub module_id: i64,
    pub vendor_id: i64,
    /// MRP 250, sells at 200.
    pub rice_id: i64,
    /// MRP 40, sells at 40.
    pub milk_id: i64,
    pub user_id: i64,
    pub address_id: i64,
}

pub async fn seed_shop(pool: &PgPool) -> Shop {
    let module_id = seed_module(pool, "Grocery").await;
    let vendor_id = seed_vendor(pool, module_id, "shop@example.com").await;
    let rice_id = seed_product(pool, vendor_id, "Rice 5kg", "250.00", "200.00").await;
    let milk_id = seed_product(pool, vendor_id, "Milk 1L", "40.00", "40.00").await;
    let user_id = seed_user(pool, "+919876543210").await;
    let address_id = seed_address(pool, user_id).await;

    Shop {
        module_id,
        vendor_id,
        rice_id,
        milk_id,
        user_id,
        address_id,
    }
}
