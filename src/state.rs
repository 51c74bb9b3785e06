//! Shared application state injected into every handler.

use chrono::Duration;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    AddressService, AdminService, AuthService, CartService, CatalogService, OrderService, OtpPolicy,
    UploadService, UserService,
};
use crate::config::Config;
use crate::infrastructure::otp::OtpSender;
use crate::infrastructure::payment::PaymentGateway;
use crate::infrastructure::persistence::{
    PgAddressRepository, PgAdminRepository, PgModuleRepository, PgOrderRepository,
    PgOtpRepository, PgProductRepository, PgSessionRepository, PgUserRepository,
    PgVendorRepository,
};

pub type PgAuthService = AuthService<PgSessionRepository>;
pub type PgAdminService = AdminService<PgAdminRepository>;
pub type PgCatalogService =
    CatalogService<PgModuleRepository, PgVendorRepository, PgProductRepository>;
pub type PgUserService = UserService<PgUserRepository, PgOtpRepository>;
pub type PgAddressService = AddressService<PgAddressRepository>;
pub type PgCartService =
    CartService<PgOrderRepository, PgVendorRepository, PgProductRepository, PgAddressRepository>;
pub type PgOrderService = OrderService<PgOrderRepository>;

/// Settings the services are built from, detached from the environment.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub token_signing_secret: String,
    pub session_ttl: Duration,
    pub otp_policy: OtpPolicy,
    pub convenience_fee: Decimal,
    pub upload_dir: String,
    pub upload_max_bytes: usize,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            token_signing_secret: config.token_signing_secret.clone(),
            session_ttl: Duration::hours(config.session_ttl_hours),
            otp_policy: OtpPolicy {
                ttl: Duration::seconds(config.otp_ttl_seconds),
                max_attempts: config.otp_max_attempts,
                resend_interval: Duration::seconds(config.otp_resend_seconds),
            },
            convenience_fee: config.convenience_fee,
            upload_dir: config.upload_dir.clone(),
            upload_max_bytes: config.upload_max_bytes,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub auth_service: Arc<PgAuthService>,
    pub admin_service: Arc<PgAdminService>,
    pub catalog_service: Arc<PgCatalogService>,
    pub user_service: Arc<PgUserService>,
    pub address_service: Arc<PgAddressService>,
    pub cart_service: Arc<PgCartService>,
    pub order_service: Arc<PgOrderService>,
    pub upload_service: Arc<UploadService>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Wires every service over PostgreSQL repositories sharing one pool.
    pub fn new(
        pool: Arc<PgPool>,
        settings: ServiceSettings,
        payment_gateway: Arc<dyn PaymentGateway>,
        otp_sender: Arc<dyn OtpSender>,
    ) -> Self {
        let admins = Arc::new(PgAdminRepository::new(pool.clone()));
        let modules = Arc::new(PgModuleRepository::new(pool.clone()));
        let vendors = Arc::new(PgVendorRepository::new(pool.clone()));
        let products = Arc::new(PgProductRepository::new(pool.clone()));
        let users = Arc::new(PgUserRepository::new(pool.clone()));
        let otps = Arc::new(PgOtpRepository::new(pool.clone()));
        let sessions = Arc::new(PgSessionRepository::new(pool.clone()));
        let addresses = Arc::new(PgAddressRepository::new(pool.clone()));
        let orders = Arc::new(PgOrderRepository::new(pool.clone()));

        Self {
            auth_service: Arc::new(AuthService::new(
                sessions,
                settings.token_signing_secret.clone(),
                settings.session_ttl,
            )),
            admin_service: Arc::new(AdminService::new(admins)),
            catalog_service: Arc::new(CatalogService::new(
                modules,
                vendors.clone(),
                products.clone(),
            )),
            user_service: Arc::new(UserService::new(
                users,
                otps,
                otp_sender,
                settings.token_signing_secret,
                settings.otp_policy,
            )),
            address_service: Arc::new(AddressService::new(addresses.clone())),
            cart_service: Arc::new(CartService::new(
                orders.clone(),
                vendors,
                products,
                addresses,
                payment_gateway.clone(),
                settings.convenience_fee,
            )),
            order_service: Arc::new(OrderService::new(orders)),
            upload_service: Arc::new(UploadService::new(
                settings.upload_dir,
                settings.upload_max_bytes,
            )),
            payment_gateway,
            db: pool,
        }
    }
}
