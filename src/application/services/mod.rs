//! Business logic services for the application layer.

pub mod address_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod order_service;
pub mod upload_service;
pub mod user_service;

pub use address_service::AddressService;
pub use admin_service::{AdminRegistration, AdminService};
pub use auth_service::{AuthService, IssuedToken};
pub use cart_service::{CartService, CartView, CheckoutOutcome, CheckoutRequest, PaymentIntent};
pub use catalog_service::{CatalogService, VendorRegistration};
pub use order_service::{OrderDetail, OrderService};
pub use upload_service::{UPLOADS_URL_PREFIX, UploadService};
pub use user_service::{OtpLogin, OtpPolicy, UserService};
