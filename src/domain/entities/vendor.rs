//! Vendor entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A seller on the marketplace.
///
/// Carries the per-vendor charges used by checkout pricing and the location
/// used for nearest-vendor lookup.
#[derive(Debug, Clone)]
pub struct Vendor {
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<String>,
    pub is_active: bool,
    pub is_open: bool,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub free_delivery_above: Option<Decimal>,
    pub min_order_amount: Decimal,
    pub delivery_radius_km: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// Returns true if the vendor currently accepts orders.
    pub fn accepts_orders(&self) -> bool {
        self.is_active && self.is_open
    }
}

/// A vendor returned by nearest-vendor search together with its distance.
#[derive(Debug, Clone)]
pub struct NearbyVendor {
    pub vendor: Vendor,
    pub distance_km: f64,
}

/// Input data for registering a vendor. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewVendor {
    pub module_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<String>,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub free_delivery_above: Option<Decimal>,
    pub min_order_amount: Decimal,
    pub delivery_radius_km: f64,
}

/// Partial update for a vendor.
///
/// `image` and `free_delivery_above`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateVendor {
    pub module_id: Option<i64>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_open: Option<bool>,
    pub packaging_charge: Option<Decimal>,
    pub delivery_charge: Option<Decimal>,
    pub free_delivery_above: Option<Option<Decimal>>,
    pub min_order_amount: Option<Decimal>,
    pub delivery_radius_km: Option<f64>,
}
