//! DTOs for modules, vendors and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::api::dto::pagination::PaginationParams;
use crate::application::services::VendorRegistration;
use crate::domain::entities::{
    Module, NearbyVendor, NewModule, NewProduct, Product, UpdateModule, UpdateProduct,
    UpdateVendor, Vendor,
};
use crate::utils::validation::PHONE_RE;

/// Default number of vendors returned by the nearby search.
pub const NEARBY_LIMIT: i64 = 50;

// ─── Modules ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ModuleResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Module> for ModuleResponse {
    fn from(m: Module) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            image: m.image,
            sort_order: m.sort_order,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleListResponse {
    pub items: Vec<ModuleResponse>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl From<CreateModuleRequest> for NewModule {
    fn from(req: CreateModuleRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: req.description,
            image: req.image,
            sort_order: req.sort_order,
        }
    }
}

/// Partial module update. `description` and `image` accept `null` to clear.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub image: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl From<UpdateModuleRequest> for UpdateModule {
    fn from(req: UpdateModuleRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            image: req.image,
            sort_order: req.sort_order,
            is_active: req.is_active,
        }
    }
}

// ─── Vendors ────────────────────────────────────────────────────────────────

/// Full vendor record, shown to admins and to the vendor itself.
#[derive(Debug, Serialize)]
pub struct VendorResponse {
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
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

impl From<Vendor> for VendorResponse {
    fn from(v: Vendor) -> Self {
        Self {
            id: v.id,
            module_id: v.module_id,
            name: v.name,
            email: v.email,
            phone: v.phone,
            address: v.address,
            latitude: v.latitude,
            longitude: v.longitude,
            image: v.image,
            is_active: v.is_active,
            is_open: v.is_open,
            packaging_charge: v.packaging_charge,
            delivery_charge: v.delivery_charge,
            free_delivery_above: v.free_delivery_above,
            min_order_amount: v.min_order_amount,
            delivery_radius_km: v.delivery_radius_km,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// Storefront view of a vendor.
#[derive(Debug, Serialize)]
pub struct PublicVendorResponse {
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<String>,
    pub is_open: bool,
    pub packaging_charge: Decimal,
    pub delivery_charge: Decimal,
    pub free_delivery_above: Option<Decimal>,
    pub min_order_amount: Decimal,
    pub delivery_radius_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<Vendor> for PublicVendorResponse {
    fn from(v: Vendor) -> Self {
        Self {
            id: v.id,
            module_id: v.module_id,
            name: v.name,
            phone: v.phone,
            address: v.address,
            latitude: v.latitude,
            longitude: v.longitude,
            image: v.image,
            is_open: v.is_open,
            packaging_charge: v.packaging_charge,
            delivery_charge: v.delivery_charge,
            free_delivery_above: v.free_delivery_above,
            min_order_amount: v.min_order_amount,
            delivery_radius_km: v.delivery_radius_km,
            distance_km: None,
        }
    }
}

impl From<NearbyVendor> for PublicVendorResponse {
    fn from(nearby: NearbyVendor) -> Self {
        let distance = (nearby.distance_km * 100.0).round() / 100.0;
        Self {
            distance_km: Some(distance),
            ..Self::from(nearby.vendor)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyVendorsResponse {
    pub items: Vec<PublicVendorResponse>,
}

/// Query of `GET /api/catalog/vendors`.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct NearbyParams {
    #[serde_as(as = "DisplayFromStr")]
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub lat: f64,

    #[serde_as(as = "DisplayFromStr")]
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub lng: f64,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub module_id: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, message = "Radius must be positive"))]
    pub radius_km: Option<f64>,
}

/// Query of the admin vendor listing.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct VendorListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub module_id: Option<i64>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendorRequest {
    pub module_id: i64,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[validate(regex(path = "*PHONE_RE", message = "Invalid phone number"))]
    pub phone: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 500))]
    pub address: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: f64,

    pub image: Option<String>,

    #[serde(default)]
    pub packaging_charge: Decimal,
    #[serde(default)]
    pub delivery_charge: Decimal,
    pub free_delivery_above: Option<Decimal>,
    #[serde(default)]
    pub min_order_amount: Decimal,

    #[serde(default = "default_delivery_radius")]
    #[validate(range(exclusive_min = 0.0, message = "Radius must be positive"))]
    pub delivery_radius_km: f64,
}

fn default_delivery_radius() -> f64 {
    10.0
}

impl From<CreateVendorRequest> for VendorRegistration {
    fn from(req: CreateVendorRequest) -> Self {
        Self {
            module_id: req.module_id,
            name: req.name.trim().to_string(),
            email: req.email,
            phone: req.phone,
            password: req.password,
            address: req.address,
            latitude: req.latitude,
            longitude: req.longitude,
            image: req.image,
            packaging_charge: req.packaging_charge,
            delivery_charge: req.delivery_charge,
            free_delivery_above: req.free_delivery_above,
            min_order_amount: req.min_order_amount,
            delivery_radius_km: req.delivery_radius_km,
        }
    }
}

/// Profile and charges a vendor may change on itself.
///
/// `image` and `free_delivery_above` accept `null` to clear.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(regex(path = "*PHONE_RE", message = "Invalid phone number"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: Option<f64>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub image: Option<Option<String>>,

    pub packaging_charge: Option<Decimal>,
    pub delivery_charge: Option<Decimal>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub free_delivery_above: Option<Option<Decimal>>,

    pub min_order_amount: Option<Decimal>,

    #[validate(range(exclusive_min = 0.0, message = "Radius must be positive"))]
    pub delivery_radius_km: Option<f64>,
}

impl From<UpdateVendorRequest> for UpdateVendor {
    fn from(req: UpdateVendorRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            phone: req.phone,
            address: req.address,
            latitude: req.latitude,
            longitude: req.longitude,
            image: req.image,
            packaging_charge: req.packaging_charge,
            delivery_charge: req.delivery_charge,
            free_delivery_above: req.free_delivery_above,
            min_order_amount: req.min_order_amount,
            delivery_radius_km: req.delivery_radius_km,
            ..Default::default()
        }
    }
}

/// Admin vendor update: everything a vendor can change plus its module.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateVendorRequest {
    pub module_id: Option<i64>,

    #[serde(flatten)]
    #[validate(nested)]
    pub profile: UpdateVendorRequest,
}

impl From<AdminUpdateVendorRequest> for UpdateVendor {
    fn from(req: AdminUpdateVendorRequest) -> Self {
        Self {
            module_id: req.module_id,
            ..Self::from(req.profile)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VendorOpenRequest {
    pub is_open: bool,
}

// ─── Products ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    pub selling_price: Decimal,
    pub in_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            vendor_id: p.vendor_id,
            name: p.name,
            description: p.description,
            image: p.image,
            price: p.price,
            selling_price: p.selling_price,
            in_stock: p.in_stock,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Decimal,
    /// Defaults to `price` (no discount).
    pub selling_price: Option<Decimal>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl CreateProductRequest {
    pub fn into_new_product(self, vendor_id: i64) -> NewProduct {
        NewProduct {
            vendor_id,
            name: self.name.trim().to_string(),
            description: self.description,
            image: self.image,
            price: self.price,
            selling_price: self.selling_price.unwrap_or(self.price),
            in_stock: self.in_stock,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub image: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub is_active: Option<bool>,
}

impl From<UpdateProductRequest> for UpdateProduct {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            image: req.image,
            price: req.price,
            selling_price: req.selling_price,
            in_stock: req.in_stock,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub in_stock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_params_from_query_strings() {
        let params: NearbyParams =
            serde_json::from_str(r#"{"lat": "12.97", "lng": "77.59", "module_id": "3"}"#).unwrap();
        assert!(params.validate().is_ok());
        assert_eq!(params.module_id, Some(3));
        assert!(params.radius_km.is_none());
    }

    #[test]
    fn test_nearby_params_reject_bad_coordinates() {
        let params: NearbyParams =
            serde_json::from_str(r#"{"lat": "95", "lng": "77.59"}"#).unwrap();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_update_vendor_null_clears_threshold() {
        let req: UpdateVendorRequest =
            serde_json::from_str(r#"{"free_delivery_above": null}"#).unwrap();
        let update: UpdateVendor = req.into();
        assert_eq!(update.free_delivery_above, Some(None));
        assert_eq!(update.image, None);
    }

    #[test]
    fn test_admin_update_carries_module() {
        let req: AdminUpdateVendorRequest =
            serde_json::from_str(r#"{"module_id": 4, "name": "Spice Route"}"#).unwrap();
        assert!(req.validate().is_ok());
        let update: UpdateVendor = req.into();
        assert_eq!(update.module_id, Some(4));
        assert_eq!(update.name.as_deref(), Some("Spice Route"));
    }

    #[test]
    fn test_selling_price_defaults_to_price() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Idli", "price": "40.00"}"#).unwrap();
        let product = req.into_new_product(9);
        assert_eq!(product.vendor_id, 9);
        assert_eq!(product.selling_price, product.price);
        assert!(product.in_stock);
    }

    #[test]
    fn test_create_vendor_validation() {
        let req: CreateVendorRequest = serde_json::from_str(
            r#"{
                "module_id": 1, "name": "Dosa Corner", "email": "not-an-email",
                "phone": "9876543210", "password": "longenough", "address": "MG Road",
                "latitude": 12.97, "longitude": 77.59
            }"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert_eq!(req.delivery_radius_km, 10.0);
    }
}
