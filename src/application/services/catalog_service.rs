//! Catalog: modules, vendors and products.

use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{
    Module, NearbyVendor, NewModule, NewProduct, NewVendor, Product, UpdateModule, UpdateProduct,
    UpdateVendor, Vendor,
};
use crate::domain::page::{PageRequest, Paged};
use crate::domain::repositories::{
    ModuleRepository, NearbyQuery, ProductRepository, VendorRepository,
};
use crate::error::AppError;
use crate::utils::password::{MIN_PASSWORD_LENGTH, hash_password, verify_password};
use crate::utils::validation::normalize_email;

/// Input for onboarding a vendor.
#[derive(Debug, Clone)]
pub struct VendorRegistration {
    pub module_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
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

/// Service for the marketplace catalog.
///
/// Owns the module → vendor → product hierarchy and enforces ownership:
/// a vendor only ever sees or changes its own products.
pub struct CatalogService<M: ModuleRepository, V: VendorRepository, P: ProductRepository> {
    modules: Arc<M>,
    vendors: Arc<V>,
    products: Arc<P>,
}

impl<M, V, P> CatalogService<M, V, P>
where
    M: ModuleRepository,
    V: VendorRepository,
    P: ProductRepository,
{
    pub fn new(modules: Arc<M>, vendors: Arc<V>, products: Arc<P>) -> Self {
        Self {
            modules,
            vendors,
            products,
        }
    }

    // Modules

    pub async fn list_modules(&self, only_active: bool) -> Result<Vec<Module>, AppError> {
        self.modules.list(only_active).await
    }

    pub async fn get_module(&self, id: i64) -> Result<Module, AppError> {
        self.modules
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Module not found", json!({"id": id})))
    }

    /// Creates a module. Duplicate names surface as [`AppError::Conflict`].
    pub async fn create_module(&self, new_module: NewModule) -> Result<Module, AppError> {
        let module = self.modules.create(new_module).await?;
        tracing::info!(module_id = module.id, name = %module.name, "Module created");
        Ok(module)
    }

    pub async fn update_module(&self, id: i64, update: UpdateModule) -> Result<Module, AppError> {
        self.get_module(id).await?;
        self.modules.update(id, update).await
    }

    /// Deletes a module that no vendor references.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the module does not exist and
    /// [`AppError::Conflict`] while vendors still belong to it.
    pub async fn delete_module(&self, id: i64) -> Result<(), AppError> {
        self.get_module(id).await?;

        let vendors = self.modules.count_vendors(id).await?;
        if vendors > 0 {
            return Err(AppError::conflict(
                "Cannot delete module with vendors",
                json!({"vendor_count": vendors}),
            ));
        }

        self.modules.delete(id).await?;
        tracing::info!(module_id = id, "Module deleted");
        Ok(())
    }

    // Vendors

    /// Onboards a vendor under an existing module.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a short password, an invalid charge or
    ///   an unknown module
    /// - [`AppError::Conflict`] if the email is taken
    pub async fn create_vendor(&self, input: VendorRegistration) -> Result<Vendor, AppError> {
        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::bad_request(
                "Password too short",
                json!({"min_length": MIN_PASSWORD_LENGTH}),
            ));
        }

        check_vendor_charges(
            Some(input.packaging_charge),
            Some(input.delivery_charge),
            input.free_delivery_above,
            Some(input.min_order_amount),
        )?;

        if self.modules.find_by_id(input.module_id).await?.is_none() {
            return Err(AppError::bad_request(
                "Module does not exist",
                json!({"module_id": input.module_id}),
            ));
        }

        let email = normalize_email(&input.email);
        if self.vendors.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(
                "Email already registered",
                json!({"email": email}),
            ));
        }

        let vendor = self
            .vendors
            .create(NewVendor {
                module_id: input.module_id,
                name: input.name.trim().to_string(),
                email,
                phone: input.phone,
                password_hash: hash_password(&input.password)?,
                address: input.address,
                latitude: input.latitude,
                longitude: input.longitude,
                image: input.image,
                packaging_charge: input.packaging_charge,
                delivery_charge: input.delivery_charge,
                free_delivery_above: input.free_delivery_above,
                min_order_amount: input.min_order_amount,
                delivery_radius_km: input.delivery_radius_km,
            })
            .await?;

        tracing::info!(vendor_id = vendor.id, module_id = vendor.module_id, "Vendor created");
        Ok(vendor)
    }

    pub async fn get_vendor(&self, id: i64) -> Result<Vendor, AppError> {
        self.vendors
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Vendor not found", json!({"id": id})))
    }

    /// Vendor as seen by the public: deactivated vendors do not exist.
    pub async fn get_public_vendor(&self, id: i64) -> Result<Vendor, AppError> {
        let vendor = self.get_vendor(id).await?;
        if !vendor.is_active {
            return Err(AppError::not_found("Vendor not found", json!({"id": id})));
        }
        Ok(vendor)
    }

    pub async fn list_vendors(
        &self,
        module_id: Option<i64>,
        page: PageRequest,
    ) -> Result<Paged<Vendor>, AppError> {
        self.vendors.list(module_id, page).await
    }

    /// Applies a vendor update. A changed module must exist and charges must
    /// be storable amounts.
    pub async fn update_vendor(&self, id: i64, update: UpdateVendor) -> Result<Vendor, AppError> {
        check_vendor_charges(
            update.packaging_charge,
            update.delivery_charge,
            update.free_delivery_above.flatten(),
            update.min_order_amount,
        )?;

        self.get_vendor(id).await?;

        if let Some(module_id) = update.module_id
            && self.modules.find_by_id(module_id).await?.is_none()
        {
            return Err(AppError::bad_request(
                "Module does not exist",
                json!({"module_id": module_id}),
            ));
        }

        self.vendors.update(id, update).await
    }

    pub async fn set_vendor_active(&self, id: i64, is_active: bool) -> Result<Vendor, AppError> {
        let vendor = self
            .update_vendor(
                id,
                UpdateVendor {
                    is_active: Some(is_active),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(vendor_id = id, is_active, "Vendor status changed");
        Ok(vendor)
    }

    /// Opens or closes the vendor for new orders.
    pub async fn set_vendor_open(&self, id: i64, is_open: bool) -> Result<Vendor, AppError> {
        self.update_vendor(
            id,
            UpdateVendor {
                is_open: Some(is_open),
                ..Default::default()
            },
        )
        .await
    }

    /// Checks vendor credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email, a wrong
    /// password or a deactivated vendor.
    pub async fn vendor_login(&self, email: &str, password: &str) -> Result<Vendor, AppError> {
        let invalid = || AppError::unauthorized("Invalid email or password", json!({}));

        let vendor = self
            .vendors
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &vendor.password_hash) || !vendor.is_active {
            tracing::warn!(vendor_id = vendor.id, "Vendor login rejected");
            return Err(invalid());
        }

        Ok(vendor)
    }

    /// Loads the vendor behind a session, refusing deactivated accounts.
    pub async fn ensure_vendor_active(&self, id: i64) -> Result<Vendor, AppError> {
        let vendor = self
            .vendors
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unauthorized", json!({})))?;

        if !vendor.is_active {
            return Err(AppError::forbidden(
                "Account is deactivated",
                json!({"vendor_id": id}),
            ));
        }

        Ok(vendor)
    }

    /// Active, open vendors delivering to a point, nearest first.
    pub async fn nearby_vendors(&self, query: NearbyQuery) -> Result<Vec<NearbyVendor>, AppError> {
        self.vendors.find_nearby(query).await
    }

    // Products

    /// Lists a vendor's products.
    ///
    /// With `only_active` the listing hides inactive products (public view).
    pub async fn list_products(
        &self,
        vendor_id: i64,
        only_active: bool,
        page: PageRequest,
    ) -> Result<Paged<Product>, AppError> {
        self.products.list_by_vendor(vendor_id, only_active, page).await
    }

    /// Public product listing of an active vendor.
    pub async fn list_public_products(
        &self,
        vendor_id: i64,
        page: PageRequest,
    ) -> Result<Paged<Product>, AppError> {
        self.get_public_vendor(vendor_id).await?;
        self.list_products(vendor_id, true, page).await
    }

    /// Returns a product owned by `vendor_id`.
    ///
    /// Products of other vendors are reported as not found.
    pub async fn get_own_product(&self, vendor_id: i64, id: i64) -> Result<Product, AppError> {
        self.products
            .find_by_id(id)
            .await?
            .filter(|p| p.vendor_id == vendor_id)
            .ok_or_else(|| AppError::not_found("Product not found", json!({"id": id})))
    }

    pub async fn create_product(&self, new_product: NewProduct) -> Result<Product, AppError> {
        check_prices(new_product.price, new_product.selling_price)?;

        let product = self.products.create(new_product).await?;
        tracing::info!(product_id = product.id, vendor_id = product.vendor_id, "Product created");
        Ok(product)
    }

    /// Updates an owned product; the resulting prices must stay consistent.
    pub async fn update_product(
        &self,
        vendor_id: i64,
        id: i64,
        update: UpdateProduct,
    ) -> Result<Product, AppError> {
        let current = self.get_own_product(vendor_id, id).await?;

        check_prices(
            update.price.unwrap_or(current.price),
            update.selling_price.unwrap_or(current.selling_price),
        )?;

        self.products.update(id, update).await
    }

    pub async fn set_product_stock(
        &self,
        vendor_id: i64,
        id: i64,
        in_stock: bool,
    ) -> Result<Product, AppError> {
        self.update_product(
            vendor_id,
            id,
            UpdateProduct {
                in_stock: Some(in_stock),
                ..Default::default()
            },
        )
        .await
    }

    /// Removes an owned product from the catalog.
    ///
    /// Past orders keep their snapshot of the product.
    pub async fn delete_product(&self, vendor_id: i64, id: i64) -> Result<(), AppError> {
        self.get_own_product(vendor_id, id).await?;

        if !self.products.delete(id).await? {
            return Err(AppError::not_found("Product not found", json!({"id": id})));
        }

        tracing::info!(product_id = id, vendor_id, "Product deleted");
        Ok(())
    }
}

/// Money columns are `NUMERIC(12, 2)`: amounts must stay below 10^10.
const AMOUNT_DIGITS: u32 = 10;
const AMOUNT_SCALE: u32 = 2;

/// Why `value` cannot be stored as an amount, if it cannot.
fn amount_problem(value: Decimal) -> Option<&'static str> {
    if value.is_sign_negative() && !value.is_zero() {
        Some("must not be negative")
    } else if value.normalize().scale() > AMOUNT_SCALE {
        Some("must have at most 2 decimal places")
    } else if value.trunc() >= Decimal::from(10_i64.pow(AMOUNT_DIGITS)) {
        Some("is too large")
    } else {
        None
    }
}

/// Collects amount problems into the `fields` shape used for validation errors.
fn check_amounts(amounts: &[(&str, Option<Decimal>)]) -> Result<(), AppError> {
    let fields: serde_json::Map<String, serde_json::Value> = amounts
        .iter()
        .filter_map(|(field, value)| {
            let problem = amount_problem((*value)?)?;
            Some((field.to_string(), json!([format!("{field} {problem}")])))
        })
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Invalid amount",
            json!({"fields": fields}),
        ))
    }
}

fn check_prices(price: Decimal, selling_price: Decimal) -> Result<(), AppError> {
    check_amounts(&[("price", Some(price)), ("selling_price", Some(selling_price))])?;

    if selling_price > price {
        return Err(AppError::bad_request(
            "Selling price cannot exceed price",
            json!({"price": price, "selling_price": selling_price}),
        ));
    }

    Ok(())
}

fn check_vendor_charges(
    packaging_charge: Option<Decimal>,
    delivery_charge: Option<Decimal>,
    free_delivery_above: Option<Decimal>,
    min_order_amount: Option<Decimal>,
) -> Result<(), AppError> {
    check_amounts(&[
        ("packaging_charge", packaging_charge),
        ("delivery_charge", delivery_charge),
        ("free_delivery_above", free_delivery_above),
        ("min_order_amount", min_order_amount),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        MockModuleRepository, MockProductRepository, MockVendorRepository,
    };
    use chrono::Utc;

    type Service =
        CatalogService<MockModuleRepository, MockVendorRepository, MockProductRepository>;

    fn service(
        modules: MockModuleRepository,
        vendors: MockVendorRepository,
        products: MockProductRepository,
    ) -> Service {
        CatalogService::new(Arc::new(modules), Arc::new(vendors), Arc::new(products))
    }

    fn module(id: i64) -> Module {
        Module {
            id,
            name: "Food".to_string(),
            description: None,
            image: None,
            sort_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: i64, vendor_id: i64, price: i64, selling_price: i64) -> Product {
        Product {
            id,
            vendor_id,
            name: "Masala Dosa".to_string(),
            description: None,
            image: None,
            price: Decimal::from(price),
            selling_price: Decimal::from(selling_price),
            in_stock: true,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn registration() -> VendorRegistration {
        VendorRegistration {
            module_id: 1,
            name: "Dosa Corner".to_string(),
            email: "Owner@Dosa.example".to_string(),
            phone: "9876543210".to_string(),
            password: "vendor-password".to_string(),
            address: "MG Road".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            image: None,
            packaging_charge: Decimal::from(10),
            delivery_charge: Decimal::from(30),
            free_delivery_above: None,
            min_order_amount: Decimal::ZERO,
            delivery_radius_km: 5.0,
        }
    }

    #[tokio::test]
    async fn test_delete_module_with_vendors() {
        let mut modules = MockModuleRepository::new();
        modules
            .expect_find_by_id()
            .returning(|id| Ok(Some(module(id))));
        modules.expect_count_vendors().times(1).returning(|_| Ok(3));
        modules.expect_delete().never();

        let svc = service(
            modules,
            MockVendorRepository::new(),
            MockProductRepository::new(),
        );

        let result = svc.delete_module(1).await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_module_not_found() {
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(
            modules,
            MockVendorRepository::new(),
            MockProductRepository::new(),
        );

        let result = svc.delete_module(9).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_vendor_unknown_module() {
        let mut modules = MockModuleRepository::new();
        modules.expect_find_by_id().returning(|_| Ok(None));
        let mut vendors = MockVendorRepository::new();
        vendors.expect_create().never();

        let svc = service(modules, vendors, MockProductRepository::new());

        let result = svc.create_vendor(registration()).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_vendor_hashes_password_and_normalizes_email() {
        let mut modules = MockModuleRepository::new();
        modules
            .expect_find_by_id()
            .returning(|id| Ok(Some(module(id))));

        let mut vendors = MockVendorRepository::new();
        vendors
            .expect_find_by_email()
            .withf(|email| email == "owner@dosa.example")
            .returning(|_| Ok(None));
        vendors
            .expect_create()
            .withf(|v| {
                v.email == "owner@dosa.example"
                    && verify_password("vendor-password", &v.password_hash)
            })
            .times(1)
            .returning(|v| {
                Ok(Vendor {
                    id: 11,
                    module_id: v.module_id,
                    name: v.name,
                    email: v.email,
                    phone: v.phone,
                    password_hash: v.password_hash,
                    address: v.address,
                    latitude: v.latitude,
                    longitude: v.longitude,
                    image: v.image,
                    is_active: true,
                    is_open: true,
                    packaging_charge: v.packaging_charge,
                    delivery_charge: v.delivery_charge,
                    free_delivery_above: v.free_delivery_above,
                    min_order_amount: v.min_order_amount,
                    delivery_radius_km: v.delivery_radius_km,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let svc = service(modules, vendors, MockProductRepository::new());

        let vendor = svc.create_vendor(registration()).await.unwrap();
        assert_eq!(vendor.id, 11);
    }

    #[tokio::test]
    async fn test_create_product_rejects_selling_above_price() {
        let mut products = MockProductRepository::new();
        products.expect_create().never();

        let svc = service(
            MockModuleRepository::new(),
            MockVendorRepository::new(),
            products,
        );

        let result = svc
            .create_product(NewProduct {
                vendor_id: 1,
                name: "Idli".to_string(),
                description: None,
                image: None,
                price: Decimal::from(40),
                selling_price: Decimal::from(45),
                in_stock: true,
            })
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_product_checks_merged_prices() {
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, 1, 100, 80))));
        products.expect_update().never();

        let svc = service(
            MockModuleRepository::new(),
            MockVendorRepository::new(),
            products,
        );

        // New price below the existing selling price.
        let result = svc
            .update_product(
                1,
                5,
                UpdateProduct {
                    price: Some(Decimal::from(70)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_other_vendors_product_is_not_found() {
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, 2, 100, 80))));
        products.expect_delete().never();

        let svc = service(
            MockModuleRepository::new(),
            MockVendorRepository::new(),
            products,
        );

        let result = svc.delete_product(1, 5).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_vendor_login_wrong_password() {
        let mut vendors = MockVendorRepository::new();
        vendors.expect_find_by_email().returning(|_| {
            Ok(Some(Vendor {
                id: 3,
                module_id: 1,
                name: "Dosa Corner".to_string(),
                email: "owner@dosa.example".to_string(),
                phone: "9876543210".to_string(),
                password_hash: hash_password("vendor-password").unwrap(),
                address: "MG Road".to_string(),
                latitude: 0.0,
                longitude: 0.0,
                image: None,
                is_active: true,
                is_open: true,
                packaging_charge: Decimal::ZERO,
                delivery_charge: Decimal::ZERO,
                free_delivery_above: None,
                min_order_amount: Decimal::ZERO,
                delivery_radius_km: 5.0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let svc = service(
            MockModuleRepository::new(),
            vendors,
            MockProductRepository::new(),
        );

        let result = svc.vendor_login("owner@dosa.example", "nope").await;
        assert!(matches!(result.unwrap_err(), AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_check_prices() {
        assert!(check_prices(Decimal::from(10), Decimal::from(10)).is_ok());
        assert!(check_prices(Decimal::from(10), Decimal::from(9)).is_ok());
        assert!(check_prices(Decimal::from(10), Decimal::from(11)).is_err());
        assert!(check_prices(Decimal::from(-1), Decimal::from(-2)).is_err());
    }

    #[test]
    fn test_amount_limits() {
        assert!(amount_problem(Decimal::ZERO).is_none());
        assert!(amount_problem("9999999999.99".parse().unwrap()).is_none());
        assert!(amount_problem("12.500".parse().unwrap()).is_none());

        assert!(amount_problem("-0.01".parse().unwrap()).is_some());
        assert!(amount_problem("12.345".parse().unwrap()).is_some());
        assert!(amount_problem("10000000000".parse().unwrap()).is_some());
        assert!(amount_problem("99999999999.00".parse().unwrap()).is_some());
    }

    #[test]
    fn test_check_prices_reports_fields() {
        let err = check_prices("99999999999.00".parse().unwrap(), Decimal::from(10)).unwrap_err();

        match err {
            AppError::Validation { details, .. } => {
                assert!(details["fields"]["price"].is_array());
                assert!(details["fields"].get("selling_price").is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_vendor_rejects_negative_charge() {
        let mut vendors = MockVendorRepository::new();
        vendors.expect_create().never();

        let svc = service(
            MockModuleRepository::new(),
            vendors,
            MockProductRepository::new(),
        );

        let mut input = registration();
        input.delivery_charge = Decimal::from(-30);

        let result = svc.create_vendor(input).await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_vendor_rejects_bad_charges_before_lookup() {
        let mut vendors = MockVendorRepository::new();
        vendors.expect_find_by_id().never();
        vendors.expect_update().never();

        let svc = service(
            MockModuleRepository::new(),
            vendors,
            MockProductRepository::new(),
        );

        let result = svc
            .update_vendor(
                3,
                UpdateVendor {
                    packaging_charge: Some("-5.00".parse().unwrap()),
                    free_delivery_above: Some(Some("0.001".parse().unwrap())),
                    ..Default::default()
                },
            )
            .await;

        match result.unwrap_err() {
            AppError::Validation { details, .. } => {
                assert!(details["fields"]["packaging_charge"].is_array());
                assert!(details["fields"]["free_delivery_above"].is_array());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
