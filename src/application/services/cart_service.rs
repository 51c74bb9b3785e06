//! Vendor-scoped carts and checkout.
//!
//! A cart is the `new` order of a `(user, vendor)` pair. Checkout freezes the
//! cart's lines and totals; cash-on-delivery orders are placed immediately,
//! online orders once the provider's payment signature is verified.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{
    CartLine, Order, OrderTotals, PaymentMode, PaymentStatus, Vendor,
};
use crate::domain::order_status::OrderStatus;
use crate::domain::pricing::{self, Charges, PriceBreakdown, PriceLine};
use crate::domain::repositories::{
    AddressRepository, OrderRepository, ProductRepository, VendorRepository,
};
use crate::error::AppError;
use crate::infrastructure::payment::PaymentGateway;
use crate::utils::order_number::generate_order_number;

/// A cart with live product data and its current price.
#[derive(Debug, Clone)]
pub struct CartView {
    pub vendor: Vendor,
    /// `None` until the first item is added.
    pub cart: Option<Order>,
    pub lines: Vec<CartLine>,
    pub pricing: PriceBreakdown,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address_id: i64,
    pub payment_mode: PaymentMode,
    pub note: Option<String>,
}

/// What the client needs to open the provider's hosted checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    pub gateway_order_id: String,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub key_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    /// Present for online payments only.
    pub payment: Option<PaymentIntent>,
}

pub struct CartService<O, V, P, A>
where
    O: OrderRepository,
    V: VendorRepository,
    P: ProductRepository,
    A: AddressRepository,
{
    orders: Arc<O>,
    vendors: Arc<V>,
    products: Arc<P>,
    addresses: Arc<A>,
    gateway: Arc<dyn PaymentGateway>,
    convenience_fee: Decimal,
}

impl<O, V, P, A> CartService<O, V, P, A>
where
    O: OrderRepository,
    V: VendorRepository,
    P: ProductRepository,
    A: AddressRepository,
{
    pub fn new(
        orders: Arc<O>,
        vendors: Arc<V>,
        products: Arc<P>,
        addresses: Arc<A>,
        gateway: Arc<dyn PaymentGateway>,
        convenience_fee: Decimal,
    ) -> Self {
        Self {
            orders,
            vendors,
            products,
            addresses,
            gateway,
            convenience_fee,
        }
    }

    async fn vendor(&self, vendor_id: i64) -> Result<Vendor, AppError> {
        self.vendors
            .find_by_id(vendor_id)
            .await?
            .filter(|v| v.is_active)
            .ok_or_else(|| AppError::not_found("Vendor not found", json!({"id": vendor_id})))
    }

    fn price(&self, vendor: &Vendor, lines: &[CartLine]) -> PriceBreakdown {
        let price_lines: Vec<PriceLine> = lines.iter().map(PriceLine::from).collect();
        pricing::compute(
            &price_lines,
            &Charges::for_vendor(vendor, self.convenience_fee),
        )
    }

    async fn view(&self, vendor: Vendor, cart: Option<Order>) -> Result<CartView, AppError> {
        let lines = match &cart {
            Some(order) => self.orders.cart_lines(order.id).await?,
            None => Vec::new(),
        };
        let pricing = self.price(&vendor, &lines);

        Ok(CartView {
            vendor,
            cart,
            lines,
            pricing,
        })
    }

    /// Returns the cart for editing, dropping a started online payment.
    async fn editable_cart(&self, user_id: i64, vendor_id: i64) -> Result<Order, AppError> {
        let cart = self
            .orders
            .find_cart(user_id, vendor_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Cart not found", json!({"vendor_id": vendor_id}))
            })?;

        if cart.payment_status == PaymentStatus::Pending {
            self.orders.abandon_payment(cart.id).await?;
        }

        Ok(cart)
    }

    pub async fn get_cart(&self, user_id: i64, vendor_id: i64) -> Result<CartView, AppError> {
        let vendor = self.vendor(vendor_id).await?;
        let cart = self.orders.find_cart(user_id, vendor_id).await?;
        self.view(vendor, cart).await
    }

    /// All non-empty carts of a user, most recently touched first.
    pub async fn list_carts(&self, user_id: i64) -> Result<Vec<CartView>, AppError> {
        let carts = self.orders.list_carts(user_id).await?;

        let mut views = Vec::with_capacity(carts.len());
        for cart in carts {
            let Some(vendor) = self.vendors.find_by_id(cart.vendor_id).await? else {
                continue;
            };
            views.push(self.view(vendor, Some(cart)).await?);
        }

        Ok(views)
    }

    /// Adds `quantity` units of a product, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the vendor is unknown or inactive, or the
    ///   product does not belong to it
    /// - [`AppError::Validation`] for a non-positive quantity or an
    ///   unavailable product
    /// - [`AppError::Conflict`] if the cart was checked out meanwhile
    pub async fn add_item(
        &self,
        user_id: i64,
        vendor_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        if quantity <= 0 {
            return Err(AppError::bad_request(
                "Quantity must be positive",
                json!({"quantity": quantity}),
            ));
        }

        let vendor = self.vendor(vendor_id).await?;

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .filter(|p| p.vendor_id == vendor_id)
            .ok_or_else(|| AppError::not_found("Product not found", json!({"id": product_id})))?;

        if !product.is_orderable() {
            return Err(AppError::bad_request(
                "Product is not available",
                json!({"product_id": product_id}),
            ));
        }

        let cart = self
            .orders
            .find_or_create_cart(user_id, vendor_id, generate_order_number(Utc::now()))
            .await?;

        if cart.payment_status == PaymentStatus::Pending {
            self.orders.abandon_payment(cart.id).await?;
        }

        self.orders.add_item(cart.id, product_id, quantity).await?;
        self.view(vendor, Some(cart)).await
    }

    /// Sets a line's quantity; zero removes the line.
    pub async fn set_quantity(
        &self,
        user_id: i64,
        vendor_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartView, AppError> {
        if quantity < 0 {
            return Err(AppError::bad_request(
                "Quantity cannot be negative",
                json!({"quantity": quantity}),
            ));
        }
        if quantity == 0 {
            return self.remove_item(user_id, vendor_id, product_id).await;
        }

        let vendor = self.vendor(vendor_id).await?;
        let cart = self.editable_cart(user_id, vendor_id).await?;

        if !self
            .orders
            .set_item_quantity(cart.id, product_id, quantity)
            .await?
        {
            return Err(line_not_found(product_id));
        }

        self.view(vendor, Some(cart)).await
    }

    pub async fn remove_item(
        &self,
        user_id: i64,
        vendor_id: i64,
        product_id: i64,
    ) -> Result<CartView, AppError> {
        let vendor = self.vendor(vendor_id).await?;
        let cart = self.editable_cart(user_id, vendor_id).await?;

        if !self.orders.remove_item(cart.id, product_id).await? {
            return Err(line_not_found(product_id));
        }

        self.view(vendor, Some(cart)).await
    }

    /// Empties the cart. Clearing a missing cart is a no-op.
    pub async fn clear(&self, user_id: i64, vendor_id: i64) -> Result<(), AppError> {
        if let Some(cart) = self.orders.find_cart(user_id, vendor_id).await? {
            if cart.payment_status == PaymentStatus::Pending {
                self.orders.abandon_payment(cart.id).await?;
            }
            self.orders.clear_items(cart.id).await?;
        }
        Ok(())
    }

    /// Turns the cart into an order.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] for an unknown cart, vendor or address
    /// - [`AppError::Validation`] for an empty cart, a closed vendor,
    ///   unavailable products, an order below the vendor minimum, or online
    ///   payment while the gateway is disabled
    /// - [`AppError::BadGateway`] if the payment provider fails
    /// - [`AppError::Conflict`] if the cart was checked out or edited
    ///   concurrently
    pub async fn checkout(
        &self,
        user_id: i64,
        vendor_id: i64,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, AppError> {
        if request.payment_mode == PaymentMode::Online && !self.gateway.is_enabled() {
            return Err(AppError::bad_request(
                "Online payments are not available",
                json!({"payment_mode": "online"}),
            ));
        }

        let cart = self
            .orders
            .find_cart(user_id, vendor_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Cart not found", json!({"vendor_id": vendor_id}))
            })?;

        let lines = self.orders.cart_lines(cart.id).await?;
        if lines.is_empty() {
            return Err(AppError::bad_request("Cart is empty", json!({})));
        }

        let vendor = self.vendor(vendor_id).await?;
        if !vendor.accepts_orders() {
            return Err(AppError::bad_request(
                "Vendor is not accepting orders",
                json!({"vendor_id": vendor_id}),
            ));
        }

        let unavailable: Vec<i64> = lines
            .iter()
            .filter(|l| !l.is_orderable())
            .map(|l| l.product_id)
            .collect();
        if !unavailable.is_empty() {
            return Err(AppError::bad_request(
                "Some products are no longer available",
                json!({"product_ids": unavailable}),
            ));
        }

        if self
            .addresses
            .find(user_id, request.address_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found(
                "Address not found",
                json!({"id": request.address_id}),
            ));
        }

        let breakdown = self.price(&vendor, &lines);
        if !breakdown.meets_minimum(vendor.min_order_amount) {
            return Err(AppError::bad_request(
                "Order is below the vendor minimum",
                json!({
                    "min_order_amount": vendor.min_order_amount,
                    "item_total": breakdown.item_total,
                }),
            ));
        }

        let payment = match request.payment_mode {
            PaymentMode::Cod => None,
            PaymentMode::Online => Some(self.open_payment(&cart, &breakdown).await?),
        };

        let totals = OrderTotals {
            address_id: request.address_id,
            payment_mode: request.payment_mode,
            subtotal: breakdown.subtotal,
            discount: breakdown.discount,
            packaging_charge: breakdown.packaging_charge,
            delivery_charge: breakdown.delivery_charge,
            convenience_fee: breakdown.convenience_fee,
            payable: breakdown.payable,
            note: request.note,
        };

        let order = self
            .orders
            .checkout(
                cart.id,
                totals,
                lines,
                payment.as_ref().map(|p| p.gateway_order_id.clone()),
            )
            .await?;

        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            user_id,
            vendor_id,
            payment_mode = %request.payment_mode,
            payable = %order.payable,
            status = %order.status,
            "Checkout completed"
        );

        Ok(CheckoutOutcome { order, payment })
    }

    async fn open_payment(
        &self,
        cart: &Order,
        breakdown: &PriceBreakdown,
    ) -> Result<PaymentIntent, AppError> {
        let amount = breakdown.payable_minor_units().ok_or_else(|| {
            AppError::internal("Payable amount out of range", json!({}))
        })?;

        let gateway_order = self
            .gateway
            .create_order(amount, &cart.order_number)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, order_id = cart.id, "Payment order creation failed");
                AppError::bad_gateway("Payment provider unavailable", json!({}))
            })?;

        Ok(PaymentIntent {
            gateway_order_id: gateway_order.id,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            key_id: self.gateway.key_id().map(str::to_string),
        })
    }

    /// Confirms an online payment and places the order.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the order does not belong to the user
    /// - [`AppError::Conflict`] if the order is not awaiting payment
    /// - [`AppError::Validation`] if the signature does not verify
    pub async fn verify_payment(
        &self,
        user_id: i64,
        order_id: i64,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<Order, AppError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Order not found", json!({"id": order_id})))?;

        let awaiting = order.status == OrderStatus::New
            && order.payment_status == PaymentStatus::Pending;
        let gateway_order_id = match (&order.gateway_order_id, awaiting) {
            (Some(id), true) => id.clone(),
            _ => {
                return Err(AppError::conflict(
                    "Order is not awaiting payment",
                    json!({"id": order_id, "status": order.status.as_str()}),
                ));
            }
        };

        if !self
            .gateway
            .verify_signature(&gateway_order_id, gateway_payment_id, signature)
        {
            tracing::warn!(order_id, "Payment signature mismatch");
            return Err(AppError::bad_request(
                "Invalid payment signature",
                json!({}),
            ));
        }

        let placed = self
            .orders
            .confirm_payment(order_id, gateway_payment_id.to_string())
            .await?
            .ok_or_else(|| {
                AppError::conflict("Order is not awaiting payment", json!({"id": order_id}))
            })?;

        tracing::info!(order_id, user_id, payable = %placed.payable, "Online payment confirmed");
        Ok(placed)
    }
}

fn line_not_found(product_id: i64) -> AppError {
    AppError::not_found("Item not in cart", json!({"product_id": product_id}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Address, Product};
    use crate::domain::repositories::{
        MockAddressRepository, MockOrderRepository, MockProductRepository, MockVendorRepository,
    };
    use crate::infrastructure::payment::{
        DisabledPaymentGateway, GatewayOrder, PaymentError, PaymentResult, sign_payment,
    };
    use async_trait::async_trait;

    const SECRET: &str = "gateway-secret";

    struct StubGateway {
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        fn is_enabled(&self) -> bool {
            true
        }

        fn key_id(&self) -> Option<&str> {
            Some("key_test")
        }

        fn currency(&self) -> &str {
            "INR"
        }

        async fn create_order(&self, amount: i64, _receipt: &str) -> PaymentResult<GatewayOrder> {
            if self.fail {
                return Err(PaymentError::Request("connection reset".into()));
            }
            Ok(GatewayOrder {
                id: "gw_order_1".to_string(),
                amount,
                currency: "INR".to_string(),
            })
        }

        fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
            sign_payment(SECRET, order_id, payment_id) == signature
        }
    }

    struct Mocks {
        orders: MockOrderRepository,
        vendors: MockVendorRepository,
        products: MockProductRepository,
        addresses: MockAddressRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                orders: MockOrderRepository::new(),
                vendors: MockVendorRepository::new(),
                products: MockProductRepository::new(),
                addresses: MockAddressRepository::new(),
            }
        }

        fn build(
            self,
            gateway: Arc<dyn PaymentGateway>,
        ) -> CartService<
            MockOrderRepository,
            MockVendorRepository,
            MockProductRepository,
            MockAddressRepository,
        > {
            CartService::new(
                Arc::new(self.orders),
                Arc::new(self.vendors),
                Arc::new(self.products),
                Arc::new(self.addresses),
                gateway,
                Decimal::from(5),
            )
        }
    }

    fn vendor(id: i64, is_open: bool) -> Vendor {
        Vendor {
            id,
            module_id: 1,
            name: "Dosa Corner".to_string(),
            email: "owner@dosa.example".to_string(),
            phone: "9876543210".to_string(),
            password_hash: String::new(),
            address: "MG Road".to_string(),
            latitude: 12.97,
            longitude: 77.59,
            image: None,
            is_active: true,
            is_open,
            packaging_charge: Decimal::from(10),
            delivery_charge: Decimal::from(30),
            free_delivery_above: Some(Decimal::from(500)),
            min_order_amount: Decimal::from(100),
            delivery_radius_km: 5.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart(id: i64, payment_status: PaymentStatus) -> Order {
        Order {
            id,
            order_number: "ORD-250101-ABCDEF".to_string(),
            user_id: 7,
            vendor_id: 3,
            address_id: None,
            status: OrderStatus::New,
            payment_mode: None,
            payment_status,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            packaging_charge: Decimal::ZERO,
            delivery_charge: Decimal::ZERO,
            convenience_fee: Decimal::ZERO,
            payable: Decimal::ZERO,
            gateway_order_id: (payment_status == PaymentStatus::Pending)
                .then(|| "gw_order_1".to_string()),
            gateway_payment_id: None,
            note: None,
            cancel_reason: None,
            placed_at: None,
            delivered_at: None,
            cancelled_at: None,
            refunded_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn line(product_id: i64, price: i64, selling_price: i64, quantity: i32) -> CartLine {
        CartLine {
            product_id,
            name: format!("Item {product_id}"),
            image: None,
            price: Decimal::from(price),
            selling_price: Decimal::from(selling_price),
            quantity,
            in_stock: true,
            is_active: true,
        }
    }

    fn product(id: i64, vendor_id: i64, in_stock: bool) -> Product {
        Product {
            id,
            vendor_id,
            name: "Masala Dosa".to_string(),
            description: None,
            image: None,
            price: Decimal::from(120),
            selling_price: Decimal::from(100),
            in_stock,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn address(id: i64) -> Address {
        Address {
            id,
            user_id: 7,
            label: "Home".to_string(),
            line1: "12 Residency Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            pincode: "560025".to_string(),
            latitude: None,
            longitude: None,
            is_default: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn checkout_request(payment_mode: PaymentMode) -> CheckoutRequest {
        CheckoutRequest {
            address_id: 1,
            payment_mode,
            note: None,
        }
    }

    /// Cart of user 7 at vendor 3 with 2 x (120 MRP, 100 selling) + 1 x 80.
    fn mocks_with_cart(vendor_open: bool) -> Mocks {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(move |id| Ok(Some(vendor(id, vendor_open))));
        m.orders
            .expect_find_cart()
            .returning(|_, _| Ok(Some(cart(50, PaymentStatus::Unpaid))));
        m.orders
            .expect_cart_lines()
            .returning(|_| Ok(vec![line(1, 120, 100, 2), line(2, 80, 80, 1)]));
        m.addresses
            .expect_find()
            .returning(|_, id| Ok(Some(address(id))));
        m
    }

    #[tokio::test]
    async fn test_get_cart_prices_lines() {
        let svc = mocks_with_cart(true).build(Arc::new(DisabledPaymentGateway::default()));

        let view = svc.get_cart(7, 3).await.unwrap();

        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.pricing.subtotal, Decimal::from(320));
        assert_eq!(view.pricing.discount, Decimal::from(40));
        assert_eq!(view.pricing.item_total, Decimal::from(280));
        // 280 + 10 packaging + 30 delivery + 5 fee
        assert_eq!(view.pricing.payable, Decimal::from(325));
    }

    #[tokio::test]
    async fn test_get_cart_without_cart_is_empty() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.orders.expect_find_cart().returning(|_, _| Ok(None));
        m.orders.expect_cart_lines().never();

        let view = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .get_cart(7, 3)
            .await
            .unwrap();

        assert!(view.cart.is_none());
        assert_eq!(view.pricing, PriceBreakdown::default());
    }

    #[tokio::test]
    async fn test_add_item_from_other_vendor_rejected() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, 99, true))));
        m.orders.expect_find_or_create_cart().never();

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .add_item(7, 3, 1, 1)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_out_of_stock_item_rejected() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, 3, false))));
        m.orders.expect_find_or_create_cart().never();

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .add_item(7, 3, 1, 1)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_add_item_abandons_pending_payment() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, 3, true))));
        m.orders
            .expect_find_or_create_cart()
            .withf(|user, vendor, number| *user == 7 && *vendor == 3 && number.starts_with("ORD-"))
            .returning(|_, _, _| Ok(cart(50, PaymentStatus::Pending)));
        m.orders
            .expect_abandon_payment()
            .withf(|id| *id == 50)
            .times(1)
            .returning(|_| Ok(()));
        m.orders
            .expect_add_item()
            .withf(|order, product, qty| *order == 50 && *product == 1 && *qty == 2)
            .times(1)
            .returning(|_, _, _| Ok(2));
        m.orders
            .expect_cart_lines()
            .returning(|_| Ok(vec![line(1, 120, 100, 2)]));

        let view = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .add_item(7, 3, 1, 2)
            .await
            .unwrap();

        assert_eq!(view.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.orders
            .expect_find_cart()
            .returning(|_, _| Ok(Some(cart(50, PaymentStatus::Unpaid))));
        m.orders.expect_set_item_quantity().never();
        m.orders
            .expect_remove_item()
            .times(1)
            .returning(|_, _| Ok(true));
        m.orders.expect_cart_lines().returning(|_| Ok(vec![]));

        let view = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .set_quantity(7, 3, 1, 0)
            .await
            .unwrap();

        assert!(view.lines.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_cod_places_order() {
        let mut m = mocks_with_cart(true);
        m.orders
            .expect_checkout()
            .withf(|id, totals, lines, gateway| {
                *id == 50
                    && totals.payable == Decimal::from(325)
                    && totals.payment_mode == PaymentMode::Cod
                    && lines.len() == 2
                    && gateway.is_none()
            })
            .times(1)
            .returning(|id, totals, _, _| {
                let mut order = cart(id, PaymentStatus::Unpaid);
                order.status = OrderStatus::Placed;
                order.payable = totals.payable;
                Ok(order)
            });

        let outcome = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .checkout(7, 3, checkout_request(PaymentMode::Cod))
            .await
            .unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Placed);
        assert!(outcome.payment.is_none());
    }

    #[tokio::test]
    async fn test_checkout_online_creates_gateway_order() {
        let mut m = mocks_with_cart(true);
        m.orders
            .expect_checkout()
            .withf(|_, _, _, gateway| gateway.as_deref() == Some("gw_order_1"))
            .times(1)
            .returning(|id, _, _, _| Ok(cart(id, PaymentStatus::Pending)));

        let outcome = m
            .build(Arc::new(StubGateway { fail: false }))
            .checkout(7, 3, checkout_request(PaymentMode::Online))
            .await
            .unwrap();

        assert_eq!(outcome.order.status, OrderStatus::New);
        assert_eq!(
            outcome.payment,
            Some(PaymentIntent {
                gateway_order_id: "gw_order_1".to_string(),
                amount: 32500,
                currency: "INR".to_string(),
                key_id: Some("key_test".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_checkout_online_gateway_failure() {
        let mut m = mocks_with_cart(true);
        m.orders.expect_checkout().never();

        let result = m
            .build(Arc::new(StubGateway { fail: true }))
            .checkout(7, 3, checkout_request(PaymentMode::Online))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::BadGateway { .. }));
    }

    #[tokio::test]
    async fn test_checkout_online_when_disabled() {
        let mut m = Mocks::new();
        m.orders.expect_find_cart().never();

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .checkout(7, 3, checkout_request(PaymentMode::Online))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_checkout_closed_vendor() {
        let mut m = mocks_with_cart(false);
        m.orders.expect_checkout().never();

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .checkout(7, 3, checkout_request(PaymentMode::Cod))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let mut m = Mocks::new();
        m.orders
            .expect_find_cart()
            .returning(|_, _| Ok(Some(cart(50, PaymentStatus::Unpaid))));
        m.orders.expect_cart_lines().returning(|_| Ok(vec![]));

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .checkout(7, 3, checkout_request(PaymentMode::Cod))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_checkout_below_minimum() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.orders
            .expect_find_cart()
            .returning(|_, _| Ok(Some(cart(50, PaymentStatus::Unpaid))));
        m.orders
            .expect_cart_lines()
            .returning(|_| Ok(vec![line(1, 60, 50, 1)]));
        m.addresses
            .expect_find()
            .returning(|_, id| Ok(Some(address(id))));
        m.orders.expect_checkout().never();

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .checkout(7, 3, checkout_request(PaymentMode::Cod))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_error_info().details["item_total"], "50");
    }

    #[tokio::test]
    async fn test_checkout_unavailable_product() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.orders
            .expect_find_cart()
            .returning(|_, _| Ok(Some(cart(50, PaymentStatus::Unpaid))));
        m.orders.expect_cart_lines().returning(|_| {
            let mut gone = line(2, 300, 300, 1);
            gone.in_stock = false;
            Ok(vec![line(1, 120, 100, 2), gone])
        });

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .checkout(7, 3, checkout_request(PaymentMode::Cod))
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.to_error_info().details["product_ids"], json!([2]));
    }

    #[tokio::test]
    async fn test_checkout_foreign_address() {
        let mut m = Mocks::new();
        m.vendors
            .expect_find_by_id()
            .returning(|id| Ok(Some(vendor(id, true))));
        m.orders
            .expect_find_cart()
            .returning(|_, _| Ok(Some(cart(50, PaymentStatus::Unpaid))));
        m.orders
            .expect_cart_lines()
            .returning(|_| Ok(vec![line(1, 120, 100, 2)]));
        m.addresses.expect_find().returning(|_, _| Ok(None));

        let result = m
            .build(Arc::new(DisabledPaymentGateway::default()))
            .checkout(7, 3, checkout_request(PaymentMode::Cod))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_verify_payment_success() {
        let mut m = Mocks::new();
        m.orders
            .expect_find_by_id()
            .returning(|id| Ok(Some(cart(id, PaymentStatus::Pending))));
        m.orders
            .expect_confirm_payment()
            .withf(|id, payment| *id == 50 && payment == "pay_1")
            .times(1)
            .returning(|id, _| {
                let mut order = cart(id, PaymentStatus::Paid);
                order.status = OrderStatus::Placed;
                Ok(Some(order))
            });

        let signature = sign_payment(SECRET, "gw_order_1", "pay_1");
        let order = m
            .build(Arc::new(StubGateway { fail: false }))
            .verify_payment(7, 50, "pay_1", &signature)
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_verify_payment_bad_signature() {
        let mut m = Mocks::new();
        m.orders
            .expect_find_by_id()
            .returning(|id| Ok(Some(cart(id, PaymentStatus::Pending))));
        m.orders.expect_confirm_payment().never();

        let result = m
            .build(Arc::new(StubGateway { fail: false }))
            .verify_payment(7, 50, "pay_1", "deadbeef")
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_verify_payment_other_users_order() {
        let mut m = Mocks::new();
        m.orders
            .expect_find_by_id()
            .returning(|id| Ok(Some(cart(id, PaymentStatus::Pending))));

        let result = m
            .build(Arc::new(StubGateway { fail: false }))
            .verify_payment(8, 50, "pay_1", "sig")
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_verify_payment_not_pending() {
        let mut m = Mocks::new();
        m.orders
            .expect_find_by_id()
            .returning(|id| Ok(Some(cart(id, PaymentStatus::Unpaid))));

        let result = m
            .build(Arc::new(StubGateway { fail: false }))
            .verify_payment(7, 50, "pay_1", "sig")
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }
}
