mod common;

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use marketplace::domain::entities::{OrderFilter, OrderTotals, PaymentMode, PaymentStatus};
use marketplace::domain::order_status::OrderStatus;
use marketplace::domain::page::PageRequest;
use marketplace::domain::repositories::OrderRepository;
use marketplace::error::AppError;
use marketplace::infrastructure::persistence::PgOrderRepository;

fn totals(address_id: i64, mode: PaymentMode) -> OrderTotals {
    OrderTotals {
        address_id,
        payment_mode: mode,
        subtotal: common::dec("250.00"),
        discount: common::dec("50.00"),
        packaging_charge: common::dec("10.00"),
        delivery_charge: common::dec("30.00"),
        convenience_fee: common::dec("5.00"),
        payable: common::dec("245.00"),
        note: None,
    }
}

#[sqlx::test]
async fn test_one_cart_per_user_and_vendor(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));

    let first = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    let second = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-BBBBBB".into())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.order_number, "ORD-250101-AAAAAA");
    assert_eq!(second.status, OrderStatus::New);
}

#[sqlx::test]
async fn test_add_item_accumulates(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();

    assert_eq!(repo.add_item(cart.id, shop.rice_id, 2).await.unwrap(), 2);
    assert_eq!(repo.add_item(cart.id, shop.rice_id, 1).await.unwrap(), 3);

    let lines = repo.cart_lines(cart.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(lines[0].selling_price, common::dec("200.00"));
}

#[sqlx::test]
async fn test_set_quantity_on_missing_line(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();

    assert!(!repo.set_item_quantity(cart.id, shop.milk_id, 4).await.unwrap());
    assert!(!repo.remove_item(cart.id, shop.milk_id).await.unwrap());
}

#[sqlx::test]
async fn test_empty_carts_not_listed(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();

    assert!(repo.list_carts(shop.user_id).await.unwrap().is_empty());

    repo.add_item(cart.id, shop.milk_id, 1).await.unwrap();
    assert_eq!(repo.list_carts(shop.user_id).await.unwrap().len(), 1);

    repo.clear_items(cart.id).await.unwrap();
    assert!(repo.list_carts(shop.user_id).await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_cod_checkout_freezes_lines(pool: PgPool) {
    let pool_handle = pool.clone();
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let lines = repo.cart_lines(cart.id).await.unwrap();

    let order = repo
        .checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), lines, None)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert_eq!(order.payable, common::dec("245.00"));
    assert!(order.placed_at.is_some());

    sqlx::query("UPDATE products SET name = 'Basmati', selling_price = 180 WHERE id = $1")
        .bind(shop.rice_id)
        .execute(&pool_handle)
        .await
        .unwrap();

    let items = repo.items(order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].selling_price, common::dec("200.00"));
    assert_eq!(items[0].line_total(), Decimal::from(200));
    assert_ne!(items[0].name, "Basmati");
}

#[sqlx::test]
async fn test_checkout_twice_conflicts(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let lines = repo.cart_lines(cart.id).await.unwrap();

    repo.checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), lines.clone(), None)
        .await
        .unwrap();
    let result = repo
        .checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), lines, None)
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_online_checkout_waits_for_payment(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let lines = repo.cart_lines(cart.id).await.unwrap();

    let pending = repo
        .checkout(
            cart.id,
            totals(shop.address_id, PaymentMode::Online),
            lines,
            Some("gw_1".into()),
        )
        .await
        .unwrap();
    assert_eq!(pending.status, OrderStatus::New);
    assert_eq!(pending.payment_status, PaymentStatus::Pending);
    assert_eq!(pending.gateway_order_id.as_deref(), Some("gw_1"));

    let paid = repo
        .confirm_payment(cart.id, "pay_1".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Placed);
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.gateway_payment_id.as_deref(), Some("pay_1"));

    assert!(repo.confirm_payment(cart.id, "pay_2".into()).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_abandon_payment_reopens_cart(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let lines = repo.cart_lines(cart.id).await.unwrap();
    repo.checkout(
        cart.id,
        totals(shop.address_id, PaymentMode::Online),
        lines,
        Some("gw_1".into()),
    )
    .await
    .unwrap();

    repo.abandon_payment(cart.id).await.unwrap();

    let order = repo.find_by_id(cart.id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Unpaid);
    assert!(order.payment_mode.is_none());
    assert!(order.gateway_order_id.is_none());
    assert!(repo.confirm_payment(cart.id, "pay_1".into()).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_transition_requires_expected_status(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let lines = repo.cart_lines(cart.id).await.unwrap();
    let order = repo
        .checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), lines, None)
        .await
        .unwrap();

    let stale = repo
        .transition(order.id, OrderStatus::Delivered, OrderStatus::Refunded, None)
        .await
        .unwrap();
    assert!(stale.is_none());

    let cancelled = repo
        .transition(
            order.id,
            OrderStatus::Placed,
            OrderStatus::Cancelled,
            Some("Out of area".into()),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("Out of area"));
    assert!(cancelled.cancelled_at.is_some());
}

#[sqlx::test]
async fn test_list_skips_carts(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();

    let filter = OrderFilter {
        user_id: Some(shop.user_id),
        ..Default::default()
    };
    let page = repo.list(filter.clone(), PageRequest::new(0, 20)).await.unwrap();
    assert_eq!(page.total, 0);

    let lines = repo.cart_lines(cart.id).await.unwrap();
    repo.checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), lines, None)
        .await
        .unwrap();

    let page = repo.list(filter, PageRequest::new(0, 20)).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, cart.id);
}

#[sqlx::test]
async fn test_checkout_rejects_lines_edited_after_pricing(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let priced = repo.cart_lines(cart.id).await.unwrap();

    repo.add_item(cart.id, shop.milk_id, 10).await.unwrap();

    let result = repo
        .checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), priced, None)
        .await;
    assert!(matches!(result, Err(AppError::Conflict { .. })));

    let still_cart = repo.find_by_id(cart.id).await.unwrap().unwrap();
    assert_eq!(still_cart.status, OrderStatus::New);
    assert_eq!(repo.cart_lines(cart.id).await.unwrap().len(), 2);
}

#[sqlx::test]
async fn test_checkout_rejects_changed_quantity(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let priced = repo.cart_lines(cart.id).await.unwrap();

    assert!(repo.set_item_quantity(cart.id, shop.rice_id, 4).await.unwrap());

    let result = repo
        .checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), priced, None)
        .await;
    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_placed_order_lines_are_frozen(pool: PgPool) {
    let shop = common::seed_shop(&pool).await;
    let repo = PgOrderRepository::new(Arc::new(pool));
    let cart = repo
        .find_or_create_cart(shop.user_id, shop.vendor_id, "ORD-250101-AAAAAA".into())
        .await
        .unwrap();
    repo.add_item(cart.id, shop.rice_id, 1).await.unwrap();
    let lines = repo.cart_lines(cart.id).await.unwrap();
    repo.checkout(cart.id, totals(shop.address_id, PaymentMode::Cod), lines, None)
        .await
        .unwrap();

    let added = repo.add_item(cart.id, shop.milk_id, 1).await;
    assert!(matches!(added, Err(AppError::Conflict { .. })));
    assert!(!repo.set_item_quantity(cart.id, shop.rice_id, 5).await.unwrap());
    assert!(!repo.remove_item(cart.id, shop.rice_id).await.unwrap());
    repo.clear_items(cart.id).await.unwrap();

    let items = repo.items(cart.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 1);
}
