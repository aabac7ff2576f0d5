//! End-to-end storefront sessions over the in-memory store.

use std::time::Duration;

use jiff::Timestamp;
use testresult::TestResult;
use tokio::time::{sleep, timeout};

use satchel::prelude::*;
use satchel_app::{
    backend::{InMemoryBackend, ProductsRepository, Seed},
    context::AppContext,
    domain::{
        cart::CartStore,
        coupons::{CouponError, CouponsService},
    },
    settings::StoreSettings,
};

fn storefront() -> Result<(InMemoryBackend, AppContext), serde_norway::Error> {
    let seed: Seed = serde_norway::from_str(include_str!("../../../fixtures/storefront.yaml"))?;
    let backend = InMemoryBackend::from_seed(seed);
    let app = AppContext::in_memory(&backend, StoreSettings::default());

    Ok((backend, app))
}

fn reader() -> AuthUser {
    AuthUser {
        id: UserId::new("reader-1"),
        email: "reader@example.com".to_string(),
        display_name: Some("Mina".to_string()),
    }
}

async fn product(app: &AppContext, id: &str) -> TestResult<Product> {
    Ok(app
        .products
        .get_product(&ProductId::new(id))
        .await?
        .ok_or("product missing from fixture")?)
}

async fn wait_for_count(cart: &CartStore, count: usize) -> TestResult {
    timeout(Duration::from_secs(2), async {
        while cart.count() != count {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;

    Ok(())
}

#[tokio::test]
async fn discounted_purchase_end_to_end() -> TestResult {
    let (backend, app) = storefront()?;
    let workbook = product(&app, "fractions-workbook").await?;
    let slides = product(&app, "decimals-slides").await?;

    app.cart.subscribe(reader()).await?;
    app.cart.add(&workbook, "/products/fractions-workbook").await?;
    app.cart.add(&slides, "/products/decimals-slides").await?;
    wait_for_count(&app.cart, 2).await?;

    let record = backend.user(&reader().id).ok_or("reader missing")?;

    assert_eq!(record.purchased_products, [ProductId::new("reading-log")]);
    assert_eq!(record.display_name.as_deref(), Some("Mina"));

    let quote = app.cart.apply_coupon(app.coupons.as_ref(), "welcome10").await?;

    assert_eq!(quote.discount_amount, 2_000);
    assert_eq!(app.cart.total()?, 18_000);

    let receipt = app.checkout.checkout(&app.cart, "/cart").await?;

    assert_eq!(receipt.order.original_total, 20_000);
    assert_eq!(receipt.order.discount_amount, 2_000);
    assert_eq!(receipt.order.final_total, 18_000);
    assert_eq!(receipt.order.status, OrderStatus::Pending);
    assert_eq!(receipt.order.user_name, "Mina");
    assert_eq!(receipt.redirect_to, "/my-materials");
    assert_eq!(
        backend.coupon(&CouponId::new("welcome10")).map(|c| c.usage_count),
        Some(0)
    );

    wait_for_count(&app.cart, 0).await?;

    Ok(())
}

#[tokio::test]
async fn free_coupon_completes_without_payment() -> TestResult {
    let (backend, app) = storefront()?;
    let course = product(&app, "geometry-course").await?;

    app.cart.subscribe(reader()).await?;
    app.cart.add(&course, "/").await?;
    wait_for_count(&app.cart, 1).await?;
    app.cart.apply_coupon(app.coupons.as_ref(), "ClassroomFree").await?;

    let receipt = app.checkout.checkout(&app.cart, "/cart").await?;

    assert_eq!(receipt.order.final_total, 0);
    assert_eq!(receipt.order.status, OrderStatus::Completed);
    assert_eq!(receipt.order.payment_method, PaymentMethod::Coupon);
    assert_eq!(
        receipt.order.items.first().map(|line| line.delivery.location()),
        Some("https://course.example.com/geometry")
    );
    assert_eq!(
        backend.coupon(&CouponId::new("classroom-free")).map(|c| c.usage_count),
        Some(13)
    );

    Ok(())
}

#[tokio::test]
async fn expired_and_retired_coupons_are_rejected() -> TestResult {
    let (_backend, app) = storefront()?;
    let now: Timestamp = "2026-10-16T00:00:00Z".parse()?;

    let expired = app.coupons.apply_at("SUMMER2026", 10_000, now).await;
    let retired = app.coupons.apply_at("spring", 10_000, now).await;

    assert!(
        matches!(expired, Err(CouponError::Expired)),
        "expected Expired, got {expired:?}"
    );
    assert!(
        matches!(retired, Err(CouponError::Inactive)),
        "expected Inactive, got {retired:?}"
    );

    Ok(())
}

#[tokio::test]
async fn exhausted_coupon_changes_nothing() -> TestResult {
    let (backend, app) = storefront()?;

    backend.put_coupon(Coupon {
        id: CouponId::new("launch"),
        code: "LAUNCH".to_string(),
        discount_percent: 50,
        is_active: true,
        valid_until: None,
        usage_limit: Some(3),
        usage_count: 3,
    });

    app.cart.subscribe(reader()).await?;

    let result = app.cart.apply_coupon(app.coupons.as_ref(), "LAUNCH").await;

    assert!(
        matches!(result, Err(CouponError::LimitReached)),
        "expected LimitReached, got {result:?}"
    );
    assert_eq!(app.cart.applied_coupon(), None);
    assert_eq!(
        backend.coupon(&CouponId::new("launch")).map(|c| c.usage_count),
        Some(3)
    );

    Ok(())
}

#[tokio::test]
async fn sign_out_stops_cart_updates() -> TestResult {
    let (backend, app) = storefront()?;
    let workbook = product(&app, "fractions-workbook").await?;
    let slides = product(&app, "decimals-slides").await?;

    app.cart.subscribe(reader()).await?;
    app.cart.add(&workbook, "/").await?;
    wait_for_count(&app.cart, 1).await?;

    app.cart.dispose();

    backend.update_user(&reader().id, |record| {
        record.my_cart.merge(CartItem::from(&slides));
    });

    sleep(Duration::from_millis(20)).await;

    assert_eq!(app.cart.count(), 0);
    assert_eq!(
        backend.user(&reader().id).map(|record| record.my_cart.len()),
        Some(2)
    );

    Ok(())
}
