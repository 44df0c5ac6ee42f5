//! Integration tests for cart mutations.
//!
//! These tests drive the cart manager through the real HTTP catalog client
//! and the JSON file store, with a mock catalog server behind them.

#![allow(clippy::unwrap_used)]

use rocketshoes_cart::{MutationOutcome, Notice};
use rocketshoes_core::{Price, ProductId};
use rocketshoes_integration_tests::TestContext;

fn pid(id: i32) -> ProductId {
    ProductId::new(id)
}

// =============================================================================
// Adding
// =============================================================================

#[tokio::test]
async fn test_add_new_product_creates_single_entry() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis de Caminhada Leve", "179.9", 3).await;
    let manager = ctx.manager().await;

    let outcome = manager.add_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Applied);
    let cart = manager.cart();
    assert_eq!(cart.len(), 1);
    let entry = cart.get(pid(1)).unwrap();
    assert_eq!(entry.amount, 1);
    assert_eq!(entry.product.title, "Tênis de Caminhada Leve");
    assert_eq!(entry.product.price, Price::from_cents(17990));
    assert_eq!(ctx.persisted().await.as_ref(), Some(&*cart));
}

#[tokio::test]
async fn test_add_existing_product_increments_amount() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis", "179.9", 3).await;
    let manager = ctx.manager().await;

    manager.add_product(pid(1)).await;
    manager.add_product(pid(1)).await;
    let outcome = manager.add_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Applied);
    assert_eq!(manager.cart().len(), 1);
    assert_eq!(manager.cart().amount_of(pid(1)), Some(3));
    assert!(ctx.notices.notices().is_empty());
}

#[tokio::test]
async fn test_add_past_stock_reports_out_of_stock() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis", "179.9", 2).await;
    let manager = ctx.manager().await;

    manager.add_product(pid(1)).await;
    manager.add_product(pid(1)).await;
    let outcome = manager.add_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::OutOfStock));
    assert_eq!(manager.cart().amount_of(pid(1)), Some(2));
    assert_eq!(ctx.notices.notices(), vec![Notice::OutOfStock]);
    assert_eq!(ctx.persisted().await.as_ref(), Some(&*manager.cart()));
}

#[tokio::test]
async fn test_add_sold_out_product_writes_nothing() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis", "179.9", 0).await;
    let manager = ctx.manager().await;

    let outcome = manager.add_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::OutOfStock));
    assert!(manager.cart().is_empty());
    assert!(!ctx.store_path().exists());
}

#[tokio::test]
async fn test_add_unknown_product_reports_add_failure() {
    let mut ctx = TestContext::new().await;
    ctx.serve("/stock/9".to_string(), 404, "{}".to_string()).await;
    let manager = ctx.manager().await;

    let outcome = manager.add_product(pid(9)).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::AddFailed));
    assert_eq!(ctx.notices.notices(), vec![Notice::AddFailed]);
    assert!(manager.cart().is_empty());
}

#[tokio::test]
async fn test_catalog_outage_reports_add_failure() {
    let mut ctx = TestContext::new().await;
    ctx.product(1, "Tênis", "179.9").await;
    ctx.serve("/stock/1".to_string(), 503, "unavailable".to_string())
        .await;
    let manager = ctx.manager().await;

    let outcome = manager.add_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::AddFailed));
    assert!(manager.cart().is_empty());
}

#[tokio::test]
async fn test_product_lookup_failure_after_stock_check_reports_add_failure() {
    let mut ctx = TestContext::new().await;
    ctx.stock(1, 5).await;
    ctx.serve("/products/1".to_string(), 500, "boom".to_string())
        .await;
    let manager = ctx.manager().await;

    let outcome = manager.add_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::AddFailed));
    assert_eq!(ctx.notices.notices(), vec![Notice::AddFailed]);
    assert!(manager.cart().is_empty());
    assert!(!ctx.store_path().exists());
}

// =============================================================================
// Removing
// =============================================================================

#[tokio::test]
async fn test_remove_product() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis A", "100", 5).await;
    ctx.listed(2, "Tênis B", "200", 5).await;
    let manager = ctx.manager().await;
    manager.add_product(pid(1)).await;
    manager.add_product(pid(2)).await;

    let outcome = manager.remove_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Applied);
    let ids: Vec<ProductId> = manager.cart().iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![pid(2)]);
    assert_eq!(ctx.persisted().await.as_ref(), Some(&*manager.cart()));
}

#[tokio::test]
async fn test_remove_missing_product_reports_failure() {
    let ctx = TestContext::new().await;
    let manager = ctx.manager().await;

    let outcome = manager.remove_product(pid(1)).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::RemoveFailed));
    assert_eq!(ctx.notices.notices(), vec![Notice::RemoveFailed]);
    assert!(!ctx.store_path().exists());
}

// =============================================================================
// Updating
// =============================================================================

#[tokio::test]
async fn test_update_amount_within_stock() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis", "100", 5).await;
    let manager = ctx.manager().await;
    manager.add_product(pid(1)).await;

    assert_eq!(
        manager.update_product_amount(pid(1), 5).await,
        MutationOutcome::Applied
    );
    assert_eq!(manager.cart().amount_of(pid(1)), Some(5));
    assert_eq!(manager.cart().total(), Price::from_cents(50000));
    assert_eq!(ctx.persisted().await.as_ref(), Some(&*manager.cart()));
}

#[tokio::test]
async fn test_update_beyond_stock_leaves_cart_unchanged() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis", "100", 5).await;
    let manager = ctx.manager().await;
    manager.add_product(pid(1)).await;

    let outcome = manager.update_product_amount(pid(1), 6).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::OutOfStock));
    assert_eq!(manager.cart().amount_of(pid(1)), Some(1));
    assert_eq!(ctx.notices.notices(), vec![Notice::OutOfStock]);
}

#[tokio::test]
async fn test_update_non_positive_is_silent_noop() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis", "100", 5).await;
    let manager = ctx.manager().await;
    manager.add_product(pid(1)).await;

    assert_eq!(
        manager.update_product_amount(pid(1), 0).await,
        MutationOutcome::Unchanged
    );
    assert_eq!(
        manager.update_product_amount(pid(1), -1).await,
        MutationOutcome::Unchanged
    );
    assert_eq!(manager.cart().amount_of(pid(1)), Some(1));
    assert!(ctx.notices.notices().is_empty());
}

#[tokio::test]
async fn test_update_product_not_in_cart_reports_failure() {
    let mut ctx = TestContext::new().await;
    ctx.listed(1, "Tênis", "100", 5).await;
    let manager = ctx.manager().await;

    let outcome = manager.update_product_amount(pid(1), 2).await;

    assert_eq!(outcome, MutationOutcome::Rejected(Notice::UpdateFailed));
    assert!(manager.cart().is_empty());
}
