//! Integration tests for the `PostgreSQL` stores, without the HTTP layer.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database at `DATABASE_URL`
//!
//! Run with: cargo test -p energy-maximum-integration-tests -- --ignored

use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use energy_maximum_core::{CustomerId, ProductId, RoleId};
use energy_maximum_integration_tests::TestContext;
use energy_maximum_server::db::{PgOrderStore, RoleRepository};
use energy_maximum_server::models::{NewOrder, NewOrderItem, OrderPatch, Page};
use energy_maximum_server::services::orders::{OrderError, OrderProcessor};

fn processor(ctx: &TestContext) -> OrderProcessor<PgOrderStore> {
    OrderProcessor::new(PgOrderStore::new(ctx.pool.clone()), Duration::from_secs(5))
}

fn item(amount: i32) -> NewOrderItem {
    NewOrderItem {
        price: Decimal::from(50),
        amount,
        item_id: ProductId::new(7),
    }
}

fn new_order(customer_id: CustomerId, items: Vec<NewOrderItem>) -> NewOrder {
    NewOrder {
        customer_id,
        description: "test".to_string(),
        total: Decimal::new(15000, 2),
        items,
    }
}

async fn live_orders_of(ctx: &TestContext, customer_id: CustomerId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1 AND deleted_at IS NULL")
        .bind(customer_id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_rejected_item_rolls_back_update() {
    let ctx = TestContext::new().await;
    let (customer_id, _) = ctx.seed_customer().await;
    let (admin_id, _) = ctx.seed_admin(false).await;
    let processor = processor(&ctx);

    let before = processor
        .create(new_order(customer_id, vec![item(3)]))
        .await
        .unwrap();
    let id = before.order.id;

    // amount = 0 violates the order_items CHECK after the header patch ran
    let patch = OrderPatch {
        description: Some("should not stick".to_string()),
        total: Some(Decimal::from(1)),
        ..OrderPatch::default()
    };
    let err = processor
        .update(id, patch, vec![item(1), item(0)], admin_id)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Repository(_)));

    let after = processor.get(id).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_rejected_item_rolls_back_create() {
    let ctx = TestContext::new().await;
    let (customer_id, _) = ctx.seed_customer().await;

    let err = processor(&ctx)
        .create(new_order(customer_id, vec![item(0)]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::Repository(_)));
    assert_eq!(live_orders_of(&ctx, customer_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_unknown_customer_is_missing_reference() {
    let ctx = TestContext::new().await;
    let (customer_id, _) = ctx.seed_customer().await;
    let (admin_id, _) = ctx.seed_admin(false).await;
    let processor = processor(&ctx);
    let unknown = CustomerId::new(i64::MAX);

    let err = processor
        .create(new_order(unknown, Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::MissingReference(ref what) if what == "customer"));

    let id = processor
        .create(new_order(customer_id, Vec::new()))
        .await
        .unwrap()
        .order
        .id;
    let patch = OrderPatch {
        customer_id: Some(unknown),
        ..OrderPatch::default()
    };
    let err = processor
        .update(id, patch, Vec::new(), admin_id)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::MissingReference(_)));
    assert_eq!(processor.get(id).await.unwrap().order.customer_id, customer_id);
}

async fn seed_role(ctx: &TestContext, keys: &[&str], deleted: bool) -> RoleId {
    let name = format!("it-role-{}", Uuid::new_v4().simple());
    let (id,): (RoleId,) = sqlx::query_as(
        "INSERT INTO roles (name, deleted_at) VALUES ($1, CASE WHEN $2 THEN now() END) RETURNING id",
    )
    .bind(&name)
    .bind(deleted)
    .fetch_one(&ctx.pool)
    .await
    .expect("Failed to seed role");

    for key in keys {
        sqlx::query("INSERT INTO role_items (role_id, module_item_key) VALUES ($1, $2)")
            .bind(id)
            .bind(*key)
            .execute(&ctx.pool)
            .await
            .expect("Failed to seed role item");
    }
    id
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_deleted_role_grants_no_capabilities() {
    let ctx = TestContext::new().await;
    let live = seed_role(&ctx, &["orders.write", "orders.read"], false).await;
    let deleted = seed_role(&ctx, &["orders.write"], true).await;
    let roles = RoleRepository::new(&ctx.pool);

    let keys: Vec<String> = roles
        .capabilities_for(live)
        .await
        .unwrap()
        .iter()
        .map(|k| k.as_str().to_string())
        .collect();
    assert_eq!(keys, vec!["orders.read", "orders.write"]);

    assert!(roles.capabilities_for(deleted).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_customer_counts_ignore_deleted_orders() {
    let ctx = TestContext::new().await;
    let (customer_id, _) = ctx.seed_customer().await;
    let processor = processor(&ctx);
    let (actor, _) = ctx.seed_admin(false).await;

    let kept = processor
        .create(new_order(customer_id, Vec::new()))
        .await
        .unwrap()
        .order
        .id;
    let dropped = processor
        .create(new_order(customer_id, Vec::new()))
        .await
        .unwrap()
        .order
        .id;
    processor.soft_delete(dropped, actor).await.unwrap();

    let listing = processor
        .list_for_customer(customer_id, None, Page::default())
        .await
        .unwrap();
    assert_eq!(listing.counts.count, 1);
    assert_eq!(listing.counts.active_count, 1);
    assert_eq!(listing.orders.len(), 1);
    assert_eq!(listing.orders[0].id, kept);
}
