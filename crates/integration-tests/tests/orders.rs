//! Integration tests for the order lifecycle.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database at `DATABASE_URL`
//! - The server running (cargo run -p energy-maximum-server)
//!
//! Run with: cargo test -p energy-maximum-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use energy_maximum_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_order_lifecycle() {
    let ctx = TestContext::new().await;
    let (customer_id, phone) = ctx.seed_customer().await;
    let (_, admin) = ctx.seed_admin(false).await;
    let customer_token = ctx.customer_token(&phone).await;
    let admin_token = ctx.admin_token(&admin).await;

    // Customer creates
    let created: Value = ctx
        .client
        .post(ctx.url("/api/order"))
        .bearer_auth(&customer_token)
        .json(&json!({
            "description": "test",
            "total": 150.00,
            "items": [{ "price": 50, "amount": 3, "itemId": 7 }]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["order"]["status"], 0);
    assert_eq!(created["order"]["customerId"], customer_id.as_i64());
    assert_eq!(created["items"].as_array().unwrap().len(), 1);
    assert_eq!(created["items"][0]["amount"], 3);
    assert_eq!(created["items"][0]["itemId"], 7);
    let order_id = created["order"]["id"].as_i64().unwrap();

    // Admin replaces the items
    let updated: Value = ctx
        .client
        .put(ctx.url(&format!("/api/order/{order_id}")))
        .bearer_auth(&admin_token)
        .json(&json!({
            "description": "rush",
            "items": [
                { "price": 10, "amount": 1, "itemId": 8 },
                { "price": 20, "amount": 2, "itemId": 9 }
            ]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["order"]["description"], "rush");
    assert_eq!(updated["order"]["total"], "150.00");
    assert_eq!(updated["items"].as_array().unwrap().len(), 2);

    // Customer sees the new items
    let read: Value = ctx
        .client
        .get(ctx.url(&format!("/api/order/{order_id}")))
        .bearer_auth(&customer_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read["items"], updated["items"]);

    // Finish, then cancel is refused
    let resp = ctx
        .client
        .put(ctx.url(&format!("/api/order/finish/{order_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let finished: Value = resp.json().await.unwrap();
    assert_eq!(finished["status"], 1);

    let resp = ctx
        .client
        .put(ctx.url(&format!("/api/order/cancel/{order_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Soft delete hides the order
    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/order/{order_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/order/{order_id}")))
        .bearer_auth(&customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_customers_cannot_read_each_others_orders() {
    let ctx = TestContext::new().await;
    let (_, owner_phone) = ctx.seed_customer().await;
    let (_, other_phone) = ctx.seed_customer().await;
    let owner = ctx.customer_token(&owner_phone).await;
    let other = ctx.customer_token(&other_phone).await;

    let created: Value = ctx
        .client
        .post(ctx.url("/api/order"))
        .bearer_auth(&owner)
        .json(&json!({ "description": "mine", "total": "10.00", "items": [] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order_id = created["order"]["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/order/{order_id}")))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_admin_creates_order_for_customer() {
    let ctx = TestContext::new().await;
    let (customer_id, _) = ctx.seed_customer().await;
    let (_, admin) = ctx.seed_admin(false).await;
    let admin_token = ctx.admin_token(&admin).await;

    let resp = ctx
        .client
        .post(ctx.url(&format!("/api/order/{customer_id}")))
        .bearer_auth(&admin_token)
        .json(&json!({
            "description": "phone order",
            "total": 30,
            "items": [{ "price": 15, "amount": 2, "itemId": 3 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["order"]["customerId"], customer_id.as_i64());
    assert_eq!(body["order"]["status"], 0);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_order_listings() {
    let ctx = TestContext::new().await;
    let (customer_id, phone) = ctx.seed_customer().await;
    let (_, admin) = ctx.seed_admin(false).await;
    let customer_token = ctx.customer_token(&phone).await;
    let admin_token = ctx.admin_token(&admin).await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let created: Value = ctx
            .client
            .post(ctx.url("/api/order"))
            .bearer_auth(&customer_token)
            .json(&json!({ "description": "listed", "total": "5.00", "items": [] }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(created["order"]["id"].as_i64().unwrap());
    }
    let resp = ctx
        .client
        .put(ctx.url(&format!("/api/order/finish/{}", ids[0])))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Counts cover every status; the page honours the filter
    let own: Value = ctx
        .client
        .get(ctx.url("/api/order?status=0"))
        .bearer_auth(&customer_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(own["activeCount"], 1);
    assert_eq!(own["finishedCount"], 1);
    assert_eq!(own["cancelledCount"], 0);
    assert_eq!(own["count"], 2);
    assert_eq!(own["page"], 1);
    assert_eq!(own["pageSize"], 10);
    assert_eq!(own["orders"].as_array().unwrap().len(), 1);
    assert_eq!(own["orders"][0]["id"], ids[1]);

    let all: Value = ctx
        .client
        .get(ctx.url(&format!("/api/order/all?customerId={customer_id}&status=1")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["id"], ids[0]);

    let resp = ctx
        .client
        .get(ctx.url("/api/order/all"))
        .bearer_auth(&customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_order_for_unknown_customer_is_404() {
    let ctx = TestContext::new().await;
    let (_, admin) = ctx.seed_admin(false).await;
    let admin_token = ctx.admin_token(&admin).await;

    let resp = ctx
        .client
        .post(ctx.url(&format!("/api/order/{}", i64::MAX)))
        .bearer_auth(&admin_token)
        .json(&json!({ "description": "nobody", "total": 1, "items": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "customer not found");
}
