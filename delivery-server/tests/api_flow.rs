//! HTTP 端到端流程：下单 → 抢单 → 配送 → 结算

mod common;

use common::{RESTAURANT_ID, TestApp, checkout_body};
use http::{Method, StatusCode};
use serde_json::json;
use shared::order::ActorRole;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sequence"], 0);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .request(Method::POST, "/orders", None, Some(checkout_body("card")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/orders/o-1", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_delivery_flow() {
    let app = TestApp::new();
    let admin = app.token("admin-1", ActorRole::Admin);
    let customer = app.token("cust-1", ActorRole::Customer);
    let restaurant = app.token("owner-1", ActorRole::Restaurant);

    // Checkout: 2×450 + 3×(30+10) + 100 + 50
    let order = app.place_order(&customer).await;
    let order_id = order["orderId"].as_str().unwrap().to_string();
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["customerId"], "cust-1");
    assert_eq!(order["restaurantId"], RESTAURANT_ID);
    assert_eq!(order["subtotal"], 1020.0);
    assert_eq!(order["total"], 1170.0);
    assert_eq!(order["paymentStatus"], "paid");

    // Rider sees and takes the order
    let (rider_id, rider) = app.ready_rider("rider-user-1", &admin).await;
    let (status, available) = app
        .get(&format!("/riders/{rider_id}/available-orders"), &rider)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        available
            .as_array()
            .unwrap()
            .iter()
            .any(|o| o["orderId"] == order_id.as_str())
    );

    let (status, profile) = app
        .post(
            &format!("/riders/{rider_id}/accept-order"),
            &rider,
            json!({ "orderId": order_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{profile}");
    assert_eq!(profile["currentOrder"], order_id.as_str());

    let (_, order) = app.get(&format!("/orders/{order_id}"), &customer).await;
    assert_eq!(order["status"], "Accepted");
    assert_eq!(order["riderId"], rider_id.as_str());

    // Kitchen stages
    for status in ["Preparing", "Ready for Pickup"] {
        let (code, order) = app
            .put(
                &format!("/orders/{order_id}/status"),
                &restaurant,
                json!({ "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "{order}");
        assert_eq!(order["status"], status);
    }

    // Restaurant cannot drive rider stages
    let (code, _) = app
        .put(
            &format!("/orders/{order_id}/status"),
            &restaurant,
            json!({ "status": "Arrived" }),
        )
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    for status in ["Arrived", "Picked Up", "ArrivedAtCustomer"] {
        let (code, order) = app
            .put(
                &format!("/orders/{order_id}/status"),
                &rider,
                json!({ "status": status }),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "{order}");
    }

    // 50 + 15×4 = 110 gross, 10% commission
    let (code, order) = app
        .post(
            &format!("/orders/{order_id}/complete"),
            &rider,
            json!({ "distanceKm": 4.0 }),
        )
        .await;
    assert_eq!(code, StatusCode::OK, "{order}");
    assert_eq!(order["status"], "Delivered");
    assert_eq!(order["netRiderEarning"], 99.0);

    let (code, statement) = app.get(&format!("/ledger/rider/{rider_id}"), &rider).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(statement["balance"], 99.0);
    assert_eq!(statement["codHeld"], 0.0);

    // Rider is free again
    let (_, profile) = app.get(&format!("/riders/{rider_id}"), &rider).await;
    assert!(profile.get("currentOrder").is_none() || profile["currentOrder"].is_null());

    // Closed orders do not move
    let (code, _) = app
        .patch_cancel(&order_id, &admin)
        .await;
    assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);

    let (code, events) = app.get(&format!("/orders/{order_id}/events"), &customer).await;
    assert_eq!(code, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert!(events.len() >= 8);
    assert!(
        events
            .windows(2)
            .all(|w| w[0]["sequence"].as_u64() < w[1]["sequence"].as_u64())
    );
}

#[tokio::test]
async fn test_second_rider_gets_conflict() {
    let app = TestApp::new();
    let admin = app.token("admin-1", ActorRole::Admin);
    let customer = app.token("cust-1", ActorRole::Customer);
    let order = app.place_order(&customer).await;
    let order_id = order["orderId"].as_str().unwrap();

    let (first_id, first) = app.ready_rider("rider-user-1", &admin).await;
    let (second_id, second) = app.ready_rider("rider-user-2", &admin).await;

    let (code, _) = app
        .post(
            &format!("/riders/{first_id}/accept-order"),
            &first,
            json!({ "orderId": order_id }),
        )
        .await;
    assert_eq!(code, StatusCode::OK);

    let (code, _) = app
        .post(
            &format!("/riders/{second_id}/accept-order"),
            &second,
            json!({ "orderId": order_id }),
        )
        .await;
    assert_eq!(code, StatusCode::CONFLICT);

    // Assigned orders leave the public list and the losing rider loses sight
    let (_, available) = app
        .get(&format!("/riders/{second_id}/available-orders"), &second)
        .await;
    assert!(available.as_array().unwrap().is_empty());
    let (code, _) = app.get(&format!("/orders/{order_id}"), &second).await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    // Riders cannot act for each other
    let (code, _) = app
        .get(&format!("/riders/{first_id}/available-orders"), &second)
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unverified_rider_cannot_go_online() {
    let app = TestApp::new();
    let rider = app.token("rider-user-1", ActorRole::Rider);
    let (code, profile) = app.post("/riders", &rider, json!({})).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(profile["verification"], "pending");

    let rider_id = profile["id"].as_str().unwrap();
    let (code, _) = app
        .put(&format!("/riders/{rider_id}/online"), &rider, json!({ "online": true }))
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    // Only rider accounts register, once
    let (code, _) = app.post("/riders", &rider, json!({})).await;
    assert_eq!(code, StatusCode::CONFLICT);
    let customer = app.token("cust-1", ActorRole::Customer);
    let (code, _) = app.post("/riders", &customer, json!({})).await;
    assert_eq!(code, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_and_refund() {
    let app = TestApp::new();
    let admin = app.token("admin-1", ActorRole::Admin);
    let customer = app.token("cust-1", ActorRole::Customer);
    let order = app.place_order(&customer).await;
    let order_id = order["orderId"].as_str().unwrap();

    let (code, order) = app.patch_cancel(order_id, &customer).await;
    assert_eq!(code, StatusCode::OK, "{order}");
    assert_eq!(order["status"], "Cancelled");

    // Refund is admin-only
    let (code, _) = app
        .post(&format!("/orders/{order_id}/refund"), &customer, json!({}))
        .await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    let (code, order) = app
        .post(&format!("/orders/{order_id}/refund"), &admin, json!({}))
        .await;
    assert_eq!(code, StatusCode::OK, "{order}");
    assert_eq!(order["paymentStatus"], "refunded");

    let (code, _) = app
        .post(&format!("/orders/{order_id}/refund"), &admin, json!({}))
        .await;
    assert_eq!(code, StatusCode::CONFLICT);

    let (code, statement) = app.get("/ledger/customer/cust-1", &customer).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(statement["balance"], 1170.0);
    assert_eq!(statement["entries"].as_array().unwrap().len(), 1);

    // Another customer cannot read it
    let other = app.token("cust-2", ActorRole::Customer);
    let (code, _) = app.get("/ledger/customer/cust-1", &other).await;
    assert_eq!(code, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_orders_are_private_to_participants() {
    let app = TestApp::new();
    let customer = app.token("cust-1", ActorRole::Customer);
    let order = app.place_order(&customer).await;
    let order_id = order["orderId"].as_str().unwrap();

    let other = app.token("cust-2", ActorRole::Customer);
    let (code, _) = app.get(&format!("/orders/{order_id}"), &other).await;
    assert_eq!(code, StatusCode::FORBIDDEN);

    let restaurant = app.token("owner-1", ActorRole::Restaurant);
    let (code, _) = app.get(&format!("/orders/{order_id}"), &restaurant).await;
    assert_eq!(code, StatusCode::OK);

    let (code, _) = app.get("/orders/missing", &customer).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settlement_is_idempotent() {
    let app = TestApp::new();
    let admin = app.token("admin-1", ActorRole::Admin);
    let body = json!({
        "entityType": "restaurant",
        "entityId": RESTAURANT_ID,
        "amount": 250.0,
        "direction": "credit",
        "reference": "PAY-1"
    });

    let (code, entry) = app.post("/ledger/settlements", &admin, body.clone()).await;
    assert_eq!(code, StatusCode::OK, "{entry}");
    assert_eq!(entry["balanceAfter"], 250.0);

    let (code, _) = app.post("/ledger/settlements", &admin, body).await;
    assert_eq!(code, StatusCode::CONFLICT);

    let restaurant = app.token("owner-1", ActorRole::Restaurant);
    let (code, statement) = app
        .get(&format!("/ledger/restaurant/{RESTAURANT_ID}"), &restaurant)
        .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(statement["balance"], 250.0);

    let (code, _) = app.get("/ledger/vendor/x", &admin).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}
