//! 集成测试公共工具：临时数据库 + 真实 JWT + oneshot 请求

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use delivery_server::auth::JwtConfig;
use delivery_server::core::build_router;
use delivery_server::{Config, JwtService, ServerState};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::order::ActorRole;
use tower::ServiceExt;

pub const RESTAURANT_ID: &str = "rest-1";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    jwt: JwtService,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_tests(dir.path().to_string_lossy(), JwtConfig::for_tests());
        let state = ServerState::initialize(&config).unwrap();
        Self {
            router: build_router(state.clone()),
            state,
            jwt: JwtService::with_config(JwtConfig::for_tests()),
            _dir: dir,
        }
    }

    pub fn token(&self, user_id: &str, role: ActorRole) -> String {
        let restaurant_id = (role == ActorRole::Restaurant).then_some(RESTAURANT_ID);
        self.jwt
            .generate_token(user_id, user_id, role, restaurant_id)
            .unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    /// Cancel without a body
    pub async fn patch_cancel(&self, order_id: &str, token: &str) -> (StatusCode, Value) {
        self.request(
            Method::PATCH,
            &format!("/orders/{order_id}/cancel"),
            Some(token),
            None,
        )
        .await
    }

    /// Register a rider account, approve it and bring it online
    pub async fn ready_rider(&self, user_id: &str, admin: &str) -> (String, String) {
        let token = self.token(user_id, ActorRole::Rider);
        let (status, rider) = self.post("/riders", &token, json!({})).await;
        assert_eq!(status, StatusCode::OK, "{rider}");
        let rider_id = rider["id"].as_str().unwrap().to_string();

        let (status, _) = self
            .put(
                &format!("/riders/{rider_id}/verification"),
                admin,
                json!({ "status": "approved" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, rider) = self
            .put(&format!("/riders/{rider_id}/online"), &token, json!({ "online": true }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rider["online"], true);

        (rider_id, token)
    }

    /// Checkout one card order as `customer`
    pub async fn place_order(&self, customer: &str) -> Value {
        let (status, order) = self
            .post("/orders", customer, checkout_body("card"))
            .await;
        assert_eq!(status, StatusCode::OK, "{order}");
        order
    }
}

pub fn checkout_body(payment_method: &str) -> Value {
    json!({
        "restaurantId": RESTAURANT_ID,
        "items": [
            { "dishId": "d-1", "name": "Chicken Karahi", "quantity": 2, "unitPrice": 450.0 },
            {
                "dishId": "d-2",
                "name": "Naan",
                "quantity": 3,
                "unitPrice": 30.0,
                "addOns": [{ "name": "Butter", "price": 10.0 }]
            }
        ],
        "deliveryFee": 100.0,
        "tax": 50.0,
        "paymentMethod": payment_method,
        "delivery": {
            "shippingAddress": "House 12, Block 5, Clifton",
            "location": { "lat": 24.8138, "lng": 67.0300 },
            "pickupLocation": { "lat": 24.8200, "lng": 67.0350 }
        }
    })
}
