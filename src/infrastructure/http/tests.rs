//! 端到端接口测试：真实路由 + 内存租户库

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use super::middleware::{
    auth_middleware, require_permission, tenant_middleware, RequiredPermission,
};
use super::{build_router, AppState};
use crate::config::{AppConfig, RateLimitConfig};
use crate::infrastructure::auth::AccessTokenRequest;
use crate::infrastructure::tenancy::TenantRegistry;

const USER_ID: i64 = 7;

async fn test_state(rate_limit: RateLimitConfig) -> Arc<AppState> {
    let mut config = AppConfig::default();
    config.database.in_memory = true;
    config.tenancy.codes = vec!["alana".to_string(), "beta".to_string()];
    config.rate_limit = rate_limit;

    let registry = TenantRegistry::connect_all(&config.database, &config.tenancy.codes)
        .await
        .unwrap();
    Arc::new(AppState::new(config, Arc::new(registry)))
}

async fn test_app() -> (Router, Arc<AppState>) {
    let state = test_state(RateLimitConfig {
        requests_per_minute: 60_000,
        burst: 10_000,
    })
    .await;
    (build_router(state.clone()), state)
}

fn token_with(state: &AppState, tenant: &str, permissions: &[&str]) -> String {
    let (token, _) = state
        .jwt
        .generate_access_token(AccessTokenRequest {
            user_id: USER_ID,
            name: "Kasir".to_string(),
            role_id: 2,
            tenant_code: tenant.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            id_location: Some(1),
        })
        .unwrap();
    token
}

fn token(state: &AppState, tenant: &str) -> String {
    token_with(state, tenant, &["so.read", "so.write"])
}

struct Call<'a> {
    method: &'a str,
    uri: String,
    tenant: Option<&'a str>,
    token: Option<String>,
    body: Option<String>,
}

impl<'a> Call<'a> {
    fn new(method: &'a str, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            tenant: None,
            token: None,
            body: None,
        }
    }

    fn as_user(mut self, state: &AppState, tenant: &'a str) -> Self {
        self.tenant = Some(tenant);
        self.token = Some(token(state, tenant));
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    fn request(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(tenant) = self.tenant {
            builder = builder.header("X-Tenant-Code", tenant);
        }
        if let Some(token) = self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(self, app: &Router) -> (StatusCode, Value) {
        let response = app.clone().oneshot(self.request()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

// ============================================================================
// Health & middleware
// ============================================================================

#[tokio::test]
async fn test_health_pings_every_tenant() {
    let (app, _) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.headers()["x-xss-protection"], "1; mode=block");
    assert_eq!(
        response.headers()["strict-transport-security"],
        "max-age=31536000; includeSubDomains"
    );

    let (status, body) = Call::new("GET", "/health").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["service"], "pos-mojosoft-so-service");
    assert_eq!(body["data"]["tenants"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_health_reports_unreachable_tenant() {
    let (app, state) = test_app().await;
    state.registry.get("beta").await.unwrap().close().await;

    let (status, body) = Call::new("GET", "/health").send(&app).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Database ping failed");
    assert_eq!(body["data"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_tenant_header_is_required() {
    let (app, state) = test_app().await;

    let mut call = Call::new("GET", "/so/api/payment-method");
    call.token = Some(token(&state, "alana"));
    let (status, body) = call.send(&app).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "tenant code is required in X-Tenant-Code header");
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["errors"], Value::Null);

    let mut call = Call::new("GET", "/so/api/payment-method");
    call.tenant = Some("gamma");
    let (status, body) = call.send(&app).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid tenant code");
}

#[tokio::test]
async fn test_authentication_failures() {
    let (app, state) = test_app().await;

    let mut call = Call::new("GET", "/so/api/payment-method");
    call.tenant = Some("alana");
    let (status, body) = call.send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization header required");

    let request = Request::get("/so/api/payment-method")
        .header("X-Tenant-Code", "alana")
        .header(header::AUTHORIZATION, format!("Token {}", token(&state, "alana")))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut call = Call::new("GET", "/so/api/payment-method");
    call.tenant = Some("alana");
    call.token = Some("not-a-jwt".to_string());
    let (status, body) = call.send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    let mut call = Call::new("GET", "/so/api/payment-method");
    call.tenant = Some("alana");
    call.token = Some(state.jwt.generate_refresh_token(USER_ID, "alana").unwrap());
    let (status, body) = call.send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    // beta 的令牌不能访问 alana
    let mut call = Call::new("GET", "/so/api/payment-method");
    call.tenant = Some("alana");
    call.token = Some(token(&state, "beta"));
    let (status, body) = call.send(&app).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Token is not valid for this tenant");
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let state = test_state(RateLimitConfig {
        requests_per_minute: 1,
        burst: 2,
    })
    .await;
    let app = build_router(state);

    let health = |ip: &str| {
        Request::get("/health")
            .header("X-Forwarded-For", ip)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(health("203.0.113.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(health("203.0.113.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Rate limit exceeded");

    let response = app.clone().oneshot(health("203.0.113.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_require_permission() {
    let (_, state) = test_app().await;
    let app: Router = Router::new()
        .route("/guarded", get(|| async { "ok" }))
        .route_layer(from_fn_with_state(
            RequiredPermission("so.approve"),
            require_permission,
        ))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(from_fn_with_state(state.clone(), tenant_middleware))
        .with_state(state.clone());

    let cases = [
        (Vec::<&str>::new(), StatusCode::FORBIDDEN, "No permissions found"),
        (vec!["so.read"], StatusCode::FORBIDDEN, "Insufficient permissions"),
    ];
    for (permissions, expected, message) in cases {
        let mut call = Call::new("GET", "/guarded");
        call.tenant = Some("alana");
        call.token = Some(token_with(&state, "alana", &permissions));
        let (status, body) = call.send(&app).await;
        assert_eq!(status, expected);
        assert_eq!(body["message"], message);
    }

    let mut call = Call::new("GET", "/guarded");
    call.tenant = Some("alana");
    call.token = Some(token_with(&state, "alana", &["so.approve"]));
    let response = app.clone().oneshot(call.request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// CRUD lifecycle
// ============================================================================

#[tokio::test]
async fn test_lookup_lifecycle_and_soft_delete() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("POST", "/so/api/payment-method")
        .as_user(&state, "alana")
        .json(json!({ "name": "Cash" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Payment method created successfully");
    assert_eq!(body["data"]["name"], "Cash");
    assert_eq!(body["data"]["created_by"], USER_ID);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = Call::new("GET", "/so/api/payment-method?name=cas")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment methods retrieved successfully");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let uri = format!("/so/api/payment-method/{}", id);
    let (status, body) = Call::new("DELETE", &uri).as_user(&state, "alana").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment method deleted successfully");
    assert_eq!(body["data"], Value::Null);

    // 按主键读取仍可见已删除的行
    let (status, body) = Call::new("GET", &uri).as_user(&state, "alana").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_by"], USER_ID);
    assert!(!body["data"]["deleted_at"].is_null());

    let (_, body) = Call::new("GET", "/so/api/payment-method")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = Call::new("DELETE", &uri).as_user(&state, "alana").send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Payment method not found");

    let (status, _) = Call::new("PUT", &uri)
        .as_user(&state, "alana")
        .json(json!({ "name": "Card" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_input_errors() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("POST", "/so/api/payment-method")
        .as_user(&state, "alana")
        .json(json!({}))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "name");

    let mut call = Call::new("POST", "/so/api/payment-method").as_user(&state, "alana");
    call.body = Some("{not json".to_string());
    let (status, body) = call.send(&app).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
    assert!(body["errors"].is_string());

    let (status, body) = Call::new("GET", "/so/api/sales-orders/123")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid sales order ID");

    let (status, body) = Call::new("GET", "/so/api/sales-orders?status_id=abc")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid query parameter: status_id");

    let missing = "/so/api/sales-orders/6f1c2a3e-0000-4000-8000-000000000000";
    let (status, body) = Call::new("GET", missing)
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sales order not found");
}

#[tokio::test]
async fn test_update_overwrites_every_field() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("POST", "/so/api/sales-order-details")
        .as_user(&state, "alana")
        .json(json!({ "item_name": "Serum", "quantity": 3, "price": 10.0 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["item_total"], 30.0);
    let uri = format!("/so/api/sales-order-details/{}", body["data"]["id"]);

    let (status, body) = Call::new("PUT", &uri)
        .as_user(&state, "alana")
        .json(json!({ "quantity": 1, "price": 5.0, "discount_pct": 20 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sales order detail updated successfully");
    assert_eq!(body["data"]["item_name"], Value::Null);
    assert_eq!(body["data"]["item_total"], 4.0);
    assert_eq!(body["data"]["updated_by"], USER_ID);
}

#[tokio::test]
async fn test_mark_service_treated() {
    let (app, state) = test_app().await;

    let (_, body) = Call::new("POST", "/so/api/sales-order-services")
        .as_user(&state, "alana")
        .json(json!({ "service_name": "Facial", "treated": false }))
        .send(&app)
        .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/so/api/sales-order-services/{}/mark-treated", id);
    let (status, body) = Call::new("PATCH", &uri)
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Service marked as treated successfully");
    assert_eq!(body["data"]["treated"], true);
    assert_eq!(body["data"]["service_name"], "Facial");

    let (status, _) = Call::new("PATCH", "/so/api/sales-order-services/999/mark-treated")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Composite documents
// ============================================================================

#[tokio::test]
async fn test_sales_order_composite_create() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("POST", "/so/api/sales-orders")
        .as_user(&state, "alana")
        .json(json!({
            "customer_id": 11,
            "doc_date": "2024-03-01",
            "details": [
                { "item_name": "Peeling", "quantity": 2, "price": 50.0, "discount_pct": 10 },
                { "item_name": "Toner", "quantity": 1, "price": 25.0 }
            ],
            "services": [{ "service_name": "Facial" }]
        }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Sales order created successfully");

    let order = &body["data"];
    assert_eq!(order["created_by"], USER_ID);
    assert_eq!(order["doc_date"], "2024-03-01");
    let details = order["details"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert!(details.iter().all(|d| d["sales_order_id"] == order["id"]));
    assert_eq!(details[0]["item_total"], 90.0);
    assert_eq!(details[1]["item_total"], 25.0);
    assert_eq!(order["services"].as_array().unwrap().len(), 1);

    let uri = format!(
        "/so/api/sales-order-details/by-sales-order/{}",
        order["id"].as_str().unwrap()
    );
    let (status, body) = Call::new("GET", &uri).as_user(&state, "alana").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = Call::new("GET", "/so/api/sales-order-details/by-sales-order/42")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid sales order ID");
}

#[tokio::test]
async fn test_composite_create_rolls_back_on_line_failure() {
    let (app, state) = test_app().await;
    let pool = state.registry.get("alana").await.unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_line BEFORE INSERT ON sales_order_detail
         WHEN NEW.item_name = 'rejected'
         BEGIN SELECT RAISE(ABORT, 'line rejected'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let (status, body) = Call::new("POST", "/so/api/sales-orders")
        .as_user(&state, "alana")
        .json(json!({
            "customer_id": 11,
            "details": [
                { "quantity": 1, "price": 10.0 },
                { "item_name": "rejected", "quantity": 1, "price": 10.0 }
            ]
        }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to create sales order detail");
    assert!(body["errors"].as_str().unwrap().contains("line rejected"));

    let (_, body) = Call::new("GET", "/so/api/sales-orders")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = Call::new("GET", "/so/api/sales-order-details")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_negative_quantity_is_a_validation_error() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("POST", "/so/api/sales-order-details")
        .as_user(&state, "alana")
        .json(json!({ "quantity": -1, "price": 10.0 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "quantity");

    let (status, body) = Call::new("POST", "/so/api/treatments")
        .as_user(&state, "alana")
        .json(json!({ "details": [{ "quantity": -2 }] }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "details[0].quantity");
}

#[tokio::test]
async fn test_nested_validation_errors_are_prefixed() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("POST", "/so/api/treatments")
        .as_user(&state, "alana")
        .json(json!({ "details": [{ "item_id": 3 }] }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "details[0].quantity");
}

#[tokio::test]
async fn test_tenant_isolation() {
    let (app, state) = test_app().await;

    let (_, body) = Call::new("POST", "/so/api/ar-receipts")
        .as_user(&state, "alana")
        .json(json!({ "customer_id": 5, "details": [{ "receipt_amount": 150000.0 }] }))
        .send(&app)
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["details"].as_array().unwrap().len(), 1);

    let (_, body) = Call::new("GET", "/so/api/ar-receipts")
        .as_user(&state, "beta")
        .send(&app)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = Call::new("GET", format!("/so/api/ar-receipts/{}", id))
        .as_user(&state, "beta")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = Call::new("GET", format!("/so/api/ar-receipts/{}", id))
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bookkeeping_relations_and_ranges() {
    let (app, state) = test_app().await;

    let (_, body) = Call::new("POST", "/so/api/book-transaction-type")
        .as_user(&state, "alana")
        .json(json!({ "name": "Sales" }))
        .send(&app)
        .await;
    let type_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = Call::new("POST", "/so/api/bookkeeping")
        .as_user(&state, "alana")
        .json(json!({ "location_id": "JKT-01", "book_date": "2024-01-15", "opening": 0.0 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let book_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = Call::new("POST", "/so/api/bookkeeping-detail")
        .as_user(&state, "alana")
        .json(json!({ "bookkeeping_id": book_id, "type_id": type_id, "income": 500.0 }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = Call::new("GET", format!("/so/api/bookkeeping/{}", book_id))
        .as_user(&state, "alana")
        .send(&app)
        .await;
    let details = body["data"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["type"]["name"], "Sales");

    let range = "/so/api/bookkeeping?book_date_from=2024-01-01&book_date_to=2024-01-31";
    let (_, body) = Call::new("GET", range)
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = Call::new("GET", "/so/api/bookkeeping?book_date_from=2024-02-01")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = Call::new("GET", "/so/api/bookkeeping/by-location/JKT-01")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(body["message"], "Bookkeeping records retrieved successfully");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_read_only_lookups_reject_writes() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("POST", "/so/api/sales-order-status")
        .as_user(&state, "alana")
        .json(json!({ "name": "Open" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Method not allowed");

    let (status, body) = Call::new("GET", "/so/api/sales-order-status")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sales order statuses retrieved successfully");
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let (app, state) = test_app().await;

    let (status, body) = Call::new("GET", "/so/api/no-such-table")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");

    let (status, body) = Call::new("DELETE", "/health").send(&app).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], "Method not allowed");
}

#[tokio::test]
async fn test_request_timeout_uses_envelope() {
    let base = test_state(RateLimitConfig {
        requests_per_minute: 60_000,
        burst: 10_000,
    })
    .await;
    let mut config = base.config.clone();
    config.server.request_timeout_secs = 0;
    let state = Arc::new(AppState::new(config, base.registry.clone()));
    let app = build_router(state.clone());

    let (status, body) = Call::new("GET", "/so/api/payment-method")
        .as_user(&state, "alana")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Request timeout");
}
