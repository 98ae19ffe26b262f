use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::SharedOrderService;
use crate::domain::order::{NewOrderInput, Order};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer_id: String,
    pub product1_quantity: i32,
    pub product2_quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub total_price: String,
    /// 1 = pending, 2 = fulfilled, 3 = bad debt
    pub status: i16,
    /// `true` when placed at the cashier; `false` or null for mobile orders.
    pub cashier: Option<bool>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            buyer_id: o.buyer_id,
            product1_quantity: o.product1_quantity,
            product2_quantity: o.product2_quantity,
            total_price: o.total_price.to_string(),
            status: o.status.code(),
            cashier: o.cashier,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveOrderRequest {
    pub buyer_id: String,
    #[serde(default)]
    pub product1_quantity: i32,
    #[serde(default)]
    pub product2_quantity: i32,
    /// Accepts a JSON number or a decimal string.
    #[schema(value_type = String, example = "59.80")]
    pub total_price: BigDecimal,
    /// Omit for orders placed from the mobile app.
    #[serde(default)]
    pub cashier: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceiveOrderResponse {
    pub message: String,
    pub results: OrderResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Must be 1, 2 or 3; anything else is rejected.
    #[serde(default)]
    #[schema(value_type = i16, example = 2)]
    pub status: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/orders
///
/// Returns every order, unfiltered and unpaginated.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<SharedOrderService>,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || service.list_orders()).await??;

    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id)).await??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /api/orders/{id}
///
/// Sets the fulfillment status. No other field is touched.
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Status is not 1, 2 or 3"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let raw = status_code(&body.into_inner().status);

    let status = web::block(move || service.update_status(order_id, raw)).await??;

    log::info!("Order {} set to {}", order_id, status);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Status updated".to_string(),
    }))
}

/// Integral JSON numbers only, so `2` and `2.0` are the same status while
/// `2.5` and `"2"` are not numbers the service can check.
fn status_code(value: &serde_json::Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// POST /receive
///
/// Records a new order. The id and timestamp are assigned here and the
/// status starts as pending.
#[utoipa::path(
    post,
    path = "/receive",
    request_body = ReceiveOrderRequest,
    responses(
        (status = 200, description = "Order recorded", body = ReceiveOrderResponse),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn receive_order(
    service: web::Data<SharedOrderService>,
    body: web::Json<ReceiveOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = NewOrderInput {
        buyer_id: body.buyer_id,
        product1_quantity: body.product1_quantity,
        product2_quantity: body.product2_quantity,
        total_price: body.total_price,
        cashier: body.cashier,
    };

    let order = web::block(move || service.create_order(input)).await??;

    log::info!("Recorded order {} for buyer {}", order.id, order.buyer_id);
    Ok(HttpResponse::Ok().json(ReceiveOrderResponse {
        message: "Order received".to_string(),
        results: order.into(),
    }))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::config::AnalyticsSettings;
    use crate::domain::ports::OrderRepository;
    use crate::handlers::configure;
    use crate::handlers::test_support::service_data;
    use crate::infrastructure::memory_repo::InMemoryOrderRepository;

    fn new_input() -> NewOrderInput {
        NewOrderInput {
            buyer_id: "buyer-7".to_string(),
            product1_quantity: 1,
            product2_quantity: 2,
            total_price: BigDecimal::from_str("29.90").expect("valid decimal"),
            cashier: Some(true),
        }
    }

    #[actix_web::test]
    async fn receive_then_list_returns_the_order() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let app = test::init_service(
            App::new()
                .app_data(service_data(repo.clone(), AnalyticsSettings::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/receive")
            .set_json(json!({
                "buyerId": "buyer-1",
                "product1Quantity": 2,
                "product2Quantity": 0,
                "totalPrice": "19.80"
            }))
            .to_request();
        let created: ReceiveOrderResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created.results.status, 1);
        assert_eq!(created.results.cashier, None);
        assert_eq!(created.results.total_price, "19.80");

        let req = test::TestRequest::get().uri("/api/orders").to_request();
        let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["buyer_id"], "buyer-1");
        assert_eq!(listed[0]["id"], created.results.id.to_string());
        assert!(listed[0].get("timestamp").is_some());
    }

    #[actix_web::test]
    async fn valid_statuses_are_applied() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let order = repo.create(new_input()).expect("create failed");
        let app = test::init_service(
            App::new()
                .app_data(service_data(repo.clone(), AnalyticsSettings::default()))
                .configure(configure),
        )
        .await;

        for status in [2, 3, 1] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/orders/{}", order.id))
                .set_json(json!({ "status": status }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let req = test::TestRequest::get()
                .uri(&format!("/api/orders/{}", order.id))
                .to_request();
            let fetched: OrderResponse = test::call_and_read_body_json(&app, req).await;
            assert_eq!(i64::from(fetched.status), status);
        }
    }

    #[actix_web::test]
    async fn integral_float_status_is_accepted() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let order = repo.create(new_input()).expect("create failed");
        let app = test::init_service(
            App::new()
                .app_data(service_data(repo.clone(), AnalyticsSettings::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/orders/{}", order.id))
            .set_payload(r#"{"status": 2.0}"#)
            .insert_header(("content-type", "application/json"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = repo
            .find_by_id(order.id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(stored.status.code(), 2);
    }

    #[::core::prelude::v1::test]
    fn status_code_reads_integral_numbers_only() {
        assert_eq!(status_code(&json!(3)), Some(3));
        assert_eq!(status_code(&json!(3.0)), Some(3));
        assert_eq!(status_code(&json!(-1.0)), Some(-1));
        assert_eq!(status_code(&json!(2.5)), None);
        assert_eq!(status_code(&json!("2")), None);
        assert_eq!(status_code(&Value::Null), None);
    }

    #[actix_web::test]
    async fn invalid_status_is_rejected_and_order_unchanged() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let order = repo.create(new_input()).expect("create failed");
        let app = test::init_service(
            App::new()
                .app_data(service_data(repo.clone(), AnalyticsSettings::default()))
                .configure(configure),
        )
        .await;

        for body in [
            json!({ "status": 0 }),
            json!({ "status": 4 }),
            json!({ "status": "x" }),
            json!({ "status": "2" }),
            json!({ "status": 2.5 }),
            json!({ "status": 1e300 }),
            json!({}),
        ] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/orders/{}", order.id))
                .set_json(&body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        }

        let stored = repo
            .find_by_id(order.id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(stored.status.code(), 1);
    }

    #[actix_web::test]
    async fn unknown_order_is_404() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let app = test::init_service(
            App::new()
                .app_data(service_data(repo, AnalyticsSettings::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/orders/{}", Uuid::new_v4()))
            .set_json(json!({ "status": 2 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Order not found");
    }

    #[actix_web::test]
    async fn malformed_order_body_is_400() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let app = test::init_service(
            App::new()
                .app_data(service_data(repo.clone(), AnalyticsSettings::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/receive")
            .set_json(json!({ "buyerId": "b", "totalPrice": "not a price" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(repo.list().expect("list failed").is_empty());
    }
}
