pub mod analysis;
pub mod orders;

use actix_web::web;
use utoipa::OpenApi;

use crate::errors::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::receive_order,
        analysis::sales_analysis,
        analysis::product_analysis,
    ),
    tags(
        (name = "orders", description = "Order records and fulfillment status"),
        (name = "analysis", description = "Aggregate sales analytics"),
    )
)]
pub struct ApiDoc;

/// Registers every route on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/api")
                .route("/orders", web::get().to(orders::list_orders))
                .service(
                    web::resource("/orders/{id}")
                        .route(web::get().to(orders::get_order))
                        .route(web::put().to(orders::update_order_status)),
                )
                .route("/analysis", web::get().to(analysis::sales_analysis)),
        )
        .route("/receive", web::post().to(orders::receive_order))
        .route(
            "/analysis/{product}",
            web::get().to(analysis::product_analysis),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
