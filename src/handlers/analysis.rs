use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::order_service::SharedOrderService;
use crate::domain::analytics::{HourlyCount, SalesReport};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct AnalysisParams {
    pub product: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HourlyCountResponse {
    pub hour: u32,
    pub total_orders: i64,
}

impl From<HourlyCount> for HourlyCountResponse {
    fn from(h: HourlyCount) -> Self {
        Self {
            hour: h.hour,
            total_orders: h.total_orders,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportResponse {
    pub product: String,
    pub date: String,
    pub total_orders: i64,
    /// Units sold of the selected product, or of both products for `all`.
    pub total_sales: i64,
    /// Decimal revenue as a string, e.g. "1234.50"
    pub total_revenue: String,
    pub bad_debt_orders: i64,
    pub cashier_orders: i64,
    pub mobile_orders: i64,
    pub cashier_percentage: f64,
    pub mobile_percentage: f64,
    pub bad_debt_rate: f64,
    /// Ascending by hour; hours without orders are omitted.
    pub hourly_data: Vec<HourlyCountResponse>,
}

impl From<SalesReport> for SalesReportResponse {
    fn from(r: SalesReport) -> Self {
        Self {
            product: r.product.to_string(),
            date: r.date,
            total_orders: r.total_orders,
            total_sales: r.total_sales,
            total_revenue: r.total_revenue.to_string(),
            bad_debt_orders: r.bad_debt_orders,
            cashier_orders: r.cashier_orders,
            mobile_orders: r.mobile_orders,
            cashier_percentage: r.cashier_percentage,
            mobile_percentage: r.mobile_percentage,
            bad_debt_rate: r.bad_debt_rate,
            hourly_data: r.hourly.into_iter().map(Into::into).collect(),
        }
    }
}

async fn report(
    service: web::Data<SharedOrderService>,
    product: Option<String>,
    date: Option<String>,
) -> Result<HttpResponse, AppError> {
    let report = web::block(move || service.sales_report(product.as_deref(), date.as_deref()))
        .await??;

    Ok(HttpResponse::Ok().json(SalesReportResponse::from(report)))
}

/// GET /api/analysis
///
/// Sales totals, channel split and hourly distribution over the orders
/// matching `product` and `date` (both default to `all`).
#[utoipa::path(
    get,
    path = "/api/analysis",
    params(
        ("product" = Option<String>, Query, description = "all, product1 or product2 (default all)"),
        ("date" = Option<String>, Query, description = "all or a configured date range name (default all)"),
    ),
    responses(
        (status = 200, description = "Sales report", body = SalesReportResponse),
        (status = 400, description = "Unknown product or date range"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analysis"
)]
pub async fn sales_analysis(
    service: web::Data<SharedOrderService>,
    query: web::Query<AnalysisParams>,
) -> Result<HttpResponse, AppError> {
    let AnalysisParams { product, date } = query.into_inner();
    report(service, product, date).await
}

/// GET /analysis/{product}
///
/// Same report with the product taken from the path.
#[utoipa::path(
    get,
    path = "/analysis/{product}",
    params(
        ("product" = String, Path, description = "all, product1 or product2"),
        ("date" = Option<String>, Query, description = "all or a configured date range name (default all)"),
    ),
    responses(
        (status = 200, description = "Sales report", body = SalesReportResponse),
        (status = 400, description = "Unknown product or date range"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analysis"
)]
pub async fn product_analysis(
    service: web::Data<SharedOrderService>,
    path: web::Path<String>,
    query: web::Query<DateParams>,
) -> Result<HttpResponse, AppError> {
    report(service, Some(path.into_inner()), query.into_inner().date).await
}
