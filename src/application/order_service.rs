use std::sync::Arc;

use uuid::Uuid;

use crate::config::AnalyticsSettings;
use crate::domain::analytics::{AnalyticsQuery, ProductSelection, SalesReport, ALL_TOKEN};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrderInput, Order, OrderStatus};
use crate::domain::ports::OrderRepository;

/// The service as shared by the HTTP layer, over any injected backend.
pub type SharedOrderService = OrderService<Arc<dyn OrderRepository>>;

pub struct OrderService<R> {
    repo: R,
    analytics: AnalyticsSettings,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R, analytics: AnalyticsSettings) -> Self {
        Self { repo, analytics }
    }

    pub fn create_order(&self, input: NewOrderInput) -> Result<Order, DomainError> {
        self.repo.create(input)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.repo.list()
    }

    /// `raw` is `None` when the client sent something that is not an integer.
    pub fn update_status(&self, id: Uuid, raw: Option<i64>) -> Result<OrderStatus, DomainError> {
        let status = raw
            .ok_or_else(|| DomainError::InvalidInput("status must be an integer".to_string()))
            .and_then(OrderStatus::try_from)?;
        self.repo.update_status(id, status)?;
        Ok(status)
    }

    /// Resolves the product and date tokens (both default to `all`) and
    /// builds the sales report over the matching orders.
    pub fn sales_report(
        &self,
        product: Option<&str>,
        date: Option<&str>,
    ) -> Result<SalesReport, DomainError> {
        let query = self.resolve_query(product, date)?;
        let snapshot = self.repo.summarize(&query)?;
        Ok(SalesReport::new(&query, snapshot))
    }

    fn resolve_query(
        &self,
        product: Option<&str>,
        date: Option<&str>,
    ) -> Result<AnalyticsQuery, DomainError> {
        let product = match product {
            Some(token) => token.parse()?,
            None => ProductSelection::All,
        };
        let date = date.unwrap_or(ALL_TOKEN);
        Ok(AnalyticsQuery {
            product,
            range: self.analytics.date_ranges.resolve(date)?,
            date: date.to_string(),
            utc_offset: self.analytics.utc_offset,
        })
    }
}
