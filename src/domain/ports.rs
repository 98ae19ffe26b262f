use std::sync::Arc;

use uuid::Uuid;

use super::analytics::{AnalyticsQuery, SalesSnapshot};
use super::errors::DomainError;
use super::order::{NewOrderInput, Order, OrderStatus};

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, input: NewOrderInput) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Every order, in whatever order the backend stores them.
    fn list(&self) -> Result<Vec<Order>, DomainError>;
    /// Fails with `NotFound` when no order has this id.
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError>;
    /// Aggregates and hourly histogram, observed from a single snapshot.
    fn summarize(&self, query: &AnalyticsQuery) -> Result<SalesSnapshot, DomainError>;
}

impl<R: OrderRepository + ?Sized> OrderRepository for Arc<R> {
    fn create(&self, input: NewOrderInput) -> Result<Order, DomainError> {
        (**self).create(input)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_by_id(id)
    }

    fn list(&self) -> Result<Vec<Order>, DomainError> {
        (**self).list()
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        (**self).update_status(id, status)
    }

    fn summarize(&self, query: &AnalyticsQuery) -> Result<SalesSnapshot, DomainError> {
        (**self).summarize(query)
    }
}
