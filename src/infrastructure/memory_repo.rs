//! Process-local order store, for tests and for running without a database.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::analytics::{hourly_histogram, AnalyticsQuery, OrderTotals, SalesSnapshot};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrderInput, Order, OrderStatus};
use crate::domain::ports::OrderRepository;

#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an already-built order as is, keeping its id and timestamp.
    pub fn insert(&self, order: Order) -> Result<(), DomainError> {
        self.lock()?.push(order);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Order>>, DomainError> {
        self.orders
            .lock()
            .map_err(|_| DomainError::Storage("order store lock poisoned".to_string()))
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, input: NewOrderInput) -> Result<Order, DomainError> {
        let order = Order {
            id: Uuid::new_v4(),
            buyer_id: input.buyer_id,
            product1_quantity: input.product1_quantity,
            product2_quantity: input.product2_quantity,
            total_price: input.total_price,
            status: OrderStatus::Pending,
            cashier: input.cashier,
            created_at: Utc::now(),
        };
        self.lock()?.push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.lock()?.iter().find(|o| o.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.lock()?.clone())
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let mut orders = self.lock()?;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;
        order.status = status;
        Ok(())
    }

    fn summarize(&self, query: &AnalyticsQuery) -> Result<SalesSnapshot, DomainError> {
        let filters = query.filters();
        let orders = self.lock()?;
        let mut totals = OrderTotals::default();
        let mut placed_at = Vec::new();
        for order in orders
            .iter()
            .filter(|o| filters.iter().all(|f| f.matches(o)))
        {
            totals.record(order);
            placed_at.push(order.created_at);
        }
        Ok(SalesSnapshot {
            totals,
            hourly: hourly_histogram(placed_at, query.utc_offset),
        })
    }
}
