use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Fulfillment state of an order. Stored as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Fulfilled,
    /// Uncollectible or voided.
    BadDebt,
}

impl OrderStatus {
    pub fn code(self) -> i16 {
        match self {
            OrderStatus::Pending => 1,
            OrderStatus::Fulfilled => 2,
            OrderStatus::BadDebt => 3,
        }
    }
}

impl TryFrom<i64> for OrderStatus {
    type Error = DomainError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(OrderStatus::Pending),
            2 => Ok(OrderStatus::Fulfilled),
            3 => Ok(OrderStatus::BadDebt),
            other => Err(DomainError::InvalidInput(format!(
                "status must be 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Fulfilled => "fulfilled",
            OrderStatus::BadDebt => "bad debt",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: String,
    pub product1_quantity: i32,
    pub product2_quantity: i32,
    pub total_price: BigDecimal,
    pub status: OrderStatus,
    /// `Some(true)` for the cashier channel; anything else counts as mobile.
    pub cashier: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_cashier(&self) -> bool {
        self.cashier == Some(true)
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderInput {
    pub buyer_id: String,
    pub product1_quantity: i32,
    pub product2_quantity: i32,
    pub total_price: BigDecimal,
    pub cashier: Option<bool>,
}
