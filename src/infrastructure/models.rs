use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::analytics::HourlyCount;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderStatus};
use crate::schema::orders;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub buyer_id: String,
    pub product1_quantity: i32,
    pub product2_quantity: i32,
    pub total_price: BigDecimal,
    pub status: i16,
    pub cashier: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::try_from(i64::from(row.status)).map_err(|_| {
            DomainError::Storage(format!(
                "order {} has unknown status {}",
                row.id, row.status
            ))
        })?;
        Ok(Order {
            id: row.id,
            buyer_id: row.buyer_id,
            product1_quantity: row.product1_quantity,
            product2_quantity: row.product2_quantity,
            total_price: row.total_price,
            status,
            cashier: row.cashier,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub buyer_id: String,
    pub product1_quantity: i32,
    pub product2_quantity: i32,
    pub total_price: BigDecimal,
    pub cashier: Option<bool>,
}

/// One bucket of the hourly histogram query.
#[derive(Debug, QueryableByName)]
pub struct HourlyCountRow {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub hour: i32,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub total_orders: i64,
}

impl TryFrom<HourlyCountRow> for HourlyCount {
    type Error = DomainError;

    fn try_from(row: HourlyCountRow) -> Result<Self, Self::Error> {
        let hour = u32::try_from(row.hour)
            .ok()
            .filter(|h| *h < 24)
            .ok_or_else(|| DomainError::Storage(format!("hour {} out of range", row.hour)))?;
        Ok(HourlyCount {
            hour,
            total_orders: row.total_orders,
        })
    }
}
