//! Translation of domain filters into diesel expressions.

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;

use chrono::{DateTime, Utc};

use crate::domain::analytics::{OrderFilter, Product};
use crate::schema::orders;

pub type OrderPredicate = Box<dyn BoxableExpression<orders::table, Pg, SqlType = Bool>>;

pub fn predicate(filter: &OrderFilter) -> OrderPredicate {
    match *filter {
        OrderFilter::Contains(Product::Product1) => Box::new(orders::product1_quantity.ne(0)),
        OrderFilter::Contains(Product::Product2) => Box::new(orders::product2_quantity.ne(0)),
        OrderFilter::PlacedWithin(range) => Box::new(
            orders::created_at
                .ge(range.start)
                .and(orders::created_at.lt(range.end)),
        ),
    }
}

/// ANDs the filters together; `None` when there is nothing to filter on.
pub fn combine(filters: &[OrderFilter]) -> Option<OrderPredicate> {
    filters
        .iter()
        .map(predicate)
        .reduce(|acc, next| -> OrderPredicate { Box::new(acc.and(next)) })
}

/// Orders per hour of day. `$1` is the reporting offset in minutes; the
/// remaining parameters switch each filter on, in the order of
/// [`HourlyFilterBinds`].
pub const HOURLY_COUNTS_SQL: &str = "\
SELECT EXTRACT(HOUR FROM (created_at AT TIME ZONE 'UTC') + make_interval(mins => $1))::int4 AS hour, \
       COUNT(*) AS total_orders \
FROM orders \
WHERE ($2 = FALSE OR product1_quantity <> 0) \
  AND ($3 = FALSE OR product2_quantity <> 0) \
  AND ($4::timestamptz IS NULL OR created_at >= $4) \
  AND ($5::timestamptz IS NULL OR created_at < $5) \
GROUP BY 1 \
ORDER BY 1";

/// Bind values for the filter slots of [`HOURLY_COUNTS_SQL`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourlyFilterBinds {
    pub product1_only: bool,
    pub product2_only: bool,
    pub placed_from: Option<DateTime<Utc>>,
    pub placed_before: Option<DateTime<Utc>>,
}

impl HourlyFilterBinds {
    pub fn from_filters(filters: &[OrderFilter]) -> Self {
        let mut binds = Self::default();
        for filter in filters {
            match *filter {
                OrderFilter::Contains(Product::Product1) => binds.product1_only = true,
                OrderFilter::Contains(Product::Product2) => binds.product2_only = true,
                OrderFilter::PlacedWithin(range) => {
                    binds.placed_from = Some(range.start);
                    binds.placed_before = Some(range.end);
                }
            }
        }
        binds
    }
}
