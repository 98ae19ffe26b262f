use bigdecimal::BigDecimal;
use diesel::dsl::{case_when, count_star, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Integer, Nullable, Timestamptz};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::analytics::{
    AnalyticsQuery, HourlyCount, OrderFilter, OrderTotals, SalesSnapshot,
};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrderInput, Order, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::models::{HourlyCountRow, NewOrderRow, OrderRow};
use super::predicates::{combine, HourlyFilterBinds, HOURLY_COUNTS_SQL};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type TotalsRow = (
    i64,
    Option<i64>,
    Option<i64>,
    Option<BigDecimal>,
    Option<i64>,
    Option<i64>,
);

fn filtered<'a>(filters: &[OrderFilter]) -> orders::BoxedQuery<'a, Pg> {
    let query = orders::table.into_boxed();
    match combine(filters) {
        Some(predicate) => query.filter(predicate),
        None => query,
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, input: NewOrderInput) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                buyer_id: input.buyer_id,
                product1_quantity: input.product1_quantity,
                product2_quantity: input.product2_quantity,
                total_price: input.total_price,
                cashier: input.cashier,
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;

        row.try_into()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn list(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .select(OrderRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(orders::table.find(id))
            .set(orders::status.eq(status.code()))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn summarize(&self, query: &AnalyticsQuery) -> Result<SalesSnapshot, DomainError> {
        let mut conn = self.pool.get()?;
        let filters = query.filters();

        // Both statements must see the same rows.
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run::<_, DomainError, _>(|conn| {
                let (total_orders, product1_units, product2_units, revenue, bad_debt, cashier) =
                    filtered(&filters)
                        .select((
                            count_star(),
                            sum(orders::product1_quantity),
                            sum(orders::product2_quantity),
                            sum(orders::total_price),
                            sum(case_when::<_, _, Integer>(
                                orders::status.eq(OrderStatus::BadDebt.code()),
                                1,
                            )
                            .otherwise(0)),
                            sum(case_when::<_, _, Integer>(orders::cashier.eq(true), 1)
                                .otherwise(0)),
                        ))
                        .get_result::<TotalsRow>(conn)?;

                let binds = HourlyFilterBinds::from_filters(&filters);
                let hourly = diesel::sql_query(HOURLY_COUNTS_SQL)
                    .bind::<Integer, _>(query.utc_offset.local_minus_utc() / 60)
                    .bind::<Bool, _>(binds.product1_only)
                    .bind::<Bool, _>(binds.product2_only)
                    .bind::<Nullable<Timestamptz>, _>(binds.placed_from)
                    .bind::<Nullable<Timestamptz>, _>(binds.placed_before)
                    .load::<HourlyCountRow>(conn)?
                    .into_iter()
                    .map(HourlyCount::try_from)
                    .collect::<Result<Vec<_>, DomainError>>()?;

                Ok(SalesSnapshot {
                    totals: OrderTotals {
                        total_orders,
                        product1_units: product1_units.unwrap_or(0),
                        product2_units: product2_units.unwrap_or(0),
                        revenue: revenue.unwrap_or_default(),
                        bad_debt_orders: bad_debt.unwrap_or(0),
                        cashier_orders: cashier.unwrap_or(0),
                    },
                    hourly,
                })
            })
    }
}
