//! Sales analytics: filter selection, aggregate totals and the derived report.
//!
//! Storage adapters turn an [`AnalyticsQuery`] into [`OrderTotals`] plus an
//! hourly histogram; everything derived from those numbers lives here so that
//! every backend reports identically.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Timelike, Utc};

use super::errors::DomainError;
use super::order::{Order, OrderStatus};

pub const ALL_TOKEN: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Product1,
    Product2,
}

impl Product {
    pub fn quantity(self, order: &Order) -> i32 {
        match self {
            Product::Product1 => order.product1_quantity,
            Product::Product2 => order.product2_quantity,
        }
    }
}

/// Which product the analytics are restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSelection {
    #[default]
    All,
    Only(Product),
}

impl ProductSelection {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductSelection::All => ALL_TOKEN,
            ProductSelection::Only(Product::Product1) => "product1",
            ProductSelection::Only(Product::Product2) => "product2",
        }
    }

    /// Units sold for this selection, given the per-product unit sums.
    pub fn units(self, product1_units: i64, product2_units: i64) -> i64 {
        match self {
            ProductSelection::All => product1_units + product2_units,
            ProductSelection::Only(Product::Product1) => product1_units,
            ProductSelection::Only(Product::Product2) => product2_units,
        }
    }
}

impl FromStr for ProductSelection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ALL_TOKEN => Ok(ProductSelection::All),
            "product1" => Ok(ProductSelection::Only(Product::Product1)),
            "product2" => Ok(ProductSelection::Only(Product::Product2)),
            other => Err(DomainError::InvalidInput(format!(
                "unknown product '{other}', expected all, product1 or product2"
            ))),
        }
    }
}

impl fmt::Display for ProductSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidInput(format!(
                "date range start {start} is not before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

impl FromStr for DateRange {
    type Err = DomainError;

    /// Parses `START..END` with RFC 3339 bounds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once("..").ok_or_else(|| {
            DomainError::InvalidInput(format!("date range '{s}' must look like START..END"))
        })?;
        DateRange::new(parse_instant(start)?, parse_instant(end)?)
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DomainError::InvalidInput(format!("invalid timestamp '{raw}': {e}")))
}

/// Named date tokens and the fixed intervals they stand for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeCatalog {
    ranges: Vec<(String, DateRange)>,
}

impl DateRangeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, token: impl Into<String>, range: DateRange) -> Self {
        self.insert(token.into(), range);
        self
    }

    fn insert(&mut self, token: String, range: DateRange) {
        match self.ranges.iter_mut().find(|(name, _)| *name == token) {
            Some(entry) => entry.1 = range,
            None => self.ranges.push((token, range)),
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|(name, _)| name.as_str())
    }

    /// `Ok(None)` means no date restriction.
    pub fn resolve(&self, token: &str) -> Result<Option<DateRange>, DomainError> {
        if token == ALL_TOKEN {
            return Ok(None);
        }
        self.ranges
            .iter()
            .find(|(name, _)| name == token)
            .map(|(_, range)| Some(*range))
            .ok_or_else(|| {
                let known: Vec<&str> = std::iter::once(ALL_TOKEN).chain(self.tokens()).collect();
                DomainError::InvalidInput(format!(
                    "unknown date range '{token}', expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

impl FromStr for DateRangeCatalog {
    type Err = DomainError;

    /// Parses `token=START..END` entries separated by `;`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut catalog = DateRangeCatalog::new();
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, range) = entry.split_once('=').ok_or_else(|| {
                DomainError::InvalidInput(format!("date range entry '{entry}' is missing '='"))
            })?;
            let token = token.trim();
            if token.is_empty() || token == ALL_TOKEN {
                return Err(DomainError::InvalidInput(format!(
                    "'{token}' cannot name a date range"
                )));
            }
            catalog.insert(token.to_string(), range.parse()?);
        }
        Ok(catalog)
    }
}

/// One typed row restriction. Filters are combined with AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    /// The order contains at least one unit of the product.
    Contains(Product),
    PlacedWithin(DateRange),
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            OrderFilter::Contains(product) => product.quantity(order) != 0,
            OrderFilter::PlacedWithin(range) => range.contains(order.created_at),
        }
    }
}

/// A resolved analytics request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub product: ProductSelection,
    /// The date token as requested, echoed back in the report.
    pub date: String,
    pub range: Option<DateRange>,
    /// Offset used when bucketing orders by hour of day.
    pub utc_offset: FixedOffset,
}

impl AnalyticsQuery {
    pub fn filters(&self) -> Vec<OrderFilter> {
        let mut filters = Vec::with_capacity(2);
        if let ProductSelection::Only(product) = self.product {
            filters.push(OrderFilter::Contains(product));
        }
        if let Some(range) = self.range {
            filters.push(OrderFilter::PlacedWithin(range));
        }
        filters
    }
}

/// Raw aggregates over the filtered orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderTotals {
    pub total_orders: i64,
    pub product1_units: i64,
    pub product2_units: i64,
    pub revenue: BigDecimal,
    pub bad_debt_orders: i64,
    pub cashier_orders: i64,
}

impl OrderTotals {
    pub fn record(&mut self, order: &Order) {
        self.total_orders += 1;
        self.product1_units += i64::from(order.product1_quantity);
        self.product2_units += i64::from(order.product2_quantity);
        self.revenue += &order.total_price;
        if order.status == OrderStatus::BadDebt {
            self.bad_debt_orders += 1;
        }
        if order.is_cashier() {
            self.cashier_orders += 1;
        }
    }

    /// Orders that did not come through the cashier channel.
    pub fn mobile_orders(&self) -> i64 {
        self.total_orders - self.cashier_orders
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyCount {
    pub hour: u32,
    pub total_orders: i64,
}

/// Order counts per hour of day, ascending, omitting empty hours.
pub fn hourly_histogram<I>(timestamps: I, offset: FixedOffset) -> Vec<HourlyCount>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut buckets: BTreeMap<u32, i64> = BTreeMap::new();
    for at in timestamps {
        *buckets.entry(at.with_timezone(&offset).hour()).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(hour, total_orders)| HourlyCount { hour, total_orders })
        .collect()
}

/// What a storage backend returns for one analytics query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesSnapshot {
    pub totals: OrderTotals,
    pub hourly: Vec<HourlyCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub product: ProductSelection,
    pub date: String,
    pub total_orders: i64,
    pub total_sales: i64,
    pub total_revenue: BigDecimal,
    pub bad_debt_orders: i64,
    pub cashier_orders: i64,
    pub mobile_orders: i64,
    pub cashier_percentage: f64,
    pub mobile_percentage: f64,
    pub bad_debt_rate: f64,
    pub hourly: Vec<HourlyCount>,
}

impl SalesReport {
    pub fn new(query: &AnalyticsQuery, snapshot: SalesSnapshot) -> Self {
        let SalesSnapshot { totals, hourly } = snapshot;
        let total = totals.total_orders;
        let mobile_orders = totals.mobile_orders();
        Self {
            product: query.product,
            date: query.date.clone(),
            total_orders: total,
            total_sales: query
                .product
                .units(totals.product1_units, totals.product2_units),
            cashier_percentage: percentage(totals.cashier_orders, total),
            mobile_percentage: percentage(mobile_orders, total),
            bad_debt_rate: percentage(totals.bad_debt_orders, total),
            total_revenue: totals.revenue,
            bad_debt_orders: totals.bad_debt_orders,
            cashier_orders: totals.cashier_orders,
            mobile_orders,
            hourly,
        }
    }
}

/// `part / whole * 100`, defined as 0 for an empty population.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
