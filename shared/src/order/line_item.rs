//! Line item: one product entry of an order

use serde::{Deserialize, Serialize};

use super::OrderError;
use super::wire::deserialize_amount;
use crate::money::{MAX_COUNT, MAX_PRICE, checked_decimal, checked_mul, require_amount, to_f64};

/// A single product entry (name, quantity, unit price, line total).
///
/// `count` and `price` stay `None` until first entered. `total` is always
/// `count * price` with unset values counted as zero; it is stored so it can
/// be persisted and redisplayed, and no setter exists for it.
///
/// Count and price are bounded by [`MAX_COUNT`] and [`MAX_PRICE`], on edit
/// and on decode alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord")]
pub struct LineItem {
    id: u32,
    name: String,
    count: Option<f64>,
    price: Option<f64>,
    total: f64,
}

/// One editable field of a line item
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemField {
    Name(String),
    Count(Option<f64>),
    Price(Option<f64>),
}

impl LineItem {
    /// Empty line item, as appended by "add product"
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            count: None,
            price: None,
            total: 0.0,
        }
    }

    /// Line item seeded with values; the total is computed here
    pub fn with_values(
        id: u32,
        name: impl Into<String>,
        count: Option<f64>,
        price: Option<f64>,
    ) -> Result<Self, OrderError> {
        let count = validate_count(count)?;
        let price = validate_price(price)?;
        Ok(Self {
            id,
            name: name.into(),
            count,
            price,
            total: line_total(count, price)?,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> Option<f64> {
        self.count
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Apply one field edit. Editing count or price recomputes the total
    /// from the other field's current value. A rejected edit leaves the item
    /// untouched.
    pub fn apply(&mut self, field: LineItemField) -> Result<(), OrderError> {
        match field {
            LineItemField::Name(name) => self.name = name,
            LineItemField::Count(count) => {
                let count = validate_count(count)?;
                self.total = line_total(count, self.price)?;
                self.count = count;
            }
            LineItemField::Price(price) => {
                let price = validate_price(price)?;
                self.total = line_total(self.count, price)?;
                self.price = price;
            }
        }
        Ok(())
    }
}

fn validate_count(count: Option<f64>) -> Result<Option<f64>, OrderError> {
    count.map(|v| require_amount(v, "count", MAX_COUNT)).transpose()
}

fn validate_price(price: Option<f64>) -> Result<Option<f64>, OrderError> {
    price.map(|v| require_amount(v, "price", MAX_PRICE)).transpose()
}

/// `count * price` with unset values counted as zero
fn line_total(count: Option<f64>, price: Option<f64>) -> Result<f64, OrderError> {
    let count = count.map(|v| checked_decimal(v, "count")).transpose()?.unwrap_or_default();
    let price = price.map(|v| checked_decimal(v, "price")).transpose()?.unwrap_or_default();
    checked_mul(count, price, "total").map(to_f64)
}

/// Wire shape accepted on decode; any stored `total` is ignored
#[derive(Deserialize)]
struct LineItemRecord {
    id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    count: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    price: Option<f64>,
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = OrderError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        LineItem::with_values(
            record.id,
            record.name.unwrap_or_default(),
            record.count,
            record.price,
        )
    }
}
