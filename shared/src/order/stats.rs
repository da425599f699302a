//! Directory-view helpers over a fetched order collection
//!
//! Pure functions: nothing here mutates the collection it is given.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderAggregate;
use crate::money::{to_decimal, to_f64};

/// Sums across every order in a collection
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub count: usize,
    pub total_grand_amount: f64,
    pub total_received: f64,
    /// Sum of positive balances only; overpaid orders contribute zero
    pub total_pending: f64,
}

/// Status filter of the directory view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Cleared,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Cleared => "cleared",
        }
    }

    pub fn matches(&self, order: &OrderAggregate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !order.payment_status().is_cleared(),
            StatusFilter::Cleared => order.payment_status().is_cleared(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "cleared" => Ok(StatusFilter::Cleared),
            other => Err(format!("unknown status filter: {}", other)),
        }
    }
}

pub fn aggregate_stats(orders: &[OrderAggregate]) -> OrderStats {
    let mut grand = Decimal::ZERO;
    let mut received = Decimal::ZERO;
    let mut pending = Decimal::ZERO;

    for order in orders {
        grand = grand.saturating_add(to_decimal(order.grand_total()));
        received = received.saturating_add(to_decimal(order.amount_paid()));
        pending = pending.saturating_add(order.balance_due_decimal().max(Decimal::ZERO));
    }

    OrderStats {
        count: orders.len(),
        total_grand_amount: to_f64(grand),
        total_received: to_f64(received),
        total_pending: to_f64(pending),
    }
}

pub fn filter_by_status(orders: &[OrderAggregate], filter: StatusFilter) -> Vec<&OrderAggregate> {
    orders.iter().filter(|o| filter.matches(o)).collect()
}

/// Newest first, by creation timestamp
pub fn sort_newest_first(orders: &mut [OrderAggregate]) {
    orders.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}
