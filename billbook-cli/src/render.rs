//! Plain-text rendering of orders

use std::fmt;

use chrono::DateTime;
use shared::money::format_amount;
use shared::{BillMode, OrderAggregate, OrderStats};

fn format_date(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn status_label(order: &OrderAggregate) -> &'static str {
    match order.bill_mode() {
        BillMode::Half => "half bill",
        BillMode::Full => order.payment_status().as_str(),
    }
}

/// Directory table, one row per order
pub struct OrderTable<'a>(pub &'a [&'a OrderAggregate]);

impl fmt::Display for OrderTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No orders found.");
        }

        writeln!(
            f,
            "{:<10} {:<16} {:<24} {:>5} {:>12} {:>12} {:>12}  {}",
            "ID", "DATE", "CLIENT", "ITEMS", "TOTAL", "PAID", "BALANCE", "STATUS"
        )?;
        for order in self.0 {
            writeln!(
                f,
                "{:<10} {:<16} {:<24} {:>5} {:>12} {:>12} {:>12}  {}",
                order.id().unwrap_or("-"),
                format_date(order.timestamp()),
                order.display_name(),
                order.products().len(),
                format_amount(order.grand_total()),
                format_amount(order.amount_paid()),
                format_amount(order.display_balance_due()),
                status_label(order),
            )?;
        }
        Ok(())
    }
}

/// One order with its line items
pub struct OrderDetail<'a>(pub &'a OrderAggregate);

impl fmt::Display for OrderDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.0;
        writeln!(f, "Order {}  {}", order.id().unwrap_or("(draft)"), format_date(order.timestamp()))?;
        writeln!(f, "Client: {}", order.display_name())?;
        writeln!(f, "Bill:   {}", order.bill_mode().as_str())?;
        writeln!(f)?;
        writeln!(f, "{:>3}  {:<24} {:>8} {:>10} {:>12}", "#", "PRODUCT", "QTY", "PRICE", "TOTAL")?;
        for item in order.products() {
            writeln!(
                f,
                "{:>3}  {:<24} {:>8} {:>10} {:>12}",
                item.id(),
                item.name(),
                item.count().map(|c| c.to_string()).unwrap_or_default(),
                item.price().map(format_amount).unwrap_or_default(),
                format_amount(item.total()),
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Grand total: {}", format_amount(order.grand_total()))?;
        if order.bill_mode().tracks_payment() {
            writeln!(f, "Paid:        {}", format_amount(order.amount_paid()))?;
            writeln!(f, "Balance:     {}", format_amount(order.display_balance_due()))?;
        }
        writeln!(f, "Status:      {}", status_label(order))
    }
}

/// Totals across the collection
pub struct StatsView<'a>(pub &'a OrderStats);

impl fmt::Display for StatsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "Orders:      {}", stats.count)?;
        writeln!(f, "Grand total: {}", format_amount(stats.total_grand_amount))?;
        writeln!(f, "Received:    {}", format_amount(stats.total_received))?;
        writeln!(f, "Pending:     {}", format_amount(stats.total_pending))
    }
}
