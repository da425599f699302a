//! Order aggregate: line items plus client and payment metadata
//!
//! All derived fields (`total` per line, `grandTotal`, and the payment
//! status implied by an entered amount) are recomputed inside the mutation
//! methods. There is no public setter for any of them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{self, BillMode, PaymentStatus};
use super::wire::{deserialize_amount, deserialize_record_id};
use super::{LineItem, LineItemField, OrderError};
use crate::money::{MAX_AMOUNT_PAID, checked_sum, require_amount, to_decimal, to_decimal_or_zero, to_f64};
use crate::util::now_millis;

/// Display fallback for orders without a client name
pub const UNNAMED_CLIENT: &str = "Unnamed Client";

/// Full record for one client transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "OrderRecord")]
pub struct OrderAggregate {
    /// Assigned by the record store on creation
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    client_name: String,
    products: Vec<LineItem>,
    grand_total: f64,
    /// `None` until an amount is entered
    amount_paid: Option<f64>,
    payment_status: PaymentStatus,
    bill_mode: BillMode,
    /// Creation time in epoch milliseconds, never changed afterwards
    timestamp: i64,
}

impl OrderAggregate {
    /// New local draft with one empty line item
    pub fn draft(client_name: impl Into<String>) -> Self {
        Self {
            id: None,
            client_name: client_name.into(),
            products: vec![LineItem::new(1)],
            grand_total: 0.0,
            amount_paid: None,
            payment_status: PaymentStatus::Pending,
            bill_mode: BillMode::Full,
            timestamp: now_millis(),
        }
    }

    pub fn builder(client_name: impl Into<String>) -> OrderBuilder {
        OrderBuilder::new(client_name)
    }

    // ========== Accessors ==========

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Client name, or "Unnamed Client" when empty
    pub fn display_name(&self) -> &str {
        if self.client_name.trim().is_empty() {
            UNNAMED_CLIENT
        } else {
            &self.client_name
        }
    }

    pub fn products(&self) -> &[LineItem] {
        &self.products
    }

    pub fn line_item(&self, id: u32) -> Option<&LineItem> {
        self.products.iter().find(|p| p.id() == id)
    }

    pub fn grand_total(&self) -> f64 {
        self.grand_total
    }

    /// Amount as entered, `None` if never entered
    pub fn amount_paid_entered(&self) -> Option<f64> {
        self.amount_paid
    }

    /// Amount counted towards payment: zero for half-bill orders
    pub fn amount_paid(&self) -> f64 {
        if self.bill_mode.tracks_payment() {
            self.amount_paid.unwrap_or(0.0)
        } else {
            0.0
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn bill_mode(&self) -> BillMode {
        self.bill_mode
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Grand total minus amount paid. May be negative while editing.
    pub fn balance_due(&self) -> f64 {
        to_f64(self.balance_due_decimal())
    }

    /// Balance due clamped to zero, for display
    pub fn display_balance_due(&self) -> f64 {
        to_f64(self.balance_due_decimal().max(Decimal::ZERO))
    }

    pub(crate) fn balance_due_decimal(&self) -> Decimal {
        to_decimal(self.grand_total).saturating_sub(to_decimal(self.amount_paid()))
    }

    // ========== Line items ==========

    /// Append an empty line item and return its id
    ///
    /// Ids are `max(existing) + 1`, so gaps left by removals are never reused.
    /// The new item is empty, so totals and status are unchanged.
    pub fn add_line_item(&mut self) -> u32 {
        let id = self.products.iter().map(LineItem::id).max().unwrap_or(0) + 1;
        self.products.push(LineItem::new(id));
        id
    }

    /// Remove a line item. An order always keeps at least one item, so this
    /// is a no-op on a single-item order. Returns whether anything was removed.
    pub fn remove_line_item(&mut self, id: u32) -> Result<bool, OrderError> {
        if self.products.len() <= 1 {
            return Ok(false);
        }
        let Some(idx) = self.products.iter().position(|p| p.id() == id) else {
            return Ok(false);
        };
        let removed = self.products.remove(idx);
        match sum_line_totals(&self.products) {
            Ok(total) => {
                self.apply_grand_total(total);
                Ok(true)
            }
            Err(e) => {
                self.products.insert(idx, removed);
                Err(e)
            }
        }
    }

    /// Edit one field of a line item. A rejected edit changes nothing.
    pub fn update_line_item(&mut self, id: u32, field: LineItemField) -> Result<(), OrderError> {
        let idx = self
            .products
            .iter()
            .position(|p| p.id() == id)
            .ok_or(OrderError::LineItemNotFound(id))?;
        let mut edited = self.products[idx].clone();
        edited.apply(field)?;
        let previous = std::mem::replace(&mut self.products[idx], edited);
        match sum_line_totals(&self.products) {
            Ok(total) => {
                self.apply_grand_total(total);
                Ok(())
            }
            Err(e) => {
                self.products[idx] = previous;
                Err(e)
            }
        }
    }

    // ========== Metadata ==========

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        self.client_name = name.into();
    }

    pub fn set_bill_mode(&mut self, mode: BillMode) {
        self.bill_mode = mode;
        self.rederive_status();
    }

    /// Enter the amount paid; the payment status follows it.
    pub fn set_amount_paid(&mut self, amount: Option<f64>) -> Result<(), OrderError> {
        self.amount_paid = amount
            .map(|v| require_amount(v, "amountPaid", MAX_AMOUNT_PAID))
            .transpose()?;
        self.payment_status = PaymentStatus::Pending;
        self.rederive_status();
        Ok(())
    }

    /// Mark the order fully paid: status cleared and amount paid set to the
    /// grand total, together.
    pub fn clear_payment(&mut self) -> Result<(), OrderError> {
        let total = sum_line_totals(&self.products)?;
        require_amount(to_f64(total), "amountPaid", MAX_AMOUNT_PAID)?;
        let (status, amount) = payment::clear(total);
        self.grand_total = to_f64(total);
        self.payment_status = status;
        self.amount_paid = Some(to_f64(amount));
        Ok(())
    }

    /// The exact record to send to the store.
    ///
    /// Grand total is recomputed and an unset amount becomes 0. The status is
    /// then settled against that amount, so a full-bill record paid in full
    /// (including a zero-total one) goes out cleared. Half-bill orders are
    /// normalized to pending with nothing paid.
    pub fn persistable(&self) -> Result<OrderAggregate, OrderError> {
        let mut record = self.clone();
        let total = sum_line_totals(&record.products)?;
        let (status, amount) = payment::normalize_for_persist(
            record.bill_mode,
            record.payment_status,
            to_decimal_or_zero(record.amount_paid),
            total,
        );
        record.grand_total = to_f64(total);
        record.payment_status = status;
        record.amount_paid = Some(to_f64(amount));
        Ok(record)
    }

    fn apply_grand_total(&mut self, total: Decimal) {
        self.grand_total = to_f64(total);
        self.rederive_status();
    }

    /// Re-evaluate the status if an amount has been entered
    fn rederive_status(&mut self) {
        if let Some(paid) = self.amount_paid {
            self.payment_status =
                payment::derive_status(self.bill_mode, to_decimal(paid), to_decimal(self.grand_total));
        }
    }
}

/// Sum of line totals, checked for overflow
fn sum_line_totals(products: &[LineItem]) -> Result<Decimal, OrderError> {
    checked_sum(products.iter().map(|p| to_decimal(p.total())), "grandTotal")
}

/// Builder for orders seeded with known values (tests, imports, CLI)
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    id: Option<String>,
    client_name: String,
    lines: Vec<(String, Option<f64>, Option<f64>)>,
    bill_mode: BillMode,
    amount_paid: Option<f64>,
    payment_status: PaymentStatus,
    timestamp: Option<i64>,
}

impl OrderBuilder {
    fn new(client_name: impl Into<String>) -> Self {
        Self {
            id: None,
            client_name: client_name.into(),
            lines: Vec::new(),
            bill_mode: BillMode::Full,
            amount_paid: None,
            payment_status: PaymentStatus::Pending,
            timestamp: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn line(mut self, name: impl Into<String>, count: f64, price: f64) -> Self {
        self.lines.push((name.into(), Some(count), Some(price)));
        self
    }

    pub fn bill_mode(mut self, mode: BillMode) -> Self {
        self.bill_mode = mode;
        self
    }

    pub fn amount_paid(mut self, amount: f64) -> Self {
        self.amount_paid = Some(amount);
        self
    }

    /// Stored status for records loaded as-is; an entered amount overrides it
    pub fn payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the order. Line ids are assigned 1..=n; an order without lines
    /// gets one empty line item.
    pub fn build(self) -> Result<OrderAggregate, OrderError> {
        let mut products = Vec::with_capacity(self.lines.len().max(1));
        for (idx, (name, count, price)) in self.lines.into_iter().enumerate() {
            products.push(LineItem::with_values(idx as u32 + 1, name, count, price)?);
        }
        if products.is_empty() {
            products.push(LineItem::new(1));
        }
        let total = sum_line_totals(&products)?;

        let mut order = OrderAggregate {
            id: self.id,
            client_name: self.client_name,
            products,
            grand_total: to_f64(total),
            amount_paid: None,
            payment_status: self.payment_status,
            bill_mode: self.bill_mode,
            timestamp: self.timestamp.unwrap_or_else(now_millis),
        };
        if self.amount_paid.is_some() {
            order.set_amount_paid(self.amount_paid)?;
        }
        Ok(order)
    }
}

/// Wire shape accepted on decode
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRecord {
    #[serde(default, deserialize_with = "deserialize_record_id")]
    id: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    products: Option<Vec<LineItem>>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    amount_paid: Option<f64>,
    #[serde(default)]
    payment_status: Option<PaymentStatus>,
    #[serde(default)]
    bill_mode: Option<BillMode>,
    #[serde(default)]
    timestamp: i64,
}

impl TryFrom<OrderRecord> for OrderAggregate {
    type Error = OrderError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        let amount_paid = record
            .amount_paid
            .map(|v| require_amount(v, "amountPaid", MAX_AMOUNT_PAID))
            .transpose()?;
        let products = record.products.unwrap_or_default();
        // Stored grand totals are never trusted
        let total = sum_line_totals(&products)?;

        let mut order = OrderAggregate {
            id: record.id,
            client_name: record.client_name.unwrap_or_default(),
            products,
            grand_total: to_f64(total),
            amount_paid,
            payment_status: record.payment_status.unwrap_or_default(),
            bill_mode: record.bill_mode.unwrap_or_default(),
            timestamp: record.timestamp,
        };
        // A fully paid full-bill record is cleared even if an older client
        // forgot to flip the status. Same rule as `persistable`.
        if let Some(paid) = order.amount_paid {
            let settled = payment::settle(order.bill_mode, order.payment_status, to_decimal(paid), total);
            if settled != order.payment_status {
                tracing::debug!(id = ?order.id, paid, "Fully paid record decoded as pending, marking cleared");
                order.payment_status = settled;
            }
        }
        Ok(order)
    }
}
