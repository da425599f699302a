//! Payment status policy
//!
//! Pure rules deciding the payment state of an order from the amount paid
//! and the grand total. Nothing here touches an order directly; the
//! aggregate calls into these functions whenever a relevant field changes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment state of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Cleared,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Cleared => "cleared",
        }
    }

    pub fn is_cleared(&self) -> bool {
        matches!(self, PaymentStatus::Cleared)
    }
}

/// Whether an order tracks payment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillMode {
    /// Payment is tracked
    #[default]
    Full,
    /// Payment is not tracked; amount paid is always 0
    Half,
}

impl BillMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillMode::Full => "full",
            BillMode::Half => "half",
        }
    }

    pub fn tracks_payment(&self) -> bool {
        matches!(self, BillMode::Full)
    }
}

/// Status implied by an entered amount.
///
/// Re-evaluated on every edit, so lowering the amount below the total moves
/// a cleared order back to pending.
pub fn derive_status(bill_mode: BillMode, amount_paid: Decimal, grand_total: Decimal) -> PaymentStatus {
    if bill_mode.tracks_payment() && amount_paid >= grand_total {
        PaymentStatus::Cleared
    } else {
        PaymentStatus::Pending
    }
}

/// Fields written by the explicit clear-payment action.
///
/// Clearing always means fully paid: the amount is forced to the grand total
/// and both fields go out in the same write.
pub fn clear(grand_total: Decimal) -> (PaymentStatus, Decimal) {
    (PaymentStatus::Cleared, grand_total)
}

/// Status a stored record carries.
///
/// A full-bill record paid in full is cleared whatever status it was written
/// with. Anything else keeps its status, so a cleared order is only moved
/// back to pending by editing the amount.
pub fn settle(
    bill_mode: BillMode,
    status: PaymentStatus,
    amount_paid: Decimal,
    grand_total: Decimal,
) -> PaymentStatus {
    if derive_status(bill_mode, amount_paid, grand_total).is_cleared() {
        PaymentStatus::Cleared
    } else {
        status
    }
}

/// Payment fields as they must be persisted.
///
/// Half-bill orders never carry payment data, whatever the form held.
/// Full-bill orders are settled against the grand total.
pub fn normalize_for_persist(
    bill_mode: BillMode,
    status: PaymentStatus,
    amount_paid: Decimal,
    grand_total: Decimal,
) -> (PaymentStatus, Decimal) {
    match bill_mode {
        BillMode::Full => (settle(bill_mode, status, amount_paid, grand_total), amount_paid),
        BillMode::Half => (PaymentStatus::Pending, Decimal::ZERO),
    }
}
