//! Bill total computation and generation-eligibility checks.
//!
//! Charge amounts arrive as free-text form input, so parsing failures are a
//! normal case here: a malformed charge contributes zero to the total and
//! blocks generation, it never produces an error or a NaN-like value.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rentfolio_common::types::{BillingPeriod, TenantId};
use std::str::FromStr;

/// One additional-charge row as entered in the bill form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChargeInput {
    pub description: String,
    pub amount: String,
}

impl ChargeInput {
    pub fn new(description: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
        }
    }

    /// A charge is complete when both fields are filled in and the amount
    /// parses to a non-negative number. Only complete charges count toward
    /// the total or pass draft validation.
    pub fn is_complete(&self) -> bool {
        !self.description.trim().is_empty() && self.parsed_amount().is_some()
    }

    /// The parsed non-negative amount, if there is one.
    pub fn parsed_amount(&self) -> Option<Decimal> {
        Decimal::from_str(self.amount.trim())
            .ok()
            .filter(|amount| !amount.is_sign_negative())
    }

    fn contribution(&self) -> Decimal {
        if self.is_complete() {
            self.parsed_amount().unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

/// Total of a bill: base rent plus every complete additional charge.
///
/// Incomplete charges (empty description, unparsable or negative amount)
/// contribute exactly zero. The result is rounded to two decimal places.
pub fn compute_bill_total(rent_amount: Decimal, charges: &[ChargeInput]) -> Decimal {
    let additional: Decimal = charges.iter().map(ChargeInput::contribution).sum();
    (rent_amount + additional).round_dp(2)
}

/// An in-progress bill, before the backend has assigned it an identity.
#[derive(Debug, Clone, Default)]
pub struct BillDraft {
    pub tenant: Option<TenantId>,
    pub period: Option<BillingPeriod>,
    pub due_date: Option<NaiveDate>,
    pub rent_amount: Decimal,
    pub charges: Vec<ChargeInput>,
}

impl BillDraft {
    /// Eligible for generation: tenant, period and due date chosen, rent
    /// positive, and no charge row left half-filled.
    pub fn is_complete(&self) -> bool {
        self.tenant.is_some()
            && self.period.is_some()
            && self.due_date.is_some()
            && self.rent_amount > Decimal::ZERO
            && self.charges.iter().all(ChargeInput::is_complete)
    }

    pub fn total(&self) -> Decimal {
        compute_bill_total(self.rent_amount, &self.charges)
    }
}

/// Client-side preview bill number, e.g. `BILL-1724800000000-042`.
///
/// Advisory only: the backend remains the authority and overwrites this on
/// creation.
pub fn generate_bill_number(now_millis: u64, sequence: u32) -> String {
    format!("BILL-{}-{:03}", now_millis, sequence % 1000)
}
