//! EMI (equated monthly installment) derivation.
//!
//! A financed checkout adds a flat 5% surcharge to the final price, then
//! splits it evenly across the installment count. Each installment is
//! rounded half-up independently; there is no remainder redistribution, so
//! the total collected may drift from `final_price * 1.05` by rounding
//! error. That drift is accepted.

use serde::{Deserialize, Serialize};

use mentora_core::{Amount, DomainError, DomainResult};

use crate::money::round_half_up_ratio;

/// Financing surcharge: 5%, expressed as a ratio over 100.
const SURCHARGE_NUMERATOR: Amount = 105;
const SURCHARGE_DENOMINATOR: Amount = 100;

/// Supported installment terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentTerm {
    ThreeMonths,
    SixMonths,
}

impl InstallmentTerm {
    pub fn months(self) -> u32 {
        match self {
            InstallmentTerm::ThreeMonths => 3,
            InstallmentTerm::SixMonths => 6,
        }
    }

    pub fn from_months(months: u32) -> DomainResult<Self> {
        match months {
            3 => Ok(InstallmentTerm::ThreeMonths),
            6 => Ok(InstallmentTerm::SixMonths),
            other => Err(DomainError::validation(format!(
                "unsupported installment term: {other} months (expected 3 or 6)"
            ))),
        }
    }
}

/// A derived installment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmiQuote {
    pub term: InstallmentTerm,
    /// Amount of each installment, rounded half-up independently.
    pub per_installment: Amount,
    /// What the installments actually add up to (`per_installment * months`).
    pub total_payable: Amount,
}

impl EmiQuote {
    /// Derive the schedule for `final_price` (post-discount) over `term`.
    pub fn new(final_price: Amount, term: InstallmentTerm) -> Self {
        let months = Amount::from(term.months());
        let per_installment = round_half_up_ratio(
            final_price * SURCHARGE_NUMERATOR,
            SURCHARGE_DENOMINATOR * months,
        );
        Self {
            term,
            per_installment,
            total_payable: per_installment * months,
        }
    }
}
