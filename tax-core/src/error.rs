use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::EligibilityProfile;

/// Errors produced by the calculation core.
///
/// Every calculation is a pure function over loaded tables, so these are
/// returned to the caller as-is; nothing in the core retries or substitutes
/// a default value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    /// Band or scale data is malformed or incomplete.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No data is loaded for the requested financial year.
    #[error("financial year '{0}' not found")]
    FinancialYearNotFound(String),

    /// The individual's eligibility profile matches none of the withholding scales.
    #[error("no withholding scale matches profile {profile}")]
    NoMatchingScale { profile: EligibilityProfile },

    /// A caller-supplied value is out of range or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TaxError {
    pub(crate) fn negative_amount(
        what: &str,
        value: Decimal,
    ) -> Self {
        TaxError::InvalidInput(format!("{what} must not be negative, got {value}"))
    }
}
