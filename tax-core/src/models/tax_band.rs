use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single progressive band: every income in `[min_income, max_income]`
/// is taxed at `tax_rate`.
///
/// Bounds are inclusive whole-dollar values. `max_income` of `None` marks
/// the open-ended top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBand {
    pub name: String,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBand {
    pub fn new(
        name: impl Into<String>,
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Whether `income` falls inside this band (both bounds inclusive).
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min_income && self.max_income.is_none_or(|max| income <= max)
    }

    /// Whether the whole band sits strictly below `income`.
    pub fn is_below(
        &self,
        income: Decimal,
    ) -> bool {
        self.max_income.is_some_and(|max| max < income)
    }

    /// Taxable width of a bounded band, `max - min + 1`.
    ///
    /// Returns `None` for the open-ended top band.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income
            .map(|max| max + Decimal::ONE - self.min_income)
    }

    /// Tax owed on the full width of a bounded band.
    pub fn full_band_tax(&self) -> Option<Decimal> {
        self.width().map(|width| width * self.tax_rate)
    }
}
