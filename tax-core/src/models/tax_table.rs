use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxBand;
use crate::TaxError;

/// Which obligation a [`TaxTable`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxCategory {
    IncomeTax,
    MedicareLevy,
    MedicareLevySurcharge,
    Hecs,
}

impl TaxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncomeTax => "income_tax",
            Self::MedicareLevy => "medicare_levy",
            Self::MedicareLevySurcharge => "medicare_levy_surcharge",
            Self::Hecs => "hecs",
        }
    }
}

impl fmt::Display for TaxCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, ordered set of bands for one category in one financial year.
///
/// Band order is the order the configuration defined them in, which is the
/// order [`find_containing_band`](crate::calculations::find_containing_band)
/// searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxTable {
    financial_year: String,
    category: TaxCategory,
    bands: Vec<TaxBand>,
}

impl TaxTable {
    /// Builds a table after checking the bands are usable.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if:
    /// - no bands are given
    /// - a band has a negative minimum, a maximum below its minimum, or a
    ///   rate outside `[0, 1]`
    /// - two bands overlap once sorted by minimum income
    /// - two bands share a name
    pub fn new(
        financial_year: impl Into<String>,
        category: TaxCategory,
        bands: Vec<TaxBand>,
    ) -> Result<Self, TaxError> {
        let financial_year = financial_year.into();
        let context = format!("{category} table for {financial_year}");

        if bands.is_empty() {
            return Err(TaxError::Configuration(format!("{context} has no bands")));
        }

        for band in &bands {
            if band.min_income < Decimal::ZERO {
                return Err(TaxError::Configuration(format!(
                    "{context}: band '{}' has negative min_income {}",
                    band.name, band.min_income
                )));
            }
            if let Some(max) = band.max_income
                && max < band.min_income
            {
                return Err(TaxError::Configuration(format!(
                    "{context}: band '{}' has max_income {} below min_income {}",
                    band.name, max, band.min_income
                )));
            }
            if band.tax_rate < Decimal::ZERO || band.tax_rate > Decimal::ONE {
                return Err(TaxError::Configuration(format!(
                    "{context}: band '{}' has rate {} outside [0, 1]",
                    band.name, band.tax_rate
                )));
            }
            if bands.iter().filter(|b| b.name == band.name).count() > 1 {
                return Err(TaxError::Configuration(format!(
                    "{context}: duplicate band name '{}'",
                    band.name
                )));
            }
        }

        let mut sorted: Vec<&TaxBand> = bands.iter().collect();
        sorted.sort_by_key(|b| b.min_income);
        for pair in sorted.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            let overlaps = lower
                .max_income
                .is_none_or(|max| max >= upper.min_income);
            if overlaps {
                return Err(TaxError::Configuration(format!(
                    "{context}: band '{}' overlaps band '{}'",
                    lower.name, upper.name
                )));
            }
        }

        Ok(Self {
            financial_year,
            category,
            bands,
        })
    }

    pub fn financial_year(&self) -> &str {
        &self.financial_year
    }

    pub fn category(&self) -> TaxCategory {
        self.category
    }

    /// Bands in their configured order.
    pub fn bands(&self) -> &[TaxBand] {
        &self.bands
    }

    pub fn band(
        &self,
        name: &str,
    ) -> Option<&TaxBand> {
        self.bands.iter().find(|b| b.name == name)
    }

    /// Whether the highest band is open-ended, so every non-negative
    /// income above the lowest minimum has a band.
    pub fn has_open_top_band(&self) -> bool {
        self.bands.iter().any(|b| b.max_income.is_none())
    }
}
