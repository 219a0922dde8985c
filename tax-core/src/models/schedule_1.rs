use serde::Serialize;

use super::WithholdingScale;
use crate::TaxError;

/// The Schedule 1 withholding scales in force for one financial year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule1FinancialYear {
    pub document: String,
    pub financial_year: String,
    pub same_as_other_financial_year: bool,
    pub financial_year_for_comparison: Option<String>,
    scales: Vec<WithholdingScale>,
}

impl Schedule1FinancialYear {
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if two scales share a name.
    pub fn new(
        document: impl Into<String>,
        financial_year: impl Into<String>,
        same_as_other_financial_year: bool,
        financial_year_for_comparison: Option<String>,
        scales: Vec<WithholdingScale>,
    ) -> Result<Self, TaxError> {
        let financial_year = financial_year.into();

        for (i, scale) in scales.iter().enumerate() {
            if scales[..i].iter().any(|s| s.name() == scale.name()) {
                return Err(TaxError::Configuration(format!(
                    "schedule 1 for {financial_year} defines scale '{}' twice",
                    scale.name()
                )));
            }
        }

        Ok(Self {
            document: document.into(),
            financial_year,
            same_as_other_financial_year,
            financial_year_for_comparison,
            scales,
        })
    }

    /// Scales in configured order; selection is first match wins.
    pub fn scales(&self) -> &[WithholdingScale] {
        &self.scales
    }

    pub fn scale(
        &self,
        name: &str,
    ) -> Option<&WithholdingScale> {
        self.scales.iter().find(|s| s.name() == name)
    }

    /// Replaces the scales with another year's, for years declared identical.
    pub fn inherit_scales(
        &mut self,
        scales: Vec<WithholdingScale>,
    ) {
        self.scales = scales;
    }
}
