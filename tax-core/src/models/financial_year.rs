use serde::Serialize;

use super::{TaxCategory, TaxTable};
use crate::TaxError;

/// All band tables for one financial year, e.g. `"2022-2023"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialYearTaxData {
    pub financial_year: String,
    pub income_tax_bands: TaxTable,
    pub medicare_levy: TaxTable,
    pub medicare_levy_surcharge: TaxTable,
    pub hecs: TaxTable,
}

impl FinancialYearTaxData {
    /// Groups the four tables, checking each is tagged with the right
    /// category and year.
    pub fn new(
        financial_year: impl Into<String>,
        income_tax_bands: TaxTable,
        medicare_levy: TaxTable,
        medicare_levy_surcharge: TaxTable,
        hecs: TaxTable,
    ) -> Result<Self, TaxError> {
        let data = Self {
            financial_year: financial_year.into(),
            income_tax_bands,
            medicare_levy,
            medicare_levy_surcharge,
            hecs,
        };

        for category in [
            TaxCategory::IncomeTax,
            TaxCategory::MedicareLevy,
            TaxCategory::MedicareLevySurcharge,
            TaxCategory::Hecs,
        ] {
            let table = data.table(category);
            if table.category() != category {
                return Err(TaxError::Configuration(format!(
                    "{} slot for {} holds a {} table",
                    category,
                    data.financial_year,
                    table.category()
                )));
            }
            if table.financial_year() != data.financial_year {
                return Err(TaxError::Configuration(format!(
                    "{} table is for {} but was filed under {}",
                    category,
                    table.financial_year(),
                    data.financial_year
                )));
            }
        }

        Ok(data)
    }

    pub fn table(
        &self,
        category: TaxCategory,
    ) -> &TaxTable {
        match category {
            TaxCategory::IncomeTax => &self.income_tax_bands,
            TaxCategory::MedicareLevy => &self.medicare_levy,
            TaxCategory::MedicareLevySurcharge => &self.medicare_levy_surcharge,
            TaxCategory::Hecs => &self.hecs,
        }
    }
}
