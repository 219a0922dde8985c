use std::collections::HashMap;

use crate::{FinancialYearTaxData, Schedule1FinancialYear, TaxError};

/// Read access to loaded tax data, keyed by financial year.
///
/// Data is loaded once and only read afterwards, so implementations are
/// shared freely between threads.
pub trait TaxRepository: Send + Sync {
    /// Band tables for `financial_year`.
    fn get_financial_year(
        &self,
        financial_year: &str,
    ) -> Result<&FinancialYearTaxData, TaxError>;

    /// Schedule 1 withholding scales for `financial_year`.
    fn get_schedule_1(
        &self,
        financial_year: &str,
    ) -> Result<&Schedule1FinancialYear, TaxError>;

    /// Every financial year with band tables or withholding scales, sorted.
    fn list_financial_years(&self) -> Vec<&str>;
}

/// A [`TaxRepository`] holding everything in memory.
///
/// Typical lifetime:
/// 1. Create with `InMemoryRepository::new()`.
/// 2. Call `insert_financial_year` / `insert_schedule_1` once per loaded year.
/// 3. Share `&InMemoryRepository` with as many calculators as needed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tax_years: HashMap<String, FinancialYearTaxData>,
    schedule_1: HashMap<String, Schedule1FinancialYear>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from loaded data in one step.
    pub fn from_parts(
        tax_years: Vec<FinancialYearTaxData>,
        schedule_1: Vec<Schedule1FinancialYear>,
    ) -> Result<Self, TaxError> {
        let mut repo = Self::new();
        for data in tax_years {
            repo.insert_financial_year(data)?;
        }
        for schedule in schedule_1 {
            repo.insert_schedule_1(schedule)?;
        }
        Ok(repo)
    }

    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if the year is already loaded.
    pub fn insert_financial_year(
        &mut self,
        data: FinancialYearTaxData,
    ) -> Result<(), TaxError> {
        if self.tax_years.contains_key(&data.financial_year) {
            return Err(TaxError::Configuration(format!(
                "tax rates for {} loaded twice",
                data.financial_year
            )));
        }
        self.tax_years.insert(data.financial_year.clone(), data);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if the year is already loaded.
    pub fn insert_schedule_1(
        &mut self,
        schedule: Schedule1FinancialYear,
    ) -> Result<(), TaxError> {
        if self.schedule_1.contains_key(&schedule.financial_year) {
            return Err(TaxError::Configuration(format!(
                "schedule 1 for {} loaded twice",
                schedule.financial_year
            )));
        }
        self.schedule_1
            .insert(schedule.financial_year.clone(), schedule);
        Ok(())
    }
}

impl TaxRepository for InMemoryRepository {
    fn get_financial_year(
        &self,
        financial_year: &str,
    ) -> Result<&FinancialYearTaxData, TaxError> {
        self.tax_years
            .get(financial_year)
            .ok_or_else(|| TaxError::FinancialYearNotFound(financial_year.to_string()))
    }

    fn get_schedule_1(
        &self,
        financial_year: &str,
    ) -> Result<&Schedule1FinancialYear, TaxError> {
        self.schedule_1
            .get(financial_year)
            .ok_or_else(|| TaxError::FinancialYearNotFound(financial_year.to_string()))
    }

    fn list_financial_years(&self) -> Vec<&str> {
        let mut years: Vec<&str> = self
            .tax_years
            .keys()
            .chain(self.schedule_1.keys())
            .map(String::as_str)
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}
