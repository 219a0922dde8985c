//! Per-financial-year entry points over a [`TaxRepository`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::TaxRepository;
use crate::calculations::{
    self, FlatRateResult, IncomeTaxResult, WithholdingSummary, calculate_withholding,
    normalize_to_weekly, select_scale, weekly_to_period,
};
use crate::{IndividualProfile, PayPeriod, TaxError};

/// An individual's annual liability for one financial year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAssessment {
    pub financial_year: String,
    pub taxable_income: Decimal,
    pub income_tax: IncomeTaxResult,
    pub medicare_levy: FlatRateResult,
    /// Only charged when the individual has no private health cover.
    pub medicare_levy_surcharge: Option<FlatRateResult>,
    /// Only charged when the individual has a HECS debt.
    pub hecs: Option<FlatRateResult>,
    pub total_tax: Decimal,
}

/// Looks up the tables for a financial year and runs the calculations.
///
/// The calculator borrows both the repository and every individual it is
/// given; it keeps no state between calls.
#[derive(Clone, Copy)]
pub struct TaxCalculator<'a> {
    repository: &'a dyn TaxRepository,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(repository: &'a dyn TaxRepository) -> Self {
        Self { repository }
    }

    /// Progressive income tax on `taxable_income`.
    ///
    /// # Errors
    ///
    /// [`TaxError::FinancialYearNotFound`] for an unknown year, otherwise
    /// as [`calculations::compute_income_tax`].
    pub fn compute_income_tax(
        &self,
        financial_year: &str,
        taxable_income: Decimal,
    ) -> Result<IncomeTaxResult, TaxError> {
        let data = self.repository.get_financial_year(financial_year)?;
        calculations::compute_income_tax(&data.income_tax_bands, taxable_income)
    }

    pub fn compute_medicare_levy(
        &self,
        financial_year: &str,
        taxable_income: Decimal,
    ) -> Result<FlatRateResult, TaxError> {
        let data = self.repository.get_financial_year(financial_year)?;
        calculations::compute_medicare_levy(&data.medicare_levy, taxable_income)
    }

    pub fn compute_medicare_levy_surcharge(
        &self,
        financial_year: &str,
        taxable_income: Decimal,
    ) -> Result<FlatRateResult, TaxError> {
        let data = self.repository.get_financial_year(financial_year)?;
        calculations::compute_medicare_levy_surcharge(&data.medicare_levy_surcharge, taxable_income)
    }

    pub fn compute_hecs(
        &self,
        financial_year: &str,
        assessable_income: Decimal,
    ) -> Result<FlatRateResult, TaxError> {
        let data = self.repository.get_financial_year(financial_year)?;
        calculations::compute_hecs(&data.hecs, assessable_income)
    }

    /// Annual liability for `individual`, treating salary as both taxable
    /// and assessable income. Taxable income is the salary without cents.
    ///
    /// Income tax and the Medicare levy always apply. The surcharge is
    /// added when the individual has no private health cover, and HECS
    /// when they carry a HECS debt.
    pub fn assess(
        &self,
        individual: &IndividualProfile,
        financial_year: &str,
    ) -> Result<TaxAssessment, TaxError> {
        let data = self.repository.get_financial_year(financial_year)?;
        let income = individual.salary().trunc();

        let income_tax = calculations::compute_income_tax(&data.income_tax_bands, income)?;
        let medicare_levy = calculations::compute_medicare_levy(&data.medicare_levy, income)?;

        let medicare_levy_surcharge = if individual.has_private_health() {
            None
        } else {
            Some(calculations::compute_medicare_levy_surcharge(
                &data.medicare_levy_surcharge,
                income,
            )?)
        };

        let hecs = if individual.has_hecs() {
            Some(calculations::compute_hecs(&data.hecs, income)?)
        } else {
            None
        };

        let total_tax = income_tax.total_tax
            + medicare_levy.amount
            + medicare_levy_surcharge
                .as_ref()
                .map_or(Decimal::ZERO, |s| s.amount)
            + hecs.as_ref().map_or(Decimal::ZERO, |h| h.amount);

        info!(
            individual = individual.name.as_str(),
            financial_year,
            income = %income,
            total_tax = %total_tax,
            "assessed annual tax"
        );

        Ok(TaxAssessment {
            financial_year: financial_year.to_string(),
            taxable_income: income,
            income_tax,
            medicare_levy,
            medicare_levy_surcharge,
            hecs,
            total_tax,
        })
    }

    /// PAYG withholding on `individual`'s annual salary, expressed per
    /// week and over the other pay periods.
    ///
    /// # Errors
    ///
    /// - [`TaxError::FinancialYearNotFound`] if no Schedule 1 data is loaded
    ///   for the year.
    /// - [`TaxError::NoMatchingScale`] if the individual's profile matches
    ///   no scale.
    /// - [`TaxError::Configuration`] if the chosen scale has no threshold
    ///   above the weekly earnings.
    pub fn compute_total_withheld(
        &self,
        individual: &IndividualProfile,
        financial_year: &str,
    ) -> Result<WithholdingSummary, TaxError> {
        let schedule = self.repository.get_schedule_1(financial_year)?;
        let scale = select_scale(schedule.scales(), &individual.eligibility_profile())?;
        let weekly_earnings =
            normalize_to_weekly(individual.salary(), PayPeriod::Annual, Decimal::ZERO)?;
        let weekly = calculate_withholding(scale, weekly_earnings)?;

        info!(
            individual = individual.name.as_str(),
            financial_year,
            scale = scale.name(),
            weekly_earnings = %weekly_earnings,
            weekly = %weekly,
            "calculated withholding"
        );

        Ok(WithholdingSummary::from_weekly(
            financial_year,
            scale.name(),
            weekly_earnings,
            weekly,
        ))
    }

    /// Withholding on a single payment of `amount` made every `period`,
    /// returned as the amount to withhold from that payment. `allowances`
    /// only count for monthly, quarterly and annual payments.
    pub fn withholding_for_period(
        &self,
        individual: &IndividualProfile,
        financial_year: &str,
        amount: Decimal,
        period: PayPeriod,
        allowances: Decimal,
    ) -> Result<Decimal, TaxError> {
        let schedule = self.repository.get_schedule_1(financial_year)?;
        let scale = select_scale(schedule.scales(), &individual.eligibility_profile())?;
        let weekly_earnings = normalize_to_weekly(amount, period, allowances)?;
        let weekly = calculate_withholding(scale, weekly_earnings)?;
        Ok(weekly_to_period(weekly, period))
    }
}
