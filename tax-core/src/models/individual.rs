use rust_decimal::Decimal;

use super::{ClaimStatus, EligibilityProfile, ResidentTaxStatus};
use crate::TaxError;

/// A person whose tax is being calculated.
///
/// The calculator only ever borrows a profile. Salary is validated on every
/// change; the eligibility fields are plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndividualProfile {
    pub name: String,
    salary: Decimal,
    has_private_health: bool,
    has_hecs: bool,
    pub tfn_provided: bool,
    pub resident_tax_status: ResidentTaxStatus,
    pub tax_free_threshold: ClaimStatus,
    pub full_medicare_levy_exemption: ClaimStatus,
    pub half_medicare_levy_exemption: ClaimStatus,
}

impl IndividualProfile {
    /// Creates a resident with a TFN who claims the tax-free threshold,
    /// no Medicare exemptions, no private health cover and no HECS debt.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] if `annual_salary` is negative.
    pub fn new(
        name: impl Into<String>,
        annual_salary: Decimal,
    ) -> Result<Self, TaxError> {
        let mut individual = Self {
            name: name.into(),
            salary: Decimal::ZERO,
            has_private_health: false,
            has_hecs: false,
            tfn_provided: true,
            resident_tax_status: ResidentTaxStatus::Resident,
            tax_free_threshold: ClaimStatus::Claimed,
            full_medicare_levy_exemption: ClaimStatus::NotClaimed,
            half_medicare_levy_exemption: ClaimStatus::NotClaimed,
        };
        individual.set_salary(annual_salary)?;
        Ok(individual)
    }

    /// Copies the five eligibility attributes from `profile`.
    pub fn with_eligibility(
        mut self,
        profile: EligibilityProfile,
    ) -> Self {
        self.tfn_provided = profile.tfn_provided;
        self.resident_tax_status = profile.resident_tax_status;
        self.tax_free_threshold = profile.tax_free_threshold;
        self.full_medicare_levy_exemption = profile.full_medicare_levy_exemption;
        self.half_medicare_levy_exemption = profile.half_medicare_levy_exemption;
        self
    }

    pub fn salary(&self) -> Decimal {
        self.salary
    }

    pub fn set_salary(
        &mut self,
        salary: Decimal,
    ) -> Result<(), TaxError> {
        if salary < Decimal::ZERO {
            return Err(TaxError::negative_amount("salary", salary));
        }
        self.salary = salary;
        Ok(())
    }

    pub fn has_private_health(&self) -> bool {
        self.has_private_health
    }

    pub fn set_has_private_health(
        &mut self,
        has_private_health: bool,
    ) {
        self.has_private_health = has_private_health;
    }

    pub fn has_hecs(&self) -> bool {
        self.has_hecs
    }

    pub fn set_has_hecs(
        &mut self,
        has_hecs: bool,
    ) {
        self.has_hecs = has_hecs;
    }

    /// The profile used for scale selection, built from the current fields.
    pub fn eligibility_profile(&self) -> EligibilityProfile {
        EligibilityProfile {
            tfn_provided: self.tfn_provided,
            resident_tax_status: self.resident_tax_status,
            tax_free_threshold: self.tax_free_threshold,
            full_medicare_levy_exemption: self.full_medicare_levy_exemption,
            half_medicare_levy_exemption: self.half_medicare_levy_exemption,
        }
    }
}
