use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TaxError;

/// Residency for tax purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidentTaxStatus {
    Resident,
    #[serde(alias = "foreign resident")]
    ForeignResident,
    #[serde(alias = "working holiday maker")]
    WorkingHolidayMaker,
}

impl ResidentTaxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::ForeignResident => "foreign_resident",
            Self::WorkingHolidayMaker => "working_holiday_maker",
        }
    }
}

/// Lowercases and maps spaces and hyphens to underscores, so
/// `"Not Claimed"` and `"not-claimed"` both read as `not_claimed`.
fn normalise(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

impl FromStr for ResidentTaxStatus {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "resident" => Ok(Self::Resident),
            "foreign_resident" => Ok(Self::ForeignResident),
            "working_holiday_maker" => Ok(Self::WorkingHolidayMaker),
            _ => Err(TaxError::InvalidInput(format!(
                "unknown resident tax status '{s}'; expected resident, foreign_resident or working_holiday_maker"
            ))),
        }
    }
}

/// Whether a threshold or exemption has been claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Claimed,
    #[serde(alias = "not claimed")]
    NotClaimed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::NotClaimed => "not_claimed",
        }
    }
}

impl FromStr for ClaimStatus {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "claimed" => Ok(Self::Claimed),
            "not_claimed" => Ok(Self::NotClaimed),
            _ => Err(TaxError::InvalidInput(format!(
                "unknown claim status '{s}'; expected claimed or not_claimed"
            ))),
        }
    }
}

/// The five attributes a withholding scale is selected on.
///
/// Matching is exact equality on all five fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EligibilityProfile {
    pub tfn_provided: bool,
    pub resident_tax_status: ResidentTaxStatus,
    pub tax_free_threshold: ClaimStatus,
    pub full_medicare_levy_exemption: ClaimStatus,
    pub half_medicare_levy_exemption: ClaimStatus,
}

impl fmt::Display for EligibilityProfile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "(tfn_provided={}, {}, tax_free_threshold={}, full_medicare_levy_exemption={}, half_medicare_levy_exemption={})",
            self.tfn_provided,
            self.resident_tax_status.as_str(),
            self.tax_free_threshold.as_str(),
            self.full_medicare_levy_exemption.as_str(),
            self.half_medicare_levy_exemption.as_str(),
        )
    }
}
