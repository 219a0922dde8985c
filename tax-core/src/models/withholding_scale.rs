use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EligibilityProfile;
use crate::TaxError;

/// One row of a Schedule 1 scale: for weekly earnings strictly below
/// `upper_bound`, withholding is `a * earnings - b`.
///
/// `upper_bound` of `None` means the row has no ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsThreshold {
    pub upper_bound: Option<Decimal>,
    pub a: Decimal,
    pub b: Decimal,
}

impl EarningsThreshold {
    pub fn new(
        upper_bound: Option<Decimal>,
        a: Decimal,
        b: Decimal,
    ) -> Self {
        Self { upper_bound, a, b }
    }

    /// Whether `weekly_earnings` is strictly below this row's ceiling.
    pub fn covers(
        &self,
        weekly_earnings: Decimal,
    ) -> bool {
        self.upper_bound.is_none_or(|bound| weekly_earnings < bound)
    }
}

fn compare_bounds(
    left: Option<Decimal>,
    right: Option<Decimal>,
) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A named withholding formula set and the profile it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithholdingScale {
    name: String,
    eligibility: EligibilityProfile,
    thresholds: Vec<EarningsThreshold>,
}

impl WithholdingScale {
    /// Builds a scale, sorting thresholds ascending by upper bound.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Configuration`] if the scale has no thresholds or
    /// two thresholds share an upper bound.
    pub fn new(
        name: impl Into<String>,
        eligibility: EligibilityProfile,
        mut thresholds: Vec<EarningsThreshold>,
    ) -> Result<Self, TaxError> {
        let name = name.into();

        if thresholds.is_empty() {
            return Err(TaxError::Configuration(format!(
                "withholding scale '{name}' has no earnings thresholds"
            )));
        }

        thresholds.sort_by(|l, r| compare_bounds(l.upper_bound, r.upper_bound));

        if let Some(pair) = thresholds
            .windows(2)
            .find(|pair| pair[0].upper_bound == pair[1].upper_bound)
        {
            let bound = pair[0]
                .upper_bound
                .map_or_else(|| "infinity".to_string(), |b| b.to_string());
            return Err(TaxError::Configuration(format!(
                "withholding scale '{name}' defines threshold {bound} twice"
            )));
        }

        Ok(Self {
            name,
            eligibility,
            thresholds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eligibility(&self) -> &EligibilityProfile {
        &self.eligibility
    }

    /// Thresholds, ascending by upper bound with any open row last.
    pub fn thresholds(&self) -> &[EarningsThreshold] {
        &self.thresholds
    }

    pub fn has_open_top_threshold(&self) -> bool {
        self.thresholds
            .last()
            .is_some_and(|t| t.upper_bound.is_none())
    }
}
