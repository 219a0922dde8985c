//! Schedule 1 PAYG withholding.
//!
//! Withholding is always computed on a weekly figure: the pay amount is
//! normalised to weekly earnings, the individual's scale is chosen by an
//! exact profile match, and the scale's first threshold above the weekly
//! earnings supplies the `a * x - b` formula.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::common::{cents_are_33, ignore_cents_add_99, round_half_even};
use crate::{EligibilityProfile, PayPeriod, TaxError, WithholdingScale};

/// Converts a pay amount to the weekly earnings figure Schedule 1 formulas
/// are applied to.
///
/// `allowances` are added to annual, quarterly and monthly amounts only;
/// weekly and fortnightly pay is converted without them. Conversion then
/// follows the legacy table:
///
/// | period      | weekly figure                     |
/// |-------------|-----------------------------------|
/// | weekly      | `income`                          |
/// | fortnightly | `income / 26`                     |
/// | monthly     | `(income + allowances) * 3 / 13`  |
/// | quarterly   | `(income + allowances) / 13`      |
/// | annual      | `(income + allowances) / 52`      |
///
/// Monthly amounts whose cents are exactly 33 have one cent added before
/// scaling. Whatever the period, the weekly result has its cents dropped
/// and 99 cents added.
///
/// # Errors
///
/// Returns [`TaxError::InvalidInput`] if `income` or `allowances` is negative.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::PayPeriod;
/// use tax_core::calculations::normalize_to_weekly;
///
/// let weekly = normalize_to_weekly(dec!(76534), PayPeriod::Annual, dec!(0)).unwrap();
/// assert_eq!(weekly, dec!(1471.99));
///
/// let weekly = normalize_to_weekly(dec!(4333.33), PayPeriod::Monthly, dec!(0)).unwrap();
/// assert_eq!(weekly, dec!(1000.99));
/// ```
pub fn normalize_to_weekly(
    income: Decimal,
    period: PayPeriod,
    allowances: Decimal,
) -> Result<Decimal, TaxError> {
    if income < Decimal::ZERO {
        return Err(TaxError::negative_amount("income", income));
    }
    if allowances < Decimal::ZERO {
        return Err(TaxError::negative_amount("allowances", allowances));
    }

    let weekly = match period {
        PayPeriod::Weekly => income,
        PayPeriod::Fortnightly => income / Decimal::from(26),
        PayPeriod::Quarterly => (income + allowances) / Decimal::from(13),
        PayPeriod::Annual => (income + allowances) / Decimal::from(52),
        PayPeriod::Monthly => {
            let mut monthly = income + allowances;
            if cents_are_33(monthly) {
                debug!(monthly = %monthly, "monthly amount ends in 33 cents; adding one cent");
                monthly += Decimal::new(1, 2);
            }
            monthly * Decimal::from(3) / Decimal::from(13)
        }
    };

    Ok(ignore_cents_add_99(weekly))
}

/// Picks the first scale whose eligibility profile equals `profile`.
///
/// # Errors
///
/// Returns [`TaxError::NoMatchingScale`] if no scale matches.
pub fn select_scale<'a>(
    scales: &'a [WithholdingScale],
    profile: &EligibilityProfile,
) -> Result<&'a WithholdingScale, TaxError> {
    let scale = scales
        .iter()
        .find(|scale| scale.eligibility() == profile)
        .ok_or(TaxError::NoMatchingScale { profile: *profile })?;

    debug!(scale = scale.name(), %profile, "selected withholding scale");

    Ok(scale)
}

/// Weekly withholding for `weekly_income` under `scale`, in whole dollars.
///
/// Uses the first threshold, ascending, whose upper bound is strictly
/// above `weekly_income`. The formula result is rounded half-to-even and
/// returned as is, so a scale whose formula dips below zero yields a
/// negative amount (logged as a warning).
///
/// # Errors
///
/// - [`TaxError::InvalidInput`] if `weekly_income` is negative.
/// - [`TaxError::Configuration`] if `weekly_income` is at or above every
///   threshold, which only happens when the scale has no open-ended row.
pub fn calculate_withholding(
    scale: &WithholdingScale,
    weekly_income: Decimal,
) -> Result<Decimal, TaxError> {
    if weekly_income < Decimal::ZERO {
        return Err(TaxError::negative_amount("weekly income", weekly_income));
    }

    let threshold = scale
        .thresholds()
        .iter()
        .find(|threshold| threshold.covers(weekly_income))
        .ok_or_else(|| {
            TaxError::Configuration(format!(
                "withholding scale '{}' has no threshold above weekly earnings {}",
                scale.name(),
                weekly_income
            ))
        })?;

    let raw = threshold.a * weekly_income - threshold.b;
    if raw < Decimal::ZERO {
        warn!(
            scale = scale.name(),
            weekly_income = %weekly_income,
            a = %threshold.a,
            b = %threshold.b,
            raw = %raw,
            "withholding formula is negative"
        );
    }

    let tax = round_half_even(raw);

    debug!(
        scale = scale.name(),
        weekly_income = %weekly_income,
        a = %threshold.a,
        b = %threshold.b,
        tax = %tax,
        "calculated weekly withholding"
    );

    Ok(tax)
}

/// Converts a weekly withholding amount to the amount for `period`.
///
/// Monthly withholding is the weekly amount times `13 / 3`, rounded to
/// whole dollars; the other periods are exact multiples of a week.
pub fn weekly_to_period(
    weekly_tax: Decimal,
    period: PayPeriod,
) -> Decimal {
    match period {
        PayPeriod::Weekly => weekly_tax,
        PayPeriod::Fortnightly => weekly_tax * Decimal::TWO,
        PayPeriod::Monthly => round_half_even(weekly_tax * Decimal::from(13) / Decimal::from(3)),
        PayPeriod::Quarterly => weekly_tax * Decimal::from(13),
        PayPeriod::Annual => weekly_tax * Decimal::from(52),
    }
}

/// Withholding for an individual expressed over each common pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingSummary {
    pub financial_year: String,
    pub scale: String,
    pub weekly_earnings: Decimal,
    pub weekly: Decimal,
    pub fortnightly: Decimal,
    pub monthly: Decimal,
    pub quarterly: Decimal,
    /// 52 weeks of withholding.
    pub annual: Decimal,
}

impl WithholdingSummary {
    pub fn from_weekly(
        financial_year: impl Into<String>,
        scale: impl Into<String>,
        weekly_earnings: Decimal,
        weekly: Decimal,
    ) -> Self {
        Self {
            financial_year: financial_year.into(),
            scale: scale.into(),
            weekly_earnings,
            weekly,
            fortnightly: weekly_to_period(weekly, PayPeriod::Fortnightly),
            monthly: weekly_to_period(weekly, PayPeriod::Monthly),
            quarterly: weekly_to_period(weekly, PayPeriod::Quarterly),
            annual: weekly_to_period(weekly, PayPeriod::Annual),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::{ClaimStatus, EarningsThreshold, ResidentTaxStatus};

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn claimed_profile() -> EligibilityProfile {
        EligibilityProfile {
            tfn_provided: true,
            resident_tax_status: ResidentTaxStatus::Resident,
            tax_free_threshold: ClaimStatus::Claimed,
            full_medicare_levy_exemption: ClaimStatus::NotClaimed,
            half_medicare_levy_exemption: ClaimStatus::NotClaimed,
        }
    }

    fn not_claimed_profile() -> EligibilityProfile {
        EligibilityProfile {
            tax_free_threshold: ClaimStatus::NotClaimed,
            ..claimed_profile()
        }
    }

    fn scenario_scale() -> WithholdingScale {
        WithholdingScale::new(
            "claimed-resident-tfn",
            claimed_profile(),
            vec![
                EarningsThreshold::new(Some(dec!(500)), dec!(0), dec!(0)),
                EarningsThreshold::new(None, dec!(0.325), dec!(71.79)),
            ],
        )
        .unwrap()
    }

    fn scale_2() -> WithholdingScale {
        WithholdingScale::new(
            "scale_2",
            claimed_profile(),
            vec![
                EarningsThreshold::new(Some(dec!(359)), dec!(0), dec!(0)),
                EarningsThreshold::new(Some(dec!(438)), dec!(0.19), dec!(68.3462)),
                EarningsThreshold::new(Some(dec!(548)), dec!(0.29), dec!(112.1942)),
                EarningsThreshold::new(Some(dec!(721)), dec!(0.21), dec!(68.3465)),
                EarningsThreshold::new(Some(dec!(865)), dec!(0.219), dec!(74.8369)),
                EarningsThreshold::new(Some(dec!(1282)), dec!(0.3477), dec!(186.2119)),
                EarningsThreshold::new(Some(dec!(2307)), dec!(0.345), dec!(182.7504)),
                EarningsThreshold::new(Some(dec!(3461)), dec!(0.39), dec!(286.5965)),
                EarningsThreshold::new(None, dec!(0.47), dec!(563.5196)),
            ],
        )
        .unwrap()
    }

    fn scale_1() -> WithholdingScale {
        WithholdingScale::new(
            "scale_1",
            not_claimed_profile(),
            vec![
                EarningsThreshold::new(Some(dec!(88)), dec!(0.19), dec!(0.19)),
                EarningsThreshold::new(None, dec!(0.2348), dec!(3.9639)),
            ],
        )
        .unwrap()
    }

    // =========================================================================
    // normalize_to_weekly tests
    // =========================================================================

    #[test]
    fn normalize_annual_drops_cents_and_adds_99() {
        let weekly = normalize_to_weekly(dec!(76534), PayPeriod::Annual, dec!(0)).unwrap();

        // 76534 / 52 = 1471.807...
        assert_eq!(weekly, dec!(1471.99));
    }

    #[test]
    fn normalize_annual_includes_allowances() {
        let weekly = normalize_to_weekly(dec!(52000), PayPeriod::Annual, dec!(520)).unwrap();

        assert_eq!(weekly, dec!(1010.99));
    }

    #[test]
    fn normalize_quarterly_divides_by_13() {
        let weekly = normalize_to_weekly(dec!(19133.50), PayPeriod::Quarterly, dec!(0)).unwrap();

        assert_eq!(weekly, dec!(1471.99));
    }

    #[test]
    fn normalize_fortnightly_divides_by_26() {
        let weekly = normalize_to_weekly(dec!(38270), PayPeriod::Fortnightly, dec!(0)).unwrap();

        // 38270 / 26 = 1471.92...
        assert_eq!(weekly, dec!(1471.99));
    }

    #[test]
    fn normalize_fortnightly_ignores_allowances() {
        let weekly = normalize_to_weekly(dec!(38270), PayPeriod::Fortnightly, dec!(2600)).unwrap();

        assert_eq!(weekly, dec!(1471.99));
    }

    #[test]
    fn normalize_weekly_ignores_allowances() {
        let weekly = normalize_to_weekly(dec!(1400), PayPeriod::Weekly, dec!(71.50)).unwrap();

        assert_eq!(weekly, dec!(1400.99));
    }

    #[test]
    fn normalize_quarterly_includes_allowances() {
        let weekly = normalize_to_weekly(dec!(19000), PayPeriod::Quarterly, dec!(133.50)).unwrap();

        // 19133.50 / 13 = 1471.80...
        assert_eq!(weekly, dec!(1471.99));
    }

    #[test]
    fn normalize_weekly_is_identity_before_rounding() {
        let weekly = normalize_to_weekly(dec!(1472.45), PayPeriod::Weekly, dec!(0)).unwrap();

        assert_eq!(weekly, dec!(1472.99));
    }

    #[test]
    fn normalize_monthly_adds_cent_when_cents_are_33() {
        let _guard = init_test_tracing();

        let weekly = normalize_to_weekly(dec!(4333.33), PayPeriod::Monthly, dec!(0)).unwrap();

        // (4333.34 * 3) / 13 = 1000.0015...; without the extra cent it would be 999.999...
        assert_eq!(weekly, dec!(1000.99));
    }

    #[test]
    fn normalize_monthly_without_33_cents() {
        let weekly = normalize_to_weekly(dec!(4333.32), PayPeriod::Monthly, dec!(0)).unwrap();

        // (4333.32 * 3) / 13 = 999.996...
        assert_eq!(weekly, dec!(999.99));
    }

    #[test]
    fn normalize_monthly_checks_cents_after_allowances() {
        let weekly = normalize_to_weekly(dec!(4000.00), PayPeriod::Monthly, dec!(333.33)).unwrap();

        assert_eq!(weekly, dec!(1000.99));
    }

    #[test]
    fn normalize_rejects_negative_income() {
        let result = normalize_to_weekly(dec!(-1), PayPeriod::Weekly, dec!(0));

        assert!(matches!(result, Err(TaxError::InvalidInput(_))));
    }

    #[test]
    fn normalize_rejects_negative_allowances() {
        let result = normalize_to_weekly(dec!(100), PayPeriod::Weekly, dec!(-1));

        assert!(matches!(result, Err(TaxError::InvalidInput(msg)) if msg.contains("allowances")));
    }

    #[test]
    fn normalize_annual_matches_truncate_plus_99_for_many_salaries() {
        for salary in (0..200_000).step_by(997) {
            let salary = Decimal::from(salary);
            let expected = (salary / Decimal::from(52)).trunc() + dec!(0.99);

            let weekly = normalize_to_weekly(salary, PayPeriod::Annual, dec!(0)).unwrap();

            assert_eq!(weekly, expected, "salary {salary}");
        }
    }

    // =========================================================================
    // select_scale tests
    // =========================================================================

    #[test]
    fn select_scale_matches_exact_profile() {
        let scales = vec![scale_1(), scenario_scale()];

        let scale = select_scale(&scales, &claimed_profile()).unwrap();

        assert_eq!(scale.name(), "claimed-resident-tfn");
    }

    #[test]
    fn select_scale_picks_other_scale_for_changed_field() {
        let scales = vec![scale_1(), scenario_scale()];

        let scale = select_scale(&scales, &not_claimed_profile()).unwrap();

        assert_eq!(scale.name(), "scale_1");
    }

    #[test]
    fn select_scale_first_match_wins() {
        let scales = vec![scenario_scale(), scale_2()];

        let scale = select_scale(&scales, &claimed_profile()).unwrap();

        assert_eq!(scale.name(), "claimed-resident-tfn");
    }

    #[test]
    fn select_scale_errors_when_nothing_matches() {
        let scales = vec![scenario_scale()];
        let profile = EligibilityProfile {
            half_medicare_levy_exemption: ClaimStatus::Claimed,
            ..claimed_profile()
        };

        let result = select_scale(&scales, &profile);

        assert_eq!(result, Err(TaxError::NoMatchingScale { profile }));
    }

    // =========================================================================
    // calculate_withholding tests
    // =========================================================================

    #[test]
    fn calculate_withholding_matches_worked_scenario() {
        let tax = calculate_withholding(&scenario_scale(), dec!(1472.99)).unwrap();

        // 0.325 * 1472.99 - 71.79 = 406.93175
        assert_eq!(tax, dec!(407));
    }

    #[test]
    fn calculate_withholding_uses_first_bracket_below_bound() {
        let tax = calculate_withholding(&scenario_scale(), dec!(499.99)).unwrap();

        assert_eq!(tax, dec!(0));
    }

    #[test]
    fn calculate_withholding_bound_is_exclusive() {
        let tax = calculate_withholding(&scenario_scale(), dec!(500)).unwrap();

        // 0.325 * 500 - 71.79 = 90.71
        assert_eq!(tax, dec!(91));
    }

    #[test]
    fn calculate_withholding_scale_2_weekly_1472() {
        let tax = calculate_withholding(&scale_2(), dec!(1472.99)).unwrap();

        // 0.345 * 1472.99 - 182.7504 = 325.43115
        assert_eq!(tax, dec!(325));
    }

    #[test]
    fn calculate_withholding_rounds_half_to_even() {
        let scale = WithholdingScale::new(
            "midpoint",
            claimed_profile(),
            vec![EarningsThreshold::new(None, dec!(1), dec!(0.49))],
        )
        .unwrap();

        assert_eq!(calculate_withholding(&scale, dec!(0.99)).unwrap(), dec!(0));
        assert_eq!(calculate_withholding(&scale, dec!(1.99)).unwrap(), dec!(2));
        assert_eq!(calculate_withholding(&scale, dec!(2.99)).unwrap(), dec!(2));
    }

    #[test]
    fn calculate_withholding_keeps_negative_formula_result() {
        let _guard = init_test_tracing();
        let scale = WithholdingScale::new(
            "rebate",
            claimed_profile(),
            vec![EarningsThreshold::new(None, dec!(0.1), dec!(5))],
        )
        .unwrap();

        // 0.1 * 10.99 - 5 = -3.901
        let tax = calculate_withholding(&scale, dec!(10.99)).unwrap();

        assert_eq!(tax, dec!(-4));
    }

    #[test]
    fn calculate_withholding_scale_1_at_nil_earnings() {
        // 0.19 * 0.99 - 0.19 = -0.0019, rounds to zero
        let tax = calculate_withholding(&scale_1(), dec!(0.99)).unwrap();

        assert_eq!(tax, dec!(0));
    }

    #[test]
    fn calculate_withholding_errors_above_bounded_top_threshold() {
        let scale = WithholdingScale::new(
            "bounded",
            claimed_profile(),
            vec![EarningsThreshold::new(Some(dec!(500)), dec!(0), dec!(0))],
        )
        .unwrap();

        let result = calculate_withholding(&scale, dec!(500.99));

        assert!(matches!(result, Err(TaxError::Configuration(msg)) if msg.contains("bounded")));
    }

    #[test]
    fn calculate_withholding_rejects_negative_income() {
        assert!(matches!(
            calculate_withholding(&scenario_scale(), dec!(-1)),
            Err(TaxError::InvalidInput(_))
        ));
    }

    // =========================================================================
    // weekly_to_period tests
    // =========================================================================

    #[test]
    fn weekly_to_period_multiplies_whole_weeks() {
        assert_eq!(weekly_to_period(dec!(325), PayPeriod::Weekly), dec!(325));
        assert_eq!(weekly_to_period(dec!(325), PayPeriod::Fortnightly), dec!(650));
        assert_eq!(weekly_to_period(dec!(325), PayPeriod::Quarterly), dec!(4225));
        assert_eq!(weekly_to_period(dec!(325), PayPeriod::Annual), dec!(16900));
    }

    #[test]
    fn weekly_to_period_rounds_monthly() {
        // 325 * 13 / 3 = 1408.33...
        assert_eq!(weekly_to_period(dec!(325), PayPeriod::Monthly), dec!(1408));
    }

    #[test]
    fn summary_from_weekly_fills_every_period() {
        let summary = WithholdingSummary::from_weekly("2022-2023", "scale_2", dec!(1471.99), dec!(325));

        assert_eq!(summary.fortnightly, dec!(650));
        assert_eq!(summary.monthly, dec!(1408));
        assert_eq!(summary.quarterly, dec!(4225));
        assert_eq!(summary.annual, dec!(16900));
    }
}
