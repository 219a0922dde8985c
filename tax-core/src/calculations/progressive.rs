//! Progressive income tax and the flat-rate levies.
//!
//! Income tax is marginal: the containing band taxes only the income above
//! its floor, and every band wholly below contributes its full width. The
//! Medicare levy, the surcharge and HECS instead apply the containing
//! band's rate to the whole income.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::band_resolver::{find_containing_band, find_lower_bands};
use crate::{TaxError, TaxTable};

/// Tax attributed to a single band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandTax {
    pub band: String,
    pub rate: Decimal,
    pub taxed_income: Decimal,
    pub tax: Decimal,
}

/// Result of [`compute_income_tax`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub total_tax: Decimal,
    pub marginal_rate: Decimal,
    pub marginal_band: String,
    /// One entry per band that contributed, lower bands ascending by
    /// minimum income followed by the marginal band.
    pub breakdown: Vec<BandTax>,
}

impl IncomeTaxResult {
    pub fn marginal_tax(&self) -> Decimal {
        self.breakdown
            .last()
            .map_or(Decimal::ZERO, |entry| entry.tax)
    }
}

/// Result of a flat-rate computation (Medicare levy, surcharge, HECS).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRateResult {
    pub amount: Decimal,
    pub rate: Decimal,
    pub band: String,
}

/// Computes income tax on `taxable_income` under progressive rules.
///
/// # Errors
///
/// - [`TaxError::InvalidInput`] if `taxable_income` is negative.
/// - [`TaxError::Configuration`] if no band contains `taxable_income`.
///
/// Cents are dropped before the band search, so 45000.50 is taxed as 45000.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::compute_income_tax;
/// use tax_core::{TaxBand, TaxCategory, TaxTable};
///
/// let table = TaxTable::new(
///     "2022-2023",
///     TaxCategory::IncomeTax,
///     vec![
///         TaxBand::new("A", dec!(0), Some(dec!(18200)), dec!(0)),
///         TaxBand::new("B", dec!(18201), Some(dec!(45000)), dec!(0.19)),
///         TaxBand::new("C", dec!(45001), None, dec!(0.325)),
///     ],
/// )
/// .unwrap();
///
/// let result = compute_income_tax(&table, dec!(76534)).unwrap();
///
/// assert_eq!(result.marginal_band, "C");
/// assert_eq!(result.marginal_rate, dec!(0.325));
/// assert_eq!(result.total_tax, dec!(15340.225));
/// ```
pub fn compute_income_tax(
    table: &TaxTable,
    taxable_income: Decimal,
) -> Result<IncomeTaxResult, TaxError> {
    let taxable_income = whole_dollars(taxable_income)?;
    let band = find_containing_band(table, taxable_income)?;

    let mut breakdown: Vec<BandTax> = find_lower_bands(table, taxable_income)
        .into_iter()
        .filter_map(|lower| {
            let taxed_income = lower.width()?;
            Some(BandTax {
                band: lower.name.clone(),
                rate: lower.tax_rate,
                taxed_income,
                tax: taxed_income * lower.tax_rate,
            })
        })
        .collect();

    let marginal_income = taxable_income - band.min_income;
    breakdown.push(BandTax {
        band: band.name.clone(),
        rate: band.tax_rate,
        taxed_income: marginal_income,
        tax: marginal_income * band.tax_rate,
    });

    let total_tax: Decimal = breakdown.iter().map(|entry| entry.tax).sum();

    debug!(
        financial_year = table.financial_year(),
        taxable_income = %taxable_income,
        marginal_band = band.name.as_str(),
        total_tax = %total_tax,
        "computed income tax"
    );

    Ok(IncomeTaxResult {
        total_tax,
        marginal_rate: band.tax_rate,
        marginal_band: band.name.clone(),
        breakdown,
    })
}

/// Bands are whole-dollar ranges; taxable income is assessed without cents.
fn whole_dollars(income: Decimal) -> Result<Decimal, TaxError> {
    if income < Decimal::ZERO {
        return Err(TaxError::negative_amount("income", income));
    }
    Ok(income.trunc())
}

/// Applies the containing band's rate to the whole dollars of `income`.
fn compute_flat_rate(
    table: &TaxTable,
    income: Decimal,
) -> Result<FlatRateResult, TaxError> {
    let income = whole_dollars(income)?;
    let band = find_containing_band(table, income)?;

    Ok(FlatRateResult {
        amount: income * band.tax_rate,
        rate: band.tax_rate,
        band: band.name.clone(),
    })
}

/// Medicare levy on `taxable_income`.
pub fn compute_medicare_levy(
    table: &TaxTable,
    taxable_income: Decimal,
) -> Result<FlatRateResult, TaxError> {
    compute_flat_rate(table, taxable_income)
}

/// Medicare levy surcharge on `taxable_income`.
pub fn compute_medicare_levy_surcharge(
    table: &TaxTable,
    taxable_income: Decimal,
) -> Result<FlatRateResult, TaxError> {
    compute_flat_rate(table, taxable_income)
}

/// HECS/HELP repayment on `assessable_income`.
pub fn compute_hecs(
    table: &TaxTable,
    assessable_income: Decimal,
) -> Result<FlatRateResult, TaxError> {
    compute_flat_rate(table, assessable_income)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, proptest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{TaxBand, TaxCategory};

    fn scenario_table() -> TaxTable {
        TaxTable::new(
            "2022-2023",
            TaxCategory::IncomeTax,
            vec![
                TaxBand::new("A", dec!(0), Some(dec!(18200)), dec!(0.0)),
                TaxBand::new("B", dec!(18201), Some(dec!(45000)), dec!(0.19)),
                TaxBand::new("C", dec!(45001), None, dec!(0.325)),
            ],
        )
        .unwrap()
    }

    fn resident_2022_table() -> TaxTable {
        TaxTable::new(
            "2022-2023",
            TaxCategory::IncomeTax,
            vec![
                TaxBand::new("tax_free", dec!(0), Some(dec!(18200)), dec!(0)),
                TaxBand::new("band_1", dec!(18201), Some(dec!(45000)), dec!(0.19)),
                TaxBand::new("band_2", dec!(45001), Some(dec!(120000)), dec!(0.325)),
                TaxBand::new("band_3", dec!(120001), Some(dec!(180000)), dec!(0.37)),
                TaxBand::new("band_4", dec!(180001), None, dec!(0.45)),
            ],
        )
        .unwrap()
    }

    fn hecs_table() -> TaxTable {
        TaxTable::new(
            "2022-2023",
            TaxCategory::Hecs,
            vec![
                TaxBand::new("nil", dec!(0), Some(dec!(48360)), dec!(0)),
                TaxBand::new("one", dec!(48361), Some(dec!(55836)), dec!(0.01)),
                TaxBand::new("two", dec!(55837), None, dec!(0.02)),
            ],
        )
        .unwrap()
    }

    // =========================================================================
    // compute_income_tax tests
    // =========================================================================

    #[test]
    fn compute_income_tax_matches_worked_scenario() {
        let result = compute_income_tax(&scenario_table(), dec!(76534)).unwrap();

        assert_eq!(result.marginal_band, "C");
        assert_eq!(result.marginal_rate, dec!(0.325));
        assert_eq!(
            result.breakdown,
            vec![
                BandTax {
                    band: "A".to_string(),
                    rate: dec!(0.0),
                    taxed_income: dec!(18201),
                    tax: dec!(0),
                },
                BandTax {
                    band: "B".to_string(),
                    rate: dec!(0.19),
                    taxed_income: dec!(26800),
                    tax: dec!(5092),
                },
                BandTax {
                    band: "C".to_string(),
                    rate: dec!(0.325),
                    taxed_income: dec!(31533),
                    tax: dec!(10248.225),
                },
            ]
        );
        assert_eq!(result.marginal_tax(), dec!(10248.225));
        assert_eq!(result.total_tax, dec!(15340.225));
    }

    #[test]
    fn compute_income_tax_is_zero_in_tax_free_band() {
        let result = compute_income_tax(&scenario_table(), dec!(18200)).unwrap();

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.marginal_band, "A");
        assert_eq!(result.breakdown.len(), 1);
    }

    #[test]
    fn compute_income_tax_at_band_boundary() {
        let at_max = compute_income_tax(&scenario_table(), dec!(45000)).unwrap();
        let above_max = compute_income_tax(&scenario_table(), dec!(45001)).unwrap();

        assert_eq!(at_max.marginal_band, "B");
        assert_eq!(at_max.total_tax, dec!(5091.81));
        assert_eq!(above_max.marginal_band, "C");
        assert_eq!(above_max.total_tax, dec!(5092));
    }

    #[test]
    fn compute_income_tax_drops_cents_between_bands() {
        let above_b = compute_income_tax(&scenario_table(), dec!(45000.50)).unwrap();
        let above_a = compute_income_tax(&scenario_table(), dec!(18200.99)).unwrap();

        assert_eq!(above_b.marginal_band, "B");
        assert_eq!(above_b.total_tax, dec!(5091.81));
        assert_eq!(above_a.marginal_band, "A");
        assert_eq!(above_a.total_tax, dec!(0));
    }

    #[test]
    fn compute_income_tax_across_all_2022_bands() {
        let result = compute_income_tax(&resident_2022_table(), dec!(200000)).unwrap();

        // 5092 + 24375 + 22200 + 19999 * 0.45
        assert_eq!(result.total_tax, dec!(60666.55));
        assert_eq!(result.marginal_rate, dec!(0.45));
        assert_eq!(result.breakdown.len(), 5);
    }

    #[test]
    fn compute_income_tax_lower_bands_sum_full_widths() {
        let table = resident_2022_table();

        let result = compute_income_tax(&table, dec!(180001)).unwrap();

        let expected: Decimal = table
            .bands()
            .iter()
            .filter_map(|b| b.full_band_tax())
            .sum();
        assert_eq!(result.total_tax, expected);
        assert_eq!(result.marginal_tax(), dec!(0));
    }

    #[test]
    fn compute_income_tax_rejects_negative_income() {
        let result = compute_income_tax(&scenario_table(), dec!(-0.01));

        assert!(matches!(result, Err(TaxError::InvalidInput(_))));
    }

    #[test]
    fn compute_income_tax_errors_when_no_band_matches() {
        let table = TaxTable::new(
            "2022-2023",
            TaxCategory::IncomeTax,
            vec![TaxBand::new("A", dec!(0), Some(dec!(18200)), dec!(0))],
        )
        .unwrap();

        let result = compute_income_tax(&table, dec!(18201));

        assert!(matches!(result, Err(TaxError::Configuration(_))));
    }

    // =========================================================================
    // flat-rate tests
    // =========================================================================

    #[test]
    fn compute_hecs_applies_rate_to_whole_income() {
        let result = compute_hecs(&hecs_table(), dec!(50000)).unwrap();

        assert_eq!(
            result,
            FlatRateResult {
                amount: dec!(500.00),
                rate: dec!(0.01),
                band: "one".to_string(),
            }
        );
    }

    #[test]
    fn compute_hecs_is_zero_below_threshold() {
        let result = compute_hecs(&hecs_table(), dec!(48360)).unwrap();

        assert_eq!(result.amount, dec!(0));
        assert_eq!(result.band, "nil");
    }

    #[test]
    fn compute_medicare_levy_is_flat() {
        let table = TaxTable::new(
            "2022-2023",
            TaxCategory::MedicareLevy,
            vec![
                TaxBand::new("exempt", dec!(0), Some(dec!(23365)), dec!(0)),
                TaxBand::new("full", dec!(23366), None, dec!(0.02)),
            ],
        )
        .unwrap();

        let result = compute_medicare_levy(&table, dec!(76534)).unwrap();

        assert_eq!(result.amount, dec!(1530.68));
        assert_eq!(result.rate, dec!(0.02));
    }

    #[test]
    fn compute_hecs_ignores_cents_at_threshold() {
        let result = compute_hecs(&hecs_table(), dec!(48360.75)).unwrap();

        assert_eq!(result.band, "nil");
        assert_eq!(result.amount, dec!(0));
    }

    #[test]
    fn compute_medicare_levy_surcharge_uses_tier_rate() {
        let table = TaxTable::new(
            "2022-2023",
            TaxCategory::MedicareLevySurcharge,
            vec![
                TaxBand::new("base", dec!(0), Some(dec!(90000)), dec!(0)),
                TaxBand::new("tier_1", dec!(90001), Some(dec!(105000)), dec!(0.01)),
                TaxBand::new("tier_2", dec!(105001), None, dec!(0.0125)),
            ],
        )
        .unwrap();

        let result = compute_medicare_levy_surcharge(&table, dec!(100000)).unwrap();

        assert_eq!(result.amount, dec!(1000.00));
        assert_eq!(result.band, "tier_1");
    }

    #[test]
    fn flat_rate_rejects_negative_income() {
        assert!(matches!(
            compute_hecs(&hecs_table(), dec!(-5)),
            Err(TaxError::InvalidInput(_))
        ));
    }

    // =========================================================================
    // properties
    // =========================================================================

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_income_tax_is_monotonic(
            income in 0u32..400_000,
            step in 1u32..5_000,
        ) {
            let table = resident_2022_table();
            let lower = compute_income_tax(&table, Decimal::from(income)).unwrap();
            let higher = compute_income_tax(&table, Decimal::from(income + step)).unwrap();

            prop_assert!(higher.total_tax >= lower.total_tax);
        }

        #[test]
        fn prop_income_tax_has_no_cliff_at_boundaries(index in 0usize..4) {
            let table = resident_2022_table();
            let band = &table.bands()[index];
            let Some(max) = band.max_income else {
                unreachable!("only the last band is open");
            };

            let at_max = compute_income_tax(&table, max).unwrap();
            let next = compute_income_tax(&table, max + Decimal::ONE).unwrap();
            let step = next.total_tax - at_max.total_tax;

            prop_assert!(step >= Decimal::ZERO);
            prop_assert!(step <= band.tax_rate);
        }
    }
}
