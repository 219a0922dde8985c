//! Locating bands within a [`TaxTable`].

use rust_decimal::Decimal;
use tracing::debug;

use crate::{TaxBand, TaxError, TaxTable};

/// Returns the first band, in configured order, whose inclusive range
/// contains `income`.
///
/// # Errors
///
/// - [`TaxError::InvalidInput`] if `income` is negative.
/// - [`TaxError::Configuration`] if no band contains `income`. A table
///   whose top band is bounded, or whose bands leave a gap, will hit this.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::find_containing_band;
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
/// let band = find_containing_band(&table, dec!(45000)).unwrap();
/// assert_eq!(band.name, "B");
/// assert_eq!(band.tax_rate, dec!(0.19));
/// ```
pub fn find_containing_band(
    table: &TaxTable,
    income: Decimal,
) -> Result<&TaxBand, TaxError> {
    if income < Decimal::ZERO {
        return Err(TaxError::negative_amount("income", income));
    }

    let band = table
        .bands()
        .iter()
        .find(|band| band.contains(income))
        .ok_or_else(|| {
            TaxError::Configuration(format!(
                "no {} band for {} contains income {}",
                table.category(),
                table.financial_year(),
                income
            ))
        })?;

    debug!(
        category = %table.category(),
        financial_year = table.financial_year(),
        income = %income,
        band = band.name.as_str(),
        rate = %band.tax_rate,
        "resolved band"
    );

    Ok(band)
}

/// Returns every band lying entirely below `income`, ascending by
/// minimum income.
pub fn find_lower_bands(
    table: &TaxTable,
    income: Decimal,
) -> Vec<&TaxBand> {
    let mut lower: Vec<&TaxBand> = table
        .bands()
        .iter()
        .filter(|band| band.is_below(income))
        .collect();
    lower.sort_by_key(|band| band.min_income);
    lower
}
