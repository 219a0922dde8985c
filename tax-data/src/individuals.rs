//! CSV loader for the people whose tax is calculated.
//!
//! Headers are matched by name, so column order does not matter. Only
//! `name` and `salary` are required; an empty or missing eligibility column
//! takes the [`IndividualProfile::new`] default.
//!
//! | Column                         | Type    | Default       |
//! |--------------------------------|---------|---------------|
//! | `name`                         | string  |               |
//! | `salary`                       | decimal |               |
//! | `has_private_health`           | bool    | `false`       |
//! | `has_hecs`                     | bool    | `false`       |
//! | `tfn_provided`                 | bool    | `true`        |
//! | `resident_tax_status`          | string  | `resident`    |
//! | `tax_free_threshold`           | string  | `claimed`     |
//! | `full_medicare_levy_exemption` | string  | `not_claimed` |
//! | `half_medicare_levy_exemption` | string  | `not_claimed` |
//!
//! ```csv
//! name,salary,has_private_health,has_hecs,tax_free_threshold
//! Fred,76534,true,false,claimed
//! Wilma,45000,,true,not claimed
//! ```
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{ClaimStatus, IndividualProfile, ResidentTaxStatus};

use crate::loader::{LoaderError, open};

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    salary: Decimal,
    has_private_health: Option<bool>,
    has_hecs: Option<bool>,
    tfn_provided: Option<bool>,
    resident_tax_status: Option<ResidentTaxStatus>,
    tax_free_threshold: Option<ClaimStatus>,
    full_medicare_levy_exemption: Option<ClaimStatus>,
    half_medicare_levy_exemption: Option<ClaimStatus>,
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<IndividualProfile, LoaderError> {
    let mut individual = IndividualProfile::new(row.name, row.salary).map_err(|source| {
        LoaderError::InvalidIndividual {
            row: row_number,
            source,
        }
    })?;

    individual.set_has_private_health(row.has_private_health.unwrap_or(false));
    individual.set_has_hecs(row.has_hecs.unwrap_or(false));
    if let Some(tfn_provided) = row.tfn_provided {
        individual.tfn_provided = tfn_provided;
    }
    if let Some(status) = row.resident_tax_status {
        individual.resident_tax_status = status;
    }
    if let Some(claim) = row.tax_free_threshold {
        individual.tax_free_threshold = claim;
    }
    if let Some(claim) = row.full_medicare_levy_exemption {
        individual.full_medicare_levy_exemption = claim;
    }
    if let Some(claim) = row.half_medicare_levy_exemption {
        individual.half_medicare_levy_exemption = claim;
    }

    Ok(individual)
}

/// Parse individuals from CSV, in file order.
///
/// # Errors
///
/// * [`LoaderError::CsvParse`] if the CSV is malformed or a cell has the
///   wrong type.
/// * [`LoaderError::InvalidIndividual`] if a row has a negative salary.
pub fn parse_individuals<R: Read>(reader: R) -> Result<Vec<IndividualProfile>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Read the CSV file at `path` and delegate to [`parse_individuals`].
pub fn load_individuals(path: &Path) -> Result<Vec<IndividualProfile>, LoaderError> {
    parse_individuals(open(path)?)
}
