use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{
    ClaimStatus, EarningsThreshold, EligibilityProfile, FinancialYearTaxData, InMemoryRepository,
    ResidentTaxStatus, Schedule1FinancialYear, TaxBand, TaxCategory, TaxError, TaxTable,
    WithholdingScale,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::yaml::{OrderedMap, UpperBound, deserialize_optional_string};

/// Errors that can occur when loading tax configuration.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tax data: {0}")]
    Invalid(#[from] TaxError),

    /// `row` is 1-based, not counting the header.
    #[error("invalid individual on row {row}: {source}")]
    InvalidIndividual {
        row: usize,
        #[source]
        source: TaxError,
    },

    #[error(
        "schedule 1 for {financial_year} is the same as {comparison}, but {comparison} is not defined"
    )]
    ComparisonYearNotFound {
        financial_year: String,
        comparison: String,
    },
}

impl From<serde_yml::Error> for LoaderError {
    fn from(err: serde_yml::Error) -> Self {
        LoaderError::Yaml(err.to_string())
    }
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

pub(crate) fn open(path: &Path) -> Result<File, LoaderError> {
    File::open(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ============================================================================
// Tax rates document
// ============================================================================

/// One band as written in the tax rates document.
///
/// `max_income` may be a number, `.inf`, `inf`, `infinity` or null; all but
/// a number mean the band has no ceiling.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BandRecord {
    pub min_income: Decimal,
    pub max_income: UpperBound,
    pub tax_rate: Decimal,
}

/// One financial year entry of the tax rates document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxRatesRecord {
    pub financial_year: String,
    pub income_tax_bands: OrderedMap<String, BandRecord>,
    pub medicare_levy: OrderedMap<String, BandRecord>,
    pub medicare_levy_surcharge: OrderedMap<String, BandRecord>,
    #[serde(rename = "HECS", alias = "hecs")]
    pub hecs: OrderedMap<String, BandRecord>,
}

impl TaxRatesRecord {
    /// Validates the four tables and groups them for the core.
    pub fn into_tax_data(self) -> Result<FinancialYearTaxData, TaxError> {
        let fy = self.financial_year;
        let income_tax = build_table(&fy, TaxCategory::IncomeTax, self.income_tax_bands)?;
        let levy = build_table(&fy, TaxCategory::MedicareLevy, self.medicare_levy)?;
        let surcharge = build_table(
            &fy,
            TaxCategory::MedicareLevySurcharge,
            self.medicare_levy_surcharge,
        )?;
        let hecs = build_table(&fy, TaxCategory::Hecs, self.hecs)?;

        FinancialYearTaxData::new(fy, income_tax, levy, surcharge, hecs)
    }
}

fn build_table(
    financial_year: &str,
    category: TaxCategory,
    bands: OrderedMap<String, BandRecord>,
) -> Result<TaxTable, TaxError> {
    let bands = bands
        .into_inner()
        .into_iter()
        .map(|(name, band)| {
            TaxBand::new(name, band.min_income, band.max_income.0, band.tax_rate)
        })
        .collect();

    TaxTable::new(financial_year, category, bands)
}

/// Loader for the tax rates document (income tax, Medicare levy, Medicare
/// levy surcharge and HECS bands per financial year).
///
/// The document is a mapping of entry names to [`TaxRatesRecord`]s. Entry
/// names are labels only; each entry carries its own `financial_year`.
pub struct TaxRatesLoader;

impl TaxRatesLoader {
    /// Parse tax rates records from a YAML reader, in document order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxRatesRecord>, LoaderError> {
        let document: Option<OrderedMap<String, TaxRatesRecord>> =
            serde_yml::from_reader(reader)?;

        Ok(document
            .unwrap_or_default()
            .into_inner()
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Validate parsed records into per-year tax data.
    pub fn load(records: Vec<TaxRatesRecord>) -> Result<Vec<FinancialYearTaxData>, LoaderError> {
        records
            .into_iter()
            .map(|record| {
                debug!(financial_year = %record.financial_year, "building tax tables");
                record.into_tax_data().map_err(LoaderError::from)
            })
            .collect()
    }

    /// Parse and validate the document at `path`.
    pub fn load_path(path: &Path) -> Result<Vec<FinancialYearTaxData>, LoaderError> {
        let records = Self::parse(open(path)?)?;
        let data = Self::load(records)?;
        info!(path = %path.display(), years = data.len(), "loaded tax rates");
        Ok(data)
    }
}

// ============================================================================
// Schedule 1 withholding document
// ============================================================================

/// The `a` and `b` coefficients of a withholding formula `a * x - b`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct CoefficientRecord {
    pub a: Decimal,
    pub b: Decimal,
}

/// One named scale in a Schedule 1 entry.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScaleRecord {
    pub tfn_provided: bool,
    pub resident_tax_status: ResidentTaxStatus,
    pub tax_free_threshold: ClaimStatus,
    pub full_medicare_levy_exemption: ClaimStatus,
    pub half_medicare_levy_exemption: ClaimStatus,
    pub weekly_earnings_less_than_thresholds: OrderedMap<UpperBound, CoefficientRecord>,
}

impl ScaleRecord {
    fn into_scale(
        self,
        name: String,
    ) -> Result<WithholdingScale, TaxError> {
        let eligibility = EligibilityProfile {
            tfn_provided: self.tfn_provided,
            resident_tax_status: self.resident_tax_status,
            tax_free_threshold: self.tax_free_threshold,
            full_medicare_levy_exemption: self.full_medicare_levy_exemption,
            half_medicare_levy_exemption: self.half_medicare_levy_exemption,
        };
        let thresholds = self
            .weekly_earnings_less_than_thresholds
            .into_inner()
            .into_iter()
            .map(|(bound, c)| EarningsThreshold::new(bound.0, c.a, c.b))
            .collect();

        WithholdingScale::new(name, eligibility, thresholds)
    }
}

/// One financial year entry of the Schedule 1 document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Schedule1Record {
    pub document: String,
    pub financial_year: String,
    #[serde(default)]
    pub same_as_other_financial_year: bool,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub financial_year_for_comparison: Option<String>,
    #[serde(default)]
    pub scales: Option<OrderedMap<String, ScaleRecord>>,
}

impl Schedule1Record {
    fn into_schedule(self) -> Result<Schedule1FinancialYear, TaxError> {
        let scales = self
            .scales
            .unwrap_or_default()
            .into_inner()
            .into_iter()
            .map(|(name, scale)| scale.into_scale(name))
            .collect::<Result<Vec<_>, _>>()?;

        if scales.is_empty() && !self.same_as_other_financial_year {
            return Err(TaxError::Configuration(format!(
                "schedule 1 for {} defines no scales",
                self.financial_year
            )));
        }

        Schedule1FinancialYear::new(
            self.document,
            self.financial_year,
            self.same_as_other_financial_year,
            self.financial_year_for_comparison,
            scales,
        )
    }
}

fn needs_inherited_scales(schedule: &Schedule1FinancialYear) -> bool {
    schedule.same_as_other_financial_year && schedule.scales().is_empty()
}

/// Fills in the scales of every year declared the same as another year,
/// following chains of such declarations.
fn resolve_inherited_scales(schedules: &mut [Schedule1FinancialYear]) -> Result<(), LoaderError> {
    loop {
        let mut pending = Vec::new();
        let mut progressed = false;

        for i in 0..schedules.len() {
            if !needs_inherited_scales(&schedules[i]) {
                continue;
            }

            let financial_year = schedules[i].financial_year.clone();
            let Some(comparison) = schedules[i].financial_year_for_comparison.clone() else {
                return Err(TaxError::Configuration(format!(
                    "schedule 1 for {financial_year} is marked the same as another year \
                     but has no financial_year_for_comparison"
                ))
                .into());
            };
            let Some(source) = schedules
                .iter()
                .position(|s| s.financial_year == comparison)
            else {
                return Err(LoaderError::ComparisonYearNotFound {
                    financial_year,
                    comparison,
                });
            };

            if needs_inherited_scales(&schedules[source]) {
                pending.push(financial_year);
                continue;
            }

            let scales = schedules[source].scales().to_vec();
            if scales.is_empty() {
                return Err(TaxError::Configuration(format!(
                    "schedule 1 for {financial_year} copies {comparison}, which has no scales"
                ))
                .into());
            }

            debug!(
                financial_year = %financial_year,
                comparison = %comparison,
                scales = scales.len(),
                "inheriting schedule 1 scales"
            );
            schedules[i].inherit_scales(scales);
            progressed = true;
        }

        if pending.is_empty() {
            return Ok(());
        }
        if !progressed {
            return Err(TaxError::Configuration(format!(
                "schedule 1 years {} copy each other in a cycle",
                pending.join(", ")
            ))
            .into());
        }
    }
}

/// Loader for the Schedule 1 PAYG withholding document.
pub struct Schedule1Loader;

impl Schedule1Loader {
    /// Parse Schedule 1 records from a YAML reader, in document order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Schedule1Record>, LoaderError> {
        let document: Option<OrderedMap<String, Schedule1Record>> =
            serde_yml::from_reader(reader)?;

        Ok(document
            .unwrap_or_default()
            .into_inner()
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Validate parsed records and resolve years that reuse another year's
    /// scales.
    ///
    /// A year with `same_as_other_financial_year: true` and no scales of its
    /// own takes the scales of `financial_year_for_comparison`. If it does
    /// list scales, those are used as written.
    pub fn load(records: Vec<Schedule1Record>) -> Result<Vec<Schedule1FinancialYear>, LoaderError> {
        let mut schedules = records
            .into_iter()
            .map(Schedule1Record::into_schedule)
            .collect::<Result<Vec<_>, _>>()?;

        resolve_inherited_scales(&mut schedules)?;

        Ok(schedules)
    }

    /// Parse and validate the document at `path`.
    pub fn load_path(path: &Path) -> Result<Vec<Schedule1FinancialYear>, LoaderError> {
        let records = Self::parse(open(path)?)?;
        let schedules = Self::load(records)?;
        info!(path = %path.display(), years = schedules.len(), "loaded schedule 1");
        Ok(schedules)
    }
}

/// Paths to the two configuration documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub tax_rates: PathBuf,
    pub schedule_1: PathBuf,
}

impl ConfigPaths {
    pub fn new(
        tax_rates: impl Into<PathBuf>,
        schedule_1: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tax_rates: tax_rates.into(),
            schedule_1: schedule_1.into(),
        }
    }

    /// Load both documents into a repository ready for calculation.
    ///
    /// Any failure is returned; a repository is only produced when every
    /// year in both documents loaded cleanly.
    pub fn load_repository(&self) -> Result<InMemoryRepository, LoaderError> {
        let tax_years = TaxRatesLoader::load_path(&self.tax_rates)?;
        let schedules = Schedule1Loader::load_path(&self.schedule_1)?;
        Ok(InMemoryRepository::from_parts(tax_years, schedules)?)
    }
}
