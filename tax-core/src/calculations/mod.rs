//! Tax calculations over loaded band tables and withholding scales.
//!
//! Everything here is a pure function of its arguments. The registry in
//! [`crate::registry`] looks tables up by financial year and calls into
//! these functions.

pub mod band_resolver;
pub mod common;
pub mod progressive;
pub mod withholding;

pub use band_resolver::{find_containing_band, find_lower_bands};
pub use progressive::{
    BandTax, FlatRateResult, IncomeTaxResult, compute_hecs, compute_income_tax,
    compute_medicare_levy, compute_medicare_levy_surcharge,
};
pub use withholding::{
    WithholdingSummary, calculate_withholding, normalize_to_weekly, select_scale,
    weekly_to_period,
};
