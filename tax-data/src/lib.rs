//! Loading for the tax calculator: YAML tax rates and Schedule 1
//! documents, CSV individuals, and logging setup for the `ato-calc` binary.

pub mod individuals;
pub mod loader;
pub mod logging;
mod yaml;

pub use individuals::{load_individuals, parse_individuals};
pub use loader::{
    BandRecord, CoefficientRecord, ConfigPaths, LoaderError, ScaleRecord, Schedule1Loader,
    Schedule1Record, TaxRatesLoader, TaxRatesRecord,
};
pub use logging::init_logging;
pub use yaml::{OrderedMap, UpperBound};
