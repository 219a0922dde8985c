pub mod calculations;
pub mod error;
pub mod models;
pub mod registry;

pub use error::TaxError;
pub use models::*;
pub use registry::{InMemoryRepository, TaxCalculator, TaxRepository};
