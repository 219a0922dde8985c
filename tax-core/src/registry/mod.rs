pub mod calculator;
pub mod repository;

pub use calculator::{TaxAssessment, TaxCalculator};
pub use repository::{InMemoryRepository, TaxRepository};
