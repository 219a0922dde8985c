mod eligibility;
mod financial_year;
mod individual;
mod pay_period;
mod schedule_1;
mod tax_band;
mod tax_table;
mod withholding_scale;

pub use eligibility::{ClaimStatus, EligibilityProfile, ResidentTaxStatus};
pub use financial_year::FinancialYearTaxData;
pub use individual::IndividualProfile;
pub use pay_period::PayPeriod;
pub use schedule_1::Schedule1FinancialYear;
pub use tax_band::TaxBand;
pub use tax_table::{TaxCategory, TaxTable};
pub use withholding_scale::{EarningsThreshold, WithholdingScale};
