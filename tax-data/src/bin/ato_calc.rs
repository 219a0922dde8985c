use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tax_core::{
    ClaimStatus, IndividualProfile, PayPeriod, ResidentTaxStatus, TaxCalculator, TaxRepository,
};
use tax_data::{ConfigPaths, init_logging, load_individuals};
use tracing::debug;

/// Australian income tax, Medicare levy, HECS and PAYG withholding
/// calculator.
///
/// Reads a tax rates document and a Schedule 1 withholding document (both
/// YAML) and reports for one person given on the command line or for every
/// person in a CSV file.
#[derive(Debug, Parser)]
#[command(name = "ato-calc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the tax rates YAML document
    #[arg(long, default_value = "config_files/tax_rates.yaml")]
    rates: PathBuf,

    /// Path to the Schedule 1 withholding YAML document
    #[arg(long = "schedule-1", default_value = "config_files/schedule_1_withholding.yaml")]
    schedule_1: PathBuf,

    /// Financial year to calculate for
    #[arg(short = 'y', long, default_value = "2022-2023")]
    financial_year: String,

    /// Log level or EnvFilter directive; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Annual liability: income tax, Medicare levy, surcharge and HECS
    Assess(IndividualArgs),

    /// PAYG withholding on salary, or on a single payment with --amount
    Withhold {
        #[command(flatten)]
        individual: IndividualArgs,

        /// A single payment to withhold from, instead of the annual salary
        #[arg(long)]
        amount: Option<Decimal>,

        /// How often --amount is paid
        #[arg(long, default_value = "weekly")]
        period: PayPeriod,

        /// Allowances added to a monthly, quarterly or annual --amount
        #[arg(long, default_value = "0")]
        allowances: Decimal,
    },

    /// List the financial years present in the loaded documents
    Years,
}

#[derive(Debug, Args)]
struct IndividualArgs {
    /// CSV file of individuals; replaces the single-person flags below
    #[arg(long, conflicts_with_all = ["salary", "name"])]
    individuals: Option<PathBuf>,

    /// Name to report under
    #[arg(long, default_value = "individual")]
    name: String,

    /// Annual salary
    #[arg(long, required_unless_present = "individuals")]
    salary: Option<Decimal>,

    /// Holds private health cover (no Medicare levy surcharge)
    #[arg(long)]
    private_health: bool,

    /// Has a HECS/HELP debt
    #[arg(long)]
    hecs: bool,

    /// No tax file number has been provided
    #[arg(long)]
    no_tfn: bool,

    /// resident, foreign_resident or working_holiday_maker
    #[arg(long, default_value = "resident")]
    residency: ResidentTaxStatus,

    /// claimed or not_claimed
    #[arg(long, default_value = "claimed")]
    tax_free_threshold: ClaimStatus,

    /// claimed or not_claimed
    #[arg(long, default_value = "not_claimed")]
    full_medicare_exemption: ClaimStatus,

    /// claimed or not_claimed
    #[arg(long, default_value = "not_claimed")]
    half_medicare_exemption: ClaimStatus,
}

impl IndividualArgs {
    fn individuals(&self) -> Result<Vec<IndividualProfile>> {
        if let Some(path) = &self.individuals {
            return load_individuals(path)
                .with_context(|| format!("Failed to load individuals: {}", path.display()));
        }

        let Some(salary) = self.salary else {
            bail!("either --salary or --individuals is required");
        };
        let mut individual = IndividualProfile::new(self.name.clone(), salary)?;
        individual.set_has_private_health(self.private_health);
        individual.set_has_hecs(self.hecs);
        individual.tfn_provided = !self.no_tfn;
        individual.resident_tax_status = self.residency;
        individual.tax_free_threshold = self.tax_free_threshold;
        individual.full_medicare_levy_exemption = self.full_medicare_exemption;
        individual.half_medicare_levy_exemption = self.half_medicare_exemption;
        Ok(vec![individual])
    }
}

fn print_assessment(
    calculator: &TaxCalculator<'_>,
    individual: &IndividualProfile,
    financial_year: &str,
) -> Result<()> {
    let assessment = calculator
        .assess(individual, financial_year)
        .with_context(|| format!("Failed to assess {}", individual.name))?;

    println!(
        "{} ({}), taxable income {}",
        individual.name, financial_year, assessment.taxable_income
    );
    for band in &assessment.income_tax.breakdown {
        println!(
            "  {:<24} {:>12} @ {:<6} = {:>12}",
            band.band,
            band.taxed_income,
            band.rate,
            band.tax.round_dp(2)
        );
    }
    println!(
        "  income tax          {:>12}",
        assessment.income_tax.total_tax.round_dp(2)
    );
    println!(
        "  medicare levy       {:>12}",
        assessment.medicare_levy.amount.round_dp(2)
    );
    if let Some(surcharge) = &assessment.medicare_levy_surcharge {
        println!("  medicare surcharge  {:>12}", surcharge.amount.round_dp(2));
    }
    if let Some(hecs) = &assessment.hecs {
        println!("  HECS repayment      {:>12}", hecs.amount.round_dp(2));
    }
    println!("  total               {:>12}", assessment.total_tax.round_dp(2));
    Ok(())
}

fn print_withholding(
    calculator: &TaxCalculator<'_>,
    individual: &IndividualProfile,
    financial_year: &str,
) -> Result<()> {
    let summary = calculator
        .compute_total_withheld(individual, financial_year)
        .with_context(|| format!("Failed to calculate withholding for {}", individual.name))?;

    println!(
        "{} ({}), scale {}, weekly earnings {}",
        individual.name, financial_year, summary.scale, summary.weekly_earnings
    );
    println!("  weekly       {:>10}", summary.weekly);
    println!("  fortnightly  {:>10}", summary.fortnightly);
    println!("  monthly      {:>10}", summary.monthly);
    println!("  quarterly    {:>10}", summary.quarterly);
    println!("  annual       {:>10}", summary.annual);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.log_file.as_deref())?;

    let paths = ConfigPaths::new(&cli.rates, &cli.schedule_1);
    let repo = paths
        .load_repository()
        .context("Failed to load tax configuration")?;
    debug!(years = ?repo.list_financial_years(), "configuration loaded");

    let calculator = TaxCalculator::new(&repo);
    let fy = cli.financial_year.as_str();

    match &cli.command {
        Command::Assess(args) => {
            for individual in args.individuals()? {
                print_assessment(&calculator, &individual, fy)?;
            }
        }
        Command::Withhold {
            individual: args,
            amount: None,
            ..
        } => {
            for individual in args.individuals()? {
                print_withholding(&calculator, &individual, fy)?;
            }
        }
        Command::Withhold {
            individual: args,
            amount: Some(amount),
            period,
            allowances,
        } => {
            for individual in args.individuals()? {
                let withheld = calculator
                    .withholding_for_period(&individual, fy, *amount, *period, *allowances)
                    .with_context(|| {
                        format!("Failed to calculate withholding for {}", individual.name)
                    })?;
                println!(
                    "{} ({}), {} payment of {} plus {} allowances: withhold {}",
                    individual.name, fy, period, amount, allowances, withheld
                );
            }
        }
        Command::Years => {
            for year in repo.list_financial_years() {
                println!("{year}");
            }
        }
    }

    Ok(())
}
