use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use financehub_core::investing::projection::{self, InvestmentRequest};

use crate::input;

/// Arguments for a savings-plan projection
#[derive(Args)]
pub struct InvestArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Initial lump sum
    #[arg(long, default_value = "0")]
    pub initial: Decimal,

    /// Contribution added at the end of every month
    #[arg(long, default_value = "0")]
    pub monthly: Decimal,

    /// Expected annual return as a decimal (0.07 = 7%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Horizon in whole years
    #[arg(long)]
    pub years: Option<u32>,
}

pub fn run_invest(args: InvestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: InvestmentRequest = match input::from_file_or_stdin(&args.input)? {
        Some(request) => request,
        None => InvestmentRequest {
            initial_investment: args.initial,
            monthly_contribution: args.monthly,
            annual_return_rate: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            years: args.years
                .ok_or("--years is required (or provide --input)")?,
        },
    };

    let result = projection::project_investment(&request)?;
    Ok(serde_json::to_value(result)?)
}
