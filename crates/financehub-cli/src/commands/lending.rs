use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use financehub_core::lending::amortization::{self, LoanRequest};
use financehub_core::lending::application::{self, LoanApplication, LoanType};
use financehub_core::FinanceHubError;

use crate::config::AppConfig;
use crate::input;

/// Arguments for a fixed-rate loan calculation
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (0.0525 = 5.25%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long, conflicts_with = "term_years")]
    pub term_months: Option<u32>,

    /// Term in whole years (converted to months)
    #[arg(long)]
    pub term_years: Option<u32>,
}

/// Arguments for checking a loan amount against product limits
#[derive(Args)]
pub struct LoanCheckArgs {
    /// Loan product: personal, auto, mortgage or business
    #[arg(long)]
    pub loan_type: String,

    /// Requested amount
    #[arg(long)]
    pub amount: Decimal,

    /// Applicant's gross monthly income
    #[arg(long)]
    pub monthly_income: Decimal,
}

/// Arguments for underwriting a loan application
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON/YAML application file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan product: personal, auto, mortgage or business
    #[arg(long)]
    pub loan_type: Option<String>,

    /// Requested amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Gross annual income
    #[arg(long)]
    pub annual_income: Option<Decimal>,

    /// Employment status (employed, self_employed, ...)
    #[arg(long)]
    pub employment_status: Option<String>,

    /// Term in months (defaults to the product term)
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Monthly debt service already being paid
    #[arg(long, default_value = "0")]
    pub existing_monthly_debt: Decimal,
}

fn term_from_args(args: &LoanArgs) -> Result<u32, Box<dyn std::error::Error>> {
    match (args.term_months, args.term_years) {
        (Some(months), _) => Ok(months),
        (None, Some(years)) => years
            .checked_mul(12)
            .ok_or_else(|| "--term-years is too large".into()),
        (None, None) => Err("--term-months or --term-years is required (or provide --input)".into()),
    }
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest = match input::from_file_or_stdin(&args.input)? {
        Some(request) => request,
        None => LoanRequest {
            principal: args.principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_interest_rate: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            term_months: term_from_args(&args)?,
        },
    };

    let result = amortization::calculate_loan(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Reports `{valid, error}` rather than failing, so scripts can branch on it.
pub fn run_loan_check(args: LoanCheckArgs, config: &AppConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let checked = args
        .loan_type
        .parse::<LoanType>()
        .and_then(|loan_type| {
            application::validate_amount(loan_type, args.amount, args.monthly_income, &config.lending)
        });

    Ok(match checked {
        Ok(()) => json!({ "valid": true, "error": null }),
        Err(e) => json!({ "valid": false, "error": reason_of(&e) }),
    })
}

fn reason_of(err: &FinanceHubError) -> String {
    match err {
        FinanceHubError::InvalidInput { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

pub fn run_eligibility(args: EligibilityArgs, config: &AppConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let app: LoanApplication = match input::from_file_or_stdin(&args.input)? {
        Some(app) => app,
        None => LoanApplication {
            loan_type: args.loan_type
                .ok_or("--loan-type is required (or provide --input)")?
                .parse()?,
            amount: args.amount
                .ok_or("--amount is required (or provide --input)")?,
            annual_income: args.annual_income
                .ok_or("--annual-income is required (or provide --input)")?,
            employment_status: args.employment_status
                .ok_or("--employment-status is required (or provide --input)")?,
            term_months: args.term_months,
            existing_monthly_debt: args.existing_monthly_debt,
        },
    };

    let result = application::evaluate_application(&app, &config.lending)?;
    Ok(serde_json::to_value(result)?)
}
