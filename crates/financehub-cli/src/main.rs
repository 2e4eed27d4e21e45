mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::investing::InvestArgs;
use commands::lending::{EligibilityArgs, LoanArgs, LoanCheckArgs};
use commands::portfolio::{BuyArgs, ClassifyArgs, GainLossArgs, HoldingsArgs, SellArgs};

/// Loan, investment and portfolio calculations for FinanceHub
#[derive(Parser)]
#[command(
    name = "fhub",
    version,
    about = "Loan, investment and portfolio calculations for FinanceHub",
    long_about = "A CLI over the FinanceHub calculation engine with decimal precision. \
                  Supports loan amortization, loan underwriting, savings projections, \
                  holding gain/loss, portfolio summaries and asset allocation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML file overriding lending policy and classification keywords
    #[arg(long, global = true, env = "FINANCEHUB_CONFIG")]
    config: Option<String>,

    /// Log calculation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment, total interest and total repaid for a fixed-rate loan
    Loan(LoanArgs),
    /// Check a loan amount against product limits and the income cap
    LoanCheck(LoanCheckArgs),
    /// Underwrite a loan application (DTI, income, employment, limits)
    LoanEligibility(EligibilityArgs),
    /// Project a savings plan with monthly contributions
    Invest(InvestArgs),
    /// Gain/loss of a single holding
    GainLoss(GainLossArgs),
    /// Gain/loss summary across a holdings file
    Portfolio(HoldingsArgs),
    /// Asset allocation across a holdings file
    Allocation(HoldingsArgs),
    /// Asset class of a symbol/name pair
    Classify(ClassifyArgs),
    /// Apply a purchase to a holding
    Buy(BuyArgs),
    /// Apply a sale to a holding
    Sell(SellArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("financehub_core=debug,fhub=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // stdout carries the result; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app_config = match config::AppConfig::resolve(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::lending::run_loan(args),
        Commands::LoanCheck(args) => commands::lending::run_loan_check(args, &app_config),
        Commands::LoanEligibility(args) => commands::lending::run_eligibility(args, &app_config),
        Commands::Invest(args) => commands::investing::run_invest(args),
        Commands::GainLoss(args) => commands::portfolio::run_gain_loss(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Allocation(args) => commands::portfolio::run_allocation(args, &app_config),
        Commands::Classify(args) => commands::portfolio::run_classify(args, &app_config),
        Commands::Buy(args) => commands::portfolio::run_buy(args),
        Commands::Sell(args) => commands::portfolio::run_sell(args),
        Commands::Version => {
            println!("fhub {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!("command completed");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
