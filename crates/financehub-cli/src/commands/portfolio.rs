use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use financehub_core::portfolio::classification::AssetClassifier;
use financehub_core::portfolio::{allocation, gain_loss, positions, Holding};

use crate::config::AppConfig;
use crate::input;

/// Arguments describing a single holding
#[derive(Args)]
pub struct GainLossArgs {
    /// Path to JSON/YAML holding file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Ticker symbol
    #[arg(long, default_value = "")]
    pub symbol: String,

    /// Instrument name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Number of shares held
    #[arg(long)]
    pub shares: Option<Decimal>,

    /// Average purchase price per share
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Current market price per share
    #[arg(long)]
    pub current_price: Option<Decimal>,
}

/// Arguments for commands over a holdings file
#[derive(Args)]
pub struct HoldingsArgs {
    /// Path to a JSON/YAML holdings array (or object with a `holdings` key)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for classifying one instrument
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ClassifyArgs {
    /// Ticker symbol
    #[arg(long)]
    pub symbol: String,

    /// Instrument name
    #[arg(long, default_value = "")]
    pub name: String,
}

/// Arguments for a purchase
#[derive(Args)]
pub struct BuyArgs {
    /// Existing position file; omit to open a new position
    #[arg(long)]
    pub holding: Option<String>,

    /// Ticker symbol (for a new position)
    #[arg(long, default_value = "")]
    pub symbol: String,

    /// Instrument name (for a new position)
    #[arg(long, default_value = "")]
    pub name: String,

    /// Shares bought
    #[arg(long)]
    pub shares: Decimal,

    /// Price paid per share
    #[arg(long)]
    pub price: Decimal,
}

/// Arguments for a sale
#[derive(Args)]
pub struct SellArgs {
    /// Position file to sell from
    #[arg(long)]
    pub holding: String,

    /// Shares sold
    #[arg(long)]
    pub shares: Decimal,

    /// Price received per share
    #[arg(long)]
    pub price: Decimal,
}

pub fn run_gain_loss(args: GainLossArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let holding: Holding = match input::from_file_or_stdin(&args.input)? {
        Some(holding) => holding,
        None => Holding {
            symbol: args.symbol,
            name: args.name,
            shares: args.shares
                .ok_or("--shares is required (or provide --input)")?,
            purchase_price: args.purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?,
            current_price: args.current_price
                .ok_or("--current-price is required (or provide --input)")?,
        },
    };

    let result = gain_loss::analyze_holding(&holding)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_portfolio(args: HoldingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let holdings = input::holdings(&args.input)?;
    let result = gain_loss::summarize_portfolio(&holdings)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_allocation(args: HoldingsArgs, config: &AppConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let holdings = input::holdings(&args.input)?;
    let result = allocation::calculate_allocation(&holdings, &config.classification)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_classify(args: ClassifyArgs, config: &AppConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let classifier = &config.classification;
    let category = classifier.classify(&args.symbol, &args.name);
    let matched_rule = classifier.explicit_match(&args.symbol, &args.name).is_some();

    Ok(json!({
        "symbol": args.symbol,
        "name": args.name,
        "category": category,
        "color": allocation::color_token(category),
        "matched_rule": matched_rule,
    }))
}

pub fn run_buy(args: BuyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let existing: Option<Holding> = match args.holding {
        Some(ref path) => Some(input::file::read_document(path)?),
        None => None,
    };
    if existing.is_none() && args.symbol.is_empty() {
        return Err("--symbol is required when opening a new position (or provide --holding)".into());
    }

    let outcome = positions::apply_buy(existing.as_ref(), &args.symbol, &args.name, args.shares, args.price)?;
    Ok(serde_json::to_value(outcome)?)
}

pub fn run_sell(args: SellArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let holding: Holding = input::file::read_document(&args.holding)?;
    let outcome = positions::apply_sell(&holding, args.shares, args.price)?;
    Ok(serde_json::to_value(outcome)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_reports_fallback() {
        let config = AppConfig::default();
        let args = ClassifyArgs {
            symbol: "TEST".into(),
            name: "Test Company".into(),
        };
        let out = run_classify(args, &config).unwrap();
        assert_eq!(out["category"], "stocks");
        assert_eq!(out["matched_rule"], false);
    }

    #[test]
    fn test_classify_etf() {
        let config = AppConfig::default();
        let args = ClassifyArgs {
            symbol: "FTSE-MIB".into(),
            name: "FTSE MIB ETF".into(),
        };
        let out = run_classify(args, &config).unwrap();
        assert_eq!(out["category"], "etf");
        assert_eq!(out["color"], "#EF4444");
        assert_eq!(out["matched_rule"], true);
    }

    #[test]
    fn test_buy_requires_symbol_for_new_position() {
        let args = BuyArgs {
            holding: None,
            symbol: String::new(),
            name: String::new(),
            shares: Decimal::ONE,
            price: Decimal::ONE,
        };
        assert!(run_buy(args).is_err());
    }
}
