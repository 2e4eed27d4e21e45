use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::FinanceHubError;
use crate::types::{checked_sum, round_display, with_metadata, ComputationOutput, Money, Percent};
use crate::FinanceHubResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A position in a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub shares: Decimal,
    /// Average cost per share
    pub purchase_price: Money,
    pub current_price: Money,
}

impl Holding {
    pub fn current_value(&self) -> FinanceHubResult<Money> {
        self.shares
            .checked_mul(self.current_price)
            .ok_or_else(|| FinanceHubError::overflow(format!("{} current value", self.symbol)))
    }

    pub fn purchase_value(&self) -> FinanceHubResult<Money> {
        self.shares
            .checked_mul(self.purchase_price)
            .ok_or_else(|| FinanceHubError::overflow(format!("{} purchase value", self.symbol)))
    }

    /// Reject holdings with negative share counts or prices.
    pub fn validate(&self) -> FinanceHubResult<()> {
        if self.shares < Decimal::ZERO {
            return Err(FinanceHubError::invalid(
                "shares",
                format!("{}: share count cannot be negative", self.symbol),
            ));
        }
        if self.purchase_price < Decimal::ZERO {
            return Err(FinanceHubError::invalid(
                "purchase_price",
                format!("{}: purchase price cannot be negative", self.symbol),
            ));
        }
        if self.current_price < Decimal::ZERO {
            return Err(FinanceHubError::invalid(
                "current_price",
                format!("{}: current price cannot be negative", self.symbol),
            ));
        }
        Ok(())
    }
}

/// Market value against cost for one holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainLossResult {
    pub current_value: Money,
    pub purchase_value: Money,
    pub gain_loss: Money,
    pub gain_loss_percent: Percent,
    /// True when gain_loss >= 0; a flat position counts as a gain
    pub is_gain: bool,
}

/// Per-holding line of a portfolio summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingPerformance {
    pub symbol: String,
    pub name: String,
    #[serde(flatten)]
    pub performance: GainLossResult,
}

/// Portfolio totals.
///
/// `average_gain_loss_percent` is a simple (equal-weighted) mean of the
/// per-holding percentages: a 10-share position moves it as much as a
/// 10,000-share one. `cost_basis_growth_percent` is the value-weighted
/// figure, total gain over total cost. They are different numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<HoldingPerformance>,
    pub holding_count: usize,
    pub total_current_value: Money,
    pub total_purchase_value: Money,
    pub total_gain_loss: Money,
    pub average_gain_loss_percent: Percent,
    pub cost_basis_growth_percent: Percent,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Unrounded figures, so aggregates do not accumulate display rounding.
struct RawGainLoss {
    current_value: Money,
    purchase_value: Money,
    gain_loss: Money,
    percent: Percent,
}

fn percent_of(part: Money, whole: Money) -> FinanceHubResult<Percent> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| FinanceHubError::overflow("gain/loss percent"))
}

fn raw_gain_loss(holding: &Holding) -> FinanceHubResult<RawGainLoss> {
    holding.validate()?;
    let current_value = holding.current_value()?;
    let purchase_value = holding.purchase_value()?;
    let gain_loss = current_value - purchase_value;
    Ok(RawGainLoss {
        current_value,
        purchase_value,
        gain_loss,
        percent: percent_of(gain_loss, purchase_value)?,
    })
}

impl From<&RawGainLoss> for GainLossResult {
    fn from(raw: &RawGainLoss) -> Self {
        GainLossResult {
            current_value: round_display(raw.current_value),
            purchase_value: round_display(raw.purchase_value),
            gain_loss: round_display(raw.gain_loss),
            gain_loss_percent: round_display(raw.percent),
            is_gain: raw.gain_loss >= Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Current value, cost and signed gain of a single holding.
pub fn compute_gain_loss(holding: &Holding) -> FinanceHubResult<GainLossResult> {
    let raw = raw_gain_loss(holding)?;
    Ok(GainLossResult::from(&raw))
}

/// Totals across holdings; see [`PortfolioSummary`] for the two percentages.
pub fn aggregate_gain_loss(holdings: &[Holding]) -> FinanceHubResult<PortfolioSummary> {
    let raws = holdings
        .iter()
        .map(raw_gain_loss)
        .collect::<FinanceHubResult<Vec<_>>>()?;

    let total_current_value = checked_sum(raws.iter().map(|r| r.current_value), "total current value")?;
    let total_purchase_value = checked_sum(raws.iter().map(|r| r.purchase_value), "total purchase value")?;
    let total_gain_loss = total_current_value - total_purchase_value;

    let average_gain_loss_percent = if raws.is_empty() {
        Decimal::ZERO
    } else {
        checked_sum(raws.iter().map(|r| r.percent), "sum of gain/loss percents")?
            / Decimal::from(raws.len() as i64)
    };
    let cost_basis_growth_percent = percent_of(total_gain_loss, total_purchase_value)?;

    debug!(
        holdings = raws.len(),
        %total_current_value,
        %total_gain_loss,
        "aggregated portfolio gain/loss"
    );

    let lines = holdings
        .iter()
        .zip(raws.iter())
        .map(|(h, raw)| HoldingPerformance {
            symbol: h.symbol.clone(),
            name: h.name.clone(),
            performance: GainLossResult::from(raw),
        })
        .collect();

    Ok(PortfolioSummary {
        holdings: lines,
        holding_count: raws.len(),
        total_current_value: round_display(total_current_value),
        total_purchase_value: round_display(total_purchase_value),
        total_gain_loss: round_display(total_gain_loss),
        average_gain_loss_percent: round_display(average_gain_loss_percent),
        cost_basis_growth_percent: round_display(cost_basis_growth_percent),
    })
}

/// Enveloped single-holding analysis.
pub fn analyze_holding(holding: &Holding) -> FinanceHubResult<ComputationOutput<GainLossResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = compute_gain_loss(holding)?;

    if holding.purchase_value()?.is_zero() {
        warnings.push(format!("{}: zero cost basis, gain/loss percent reported as 0", holding.symbol));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Unrealised gain/loss (shares x current price vs shares x purchase price)",
        &serde_json::json!({
            "symbol": holding.symbol,
            "shares": holding.shares.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Enveloped portfolio summary.
pub fn summarize_portfolio(holdings: &[Holding]) -> FinanceHubResult<ComputationOutput<PortfolioSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = aggregate_gain_loss(holdings)?;

    if holdings.is_empty() {
        warnings.push("Empty portfolio: all totals are zero".into());
    } else if summary.average_gain_loss_percent != summary.cost_basis_growth_percent {
        warnings.push(
            "average_gain_loss_percent is an equal-weighted mean of holdings and differs from \
             the value-weighted cost_basis_growth_percent"
                .into(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio gain/loss (sums of values; equal-weighted mean and cost-basis growth percentages)",
        &serde_json::json!({
            "holdings": holdings.len(),
            "average_percent_weighting": "equal",
        }),
        warnings,
        elapsed,
        summary,
    ))
}
