use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FinanceHubError;
use crate::portfolio::gain_loss::Holding;
use crate::types::Money;
use crate::FinanceHubResult;

/// Holding after a purchase and what the purchase cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyOutcome {
    pub holding: Holding,
    pub total_cost: Money,
}

/// What is left after a sale; `holding` is `None` once the position is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellOutcome {
    pub holding: Option<Holding>,
    pub proceeds: Money,
}

fn validate_trade(shares: Decimal, price: Money) -> FinanceHubResult<()> {
    if shares <= Decimal::ZERO {
        return Err(FinanceHubError::invalid("shares", "Shares must be positive"));
    }
    if price < Decimal::ZERO {
        return Err(FinanceHubError::invalid("price", "price cannot be negative"));
    }
    Ok(())
}

fn trade_value(shares: Decimal, price: Money, context: &str) -> FinanceHubResult<Money> {
    shares
        .checked_mul(price)
        .ok_or_else(|| FinanceHubError::overflow(context))
}

/// Add `shares` bought at `price`, opening the position if needed.
///
/// Adding to an existing position moves its purchase price to the
/// weighted-average cost of old and new shares.
pub fn apply_buy(
    existing: Option<&Holding>,
    symbol: &str,
    name: &str,
    shares: Decimal,
    price: Money,
) -> FinanceHubResult<BuyOutcome> {
    validate_trade(shares, price)?;
    let total_cost = trade_value(shares, price, "purchase cost")?;

    let holding = match existing {
        Some(current) => {
            current.validate()?;
            let new_shares = current
                .shares
                .checked_add(shares)
                .ok_or_else(|| FinanceHubError::overflow("position size"))?;
            let average_price = current
                .purchase_value()?
                .checked_add(total_cost)
                .and_then(|cost| cost.checked_div(new_shares))
                .ok_or_else(|| FinanceHubError::overflow("average purchase price"))?;
            Holding {
                symbol: current.symbol.clone(),
                name: current.name.clone(),
                shares: new_shares,
                purchase_price: average_price,
                current_price: price,
            }
        }
        None => Holding {
            symbol: symbol.to_string(),
            name: name.to_string(),
            shares,
            purchase_price: price,
            current_price: price,
        },
    };

    debug!(symbol = %holding.symbol, %shares, %price, "applied buy");
    Ok(BuyOutcome { holding, total_cost })
}

/// Remove `shares` sold at `price`.
pub fn apply_sell(holding: &Holding, shares: Decimal, price: Money) -> FinanceHubResult<SellOutcome> {
    validate_trade(shares, price)?;
    holding.validate()?;
    if shares > holding.shares {
        return Err(FinanceHubError::invalid(
            "shares",
            format!(
                "Insufficient shares to sell: holding {} of {}",
                holding.shares, holding.symbol
            ),
        ));
    }

    let proceeds = trade_value(shares, price, "sale proceeds")?;
    let remaining = holding.shares - shares;
    let holding = if remaining.is_zero() {
        None
    } else {
        Some(Holding {
            shares: remaining,
            current_price: price,
            ..holding.clone()
        })
    };

    debug!(%shares, %price, closed = holding.is_none(), "applied sell");
    Ok(SellOutcome { holding, proceeds })
}
