use rust_decimal::Decimal;

use crate::error::FinanceHubError;
use crate::types::{Money, Rate};
use crate::FinanceHubResult;

/// Number of compounding periods in a year for every FinanceHub calculator.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Convert an annual rate into the periodic monthly rate.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / Decimal::from(MONTHS_PER_YEAR)
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Fails instead of panicking when the factor leaves the Decimal range.
pub fn compound(rate: Rate, periods: u32) -> FinanceHubResult<Decimal> {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for period in 0..periods {
        result = result.checked_mul(factor).ok_or_else(|| {
            FinanceHubError::FinancialImpossibility(format!(
                "compounding factor overflows after {period} of {periods} periods at rate {rate}"
            ))
        })?;
    }
    Ok(result)
}

/// Level payment that fully amortizes `principal` over `periods` at `rate`.
///
/// Payments are returned as positive amounts. A zero rate falls back to
/// straight-line repayment.
pub fn level_payment(principal: Money, rate: Rate, periods: u32) -> FinanceHubResult<Money> {
    if periods == 0 {
        return Err(FinanceHubError::invalid(
            "periods",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = compound(rate, periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(FinanceHubError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    // factor / (factor - 1) stays near 1, so dividing first keeps large
    // principals in range
    let annuity_ratio = factor
        .checked_div(denominator)
        .ok_or_else(|| FinanceHubError::overflow("annuity factor"))?;
    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(annuity_ratio))
        .ok_or_else(|| FinanceHubError::overflow("level payment"))
}

/// Future value of a lump sum left to compound for `periods`.
pub fn future_value_lump_sum(present_value: Money, rate: Rate, periods: u32) -> FinanceHubResult<Money> {
    present_value
        .checked_mul(compound(rate, periods)?)
        .ok_or_else(|| FinanceHubError::overflow("lump sum future value"))
}

/// Future value of a contribution made at each of `periods` periods.
pub fn future_value_annuity(payment: Money, rate: Rate, periods: u32) -> FinanceHubResult<Money> {
    let total = if rate.is_zero() {
        payment.checked_mul(Decimal::from(periods))
    } else {
        let factor = compound(rate, periods)?;
        (factor - Decimal::ONE)
            .checked_div(rate)
            .and_then(|accumulation| payment.checked_mul(accumulation))
    };
    total.ok_or_else(|| FinanceHubError::overflow("annuity future value"))
}
