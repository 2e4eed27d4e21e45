use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::FinanceHubError;
use crate::time_value::{level_payment, monthly_rate};
use crate::types::{round_display, with_metadata, ComputationOutput, Money, Rate};
use crate::FinanceHubResult;

/// A fully amortizing fixed-rate loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    /// Annual nominal rate as a fraction (0.0525 = 5.25%)
    pub annual_interest_rate: Rate,
    pub term_months: u32,
}

/// Repayment figures, rounded to 2dp for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_amount: Money,
}

fn validate(principal: Money, annual_interest_rate: Rate, term_months: u32) -> FinanceHubResult<()> {
    if principal <= Decimal::ZERO {
        return Err(FinanceHubError::invalid(
            "principal",
            "principal must be greater than zero",
        ));
    }
    if term_months == 0 {
        return Err(FinanceHubError::invalid(
            "term_months",
            "term must be a positive integer number of months",
        ));
    }
    if annual_interest_rate < Decimal::ZERO {
        return Err(FinanceHubError::invalid(
            "annual_interest_rate",
            "interest rate cannot be negative",
        ));
    }
    Ok(())
}

/// Monthly payment, total repaid and total interest for a fixed-rate loan.
///
/// Payment uses the standard annuity formula
/// `P * r * (1+r)^n / ((1+r)^n - 1)` with `r = annual / 12`, or `P / n`
/// when the rate is zero. Rounding happens once, on the returned figures.
pub fn compute_loan(
    principal: Money,
    annual_interest_rate: Rate,
    term_months: u32,
) -> FinanceHubResult<LoanResult> {
    validate(principal, annual_interest_rate, term_months)?;

    let r = monthly_rate(annual_interest_rate);
    let monthly_payment = level_payment(principal, r, term_months)?;
    let total_amount = monthly_payment
        .checked_mul(Decimal::from(term_months))
        .ok_or_else(|| FinanceHubError::overflow("total repaid"))?;
    let total_interest = total_amount - principal;

    debug!(
        %principal,
        %annual_interest_rate,
        term_months,
        %monthly_payment,
        "computed loan amortization"
    );

    Ok(LoanResult {
        monthly_payment: round_display(monthly_payment),
        total_interest: round_display(total_interest),
        total_amount: round_display(total_amount),
    })
}

/// Enveloped loan calculation for CLI and binding callers.
pub fn calculate_loan(input: &LoanRequest) -> FinanceHubResult<ComputationOutput<LoanResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = compute_loan(input.principal, input.annual_interest_rate, input.term_months)?;

    if input.annual_interest_rate.is_zero() {
        warnings.push("Zero interest rate: principal repaid in equal straight-line instalments".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate loan amortization (level monthly annuity payment)",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_interest_rate": input.annual_interest_rate.to_string(),
            "term_months": input.term_months,
            "compounding": "monthly",
        }),
        warnings,
        elapsed,
        result,
    ))
}
