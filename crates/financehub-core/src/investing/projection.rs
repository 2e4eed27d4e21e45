use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::FinanceHubError;
use crate::time_value::{
    compound, future_value_annuity, future_value_lump_sum, monthly_rate, MONTHS_PER_YEAR,
};
use crate::types::{round_display, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinanceHubResult;

/// Longest horizon accepted, in years.
pub const MAX_PROJECTION_YEARS: u32 = 200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parameters for a savings plan with monthly compounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentRequest {
    pub initial_investment: Money,
    pub monthly_contribution: Money,
    /// Expected annual return as a fraction (0.075 = 7.5%)
    pub annual_return_rate: Rate,
    pub years: u32,
}

/// Projected outcome at the end of the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub future_value: Money,
    pub total_contributions: Money,
    pub total_gain: Money,
    pub return_percentage: Percent,
}

/// Value of the plan at the end of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub total_contributions: Money,
    pub value: Money,
}

/// Projection plus its year-by-year path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentProjection {
    #[serde(flatten)]
    pub summary: InvestmentResult,
    pub year_by_year: Vec<ProjectionYear>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Growth {
    future_value: Money,
    total_contributions: Money,
}

/// Unrounded plan value after `months` of compounding.
fn grow(
    initial: Money,
    monthly_contribution: Money,
    rate: Rate,
    months: u32,
) -> FinanceHubResult<Growth> {
    let lump = future_value_lump_sum(initial, rate, months)?;
    let annuity = future_value_annuity(monthly_contribution, rate, months)?;
    let future_value = lump
        .checked_add(annuity)
        .ok_or_else(|| FinanceHubError::overflow("projected value"))?;
    let total_contributions = monthly_contribution
        .checked_mul(Decimal::from(months))
        .and_then(|paid_in| paid_in.checked_add(initial))
        .ok_or_else(|| FinanceHubError::overflow("total contributions"))?;
    Ok(Growth {
        future_value,
        total_contributions,
    })
}

fn validate(
    initial: Money,
    monthly_contribution: Money,
    annual_return_rate: Rate,
    years: u32,
) -> FinanceHubResult<()> {
    if initial < Decimal::ZERO {
        return Err(FinanceHubError::invalid(
            "initial_investment",
            "initial investment cannot be negative",
        ));
    }
    if monthly_contribution < Decimal::ZERO {
        return Err(FinanceHubError::invalid(
            "monthly_contribution",
            "monthly contribution cannot be negative",
        ));
    }
    if annual_return_rate < Decimal::ZERO {
        return Err(FinanceHubError::invalid(
            "annual_return_rate",
            "expected return cannot be negative",
        ));
    }
    if years == 0 {
        return Err(FinanceHubError::invalid(
            "years",
            "years must be a positive integer",
        ));
    }
    if years > MAX_PROJECTION_YEARS {
        return Err(FinanceHubError::invalid(
            "years",
            format!("years must not exceed {MAX_PROJECTION_YEARS}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Future value of an initial lump sum plus level monthly contributions.
///
/// Both legs compound monthly at `annual_return_rate / 12`. A zero rate
/// reduces the contribution leg to `contribution * months`.
pub fn compute_investment_projection(
    initial: Money,
    monthly_contribution: Money,
    annual_return_rate: Rate,
    years: u32,
) -> FinanceHubResult<InvestmentResult> {
    validate(initial, monthly_contribution, annual_return_rate, years)?;

    let months = years * MONTHS_PER_YEAR;
    let growth = grow(initial, monthly_contribution, monthly_rate(annual_return_rate), months)?;

    let total_gain = growth.future_value - growth.total_contributions;
    let return_percentage = if growth.total_contributions.is_zero() {
        Decimal::ZERO
    } else {
        total_gain
            .checked_div(growth.total_contributions)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or_else(|| FinanceHubError::overflow("return percentage"))?
    };

    debug!(
        %initial,
        %monthly_contribution,
        %annual_return_rate,
        years,
        future_value = %growth.future_value,
        "computed investment projection"
    );

    Ok(InvestmentResult {
        future_value: round_display(growth.future_value),
        total_contributions: round_display(growth.total_contributions),
        total_gain: round_display(total_gain),
        return_percentage: round_display(return_percentage),
    })
}

/// Value at the end of each year of the horizon.
///
/// Each year rolls the previous balance forward by one year of compounding
/// and adds that year's contributions, so the schedule is linear in `years`.
pub fn year_by_year(input: &InvestmentRequest) -> FinanceHubResult<Vec<ProjectionYear>> {
    validate(
        input.initial_investment,
        input.monthly_contribution,
        input.annual_return_rate,
        input.years,
    )?;

    let rate = monthly_rate(input.annual_return_rate);
    let yearly_factor = compound(rate, MONTHS_PER_YEAR)?;
    let one_year = grow(Decimal::ZERO, input.monthly_contribution, rate, MONTHS_PER_YEAR)?;

    let mut value = input.initial_investment;
    let mut contributions = input.initial_investment;
    let mut path = Vec::with_capacity(input.years as usize);
    for year in 1..=input.years {
        value = value
            .checked_mul(yearly_factor)
            .and_then(|v| v.checked_add(one_year.future_value))
            .ok_or_else(|| FinanceHubError::overflow(format!("value in year {year}")))?;
        contributions = contributions
            .checked_add(one_year.total_contributions)
            .ok_or_else(|| FinanceHubError::overflow("total contributions"))?;
        path.push(ProjectionYear {
            year,
            total_contributions: round_display(contributions),
            value: round_display(value),
        });
    }
    Ok(path)
}

/// Enveloped projection with its yearly path.
pub fn project_investment(
    input: &InvestmentRequest,
) -> FinanceHubResult<ComputationOutput<InvestmentProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let summary = compute_investment_projection(
        input.initial_investment,
        input.monthly_contribution,
        input.annual_return_rate,
        input.years,
    )?;
    let year_by_year = year_by_year(input)?;

    if input.annual_return_rate.is_zero() {
        warnings.push("Zero expected return: value equals total contributions".into());
    }
    if summary.total_contributions.is_zero() {
        warnings.push("No contributions: return percentage reported as 0".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Future value with monthly compounding (lump sum + ordinary annuity of contributions)",
        &serde_json::json!({
            "initial_investment": input.initial_investment.to_string(),
            "monthly_contribution": input.monthly_contribution.to_string(),
            "annual_return_rate": input.annual_return_rate.to_string(),
            "years": input.years,
            "compounding": "monthly",
        }),
        warnings,
        elapsed,
        InvestmentProjection {
            summary,
            year_by_year,
        },
    ))
}
