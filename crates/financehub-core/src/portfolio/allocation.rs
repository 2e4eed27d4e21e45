use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinanceHubError;
use crate::portfolio::classification::{default_classifier, AssetCategory, AssetClassifier};
use crate::portfolio::gain_loss::Holding;
use crate::types::{checked_sum, round_display, with_metadata, ComputationOutput, Money};
use crate::FinanceHubResult;

/// Label of the single slice shown for a portfolio with nothing invested.
pub const EMPTY_LABEL: &str = "no investment";
const EMPTY_COLOR: &str = "#94A3B8";
const FALLBACK_LABEL: &str = "portfolio";
const FALLBACK_COLOR: &str = "#6B7280";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One wedge of the allocation chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub label: String,
    /// Whole percent, 1-100
    pub value: u32,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<AssetCategory>,
}

impl AllocationSlice {
    fn empty() -> Self {
        AllocationSlice {
            label: EMPTY_LABEL.into(),
            value: 100,
            color: EMPTY_COLOR.into(),
            category: None,
        }
    }

    fn for_category(category: AssetCategory, value: u32) -> Self {
        AllocationSlice {
            label: category.as_str().into(),
            value,
            color: color_token(category).into(),
            category: Some(category),
        }
    }
}

/// Market value held in one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryValue {
    pub category: AssetCategory,
    pub value: Money,
    pub holdings: usize,
}

/// Slices plus the values they were computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationBreakdown {
    pub slices: Vec<AllocationSlice>,
    pub category_values: Vec<CategoryValue>,
    pub total_value: Money,
    /// Points added to (or removed from) the first slice to reach 100
    pub rounding_adjustment: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn color_token(category: AssetCategory) -> &'static str {
    match category {
        AssetCategory::Stocks => "#3B82F6",
        AssetCategory::Bonds => "#10B981",
        AssetCategory::Etf => "#EF4444",
    }
}

fn index_of(category: AssetCategory) -> usize {
    match category {
        AssetCategory::Stocks => 0,
        AssetCategory::Bonds => 1,
        AssetCategory::Etf => 2,
    }
}

/// Whole percent of `part` in `total`, halves rounded up.
fn whole_percent(part: Money, total: Money) -> FinanceHubResult<i64> {
    (part / total * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| FinanceHubError::FinancialImpossibility(format!("allocation percent of {part} in {total}")))
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Allocation by asset class using any classifier.
///
/// Percentages are rounded independently, then the first non-empty category
/// (stocks, bonds, etf order) absorbs the difference so the slices always
/// total exactly 100. Zero-percent categories are left out.
pub fn allocate(
    holdings: &[Holding],
    classifier: &dyn AssetClassifier,
) -> FinanceHubResult<AllocationBreakdown> {
    let mut values = [Decimal::ZERO; 3];
    let mut counts = [0usize; 3];
    for holding in holdings {
        holding.validate()?;
        let category = classifier.classify(&holding.symbol, &holding.name);
        let idx = index_of(category);
        values[idx] = values[idx]
            .checked_add(holding.current_value()?)
            .ok_or_else(|| FinanceHubError::overflow(format!("{category} holdings value")))?;
        counts[idx] += 1;
    }
    let total = checked_sum(values, "portfolio value")?;

    let category_values = AssetCategory::DISPLAY_ORDER
        .iter()
        .map(|&category| CategoryValue {
            category,
            value: round_display(values[index_of(category)]),
            holdings: counts[index_of(category)],
        })
        .collect();

    if holdings.is_empty() || total.is_zero() {
        return Ok(AllocationBreakdown {
            slices: vec![AllocationSlice::empty()],
            category_values,
            total_value: Decimal::ZERO,
            rounding_adjustment: 0,
        });
    }

    let mut percents = Vec::with_capacity(3);
    for category in AssetCategory::DISPLAY_ORDER {
        percents.push((category, whole_percent(values[index_of(category)], total)?));
    }
    let rounded_sum: i64 = percents.iter().map(|(_, p)| p).sum();
    let adjustment = 100 - rounded_sum;

    let mut kept: Vec<(AssetCategory, i64)> = percents.into_iter().filter(|(_, p)| *p > 0).collect();
    if adjustment != 0 {
        if let Some(first) = kept.first_mut() {
            first.1 += adjustment;
            debug!(category = %first.0, adjustment, "reconciled allocation rounding");
        }
        kept.retain(|(_, p)| *p > 0);
    }

    let mut slices: Vec<AllocationSlice> = kept
        .into_iter()
        .map(|(category, p)| AllocationSlice::for_category(category, p as u32))
        .collect();

    if slices.is_empty() {
        warn!(%total, "no category reached a whole percent");
        slices.push(AllocationSlice {
            label: FALLBACK_LABEL.into(),
            value: 100,
            color: FALLBACK_COLOR.into(),
            category: None,
        });
    }

    Ok(AllocationBreakdown {
        slices,
        category_values,
        total_value: round_display(total),
        rounding_adjustment: adjustment,
    })
}

/// Allocation slices using the built-in keyword classifier.
pub fn compute_portfolio_allocation(holdings: &[Holding]) -> FinanceHubResult<Vec<AllocationSlice>> {
    Ok(allocate(holdings, default_classifier())?.slices)
}

/// Enveloped allocation breakdown.
pub fn calculate_allocation(
    holdings: &[Holding],
    classifier: &dyn AssetClassifier,
) -> FinanceHubResult<ComputationOutput<AllocationBreakdown>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let breakdown = allocate(holdings, classifier)?;

    if breakdown.total_value.is_zero() {
        warnings.push("Nothing invested: single 'no investment' slice returned".into());
    }
    if breakdown.rounding_adjustment != 0 {
        warnings.push(format!(
            "Rounded percentages summed to {}; first slice adjusted by {:+}",
            100 - breakdown.rounding_adjustment,
            breakdown.rounding_adjustment
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Asset allocation by keyword classification (whole percents, reconciled to 100)",
        &serde_json::json!({
            "holdings": holdings.len(),
            "category_order": AssetCategory::DISPLAY_ORDER,
            "rounding": "half-up, remainder to first slice",
        }),
        warnings,
        elapsed,
        breakdown,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::classification::KeywordClassifier;
    use pretty_assertions::assert_eq;

    fn holding(symbol: &str, name: &str, shares: Decimal, price: Decimal) -> Holding {
        Holding {
            symbol: symbol.into(),
            name: name.into(),
            shares,
            purchase_price: price,
            current_price: price,
        }
    }

    fn total(slices: &[AllocationSlice]) -> u32 {
        slices.iter().map(|s| s.value).sum()
    }

    #[test]
    fn test_empty_portfolio() {
        let slices = compute_portfolio_allocation(&[]).unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].label, "no investment");
        assert_eq!(slices[0].value, 100);
    }

    #[test]
    fn test_zero_value_portfolio_is_empty() {
        let slices = compute_portfolio_allocation(&[holding("ENI", "Eni S.p.A.", dec!(10), Decimal::ZERO)]).unwrap();
        assert_eq!(slices, vec![AllocationSlice::empty()]);
    }

    #[test]
    fn test_single_category() {
        let slices = compute_portfolio_allocation(&[holding("ENI", "Eni S.p.A.", dec!(10), dec!(14))]).unwrap();
        assert_eq!(slices, vec![AllocationSlice::for_category(AssetCategory::Stocks, 100)]);
    }

    #[test]
    fn test_thirds_reconcile_on_first_slice() {
        // 33 + 33 + 33 = 99, stocks absorb the missing point
        let holdings = vec![
            holding("ENI", "Eni S.p.A.", dec!(1), dec!(100)),
            holding("BTP-10Y", "Buono del Tesoro", dec!(1), dec!(100)),
            holding("FTSE-MIB", "FTSE MIB ETF", dec!(1), dec!(100)),
        ];
        let breakdown = allocate(&holdings, &KeywordClassifier::default()).unwrap();
        let values: Vec<u32> = breakdown.slices.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![34, 33, 33]);
        assert_eq!(breakdown.rounding_adjustment, 1);
    }

    #[test]
    fn test_overshoot_is_taken_from_first_slice() {
        // 12.5 / 37.5 / 50 round to 13 / 38 / 50 = 101
        let holdings = vec![
            holding("ENI", "Eni S.p.A.", dec!(1), dec!(125)),
            holding("BTP-10Y", "Buono del Tesoro", dec!(1), dec!(375)),
            holding("FTSE-MIB", "FTSE MIB ETF", dec!(1), dec!(500)),
        ];
        let slices = compute_portfolio_allocation(&holdings).unwrap();
        let values: Vec<u32> = slices.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![12, 38, 50]);
    }

    #[test]
    fn test_zero_percent_categories_omitted() {
        let holdings = vec![
            holding("ENI", "Eni S.p.A.", dec!(1), dec!(1000)),
            holding("FTSE-MIB", "FTSE MIB ETF", dec!(1), dec!(1000)),
        ];
        let slices = compute_portfolio_allocation(&holdings).unwrap();
        assert_eq!(slices.len(), 2);
        assert!(slices.iter().all(|s| s.category != Some(AssetCategory::Bonds)));
        assert_eq!(total(&slices), 100);
    }

    #[test]
    fn test_slice_reconciled_to_zero_is_dropped() {
        // 0.5% stocks rounds to 1, total 101, stocks absorb -1
        let holdings = vec![
            holding("ENI", "Eni S.p.A.", dec!(1), dec!(5)),
            holding("BTP-10Y", "Buono del Tesoro", dec!(1), dec!(495)),
            holding("FTSE-MIB", "FTSE MIB ETF", dec!(1), dec!(500)),
        ];
        let slices = compute_portfolio_allocation(&holdings).unwrap();
        let values: Vec<u32> = slices.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![50, 50]);
        assert_eq!(slices[0].category, Some(AssetCategory::Bonds));
    }

    #[test]
    fn test_value_out_of_decimal_range_is_reported() {
        let near_max = dec!(50000000000000000000000000000);
        let holdings = vec![
            holding("ENI", "Eni S.p.A.", dec!(1), near_max),
            holding("FTSE-MIB", "FTSE MIB ETF", dec!(1), near_max),
        ];
        let err = compute_portfolio_allocation(&holdings).unwrap_err();
        assert!(err.to_string().contains("portfolio value"));

        let same_category = vec![
            holding("ENI", "Eni S.p.A.", dec!(1), near_max),
            holding("ENEL", "Enel S.p.A.", dec!(1), near_max),
        ];
        let err = compute_portfolio_allocation(&same_category).unwrap_err();
        assert!(err.to_string().contains("stocks holdings value"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = compute_portfolio_allocation(&[holding("ENI", "Eni", dec!(1), dec!(-1))]);
        assert!(result.is_err());
    }
}
