use financehub_core::portfolio::allocation::{self, AllocationSlice};
use financehub_core::portfolio::classification::{categorize, AssetCategory, AssetClassifier, KeywordClassifier};
use financehub_core::portfolio::gain_loss;
use financehub_core::portfolio::positions;
use financehub_core::portfolio::Holding;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn holding(symbol: &str, name: &str, shares: Decimal, purchase: Decimal, current: Decimal) -> Holding {
    Holding {
        symbol: symbol.into(),
        name: name.into(),
        shares,
        purchase_price: purchase,
        current_price: current,
    }
}

fn sample_portfolio() -> Vec<Holding> {
    vec![
        holding("ENI", "Eni S.p.A.", dec!(100), dec!(13.45), dec!(14.50)),
        holding("ENEL", "Enel S.p.A.", dec!(200), dec!(6.10), dec!(6.85)),
        holding("BTP-10Y", "Buono del Tesoro 10 anni", dec!(50), dec!(98.20), dec!(97.40)),
        holding("FTSE-MIB", "FTSE MIB ETF", dec!(40), dec!(29.45), dec!(31.10)),
        holding("STM", "STMicroelectronics N.V.", dec!(30), dec!(38.00), dec!(35.25)),
    ]
}

// ===========================================================================
// Gain/loss tests
// ===========================================================================

#[test]
fn test_reference_holding() {
    let result = financehub_core::compute_gain_loss(&holding("ENI", "Eni S.p.A.", dec!(100), dec!(13.45), dec!(14.50))).unwrap();
    assert_eq!(result.gain_loss, dec!(105.00));
    assert_eq!(result.gain_loss_percent, dec!(7.81));
    assert!(result.is_gain);
}

#[test]
fn test_portfolio_summary_totals() {
    let holdings = sample_portfolio();
    let output = gain_loss::summarize_portfolio(&holdings).unwrap();
    let summary = output.result;

    // 1450 + 1370 + 4870 + 1244 + 1057.5
    assert_eq!(summary.total_current_value, dec!(9991.50));
    // 1345 + 1220 + 4910 + 1178 + 1140
    assert_eq!(summary.total_purchase_value, dec!(9793.00));
    assert_eq!(summary.total_gain_loss, dec!(198.50));
    assert_eq!(summary.holding_count, 5);
    assert_eq!(summary.holdings[2].symbol, "BTP-10Y");
    assert!(!summary.holdings[2].performance.is_gain);
}

#[test]
fn test_equal_weighted_mean_is_not_value_weighted() {
    let holdings = sample_portfolio();
    let summary = gain_loss::aggregate_gain_loss(&holdings).unwrap();

    let per_holding: Vec<Decimal> = holdings
        .iter()
        .map(|h| {
            let cost = h.purchase_value().unwrap();
            (h.current_value().unwrap() - cost) / cost * dec!(100)
        })
        .collect();
    let mean = per_holding.iter().sum::<Decimal>() / Decimal::from(per_holding.len() as i64);

    assert_eq!(
        summary.average_gain_loss_percent,
        mean.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    );
    // 198.5 / 9793
    assert_eq!(summary.cost_basis_growth_percent, dec!(2.03));
    assert!(summary.average_gain_loss_percent != summary.cost_basis_growth_percent);
}

// ===========================================================================
// Classification & allocation tests
// ===========================================================================

#[test]
fn test_reference_classifications() {
    assert_eq!(categorize("BTP-10Y", "Buono del Tesoro"), AssetCategory::Bonds);
    assert_eq!(categorize("FTSE-MIB", "FTSE MIB ETF"), AssetCategory::Etf);
    assert_eq!(categorize("ENI", "Eni S.p.A."), AssetCategory::Stocks);
    assert_eq!(categorize("ZZZ", "Something Else"), AssetCategory::Stocks);
}

#[test]
fn test_empty_allocation() {
    let slices = financehub_core::compute_portfolio_allocation(&[]).unwrap();
    assert_eq!(slices.len(), 1);
    assert_eq!(slices[0].label, "no investment");
    assert_eq!(slices[0].value, 100);
}

#[test]
fn test_sample_allocation() {
    let slices = financehub_core::compute_portfolio_allocation(&sample_portfolio()).unwrap();
    // stocks 3877.5, bonds 4870, etf 1244 of 9991.5 => 38.81 / 48.74 / 12.45
    let expected: Vec<(&str, u32)> = vec![("stocks", 39), ("bonds", 49), ("etf", 12)];
    let actual: Vec<(&str, u32)> = slices.iter().map(|s| (s.label.as_str(), s.value)).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_allocation_always_sums_to_hundred() {
    // Sweep a range of uneven splits across all three categories
    for a in 1..=20u32 {
        for b in 0..=20u32 {
            for c in 0..=7u32 {
                let holdings = vec![
                    holding("ENI", "Eni S.p.A.", Decimal::from(a), dec!(1), dec!(3.7)),
                    holding("BTP-10Y", "BTP", Decimal::from(b), dec!(1), dec!(11.3)),
                    holding("MSCI", "MSCI World", Decimal::from(c), dec!(1), dec!(41.9)),
                ];
                let slices = financehub_core::compute_portfolio_allocation(&holdings).unwrap();
                let total: u32 = slices.iter().map(|s| s.value).sum();
                assert_eq!(total, 100, "a={a} b={b} c={c} slices={slices:?}");
                assert!(slices.iter().all(|s| s.value > 0));
            }
        }
    }
}

struct EverythingIsAnEtf;

impl AssetClassifier for EverythingIsAnEtf {
    fn classify(&self, _symbol: &str, _name: &str) -> AssetCategory {
        AssetCategory::Etf
    }
}

#[test]
fn test_allocation_accepts_custom_classifier() {
    let breakdown = allocation::allocate(&sample_portfolio(), &EverythingIsAnEtf).unwrap();
    assert_eq!(
        breakdown.slices,
        vec![AllocationSlice {
            label: "etf".into(),
            value: 100,
            color: allocation::color_token(AssetCategory::Etf).into(),
            category: Some(AssetCategory::Etf),
        }]
    );
    assert_eq!(breakdown.category_values[2].holdings, 5);
}

#[test]
fn test_classifier_tables_from_yaml() {
    let yaml = r#"
etf:
  symbol: [SPY, QQQ]
  name: [TRUST]
"#;
    let classifier: KeywordClassifier = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(classifier.classify("QQQ", "Invesco QQQ Trust"), AssetCategory::Etf);
    // Bond defaults survive a partial override
    assert_eq!(classifier.classify("BTP-5Y", "Buono"), AssetCategory::Bonds);
}

// ===========================================================================
// Position bookkeeping tests
// ===========================================================================

#[test]
fn test_buy_then_sell_round_trip() {
    let opened = positions::apply_buy(None, "ENI", "Eni S.p.A.", dec!(100), dec!(10)).unwrap();
    let added = positions::apply_buy(Some(&opened.holding), "ENI", "Eni S.p.A.", dec!(50), dec!(16)).unwrap();
    // (1000 + 800) / 150
    assert_eq!(added.holding.purchase_price, dec!(12));
    assert_eq!(added.total_cost, dec!(800));

    let sold = positions::apply_sell(&added.holding, dec!(150), dec!(15)).unwrap();
    assert!(sold.holding.is_none());
    assert_eq!(sold.proceeds, dec!(2250));
}
