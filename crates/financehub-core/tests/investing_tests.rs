use financehub_core::investing::projection::{self, InvestmentRequest, MAX_PROJECTION_YEARS};
use financehub_core::FinanceHubError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Investment projection tests
// ===========================================================================

#[test]
fn test_reference_savings_plan() {
    let result = financehub_core::compute_investment_projection(dec!(10000), dec!(500), dec!(0.075), 10).unwrap();
    assert_eq!(result.total_contributions, dec!(70000));
    assert_eq!(result.future_value, dec!(110085.82));
    assert_eq!(result.total_gain, result.future_value - result.total_contributions);
}

#[test]
fn test_flat_plan_has_no_gain() {
    let result = financehub_core::compute_investment_projection(dec!(2500), Decimal::ZERO, Decimal::ZERO, 30).unwrap();
    assert_eq!(result.future_value, dec!(2500));
    assert_eq!(result.total_gain, Decimal::ZERO);
}

#[test]
fn test_higher_rate_grows_faster() {
    let low = financehub_core::compute_investment_projection(dec!(1000), dec!(100), dec!(0.03), 20).unwrap();
    let high = financehub_core::compute_investment_projection(dec!(1000), dec!(100), dec!(0.08), 20).unwrap();
    assert!(high.future_value > low.future_value);
    assert_eq!(high.total_contributions, low.total_contributions);
}

#[test]
fn test_projection_is_monotonic_year_by_year() {
    let input = InvestmentRequest {
        initial_investment: dec!(10000),
        monthly_contribution: dec!(500),
        annual_return_rate: dec!(0.075),
        years: 10,
    };
    let output = projection::project_investment(&input).unwrap();
    let path = &output.result.year_by_year;

    assert_eq!(path.len(), 10);
    assert!(path.windows(2).all(|w| w[1].value > w[0].value));
    assert_eq!(path[9].value, dec!(110085.82));
    assert_eq!(path[9].total_contributions, dec!(70000));
}

#[test]
fn test_envelope_flattens_summary() {
    let input: InvestmentRequest = serde_json::from_str(
        r#"{"initial_investment": "1000", "monthly_contribution": "0", "annual_return_rate": "0", "years": 1}"#,
    )
    .unwrap();
    let output = projection::project_investment(&input).unwrap();
    let json = serde_json::to_value(&output).unwrap();

    assert_eq!(json["result"]["future_value"], "1000");
    assert!(json["result"]["year_by_year"].is_array());
    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_runaway_growth_is_reported() {
    let result = financehub_core::compute_investment_projection(dec!(100000), Decimal::ZERO, dec!(1.2), 50);
    assert!(matches!(result, Err(FinanceHubError::FinancialImpossibility(_))));
}

#[test]
fn test_long_horizon_envelope() {
    let input = InvestmentRequest {
        initial_investment: dec!(10000),
        monthly_contribution: dec!(100),
        annual_return_rate: dec!(0.03),
        years: MAX_PROJECTION_YEARS,
    };
    let output = projection::project_investment(&input).unwrap();
    let path = &output.result.year_by_year;

    assert_eq!(path.len(), 200);
    assert_eq!(path[199].value, output.result.summary.future_value);
    assert_eq!(path[199].total_contributions, dec!(250000));

    let too_long = InvestmentRequest { years: MAX_PROJECTION_YEARS + 1, ..input };
    assert!(projection::project_investment(&too_long).is_err());
}
