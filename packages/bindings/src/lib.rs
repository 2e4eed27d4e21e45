use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use financehub_core::lending::application::{LendingPolicy, LoanApplication, LoanType};
use financehub_core::portfolio::{Holding, KeywordClassifier};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<String> {
    let input: financehub_core::lending::amortization::LoanRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        financehub_core::lending::amortization::calculate_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Application plus an optional policy override.
#[derive(Deserialize)]
struct ApplicationRequest {
    #[serde(flatten)]
    application: LoanApplication,
    #[serde(default)]
    policy: Option<LendingPolicy>,
}

#[napi]
pub fn evaluate_application(input_json: String) -> NapiResult<String> {
    let input: ApplicationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let policy = input.policy.unwrap_or_default();
    let output =
        financehub_core::lending::application::evaluate_application(&input.application, &policy)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct AmountCheckRequest {
    loan_type: String,
    amount: Decimal,
    monthly_income: Decimal,
}

/// Returns `{"valid": bool, "error": string|null}`; only malformed JSON throws.
#[napi]
pub fn validate_loan_amount(input_json: String) -> NapiResult<String> {
    let input: AmountCheckRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let checked = input.loan_type.parse::<LoanType>().and_then(|loan_type| {
        financehub_core::lending::application::validate_amount(
            loan_type,
            input.amount,
            input.monthly_income,
            &LendingPolicy::default(),
        )
    });
    let output = match checked {
        Ok(()) => serde_json::json!({ "valid": true, "error": null }),
        Err(financehub_core::FinanceHubError::InvalidInput { reason, .. }) => {
            serde_json::json!({ "valid": false, "error": reason })
        }
        Err(e) => serde_json::json!({ "valid": false, "error": e.to_string() }),
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Investing
// ---------------------------------------------------------------------------

#[napi]
pub fn project_investment(input_json: String) -> NapiResult<String> {
    let input: financehub_core::investing::projection::InvestmentRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = financehub_core::investing::projection::project_investment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_holding(input_json: String) -> NapiResult<String> {
    let input: Holding = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        financehub_core::portfolio::gain_loss::analyze_holding(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_portfolio(input_json: String) -> NapiResult<String> {
    let input: Vec<Holding> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = financehub_core::portfolio::gain_loss::summarize_portfolio(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Holdings plus optional keyword tables replacing the built-in ones.
#[derive(Deserialize)]
struct AllocationRequest {
    holdings: Vec<Holding>,
    #[serde(default)]
    classification: Option<KeywordClassifier>,
}

#[napi]
pub fn calculate_allocation(input_json: String) -> NapiResult<String> {
    let input: AllocationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let classifier = input.classification.unwrap_or_default();
    let output =
        financehub_core::portfolio::allocation::calculate_allocation(&input.holdings, &classifier)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn categorize_asset(symbol: String, name: String) -> String {
    financehub_core::portfolio::classification::categorize(&symbol, &name)
        .as_str()
        .to_string()
}

#[derive(Deserialize)]
struct BuyRequest {
    #[serde(default)]
    holding: Option<Holding>,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    shares: Decimal,
    price: Decimal,
}

#[napi]
pub fn apply_buy(input_json: String) -> NapiResult<String> {
    let input: BuyRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = financehub_core::portfolio::positions::apply_buy(
        input.holding.as_ref(),
        &input.symbol,
        &input.name,
        input.shares,
        input.price,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct SellRequest {
    holding: Holding,
    shares: Decimal,
    price: Decimal,
}

#[napi]
pub fn apply_sell(input_json: String) -> NapiResult<String> {
    let input: SellRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        financehub_core::portfolio::positions::apply_sell(&input.holding, input.shares, input.price)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
