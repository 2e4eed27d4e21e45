use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::FinanceHubError;
use crate::time_value::{level_payment, monthly_rate, MONTHS_PER_YEAR};
use crate::types::{round_display, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinanceHubResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan products offered through the application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Personal,
    Auto,
    Mortgage,
    Business,
}

impl LoanType {
    pub const ALL: [LoanType; 4] = [
        LoanType::Personal,
        LoanType::Auto,
        LoanType::Mortgage,
        LoanType::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Personal => "personal",
            LoanType::Auto => "auto",
            LoanType::Mortgage => "mortgage",
            LoanType::Business => "business",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = FinanceHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoanType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FinanceHubError::invalid("loan_type", "Invalid loan type"))
    }
}

/// Pricing and size limits for a single loan product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    /// Annual rate as a fraction (0.085 = 8.5%)
    pub annual_rate: Rate,
    pub default_term_months: u32,
    pub min_amount: Money,
    pub max_amount: Money,
}

/// Underwriting thresholds and the product table they apply to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
    pub products: BTreeMap<LoanType, LoanProduct>,
    /// Maximum debt-to-income ratio, in percent
    pub max_dti_percent: Percent,
    pub min_monthly_income: Money,
    pub eligible_employment: Vec<String>,
    /// Absolute bounds applied to every product
    pub min_amount: Money,
    pub max_amount: Money,
    /// Share of monthly income that may service debt when sizing the loan cap
    pub affordability_share: Rate,
    /// Months of serviceable income the loan cap covers
    pub affordability_months: u32,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        let products = BTreeMap::from([
            (
                LoanType::Personal,
                LoanProduct {
                    annual_rate: dec!(0.085),
                    default_term_months: 36,
                    min_amount: dec!(1000),
                    max_amount: dec!(50000),
                },
            ),
            (
                LoanType::Auto,
                LoanProduct {
                    annual_rate: dec!(0.062),
                    default_term_months: 60,
                    min_amount: dec!(5000),
                    max_amount: dec!(80000),
                },
            ),
            (
                LoanType::Mortgage,
                LoanProduct {
                    annual_rate: dec!(0.048),
                    default_term_months: 360,
                    min_amount: dec!(50000),
                    max_amount: dec!(1000000),
                },
            ),
            (
                LoanType::Business,
                LoanProduct {
                    annual_rate: dec!(0.095),
                    default_term_months: 60,
                    min_amount: dec!(1000),
                    max_amount: dec!(1000000),
                },
            ),
        ]);

        LendingPolicy {
            products,
            max_dti_percent: dec!(40),
            min_monthly_income: dec!(2000),
            eligible_employment: vec!["employed".into(), "self_employed".into()],
            min_amount: dec!(1000),
            max_amount: dec!(1000000),
            affordability_share: dec!(0.4),
            affordability_months: 12,
        }
    }
}

impl LendingPolicy {
    pub fn product(&self, loan_type: LoanType) -> FinanceHubResult<&LoanProduct> {
        self.products
            .get(&loan_type)
            .ok_or_else(|| FinanceHubError::invalid("loan_type", "Invalid loan type"))
    }

    fn is_eligible_employment(&self, status: &str) -> bool {
        self.eligible_employment
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status.trim()))
    }
}

/// A customer's request for a new loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    pub loan_type: LoanType,
    pub amount: Money,
    pub annual_income: Money,
    pub employment_status: String,
    /// Overrides the product's default term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
    /// Debt service the applicant already pays each month
    #[serde(default)]
    pub existing_monthly_debt: Money,
}

/// Outcome of underwriting a loan application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDecision {
    pub approved: bool,
    pub loan_type: LoanType,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
    pub monthly_income: Money,
    pub total_monthly_debt: Money,
    pub dti_ratio: Percent,
    pub summary: String,
    /// One entry per failed rule; empty when approved
    pub reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Debt-to-income ratio in percent. Non-positive income counts as 100%.
pub fn dti_ratio(monthly_income: Money, monthly_debt: Money) -> FinanceHubResult<Percent> {
    if monthly_income <= Decimal::ZERO {
        return Ok(dec!(100));
    }
    monthly_debt
        .checked_div(monthly_income)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| FinanceHubError::overflow("debt-to-income ratio"))
}

/// Check a requested amount against the product limits and the income cap.
pub fn validate_amount(
    loan_type: LoanType,
    amount: Money,
    monthly_income: Money,
    policy: &LendingPolicy,
) -> FinanceHubResult<()> {
    let product = policy.product(loan_type)?;

    if amount < product.min_amount || amount > product.max_amount {
        return Err(FinanceHubError::invalid(
            "amount",
            format!(
                "Amount must be between €{} and €{}",
                product.min_amount.normalize(),
                product.max_amount.normalize()
            ),
        ));
    }

    let cap = monthly_income
        .checked_mul(policy.affordability_share)
        .and_then(|share| share.checked_mul(Decimal::from(policy.affordability_months)))
        .ok_or_else(|| FinanceHubError::overflow("affordable loan amount"))?;
    if amount > cap {
        return Err(FinanceHubError::invalid(
            "amount",
            "Exceeds maximum debt-to-income ratio",
        ));
    }

    Ok(())
}

/// Underwrite an application: price it, size the payment, apply the rules.
pub fn assess_application(
    application: &LoanApplication,
    policy: &LendingPolicy,
) -> FinanceHubResult<LoanDecision> {
    if application.amount <= Decimal::ZERO {
        return Err(FinanceHubError::invalid("amount", "amount must be greater than zero"));
    }
    if application.annual_income < Decimal::ZERO {
        return Err(FinanceHubError::invalid("annual_income", "income cannot be negative"));
    }
    if application.existing_monthly_debt < Decimal::ZERO {
        return Err(FinanceHubError::invalid(
            "existing_monthly_debt",
            "existing debt payments cannot be negative",
        ));
    }

    let product = policy.product(application.loan_type)?;
    let term_months = application.term_months.unwrap_or(product.default_term_months);
    if term_months == 0 {
        return Err(FinanceHubError::invalid(
            "term_months",
            "term must be a positive integer number of months",
        ));
    }

    let monthly_payment = level_payment(application.amount, monthly_rate(product.annual_rate), term_months)?;
    let monthly_income = application.annual_income / Decimal::from(MONTHS_PER_YEAR);
    let total_monthly_debt = application
        .existing_monthly_debt
        .checked_add(monthly_payment)
        .ok_or_else(|| FinanceHubError::overflow("total monthly debt"))?;
    let dti = dti_ratio(monthly_income, total_monthly_debt)?;

    let mut reasons = Vec::new();
    if dti > policy.max_dti_percent {
        reasons.push(format!(
            "DTI too high ({}% > {}%)",
            dti.round_dp(1),
            policy.max_dti_percent.normalize()
        ));
    }
    if monthly_income < policy.min_monthly_income {
        reasons.push(format!(
            "Insufficient income (€{} < €{})",
            monthly_income.round_dp(0),
            policy.min_monthly_income.normalize()
        ));
    }
    if !policy.is_eligible_employment(&application.employment_status) {
        reasons.push(format!(
            "Employment status '{}' is not eligible",
            application.employment_status
        ));
    }
    if application.amount < policy.min_amount || application.amount > policy.max_amount {
        reasons.push(format!(
            "Amount outside lending bounds (€{} - €{})",
            policy.min_amount.normalize(),
            policy.max_amount.normalize()
        ));
    }

    let approved = reasons.is_empty();
    let summary = if approved {
        format!("Loan approved. DTI: {}%, income sustainable.", dti.round_dp(1))
    } else {
        format!("Loan declined: {}", reasons.join(", "))
    };

    if approved {
        debug!(loan_type = %application.loan_type, %dti, "loan application approved");
    } else {
        warn!(loan_type = %application.loan_type, %dti, reasons = reasons.len(), "loan application declined");
    }

    Ok(LoanDecision {
        approved,
        loan_type: application.loan_type,
        annual_rate: product.annual_rate,
        term_months,
        monthly_payment: round_display(monthly_payment),
        monthly_income: round_display(monthly_income),
        total_monthly_debt: round_display(total_monthly_debt),
        dti_ratio: round_display(dti),
        summary,
        reasons,
    })
}

/// Enveloped underwriting decision for CLI and binding callers.
pub fn evaluate_application(
    application: &LoanApplication,
    policy: &LendingPolicy,
) -> FinanceHubResult<ComputationOutput<LoanDecision>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let decision = assess_application(application, policy)?;

    if let Err(e) = validate_amount(
        application.loan_type,
        application.amount,
        decision.monthly_income,
        policy,
    ) {
        warnings.push(e.to_string());
    }
    if application.annual_income.is_zero() {
        warnings.push("No income declared: DTI reported as 100%".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan underwriting (level-payment pricing, debt-to-income and eligibility rules)",
        &serde_json::json!({
            "max_dti_percent": policy.max_dti_percent.to_string(),
            "min_monthly_income": policy.min_monthly_income.to_string(),
            "eligible_employment": policy.eligible_employment,
        }),
        warnings,
        elapsed,
        decision,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(loan_type: LoanType, amount: Decimal, annual_income: Decimal) -> LoanApplication {
        LoanApplication {
            loan_type,
            amount,
            annual_income,
            employment_status: "employed".into(),
            term_months: None,
            existing_monthly_debt: Decimal::ZERO,
        }
    }

    #[test]
    fn test_dti_ratio_zero_income_is_full() {
        assert_eq!(dti_ratio(Decimal::ZERO, dec!(500)).unwrap(), dec!(100));
    }

    #[test]
    fn test_dti_ratio_basic() {
        assert_eq!(dti_ratio(dec!(4000), dec!(1000)).unwrap(), dec!(25));
    }

    #[test]
    fn test_dti_ratio_tiny_income_does_not_panic() {
        let result = dti_ratio(dec!(0.0000000000000000000001), dec!(1000000000));
        assert!(matches!(result, Err(FinanceHubError::FinancialImpossibility(_))));
    }

    #[test]
    fn test_loan_type_parsing() {
        assert_eq!("Mortgage".parse::<LoanType>().unwrap(), LoanType::Mortgage);
        let err = "invalid-type".parse::<LoanType>().unwrap_err();
        assert!(err.to_string().contains("Invalid loan type"));
    }

    #[test]
    fn test_validate_amount_product_bounds() {
        let policy = LendingPolicy::default();
        assert!(validate_amount(LoanType::Personal, dec!(20000), dec!(5000), &policy).is_ok());

        let err = validate_amount(LoanType::Personal, dec!(500), dec!(5000), &policy).unwrap_err();
        assert!(err.to_string().contains("between €1000 and €50000"));

        assert!(validate_amount(LoanType::Personal, dec!(60000), dec!(5000), &policy).is_err());
        assert!(validate_amount(LoanType::Auto, dec!(3000), dec!(6000), &policy).is_err());
        assert!(validate_amount(LoanType::Auto, dec!(90000), dec!(6000), &policy).is_err());
        assert!(validate_amount(LoanType::Mortgage, dec!(30000), dec!(10000), &policy).is_err());
    }

    #[test]
    fn test_validate_amount_income_cap() {
        let policy = LendingPolicy::default();
        // 3,000/month * 0.4 * 12 = 14,400 cap
        let err = validate_amount(LoanType::Personal, dec!(20000), dec!(3000), &policy).unwrap_err();
        assert!(err.to_string().contains("debt-to-income ratio"));
        assert!(validate_amount(LoanType::Personal, dec!(10000), dec!(3000), &policy).is_ok());
    }

    #[test]
    fn test_income_cap_applies_to_every_product() {
        let policy = LendingPolicy::default();
        // Inside product bounds, above income * 0.4 * 12
        for (loan_type, amount, income) in [
            (LoanType::Personal, dec!(25000), dec!(5000)),
            (LoanType::Auto, dec!(40000), dec!(6000)),
            (LoanType::Mortgage, dec!(200000), dec!(10000)),
        ] {
            let err = validate_amount(loan_type, amount, income, &policy).unwrap_err();
            assert!(err.to_string().contains("debt-to-income ratio"), "{loan_type}: {err}");
        }
        // 10,000 * 0.4 * 12 = 48,000
        assert!(validate_amount(LoanType::Mortgage, dec!(50000), dec!(10000), &policy).is_err());
        assert!(validate_amount(LoanType::Mortgage, dec!(50000), dec!(10500), &policy).is_ok());
    }

    #[test]
    fn test_assess_approves_affordable_personal_loan() {
        let policy = LendingPolicy::default();
        let decision = assess_application(&application(LoanType::Personal, dec!(10000), dec!(60000)), &policy).unwrap();
        assert!(decision.approved);
        assert!(decision.reasons.is_empty());
        assert_eq!(decision.term_months, 36);
        assert_eq!(decision.monthly_income, dec!(5000));
        assert!(decision.dti_ratio < dec!(10));
    }

    #[test]
    fn test_assess_declines_with_every_failed_rule() {
        let policy = LendingPolicy::default();
        let mut app = application(LoanType::Personal, dec!(45000), dec!(18000));
        app.employment_status = "unemployed".into();
        let decision = assess_application(&app, &policy).unwrap();
        assert!(!decision.approved);
        assert_eq!(decision.reasons.len(), 3);
        assert!(decision.summary.starts_with("Loan declined"));
    }

    #[test]
    fn test_assess_uses_explicit_term() {
        let policy = LendingPolicy::default();
        let mut app = application(LoanType::Auto, dec!(20000), dec!(60000));
        app.term_months = Some(24);
        let decision = assess_application(&app, &policy).unwrap();
        assert_eq!(decision.term_months, 24);
        assert_eq!(decision.annual_rate, dec!(0.062));
    }

    #[test]
    fn test_assess_counts_existing_debt() {
        let policy = LendingPolicy::default();
        let mut app = application(LoanType::Personal, dec!(10000), dec!(60000));
        app.existing_monthly_debt = dec!(2000);
        let decision = assess_application(&app, &policy).unwrap();
        // 2,000 existing + ~315.68 new against 5,000 income
        assert!(!decision.approved);
        assert!(decision.dti_ratio > dec!(40));
    }

    #[test]
    fn test_missing_product_is_invalid_type() {
        let mut policy = LendingPolicy::default();
        policy.products.remove(&LoanType::Business);
        let err = assess_application(&application(LoanType::Business, dec!(10000), dec!(90000)), &policy).unwrap_err();
        assert!(err.to_string().contains("Invalid loan type"));
    }
}
