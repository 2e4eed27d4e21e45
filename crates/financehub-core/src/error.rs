use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinanceHubError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FinanceHubError {
    /// Shorthand for the validation failures every calculator raises.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FinanceHubError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A figure left the representable Decimal range.
    pub fn overflow(context: impl std::fmt::Display) -> Self {
        FinanceHubError::FinancialImpossibility(format!(
            "{context} exceeds the representable decimal range"
        ))
    }
}

impl From<serde_json::Error> for FinanceHubError {
    fn from(e: serde_json::Error) -> Self {
        FinanceHubError::SerializationError(e.to_string())
    }
}
