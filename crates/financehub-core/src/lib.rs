pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "investing")]
pub mod investing;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::FinanceHubError;
pub use types::*;

#[cfg(feature = "lending")]
pub use lending::amortization::compute_loan;

#[cfg(feature = "investing")]
pub use investing::projection::compute_investment_projection;

#[cfg(feature = "portfolio")]
pub use portfolio::allocation::compute_portfolio_allocation;

#[cfg(feature = "portfolio")]
pub use portfolio::gain_loss::compute_gain_loss;

/// Standard result type for all FinanceHub calculations
pub type FinanceHubResult<T> = Result<T, FinanceHubError>;
