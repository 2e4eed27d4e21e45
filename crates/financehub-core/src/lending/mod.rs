pub mod amortization;
pub mod application;
