use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Risk parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("The provided entry price ({0}) is zero or negative.")]
    InvalidEntryPrice(Decimal),

    #[error("Leverage must be at least 1, got {0}.")]
    InvalidLeverage(Decimal),

    #[error("A calculation error occurred: {0}")]
    Calculation(String),

    #[error("Unknown sizing mode '{0}' (expected crypto or forex)")]
    UnknownMode(String),
}
