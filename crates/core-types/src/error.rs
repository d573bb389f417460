use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unknown trade type '{0}' (expected LONG or SHORT)")]
    UnknownTradeType(String),
}
