use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid calendar period: {year}-{month:02} does not exist")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("Unknown breakdown field '{0}' (expected strategy, emotion or asset-class)")]
    UnknownField(String),
}
