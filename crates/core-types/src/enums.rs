use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a trade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    #[default]
    Long,
    Short,
}

impl TradeType {
    /// The sign applied to `(exit - entry) * quantity` to obtain a trade's PnL.
    pub fn direction(&self) -> Decimal {
        match self {
            TradeType::Long => Decimal::ONE,
            TradeType::Short => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Long => write!(f, "LONG"),
            TradeType::Short => write!(f, "SHORT"),
        }
    }
}

impl FromStr for TradeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" | "BUY" => Ok(TradeType::Long),
            "SHORT" | "SELL" => Ok(TradeType::Short),
            other => Err(CoreError::UnknownTradeType(other.to_string())),
        }
    }
}

/// The outcome of a closed trade.
///
/// A flat trade (PnL of exactly zero) is classified as a `Win`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Win,
    Loss,
}

impl TradeStatus {
    pub fn from_pnl(pnl: Decimal) -> Self {
        if pnl >= Decimal::ZERO {
            TradeStatus::Win
        } else {
            TradeStatus::Loss
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Win => write!(f, "WIN"),
            TradeStatus::Loss => write!(f, "LOSS"),
        }
    }
}
