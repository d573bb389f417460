use crate::enums::{TradeStatus, TradeType};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user-entered fields of a trade, before any derived values are computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTrade {
    pub symbol: String,
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    pub date: DateTime<Utc>,
    pub strategy: Option<String>,
    pub emotion: Option<String>,
    pub asset_class: Option<String>,
    pub market_trend: Option<String>,
    pub notes: Option<String>,
}

/// A closed trade as recorded in the journal.
///
/// `pnl` and `status` are derived exactly once, in [`Trade::open`], and are
/// stored alongside the raw fields. Nothing downstream recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: Uuid,
    pub symbol: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    pub date: DateTime<Utc>,
    pub pnl: Decimal,
    pub status: TradeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_trend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Trade {
    /// Validates the user-entered fields, assigns a fresh id and derives `pnl` and `status`.
    pub fn open(new: NewTrade) -> Result<Self, CoreError> {
        let symbol = new.symbol.trim().to_string();
        if symbol.is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "must not be empty".to_string(),
            ));
        }
        ensure_positive("entry_price", new.entry_price)?;
        ensure_positive("exit_price", new.exit_price)?;
        ensure_positive("quantity", new.quantity)?;

        let pnl = Self::derive_pnl(
            new.trade_type,
            new.entry_price,
            new.exit_price,
            new.quantity,
        );

        Ok(Self {
            id: Uuid::new_v4(),
            symbol,
            trade_type: new.trade_type,
            entry_price: new.entry_price,
            exit_price: new.exit_price,
            quantity: new.quantity,
            date: new.date,
            pnl,
            status: TradeStatus::from_pnl(pnl),
            strategy: normalize_label(new.strategy),
            emotion: normalize_label(new.emotion),
            asset_class: normalize_label(new.asset_class),
            market_trend: normalize_label(new.market_trend),
            notes: normalize_label(new.notes),
        })
    }

    /// `(exit - entry) * quantity`, signed by direction and rounded to cents.
    pub fn derive_pnl(
        trade_type: TradeType,
        entry_price: Decimal,
        exit_price: Decimal,
        quantity: Decimal,
    ) -> Decimal {
        ((exit_price - entry_price) * quantity * trade_type.direction())
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn is_win(&self) -> bool {
        self.status == TradeStatus::Win
    }
}

fn ensure_positive(field: &str, value: Decimal) -> Result<(), CoreError> {
    if value <= Decimal::ZERO {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            format!("must be positive, got {}", value),
        ));
    }
    Ok(())
}

// Blank labels are stored as absent.
fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}
