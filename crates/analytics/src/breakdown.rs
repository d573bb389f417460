use crate::error::AnalyticsError;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Label used for strategy and emotion groups when the trade has none.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label used by the allocation view for trades without an asset class.
pub const OTHER_LABEL: &str = "Other";

/// The categorical trade attribute a breakdown is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakdownField {
    Strategy,
    Emotion,
    AssetClass,
}

impl BreakdownField {
    /// The group a trade falls into, or `None` if the trade is excluded from this breakdown.
    ///
    /// Strategy and emotion fall back to [`UNKNOWN_LABEL`]; a trade without an asset
    /// class does not take part in the asset-class breakdown at all.
    fn group_of(&self, trade: &Trade) -> Option<String> {
        let raw = match self {
            BreakdownField::Strategy => trade.strategy.as_deref(),
            BreakdownField::Emotion => trade.emotion.as_deref(),
            BreakdownField::AssetClass => trade.asset_class.as_deref(),
        };
        let label = raw.map(str::trim).filter(|l| !l.is_empty());
        match self {
            BreakdownField::AssetClass => label.map(str::to_string),
            _ => Some(label.unwrap_or(UNKNOWN_LABEL).to_string()),
        }
    }
}

impl fmt::Display for BreakdownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownField::Strategy => write!(f, "strategy"),
            BreakdownField::Emotion => write!(f, "emotion"),
            BreakdownField::AssetClass => write!(f, "asset-class"),
        }
    }
}

impl FromStr for BreakdownField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "strategy" => Ok(BreakdownField::Strategy),
            "emotion" => Ok(BreakdownField::Emotion),
            "asset-class" | "assetclass" | "asset" => Ok(BreakdownField::AssetClass),
            _ => Err(AnalyticsError::UnknownField(s.to_string())),
        }
    }
}

/// Aggregated result for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub name: String,
    pub pnl: Decimal,
    pub trade_count: usize,
    pub win_count: usize,
}

/// Number of trades per asset class, for the portfolio allocation view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub name: String,
    pub trade_count: usize,
}

/// Groups trades by `field` and returns the groups ordered by summed PnL, best first.
/// Groups with equal PnL are ordered by name.
pub fn compute_breakdown(trades: &[Trade], field: BreakdownField) -> Vec<CategoryPerformance> {
    let mut groups: BTreeMap<String, CategoryPerformance> = BTreeMap::new();

    for trade in trades {
        let Some(name) = field.group_of(trade) else {
            continue;
        };
        let group = groups
            .entry(name.clone())
            .or_insert_with(|| CategoryPerformance {
                name,
                pnl: Decimal::ZERO,
                trade_count: 0,
                win_count: 0,
            });
        group.pnl += trade.pnl;
        group.trade_count += 1;
        if trade.is_win() {
            group.win_count += 1;
        }
    }

    // BTreeMap iteration is name-ordered and the sort is stable.
    let mut ranked: Vec<CategoryPerformance> = groups.into_values().collect();
    ranked.sort_by(|a, b| b.pnl.cmp(&a.pnl));

    tracing::debug!(%field, groups = ranked.len(), "Computed breakdown");
    ranked
}

/// The most profitable asset class backed by more than one trade, if it made money.
pub fn star_performer(trades: &[Trade]) -> Option<CategoryPerformance> {
    compute_breakdown(trades, BreakdownField::AssetClass)
        .into_iter()
        .find(|group| group.trade_count > 1)
        .filter(|leader| leader.pnl > Decimal::ZERO)
}

/// Trade counts per asset class, largest first. Trades without one count as [`OTHER_LABEL`].
pub fn asset_allocation(trades: &[Trade]) -> Vec<AllocationSlice> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for trade in trades {
        let name = trade
            .asset_class
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(OTHER_LABEL);
        *counts.entry(name).or_default() += 1;
    }

    let mut slices: Vec<AllocationSlice> = counts
        .into_iter()
        .map(|(name, trade_count)| AllocationSlice {
            name: name.to_string(),
            trade_count,
        })
        .collect();
    slices.sort_by(|a, b| b.trade_count.cmp(&a.trade_count));
    slices
}
