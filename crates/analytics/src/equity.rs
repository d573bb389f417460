use chrono::{DateTime, Local, TimeZone, Utc};
use core_types::Trade;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Baseline account value the curve starts from when none is configured.
pub const DEFAULT_STARTING_EQUITY: Decimal = dec!(10000);

/// One step of the cumulative equity series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Short local date label, e.g. `Oct 19`.
    pub label: String,
    pub date: DateTime<Utc>,
    pub pnl: Decimal,
    pub equity: Decimal,
}

/// Peak-to-trough decline of an equity curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,
}

/// Builds the equity curve with labels in the system's local time zone.
pub fn compute_equity_curve(trades: &[Trade], starting_equity: Decimal) -> Vec<EquityPoint> {
    compute_equity_curve_in(trades, starting_equity, &Local)
}

/// Builds the equity curve, labelling each point with its date in `tz`.
///
/// Trades are ordered by `date` ascending with a stable sort, so trades sharing a
/// timestamp keep the order they were supplied in.
pub fn compute_equity_curve_in<Tz>(
    trades: &[Trade],
    starting_equity: Decimal,
    tz: &Tz,
) -> Vec<EquityPoint>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let curve: Vec<EquityPoint> = ordered
        .into_iter()
        .scan(starting_equity, |equity, trade| {
            *equity += trade.pnl;
            Some(EquityPoint {
                label: trade.date.with_timezone(tz).format("%b %-d").to_string(),
                date: trade.date,
                pnl: trade.pnl,
                equity: *equity,
            })
        })
        .collect();

    tracing::debug!(points = curve.len(), start = %starting_equity, "Built equity curve");
    curve
}

/// Largest drop from a running peak, measured from `starting_equity` onwards.
pub fn max_drawdown(curve: &[EquityPoint], starting_equity: Decimal) -> Drawdown {
    let mut peak = starting_equity;
    let mut peak_at_max = starting_equity;
    let mut max_drawdown = Decimal::ZERO;

    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        }
        let drawdown = peak - point.equity;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
            peak_at_max = peak;
        }
    }

    let max_drawdown_pct = if peak_at_max > Decimal::ZERO {
        (max_drawdown / peak_at_max) * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    Drawdown {
        max_drawdown,
        max_drawdown_pct,
    }
}
