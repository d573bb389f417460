use core_types::Trade;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Whole-portfolio counts, rates and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage of winning trades, rounded to one decimal place.
    pub win_rate_pct: Decimal,
    /// Sum of all trade PnL, rounded to cents.
    pub total_pnl: Decimal,

    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: Option<Decimal>, // None when there are no losing trades
    pub best_trade: Option<Decimal>,
    pub worst_trade: Option<Decimal>,
}

impl PortfolioStats {
    /// Creates a new, zeroed-out stats block, which is also the result for an empty journal.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            wins: 0,
            losses: 0,
            win_rate_pct: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: None,
            best_trade: None,
            worst_trade: None,
        }
    }
}

impl Default for PortfolioStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregates the full trade list into a `PortfolioStats`.
pub fn compute_stats(trades: &[Trade]) -> PortfolioStats {
    let mut stats = PortfolioStats::new();
    if trades.is_empty() {
        return stats;
    }

    let mut total_pnl = Decimal::ZERO;
    for trade in trades {
        total_pnl += trade.pnl;

        if trade.is_win() {
            stats.wins += 1;
        }
        if trade.pnl > Decimal::ZERO {
            stats.gross_profit += trade.pnl;
        } else if trade.pnl < Decimal::ZERO {
            stats.gross_loss += trade.pnl.abs();
        }

        stats.best_trade = Some(stats.best_trade.map_or(trade.pnl, |b| b.max(trade.pnl)));
        stats.worst_trade = Some(stats.worst_trade.map_or(trade.pnl, |w| w.min(trade.pnl)));
    }

    stats.total_trades = trades.len();
    stats.losses = stats.total_trades - stats.wins;
    stats.win_rate_pct = round_half_up(win_rate_pct(stats.wins, stats.total_trades), 1);
    stats.total_pnl = round_half_up(total_pnl, 2);

    if stats.gross_loss > Decimal::ZERO {
        stats.profit_factor = Some(stats.gross_profit / stats.gross_loss);
    }

    tracing::debug!(
        total = stats.total_trades,
        wins = stats.wins,
        total_pnl = %stats.total_pnl,
        "Computed portfolio stats"
    );

    stats
}

/// Unrounded win percentage; zero for an empty population.
pub(crate) fn win_rate_pct(wins: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(wins) / Decimal::from(total) * Decimal::ONE_HUNDRED
}

pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{long, short};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_journal_is_all_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, PortfolioStats::default());
        assert_eq!(stats.win_rate_pct, Decimal::ZERO);
    }

    #[test]
    fn test_three_trade_example() {
        let trades = vec![long(dec!(750)), short(dec!(-250)), long(dec!(40))];
        let stats = compute_stats(&trades);

        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.win_rate_pct, dec!(66.7));
        assert_eq!(stats.total_pnl, dec!(540.00));
        assert_eq!(stats.gross_profit, dec!(790));
        assert_eq!(stats.gross_loss, dec!(250));
        assert_eq!(stats.profit_factor, Some(dec!(3.16)));
        assert_eq!(stats.best_trade, Some(dec!(750)));
        assert_eq!(stats.worst_trade, Some(dec!(-250)));
    }

    #[test]
    fn test_flat_trade_counts_as_win() {
        let stats = compute_stats(&[long(dec!(0)), short(dec!(-10))]);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.win_rate_pct, dec!(50.0));
        // A flat trade adds to neither gross figure.
        assert_eq!(stats.gross_profit, Decimal::ZERO);
    }

    #[test]
    fn test_no_losses_leaves_profit_factor_undefined() {
        let stats = compute_stats(&[long(dec!(10)), long(dec!(20))]);
        assert_eq!(stats.profit_factor, None);
        assert_eq!(stats.win_rate_pct, dec!(100.0));
    }

    proptest! {
        #[test]
        fn prop_total_pnl_matches_sum(cents in prop::collection::vec(-500_000i64..500_000, 0..40)) {
            let trades: Vec<_> = cents.iter().map(|c| long(Decimal::new(*c, 2))).collect();
            let expected: Decimal = trades.iter().map(|t| t.pnl).sum();
            let stats = compute_stats(&trades);
            prop_assert_eq!(stats.total_pnl, expected);
            prop_assert_eq!(stats.wins + stats.losses, trades.len());
        }
    }
}
