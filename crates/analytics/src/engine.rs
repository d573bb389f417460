use crate::achievements::{compute_achievements, AchievementId};
use crate::breakdown::{asset_allocation, compute_breakdown, BreakdownField, CategoryPerformance};
use crate::calendar::{build_month, compute_calendar, DayCell};
use crate::equity::{compute_equity_curve_in, max_drawdown, EquityPoint, DEFAULT_STARTING_EQUITY};
use crate::error::AnalyticsError;
use crate::insights::{compute_insights, Insight};
use crate::report::DashboardReport;
use crate::stats::{compute_stats, PortfolioStats};
use chrono::{Datelike, Local, TimeZone};
use core_types::Trade;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fmt::Display;

/// A stateless calculator for deriving performance feedback from the journal.
///
/// The only thing it holds is the baseline the equity curve starts from; every
/// method is a pure function of the trades passed in.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    starting_equity: Decimal,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_EQUITY)
    }
}

impl AnalyticsEngine {
    pub fn new(starting_equity: Decimal) -> Self {
        Self { starting_equity }
    }

    pub fn starting_equity(&self) -> Decimal {
        self.starting_equity
    }

    pub fn stats(&self, trades: &[Trade]) -> PortfolioStats {
        compute_stats(trades)
    }

    pub fn equity_curve(&self, trades: &[Trade]) -> Vec<EquityPoint> {
        compute_equity_curve_in(trades, self.starting_equity, &Local)
    }

    pub fn calendar(
        &self,
        trades: &[Trade],
        year: i32,
        month: u32,
    ) -> Result<Vec<DayCell>, AnalyticsError> {
        compute_calendar(trades, year, month, &Local)
    }

    pub fn breakdown(&self, trades: &[Trade], field: BreakdownField) -> Vec<CategoryPerformance> {
        compute_breakdown(trades, field)
    }

    pub fn insights(&self, trades: &[Trade]) -> Vec<Insight> {
        compute_insights(trades)
    }

    pub fn achievements(&self, trades: &[Trade]) -> BTreeSet<AchievementId> {
        compute_achievements(trades)
    }

    /// Builds the full dashboard for the current local month.
    pub fn report(&self, trades: &[Trade]) -> DashboardReport {
        let today = Local::now().date_naive();
        let calendar = build_month(trades, today.with_day(1).unwrap_or(today), &Local);
        self.assemble(trades, today.year(), today.month(), calendar, &Local)
    }

    /// The main entry point for building a `DashboardReport`.
    ///
    /// # Arguments
    ///
    /// * `trades` - The journal in repository order (newest first).
    /// * `year`, `month` - The month shown in the calendar heatmap.
    /// * `tz` - The zone used for calendar bucketing and curve labels.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DashboardReport`, or `AnalyticsError::InvalidPeriod`
    /// if `year`-`month` is not a real month.
    pub fn report_in<Tz>(
        &self,
        trades: &[Trade],
        year: i32,
        month: u32,
        tz: &Tz,
    ) -> Result<DashboardReport, AnalyticsError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let calendar = compute_calendar(trades, year, month, tz)?;
        Ok(self.assemble(trades, year, month, calendar, tz))
    }

    fn assemble<Tz>(
        &self,
        trades: &[Trade],
        year: i32,
        month: u32,
        calendar: Vec<DayCell>,
        tz: &Tz,
    ) -> DashboardReport
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let equity_curve = compute_equity_curve_in(trades, self.starting_equity, tz);
        let drawdown = max_drawdown(&equity_curve, self.starting_equity);

        tracing::info!(trades = trades.len(), year, month, "Building dashboard report");

        DashboardReport {
            stats: compute_stats(trades),
            allocation: asset_allocation(trades),
            starting_equity: self.starting_equity,
            equity_curve,
            drawdown,
            calendar_year: year,
            calendar_month: month,
            calendar,
            by_strategy: compute_breakdown(trades, BreakdownField::Strategy),
            by_emotion: compute_breakdown(trades, BreakdownField::Emotion),
            by_asset_class: compute_breakdown(trades, BreakdownField::AssetClass),
            insights: compute_insights(trades),
            achievements: compute_achievements(trades),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, dated, in_class, long, short};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn journal() -> Vec<Trade> {
        // Newest first, as the repository supplies them.
        vec![
            in_class(dated(long(dec!(40)), at(2024, 3, 4, 11, 0)), "Forex"),
            in_class(dated(short(dec!(-250)), at(2024, 3, 3, 9, 15)), "Crypto"),
            in_class(dated(long(dec!(750)), at(2024, 3, 2, 10, 0)), "Crypto"),
        ]
    }

    #[test]
    fn test_report_is_consistent_with_calculators() {
        let engine = AnalyticsEngine::new(dec!(5000));
        let trades = journal();
        let report = engine.report_in(&trades, 2024, 3, &Utc).unwrap();

        assert_eq!(report.stats, compute_stats(&trades));
        assert_eq!(report.starting_equity, dec!(5000));
        assert_eq!(report.equity_curve.last().unwrap().equity, dec!(5540));
        assert_eq!(report.drawdown.max_drawdown, dec!(250));
        assert_eq!(report.by_asset_class[0].name, "Crypto");
        assert_eq!(report.by_strategy[0].name, "Unknown");
        assert!(report.achievements.contains(&AchievementId::Whale));
        assert!(!report.achievements.contains(&AchievementId::Streak));
        assert!(!report.insights.is_empty());

        let active_days = report
            .calendar
            .iter()
            .filter(|c| matches!(c, DayCell::Day { active: true, .. }))
            .count();
        assert_eq!(active_days, 3);
    }

    #[test]
    fn test_report_rejects_invalid_month() {
        let engine = AnalyticsEngine::default();
        assert!(matches!(
            engine.report_in(&journal(), 2024, 0, &Utc),
            Err(AnalyticsError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_default_engine_starts_at_ten_thousand() {
        let engine = AnalyticsEngine::default();
        assert_eq!(engine.starting_equity(), dec!(10000));
        let report = engine.report(&[]);
        assert_eq!(report.stats.total_trades, 0);
        assert!(report.equity_curve.is_empty());
        assert_eq!(report.insights.len(), 1);
    }
}
