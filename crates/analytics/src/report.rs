use crate::achievements::AchievementId;
use crate::breakdown::{AllocationSlice, CategoryPerformance};
use crate::calendar::DayCell;
use crate::equity::{Drawdown, EquityPoint};
use crate::insights::Insight;
use crate::stats::PortfolioStats;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything the dashboard shows, computed from one snapshot of the journal.
///
/// This struct is the final output of the `AnalyticsEngine` and is what the
/// `report` command serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    // I. Portfolio totals
    pub stats: PortfolioStats,
    pub allocation: Vec<AllocationSlice>,

    // II. Time series
    pub starting_equity: Decimal,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown: Drawdown,
    pub calendar_year: i32,
    pub calendar_month: u32,
    pub calendar: Vec<DayCell>,

    // III. Breakdowns
    pub by_strategy: Vec<CategoryPerformance>,
    pub by_emotion: Vec<CategoryPerformance>,
    pub by_asset_class: Vec<CategoryPerformance>,

    // IV. Feedback
    pub insights: Vec<Insight>,
    pub achievements: BTreeSet<AchievementId>,
}
