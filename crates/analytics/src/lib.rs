//! # Tradebook Analytics Engine
//!
//! This crate turns the journal's list of closed trades into performance feedback.
//! It acts as the "unbiased judge" of the trader's history.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of storage or presentation.
//!   It depends only on `core-types`.
//! - **Stateless Calculation:** Every computation is a plain function of an immutable
//!   slice of trades. Nothing is cached between calls; callers re-invoke on change.
//! - **Own Ordering:** The repository hands trades over in no particular order, so each
//!   aggregator sorts (or deliberately does not sort) the input itself.
//!
//! ## Public API
//!
//! - `compute_stats`, `compute_equity_curve`, `compute_calendar`, `compute_breakdown`,
//!   `compute_insights`, `compute_achievements`: the individual calculators.
//! - `AnalyticsEngine`: bundles all of them into a single `DashboardReport`.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod achievements;
pub mod breakdown;
pub mod calendar;
pub mod engine;
pub mod equity;
pub mod error;
pub mod insights;
pub mod report;
pub mod stats;

#[cfg(test)]
pub(crate) mod fixtures;

pub use achievements::{compute_achievements, AchievementId};
pub use breakdown::{
    asset_allocation, compute_breakdown, star_performer, AllocationSlice, BreakdownField,
    CategoryPerformance,
};
pub use calendar::{compute_calendar, compute_calendar_for_current_month, DayCell};
pub use engine::AnalyticsEngine;
pub use equity::{
    compute_equity_curve, compute_equity_curve_in, max_drawdown, Drawdown, EquityPoint,
    DEFAULT_STARTING_EQUITY,
};
pub use error::AnalyticsError;
pub use insights::{compute_insights, Insight, InsightCategory};
pub use report::DashboardReport;
pub use stats::{compute_stats, PortfolioStats};
