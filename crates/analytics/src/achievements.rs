//! Milestone badges.
//!
//! Badges are pure predicates over the current trade list; each rule in [`BADGE_RULES`]
//! is evaluated on its own and several may unlock at once.

use crate::stats::win_rate_pct;
use core_types::Trade;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const WHALE_PNL: Decimal = dec!(500);
const SNIPER_MIN_TRADES: usize = 5;
const SNIPER_MIN_WIN_RATE_PCT: Decimal = dec!(60);
const VETERAN_MIN_TRADES: usize = 10;
const STREAK_WINDOW: usize = 3;

/// Badge identifiers. The declaration order is the display ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementId {
    Rookie,
    Streak,
    Whale,
    Sniper,
    Veteran,
}

impl AchievementId {
    /// Every badge, in ranking order.
    pub const ALL: [AchievementId; 5] = [
        AchievementId::Rookie,
        AchievementId::Streak,
        AchievementId::Whale,
        AchievementId::Sniper,
        AchievementId::Veteran,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AchievementId::Rookie => "Rookie",
            AchievementId::Streak => "On Fire",
            AchievementId::Whale => "Whale",
            AchievementId::Sniper => "Sniper",
            AchievementId::Veteran => "Veteran",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::Rookie => "Logged your first trade",
            AchievementId::Streak => "3 consecutive wins",
            AchievementId::Whale => "Single trade profit of $500 or more",
            AchievementId::Sniper => "Win rate of 60% or more over 5+ trades",
            AchievementId::Veteran => "Logged 10+ trades",
        }
    }

    /// Icon tag the presentation layer renders for this badge.
    pub fn icon(&self) -> &'static str {
        match self {
            AchievementId::Rookie => "medal",
            AchievementId::Streak => "flame",
            AchievementId::Whale => "crown",
            AchievementId::Sniper => "target",
            AchievementId::Veteran => "trophy",
        }
    }
}

struct BadgeRule {
    id: AchievementId,
    unlocked: fn(&[Trade]) -> bool,
}

const BADGE_RULES: &[BadgeRule] = &[
    BadgeRule {
        id: AchievementId::Rookie,
        unlocked: rookie,
    },
    BadgeRule {
        id: AchievementId::Streak,
        unlocked: recent_streak,
    },
    BadgeRule {
        id: AchievementId::Whale,
        unlocked: whale,
    },
    BadgeRule {
        id: AchievementId::Sniper,
        unlocked: sniper,
    },
    BadgeRule {
        id: AchievementId::Veteran,
        unlocked: veteran,
    },
];

/// Evaluates every badge against `trades`, which must be in repository order (newest first).
pub fn compute_achievements(trades: &[Trade]) -> BTreeSet<AchievementId> {
    let unlocked: BTreeSet<AchievementId> = BADGE_RULES
        .iter()
        .filter(|rule| (rule.unlocked)(trades))
        .map(|rule| rule.id)
        .collect();

    tracing::debug!(?unlocked, "Evaluated achievements");
    unlocked
}

fn rookie(trades: &[Trade]) -> bool {
    !trades.is_empty()
}

// Only the three most recent trades count; older streaks do not.
fn recent_streak(trades: &[Trade]) -> bool {
    trades.len() >= STREAK_WINDOW && trades[..STREAK_WINDOW].iter().all(Trade::is_win)
}

fn sniper(trades: &[Trade]) -> bool {
    let wins = trades.iter().filter(|t| t.is_win()).count();
    trades.len() >= SNIPER_MIN_TRADES && win_rate_pct(wins, trades.len()) >= SNIPER_MIN_WIN_RATE_PCT
}

fn whale(trades: &[Trade]) -> bool {
    trades.iter().any(|t| t.pnl >= WHALE_PNL)
}

fn veteran(trades: &[Trade]) -> bool {
    trades.len() >= VETERAN_MIN_TRADES
}
