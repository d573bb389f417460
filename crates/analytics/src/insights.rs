//! Rule-based behavioural insights.
//!
//! Each detector is an entry in [`DETECTORS`]: a category and title paired with a
//! function that inspects the trades and, when its pattern is present, produces the
//! description. All detectors are evaluated on every call; only the final truncation
//! and the fallback depend on table order.

use crate::breakdown::star_performer;
use crate::stats::{round_half_up, win_rate_pct};
use core_types::{Trade, TradeStatus, TradeType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of insights returned.
pub const MAX_INSIGHTS: usize = 3;

/// Words in notes or emotion labels that mark a trade as taken under emotional stress.
pub const TILT_KEYWORDS: [&str; 6] =
    ["revenge", "angry", "fomo", "frustrated", "greedy", "fearful"];

/// Win-rate gap, in percentage points, above which a directional bias is reported.
const BIAS_THRESHOLD_PCT: Decimal = dec!(20);

/// Loss fraction among emotionally tagged trades above which leakage is reported.
const LEAKAGE_LOSS_FRACTION: Decimal = dec!(0.6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Success,
    Warning,
    Highlight,
}

impl InsightCategory {
    /// Icon tag the presentation layer renders for this category.
    pub fn icon(&self) -> &'static str {
        match self {
            InsightCategory::Success => "trending-up",
            InsightCategory::Warning => "brain",
            InsightCategory::Highlight => "sparkles",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
}

struct Detector {
    category: InsightCategory,
    title: &'static str,
    describe: fn(&[Trade]) -> Option<String>,
}

impl Detector {
    fn evaluate(&self, trades: &[Trade]) -> Option<Insight> {
        (self.describe)(trades).map(|description| Insight {
            category: self.category,
            title: self.title.to_string(),
            description,
        })
    }
}

/// Detectors in priority order.
const DETECTORS: &[Detector] = &[
    Detector {
        category: InsightCategory::Success,
        title: "Directional Bias Detected",
        describe: directional_bias,
    },
    Detector {
        category: InsightCategory::Warning,
        title: "Emotional Leakage",
        describe: emotional_leakage,
    },
    Detector {
        category: InsightCategory::Highlight,
        title: "Star Performer",
        describe: star_asset_class,
    },
];

/// Runs every detector and returns between one and [`MAX_INSIGHTS`] insights.
pub fn compute_insights(trades: &[Trade]) -> Vec<Insight> {
    let fired: Vec<Insight> = DETECTORS
        .iter()
        .filter_map(|detector| detector.evaluate(trades))
        .collect();

    tracing::debug!(fired = fired.len(), trades = trades.len(), "Evaluated insight detectors");

    if fired.is_empty() {
        return vec![gathering_data()];
    }
    fired.into_iter().take(MAX_INSIGHTS).collect()
}

fn gathering_data() -> Insight {
    Insight {
        category: InsightCategory::Highlight,
        title: "Gathering Data".to_string(),
        description: "Keep logging trades! More history is needed to spot personalized patterns."
            .to_string(),
    }
}

fn side_win_rate(trades: &[Trade], side: TradeType) -> Decimal {
    let (total, wins) = trades
        .iter()
        .filter(|t| t.trade_type == side)
        .fold((0, 0), |(total, wins), t| (total + 1, wins + usize::from(t.is_win())));
    win_rate_pct(wins, total)
}

fn directional_bias(trades: &[Trade]) -> Option<String> {
    let long_rate = side_win_rate(trades, TradeType::Long);
    let short_rate = side_win_rate(trades, TradeType::Short);
    let gap = (long_rate - short_rate).abs();
    if gap <= BIAS_THRESHOLD_PCT {
        return None;
    }

    let better = if long_rate > short_rate { "Long" } else { "Short" };
    Some(format!(
        "You perform {}% better on {} trades. Consider focusing on {} setups.",
        round_half_up(gap, 0),
        better,
        better
    ))
}

/// Whether the notes or emotion label mention any of [`TILT_KEYWORDS`].
pub fn is_emotionally_tagged(trade: &Trade) -> bool {
    [trade.notes.as_deref(), trade.emotion.as_deref()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|text| TILT_KEYWORDS.iter().any(|k| text.contains(k)))
}

fn emotional_leakage(trades: &[Trade]) -> Option<String> {
    let (tagged, losses) = trades
        .iter()
        .filter(|t| is_emotionally_tagged(t))
        .fold((0usize, 0usize), |(tagged, losses), t| {
            (tagged + 1, losses + usize::from(t.status == TradeStatus::Loss))
        });
    if tagged == 0 {
        return None;
    }

    let loss_fraction = Decimal::from(losses) / Decimal::from(tagged);
    (loss_fraction > LEAKAGE_LOSS_FRACTION).then(|| {
        format!(
            "{} of your {} emotionally charged trades (FOMO, anger, greed) were losses. \
             Take a break after a loss.",
            losses, tagged
        )
    })
}

fn star_asset_class(trades: &[Trade]) -> Option<String> {
    star_performer(trades).map(|star| {
        format!(
            "Your most profitable asset class is {} (+${}). Stick to what pays!",
            star.name,
            round_half_up(star.pnl, 0)
        )
    })
}
