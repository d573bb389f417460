//! # Tradebook Risk Calculator
//!
//! Position sizing for a prospective trade. Unlike the analytics crate this one knows
//! nothing about trade history: every plan is a pure function of the manually entered
//! `RiskInputs`.

pub mod calculator;
pub mod error;

pub use calculator::{
    compute_risk_plan, PositionSize, RewardTarget, RiskInputs, RiskPlan, SizingMode,
    TARGET_MULTIPLES,
};
pub use error::RiskError;
