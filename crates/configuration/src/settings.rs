use crate::error::ConfigError;
use risk::SizingMode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional; anything missing falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsSettings,
    pub risk: RiskDefaults,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

/// Contains parameters for the analytics engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// The account value the equity curve starts from.
    pub starting_equity: Decimal,
}

/// Default inputs for the risk calculator; each can be overridden per invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskDefaults {
    pub account_balance: Decimal,
    /// Percentage of the balance to risk per trade (1 means 1%).
    pub risk_percent: Decimal,
    pub leverage: Decimal,
    pub mode: SizingMode,
}

/// Where the journal keeps its trades.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, e.g. `info` or `analytics=debug`. `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

/// Output style of the log lines written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            starting_equity: dec!(10000),
        }
    }
}

impl Default for RiskDefaults {
    fn default() -> Self {
        Self {
            account_balance: dec!(10000),
            risk_percent: dec!(1),
            leverage: dec!(1),
            mode: SizingMode::Crypto,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("trades.json"),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Checks the values that deserialization alone cannot rule out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key, reason: &str| {
            Err(ConfigError::ValidationError {
                key,
                reason: reason.to_string(),
            })
        };

        if self.analytics.starting_equity < Decimal::ZERO {
            return invalid("analytics.starting_equity", "must not be negative");
        }
        if self.risk.leverage < Decimal::ONE {
            return invalid("risk.leverage", "must be at least 1");
        }
        if self.risk.account_balance < Decimal::ZERO {
            return invalid("risk.account_balance", "must not be negative");
        }
        if self.risk.risk_percent < Decimal::ZERO {
            return invalid("risk.risk_percent", "must not be negative");
        }
        if self.storage.path.as_os_str().is_empty() {
            return invalid("storage.path", "must not be empty");
        }
        Ok(())
    }
}
