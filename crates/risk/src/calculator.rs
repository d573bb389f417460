use crate::error::RiskError;
use core_types::TradeType;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reward-to-risk multiples a plan proposes take-profit levels for.
pub const TARGET_MULTIPLES: [Decimal; 2] = [dec!(2), dec!(3)];

/// Price distance to pips for 4-decimal quotes. JPY pairs (2 decimals) are not handled.
const PIPS_PER_PRICE_UNIT: Decimal = dec!(10000);
/// Value of one pip for one standard lot, in account currency.
const PIP_VALUE_PER_LOT: Decimal = dec!(10);
const STANDARD_LOT_UNITS: Decimal = dec!(100000);

/// How the position size is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// Size in coins/units of the instrument.
    #[default]
    Crypto,
    /// Size in standard lots, from the number of pips at risk.
    Forex,
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingMode::Crypto => write!(f, "crypto"),
            SizingMode::Forex => write!(f, "forex"),
        }
    }
}

impl FromStr for SizingMode {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crypto" => Ok(SizingMode::Crypto),
            "forex" | "fx" => Ok(SizingMode::Forex),
            _ => Err(RiskError::UnknownMode(s.to_string())),
        }
    }
}

/// Manually entered parameters for a prospective trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskInputs {
    pub account_balance: Decimal,
    /// Percentage of the balance to risk, e.g. `1` for 1%.
    pub risk_percent: Decimal,
    pub entry_price: Decimal,
    pub stop_loss_price: Decimal,
    /// Must be at least 1.
    pub leverage: Decimal,
    pub mode: SizingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PositionSize {
    Crypto {
        units: Decimal,
        notional: Decimal,
    },
    Forex {
        pips_risked: Decimal,
        lots: Decimal,
        notional: Decimal,
    },
}

impl PositionSize {
    /// Position value in quote currency, the basis for the margin figure.
    pub fn notional(&self) -> Decimal {
        match self {
            PositionSize::Crypto { notional, .. } | PositionSize::Forex { notional, .. } => {
                *notional
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTarget {
    pub multiple: Decimal,
    pub price: Decimal,
    /// `risk_amount * multiple`.
    pub reward: Decimal,
}

/// The full sizing plan derived from a set of `RiskInputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPlan {
    pub risk_amount: Decimal,
    pub bias: TradeType,
    pub price_distance: Decimal,
    pub stop_loss_pct: Decimal,
    pub position: PositionSize,
    pub margin_required: Decimal,
    pub liquidation_price: Decimal,
    pub targets: Vec<RewardTarget>,
}

/// Performs the stop-loss-driven, fixed-fractional position sizing calculation.
///
/// A zero stop distance is not an error; it yields a zero-sized position. A stop so close
/// to the entry that the position size leaves the `Decimal` range is `RiskError::Calculation`.
pub fn compute_risk_plan(inputs: &RiskInputs) -> Result<RiskPlan, RiskError> {
    // --- 1. Validation ---
    validate(inputs).inspect_err(|e| tracing::warn!(error = %e, "Rejected risk inputs"))?;
    size_plan(inputs).inspect_err(|e| tracing::warn!(error = %e, "Risk plan overflowed"))
}

fn size_plan(inputs: &RiskInputs) -> Result<RiskPlan, RiskError> {
    let entry = inputs.entry_price;
    let risk_amount = checked(
        inputs.account_balance.checked_mul(inputs.risk_percent),
        "risk amount",
    )? / Decimal::ONE_HUNDRED;

    // --- 2. Direction and stop distance ---
    let bias = if entry > inputs.stop_loss_price {
        TradeType::Long
    } else {
        TradeType::Short
    };
    let price_distance = (entry - inputs.stop_loss_price).abs();
    let stop_loss_pct = checked(
        price_distance
            .checked_div(entry)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
        "stop loss percentage",
    )?;

    // --- 3. Position size ---
    let position = match inputs.mode {
        SizingMode::Crypto => {
            let units = if price_distance > Decimal::ZERO {
                checked(risk_amount.checked_div(price_distance), "position units")?
            } else {
                Decimal::ZERO
            };
            PositionSize::Crypto {
                units,
                notional: checked(units.checked_mul(entry), "notional")?,
            }
        }
        SizingMode::Forex => {
            let pips_risked = checked(price_distance.checked_mul(PIPS_PER_PRICE_UNIT), "pips")?;
            let lots = if pips_risked > Decimal::ZERO {
                let pip_value = checked(pips_risked.checked_mul(PIP_VALUE_PER_LOT), "pip value")?;
                checked(risk_amount.checked_div(pip_value), "lots")?
            } else {
                Decimal::ZERO
            };
            let notional = lots
                .checked_mul(STANDARD_LOT_UNITS)
                .and_then(|units| units.checked_mul(entry));
            PositionSize::Forex {
                pips_risked,
                lots,
                notional: checked(notional, "notional")?,
            }
        }
    };

    // --- 4. Leverage ---
    let margin_required = checked(
        position.notional().checked_div(inputs.leverage),
        "margin",
    )?;
    let liquidation_buffer = Decimal::ONE / inputs.leverage;
    let liquidation_price = match bias {
        TradeType::Long => entry.checked_mul(Decimal::ONE - liquidation_buffer),
        TradeType::Short => entry.checked_mul(Decimal::ONE + liquidation_buffer),
    };
    let liquidation_price = checked(liquidation_price, "liquidation price")?;

    // --- 5. Take-profit targets ---
    let targets = TARGET_MULTIPLES
        .iter()
        .map(|&multiple| {
            let price = price_distance
                .checked_mul(multiple * bias.direction())
                .and_then(|offset| entry.checked_add(offset));
            Ok(RewardTarget {
                multiple,
                price: checked(price, "target price")?,
                reward: checked(risk_amount.checked_mul(multiple), "target reward")?,
            })
        })
        .collect::<Result<Vec<_>, RiskError>>()?;

    tracing::debug!(
        mode = %inputs.mode,
        %risk_amount,
        %price_distance,
        notional = %position.notional(),
        "Computed risk plan"
    );

    Ok(RiskPlan {
        risk_amount,
        bias,
        price_distance,
        stop_loss_pct,
        position,
        margin_required,
        liquidation_price,
        targets,
    })
}

fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal, RiskError> {
    value.ok_or_else(|| RiskError::Calculation(format!("{what} is out of range")))
}

fn validate(inputs: &RiskInputs) -> Result<(), RiskError> {
    if inputs.entry_price <= Decimal::ZERO {
        return Err(RiskError::InvalidEntryPrice(inputs.entry_price));
    }
    if inputs.leverage < Decimal::ONE {
        return Err(RiskError::InvalidLeverage(inputs.leverage));
    }
    if inputs.account_balance < Decimal::ZERO {
        return Err(RiskError::InvalidParameters(
            "account_balance must not be negative".to_string(),
        ));
    }
    if inputs.risk_percent < Decimal::ZERO {
        return Err(RiskError::InvalidParameters(
            "risk_percent must not be negative".to_string(),
        ));
    }
    if inputs.stop_loss_price < Decimal::ZERO {
        return Err(RiskError::InvalidParameters(
            "stop_loss_price must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypto(entry: Decimal, stop: Decimal, leverage: Decimal) -> RiskInputs {
        RiskInputs {
            account_balance: dec!(10000),
            risk_percent: dec!(1),
            entry_price: entry,
            stop_loss_price: stop,
            leverage,
            mode: SizingMode::Crypto,
        }
    }

    #[test]
    fn test_crypto_long_plan() {
        let plan = compute_risk_plan(&crypto(dec!(45000), dec!(44500), dec!(10))).unwrap();

        assert_eq!(plan.risk_amount, dec!(100));
        assert_eq!(plan.bias, TradeType::Long);
        assert_eq!(plan.price_distance, dec!(500));
        assert_eq!(plan.stop_loss_pct.round_dp(2), dec!(1.11));
        assert_eq!(
            plan.position,
            PositionSize::Crypto { units: dec!(0.2), notional: dec!(9000) }
        );
        assert_eq!(plan.margin_required, dec!(900));
        assert_eq!(plan.liquidation_price, dec!(40500));

        assert_eq!(plan.targets.len(), 2);
        let target = |multiple, price, reward| RewardTarget { multiple, price, reward };
        assert_eq!(plan.targets[0], target(dec!(2), dec!(46000), dec!(200)));
        assert_eq!(plan.targets[1], target(dec!(3), dec!(46500), dec!(300)));
    }

    #[test]
    fn test_crypto_short_plan() {
        let plan = compute_risk_plan(&crypto(dec!(2000), dec!(2100), dec!(5))).unwrap();

        assert_eq!(plan.bias, TradeType::Short);
        assert_eq!(plan.position.notional(), dec!(2000));
        assert_eq!(plan.margin_required, dec!(400));
        assert_eq!(plan.liquidation_price, dec!(2400));
        assert_eq!(plan.targets[0].price, dec!(1800));
        assert_eq!(plan.targets[1].price, dec!(1700));
    }

    #[test]
    fn test_zero_stop_distance_sizes_nothing() {
        let plan = compute_risk_plan(&crypto(dec!(100), dec!(100), dec!(1))).unwrap();
        // Entry equal to stop is treated as a short.
        assert_eq!(plan.bias, TradeType::Short);
        assert_eq!(plan.position, PositionSize::Crypto { units: dec!(0), notional: dec!(0) });
        assert_eq!(plan.margin_required, dec!(0));
        // 1x short liquidates at double the entry.
        assert_eq!(plan.liquidation_price, dec!(200));
    }

    #[test]
    fn test_forex_lots() {
        let inputs = RiskInputs {
            mode: SizingMode::Forex,
            ..crypto(dec!(1.1000), dec!(1.0950), dec!(20))
        };
        let plan = compute_risk_plan(&inputs).unwrap();

        assert_eq!(
            plan.position,
            PositionSize::Forex { pips_risked: dec!(50), lots: dec!(0.2), notional: dec!(22000) }
        );
        assert_eq!(plan.margin_required, dec!(1100));
        assert_eq!(plan.liquidation_price, dec!(1.045));
    }

    #[test]
    fn test_forex_assumes_four_decimal_quotes() {
        // A 50 pip stop on a JPY pair is read as 5000 pips, so the size comes out 100x too small.
        let inputs = RiskInputs {
            mode: SizingMode::Forex,
            ..crypto(dec!(150.00), dec!(149.50), dec!(1))
        };
        let plan = compute_risk_plan(&inputs).unwrap();
        match plan.position {
            PositionSize::Forex { pips_risked, lots, .. } => {
                assert_eq!(pips_risked, dec!(5000));
                assert_eq!(lots, dec!(0.002));
            }
            other => panic!("expected forex sizing, got {:?}", other),
        }
    }

    #[test]
    fn test_leverage_below_one_is_rejected() {
        assert_eq!(
            compute_risk_plan(&crypto(dec!(100), dec!(90), dec!(0))),
            Err(RiskError::InvalidLeverage(dec!(0)))
        );
        assert!(compute_risk_plan(&crypto(dec!(100), dec!(90), dec!(0.5))).is_err());
    }

    #[test]
    fn test_invalid_prices_are_rejected() {
        assert_eq!(
            compute_risk_plan(&crypto(dec!(0), dec!(90), dec!(1))),
            Err(RiskError::InvalidEntryPrice(dec!(0)))
        );
        assert!(matches!(
            compute_risk_plan(&crypto(dec!(100), dec!(-1), dec!(1))),
            Err(RiskError::InvalidParameters(_))
        ));

        let mut inputs = crypto(dec!(100), dec!(90), dec!(1));
        inputs.risk_percent = dec!(-1);
        assert!(matches!(compute_risk_plan(&inputs), Err(RiskError::InvalidParameters(_))));
    }

    #[test]
    fn test_tiny_stop_distance_overflows_gracefully() {
        // A 1e-28 stop distance would need 1e30 units to risk 100.
        let result = compute_risk_plan(&crypto(
            dec!(1),
            dec!(0.9999999999999999999999999999),
            dec!(1),
        ));
        assert!(matches!(result, Err(RiskError::Calculation(_))));

        let inputs = RiskInputs {
            mode: SizingMode::Forex,
            ..crypto(dec!(1), dec!(0.9999999999999999999999999999), dec!(1))
        };
        assert!(matches!(compute_risk_plan(&inputs), Err(RiskError::Calculation(_))));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("FOREX".parse::<SizingMode>().unwrap(), SizingMode::Forex);
        assert_eq!("crypto".parse::<SizingMode>().unwrap(), SizingMode::Crypto);
        assert!("stocks".parse::<SizingMode>().is_err());
    }
}
