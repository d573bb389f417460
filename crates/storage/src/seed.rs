use crate::error::StorageError;
use chrono::{DateTime, Days, NaiveDateTime, TimeZone, Utc};
use core_types::{NewTrade, Trade, TradeType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct SampleTrade {
    days_ago: u64,
    hour: u32,
    minute: u32,
    symbol: &'static str,
    trade_type: TradeType,
    entry: Decimal,
    exit: Decimal,
    quantity: Decimal,
    notes: &'static str,
    strategy: &'static str,
    emotion: &'static str,
    asset_class: &'static str,
    market_trend: &'static str,
}

const SAMPLES: [SampleTrade; 8] = [
    SampleTrade {
        days_ago: 6,
        hour: 10,
        minute: 0,
        symbol: "BTC/USD",
        trade_type: TradeType::Long,
        entry: dec!(42000),
        exit: dec!(43500),
        quantity: dec!(0.5),
        notes: "Breakout retest",
        strategy: "Breakout",
        emotion: "Confident",
        asset_class: "Crypto",
        market_trend: "Uptrend",
    },
    SampleTrade {
        days_ago: 5,
        hour: 9,
        minute: 15,
        symbol: "ETH/USD",
        trade_type: TradeType::Short,
        entry: dec!(2400),
        exit: dec!(2450),
        quantity: dec!(5),
        notes: "Resistance rejection failed",
        strategy: "Reversal",
        emotion: "Fearful",
        asset_class: "Crypto",
        market_trend: "Ranging",
    },
    SampleTrade {
        days_ago: 4,
        hour: 11,
        minute: 0,
        symbol: "EUR/USD",
        trade_type: TradeType::Long,
        entry: dec!(1.0850),
        exit: dec!(1.0890),
        quantity: dec!(10000),
        notes: "News event scalp",
        strategy: "Scalp",
        emotion: "FOMO",
        asset_class: "Forex",
        market_trend: "Uptrend",
    },
    SampleTrade {
        days_ago: 3,
        hour: 10,
        minute: 0,
        symbol: "XAU/USD",
        trade_type: TradeType::Long,
        entry: dec!(2150.50),
        exit: dec!(2165.00),
        quantity: dec!(10),
        notes: "Safe haven play",
        strategy: "Trend Following",
        emotion: "Neutral",
        asset_class: "Commodities",
        market_trend: "Uptrend",
    },
    SampleTrade {
        days_ago: 2,
        hour: 9,
        minute: 30,
        symbol: "SENSEX",
        trade_type: TradeType::Short,
        entry: dec!(73500),
        exit: dec!(73200),
        quantity: dec!(1),
        notes: "Gap fill trade",
        strategy: "Reversal",
        emotion: "Greedy",
        asset_class: "Indices",
        market_trend: "Downtrend",
    },
    SampleTrade {
        days_ago: 2,
        hour: 15,
        minute: 45,
        symbol: "GBP/JPY",
        trade_type: TradeType::Long,
        entry: dec!(188.20),
        exit: dec!(187.90),
        quantity: dec!(5000),
        notes: "Stopped out on volatility",
        strategy: "Breakout",
        emotion: "Frustrated",
        asset_class: "Forex",
        market_trend: "Ranging",
    },
    SampleTrade {
        days_ago: 1,
        hour: 11,
        minute: 20,
        symbol: "CRUDEOIL",
        trade_type: TradeType::Long,
        entry: dec!(78.50),
        exit: dec!(80.10),
        quantity: dec!(100),
        notes: "Supply shock news",
        strategy: "News",
        emotion: "Confident",
        asset_class: "Commodities",
        market_trend: "Strong Uptrend",
    },
    SampleTrade {
        days_ago: 0,
        hour: 13,
        minute: 10,
        symbol: "NIFTY50",
        trade_type: TradeType::Long,
        entry: dec!(22100),
        exit: dec!(22250),
        quantity: dec!(2),
        notes: "Support bounce",
        strategy: "Support/Resistance",
        emotion: "Calm",
        asset_class: "Indices",
        market_trend: "Uptrend",
    },
];

/// The demo journal a fresh store starts with: eight trades spread over the
/// week ending `now`, at fixed wall-clock times in `now`'s zone.
///
/// The list is in the order the demo was written (oldest first).
pub fn sample_trades<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Vec<Trade>, StorageError> {
    let zone = now.timezone();
    let today = now.date_naive();

    SAMPLES
        .iter()
        .map(|sample| {
            let day = today - Days::new(sample.days_ago);
            let local = day
                .and_hms_opt(sample.hour, sample.minute, 0)
                .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN));
            let trade = Trade::open(NewTrade {
                symbol: sample.symbol.to_string(),
                trade_type: sample.trade_type,
                entry_price: sample.entry,
                exit_price: sample.exit,
                quantity: sample.quantity,
                date: to_utc(&zone, local),
                strategy: Some(sample.strategy.to_string()),
                emotion: Some(sample.emotion.to_string()),
                asset_class: Some(sample.asset_class.to_string()),
                market_trend: Some(sample.market_trend.to_string()),
                notes: Some(sample.notes.to_string()),
            })?;
            Ok(trade)
        })
        .collect()
}

/// Wall-clock time in `zone` to UTC. Times skipped by a DST change are read as UTC.
fn to_utc<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    zone.from_local_datetime(&local)
        .earliest()
        .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};
    use core_types::TradeStatus;

    #[test]
    fn test_sample_journal() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let trades = sample_trades(&now).unwrap();

        assert_eq!(trades.len(), 8);
        assert_eq!(trades[0].symbol, "BTC/USD");
        assert_eq!(trades[0].pnl, dec!(750.00));
        assert_eq!(trades[1].pnl, dec!(-250.00));
        assert_eq!(trades[1].status, TradeStatus::Loss);
        assert_eq!(trades[7].symbol, "NIFTY50");
        assert_eq!(trades[7].date, Utc.with_ymd_and_hms(2024, 3, 15, 13, 10, 0).unwrap());
        assert_eq!(trades[0].date, Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_pnl_is_derived_from_prices() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let trades = sample_trades(&now).unwrap();
        let gbpjpy = trades.iter().find(|t| t.symbol == "GBP/JPY").unwrap();
        assert_eq!(gbpjpy.pnl, dec!(-1500.00));
    }

    #[test]
    fn test_times_are_local_to_now() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = ist.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let trades = sample_trades(&now).unwrap();

        // 13:10 in UTC+5:30 is 07:40 UTC.
        let today = trades[7].date;
        assert_eq!((today.hour(), today.minute()), (7, 40));
    }
}
