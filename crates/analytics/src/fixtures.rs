use chrono::{DateTime, TimeZone, Utc};
use core_types::{NewTrade, Trade, TradeType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// A one-unit trade whose derived PnL equals `pnl`.
pub(crate) fn trade_with_pnl(pnl: Decimal, trade_type: TradeType) -> Trade {
    let entry = dec!(10000);
    let exit = match trade_type {
        TradeType::Long => entry + pnl,
        TradeType::Short => entry - pnl,
    };
    Trade::open(NewTrade {
        symbol: "TEST".to_string(),
        trade_type,
        entry_price: entry,
        exit_price: exit,
        quantity: Decimal::ONE,
        date: at(2024, 3, 1, 10, 0),
        ..Default::default()
    })
    .unwrap()
}

pub(crate) fn long(pnl: Decimal) -> Trade {
    trade_with_pnl(pnl, TradeType::Long)
}

pub(crate) fn short(pnl: Decimal) -> Trade {
    trade_with_pnl(pnl, TradeType::Short)
}

pub(crate) fn dated(mut trade: Trade, date: DateTime<Utc>) -> Trade {
    trade.date = date;
    trade
}

pub(crate) fn in_class(mut trade: Trade, asset_class: &str) -> Trade {
    trade.asset_class = Some(asset_class.to_string());
    trade
}
