use crate::error::StorageError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::{NewTrade, Trade, TradeType};
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;

/// The asset class stamped on every imported trade.
pub const IMPORTED_ASSET_CLASS: &str = "Imported";

const HEADER: [&str; 6] = ["Date", "Symbol", "Type", "Entry", "Exit", "Qty"];
const MIN_COLUMNS: usize = 4;

/// Parses a `Date, Symbol, Type, Entry, Exit, Qty` export into trades, in row order.
///
/// Comma and tab separators are both accepted, even mixed. A first row that
/// mentions `symbol` or `date` is treated as a header. Rows with fewer than
/// four columns are skipped; any other malformed row aborts the import.
pub fn parse_trades_csv(input: &str, now: DateTime<Utc>) -> Result<Vec<Trade>, StorageError> {
    let normalized = input.replace('\t', ",");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(normalized.as_bytes());

    let mut trades = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(index as u64 + 1, |p| p.line());

        if index == 0 && is_header(&record) {
            continue;
        }
        if record.len() < MIN_COLUMNS {
            tracing::warn!(line, columns = record.len(), "Skipping short CSV row");
            continue;
        }

        trades.push(parse_row(&record, line, now)?);
    }

    tracing::debug!(count = trades.len(), "Parsed CSV import");
    Ok(trades)
}

/// Writes trades in the same column layout `parse_trades_csv` reads.
pub fn write_trades_csv<W: Write>(trades: &[Trade], writer: W) -> Result<(), StorageError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for trade in trades {
        wtr.write_record(&[
            trade.date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            trade.symbol.clone(),
            trade.trade_type.to_string(),
            trade.entry_price.to_string(),
            trade.exit_price.to_string(),
            trade.quantity.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn is_header(record: &csv::StringRecord) -> bool {
    record.iter().any(|field| {
        let field = field.to_lowercase();
        field.contains("symbol") || field.contains("date")
    })
}

fn parse_row(
    record: &csv::StringRecord,
    line: u64,
    now: DateTime<Utc>,
) -> Result<Trade, StorageError> {
    let field = |i: usize| record.get(i).unwrap_or("");
    let parse_err = |message: String| StorageError::Parse { line, message };

    let date = parse_date(field(0), now)
        .ok_or_else(|| parse_err(format!("invalid date '{}'", field(0))))?;
    let symbol = match field(1) {
        "" => "UNKNOWN".to_string(),
        s => s.to_string(),
    };
    let trade_type = if field(2).to_uppercase().contains("SHORT") {
        TradeType::Short
    } else {
        TradeType::Long
    };
    let entry_price = parse_decimal(field(3))
        .ok_or_else(|| parse_err(format!("invalid entry price '{}'", field(3))))?;
    let exit_price = parse_decimal(field(4))
        .ok_or_else(|| parse_err(format!("invalid exit price '{}'", field(4))))?;
    let quantity = match field(5) {
        "" => Decimal::ONE,
        qty => parse_decimal(qty).ok_or_else(|| parse_err(format!("invalid quantity '{}'", qty)))?,
    };

    Trade::open(NewTrade {
        symbol,
        trade_type,
        entry_price,
        exit_price,
        quantity,
        date,
        asset_class: Some(IMPORTED_ASSET_CLASS.to_string()),
        ..Default::default()
    })
    .map_err(|e| parse_err(e.to_string()))
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)).ok()
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM[:SS]` and bare dates (midnight UTC).
/// An empty cell means "now".
fn parse_date(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return Some(now);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc())
}
