use crate::error::AnalyticsError;
use chrono::{Datelike, Local, NaiveDate, TimeZone};
use core_types::Trade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cell of a Sunday-first, seven-column month grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DayCell {
    /// Padding before day 1 so that days line up with their weekday column.
    Blank,
    Day {
        day: u32,
        pnl: Decimal,
        /// Whether at least one trade closed on this day.
        active: bool,
    },
}

impl DayCell {
    pub fn is_blank(&self) -> bool {
        matches!(self, DayCell::Blank)
    }
}

/// Builds the heatmap grid for `year`-`month`, bucketing trades by their local date in `tz`.
pub fn compute_calendar<Tz: TimeZone>(
    trades: &[Trade],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Result<Vec<DayCell>, AnalyticsError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(AnalyticsError::InvalidPeriod { year, month })?;
    Ok(build_month(trades, first, tz))
}

/// The heatmap for the current month in the system's local time zone.
pub fn compute_calendar_for_current_month(trades: &[Trade]) -> Vec<DayCell> {
    let today = Local::now().date_naive();
    let first = today.with_day(1).unwrap_or(today);
    build_month(trades, first, &Local)
}

pub(crate) fn build_month<Tz: TimeZone>(
    trades: &[Trade],
    first: NaiveDate,
    tz: &Tz,
) -> Vec<DayCell> {
    let days = days_in_month(first);
    let offset = first.weekday().num_days_from_sunday() as usize;

    // (pnl, active) per day, index 0 is day 1.
    let mut buckets = vec![(Decimal::ZERO, false); days as usize];
    for trade in trades {
        let local = trade.date.with_timezone(tz).date_naive();
        if local.year() == first.year() && local.month() == first.month() {
            let bucket = &mut buckets[local.day0() as usize];
            bucket.0 += trade.pnl;
            bucket.1 = true;
        }
    }

    let mut cells = Vec::with_capacity(offset + buckets.len());
    cells.extend(std::iter::repeat_n(DayCell::Blank, offset));
    cells.extend(
        buckets
            .into_iter()
            .enumerate()
            .map(|(i, (pnl, active))| DayCell::Day {
                day: i as u32 + 1,
                pnl,
                active,
            }),
    );

    tracing::debug!(month = %first.format("%Y-%m"), offset, days, "Built calendar heatmap");
    cells
}

fn days_in_month(first: NaiveDate) -> u32 {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, dated, long, short};
    use chrono::{FixedOffset, Utc};
    use rust_decimal_macros::dec;

    fn day(cells: &[DayCell], n: u32) -> &DayCell {
        cells
            .iter()
            .find(|c| matches!(c, DayCell::Day { day, .. } if *day == n))
            .unwrap()
    }

    #[test]
    fn test_grid_shape() {
        // March 2024 starts on a Friday and has 31 days.
        let cells = compute_calendar(&[], 2024, 3, &Utc).unwrap();
        assert_eq!(cells.iter().filter(|c| c.is_blank()).count(), 5);
        assert_eq!(cells.iter().filter(|c| !c.is_blank()).count(), 31);
        assert!(cells[..5].iter().all(DayCell::is_blank));

        // February 2024 is a leap month starting on a Thursday.
        let cells = compute_calendar(&[], 2024, 2, &Utc).unwrap();
        assert_eq!(cells.len(), 4 + 29);

        // September 2024 starts on a Sunday: no padding.
        let cells = compute_calendar(&[], 2024, 9, &Utc).unwrap();
        assert_eq!(cells.len(), 30);
        assert!(!cells[0].is_blank());
    }

    #[test]
    fn test_daily_pnl_is_summed() {
        let trades = vec![
            dated(long(dec!(300)), at(2024, 3, 12, 9, 30)),
            dated(short(dec!(-140)), at(2024, 3, 12, 15, 45)),
            dated(long(dec!(160)), at(2024, 3, 13, 11, 20)),
        ];
        let cells = compute_calendar(&trades, 2024, 3, &Utc).unwrap();

        assert_eq!(day(&cells, 12), &DayCell::Day { day: 12, pnl: dec!(160), active: true });
        assert_eq!(day(&cells, 13), &DayCell::Day { day: 13, pnl: dec!(160), active: true });
        assert_eq!(day(&cells, 14), &DayCell::Day { day: 14, pnl: dec!(0), active: false });
    }

    #[test]
    fn test_other_months_and_years_are_ignored() {
        let trades = vec![
            dated(long(dec!(50)), at(2023, 3, 12, 9, 30)),
            dated(long(dec!(70)), at(2024, 4, 12, 9, 30)),
        ];
        let cells = compute_calendar(&trades, 2024, 3, &Utc).unwrap();
        assert!(cells.iter().all(|c| !matches!(c, DayCell::Day { active: true, .. })));
    }

    #[test]
    fn test_flat_day_is_still_active() {
        let trades = vec![dated(long(dec!(0)), at(2024, 3, 1, 9, 0))];
        let cells = compute_calendar(&trades, 2024, 3, &Utc).unwrap();
        assert_eq!(day(&cells, 1), &DayCell::Day { day: 1, pnl: dec!(0), active: true });
    }

    #[test]
    fn test_buckets_by_local_date() {
        // 22:30 UTC on Mar 31 is Apr 1 in UTC+3, and stays Mar 31 in UTC-5.
        let trades = vec![dated(long(dec!(25)), at(2024, 3, 31, 22, 30))];
        let east = FixedOffset::east_opt(3 * 3600).unwrap();
        let west = FixedOffset::west_opt(5 * 3600).unwrap();

        let april = compute_calendar(&trades, 2024, 4, &east).unwrap();
        assert_eq!(day(&april, 1), &DayCell::Day { day: 1, pnl: dec!(25), active: true });

        let march = compute_calendar(&trades, 2024, 3, &west).unwrap();
        assert_eq!(day(&march, 31), &DayCell::Day { day: 31, pnl: dec!(25), active: true });
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        assert_eq!(
            compute_calendar(&[], 2024, 13, &Utc),
            Err(AnalyticsError::InvalidPeriod { year: 2024, month: 13 })
        );
    }

    #[test]
    fn test_current_month_has_full_grid() {
        let cells = compute_calendar_for_current_month(&[]);
        let days = cells.iter().filter(|c| !c.is_blank()).count();
        assert!((28..=31).contains(&days));
        assert!(cells.len() - days < 7);
    }
}
