//! Month grid construction and month arithmetic.
//!
//! Grids are week-aligned with Sunday as the first column. Padding cells are
//! real dates from the neighbouring months, flagged `in_current_month = false`.

use chrono::Days;

use crate::error::CalendarError;
use crate::types::{CalendarCell, CalendarDate, YearMonth};

/// Build the week-aligned grid for `year_month`.
///
/// The result always holds a multiple of 7 cells in chronological order. Only
/// a cell inside the month can be marked selected.
pub fn build_grid(year_month: YearMonth, selected: Option<CalendarDate>) -> Vec<CalendarCell> {
    let offset = year_month.first_weekday();
    let total = (offset + year_month.len_days()).div_ceil(7) * 7;
    let start = year_month.first_day().as_naive() - Days::new(u64::from(offset));

    start
        .iter_days()
        .take(total as usize)
        .map(|day| {
            let date = CalendarDate::from(day);
            let in_current_month = year_month.contains(date);
            CalendarCell {
                date,
                in_current_month,
                is_selected: in_current_month && selected == Some(date),
            }
        })
        .collect()
}

/// Add `delta` months to `current`, rolling over year boundaries.
///
/// Fails with `OutOfRange(current)` when the result would leave the
/// representable years, so `advance_month(advance_month(ym, n)?, -n) == ym`
/// holds for every successful step.
pub fn advance_month(current: YearMonth, delta: i64) -> Result<YearMonth, CalendarError> {
    current
        .checked_add_months(delta)
        .ok_or(CalendarError::OutOfRange(current))
}

/// Select `proposed_day` in `current`, clamped to the month's length.
///
/// Never rolls into the next month: day 31 in a 30-day month selects day 30.
pub fn select_date(current: YearMonth, proposed_day: u32) -> CalendarDate {
    current.clamped_day(proposed_day)
}

/// Split a grid into rows of seven.
pub fn weeks(grid: &[CalendarCell]) -> impl Iterator<Item = &[CalendarCell]> {
    grid.chunks(7)
}
