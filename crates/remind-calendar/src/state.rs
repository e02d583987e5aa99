//! Month navigation and day selection for a calendar view.
//!
//! Invariant: `selected_date` always lies inside `displayed_month`, and
//! `displayed_month` always lies inside the configured [`YearRange`]. Every
//! rejected transition leaves both untouched.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::grid::{advance_month, build_grid, select_date};
use crate::types::{CalendarCell, CalendarDate, YearMonth, YearRange};

/// User input the calendar view reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalendarEvent {
    /// Previous-month arrow.
    Prev,
    /// Next-month arrow.
    Next,
    /// Tap on a day cell.
    Pick { date: CalendarDate },
    /// Direct entry through the year/month picker.
    Jump { year: i32, month: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredState")]
pub struct CalendarState {
    displayed_month: YearMonth,
    selected_date: CalendarDate,
    range: YearRange,
}

/// Unchecked wire form; converted through [`CalendarState::restore`].
#[derive(Deserialize)]
struct StoredState {
    displayed_month: YearMonth,
    selected_date: CalendarDate,
    range: YearRange,
}

impl TryFrom<StoredState> for CalendarState {
    type Error = CalendarError;

    fn try_from(stored: StoredState) -> Result<Self, Self::Error> {
        Self::restore(stored.displayed_month, stored.selected_date, stored.range)
    }
}

impl CalendarState {
    /// Start on `date`, displaying its month.
    pub fn starting_at(date: CalendarDate, range: YearRange) -> Result<Self, CalendarError> {
        let displayed_month = YearMonth::of(date)?;
        if !range.contains(displayed_month) {
            return Err(CalendarError::OutOfRange(displayed_month));
        }
        Ok(Self {
            displayed_month,
            selected_date: date,
            range,
        })
    }

    /// Rebuild a saved state, rejecting combinations navigation could not produce.
    pub fn restore(
        displayed_month: YearMonth,
        selected_date: CalendarDate,
        range: YearRange,
    ) -> Result<Self, CalendarError> {
        if !range.contains(displayed_month) {
            return Err(CalendarError::OutOfRange(displayed_month));
        }
        if !displayed_month.contains(selected_date) {
            return Err(CalendarError::OutsideDisplayedMonth {
                date: selected_date,
                displayed: displayed_month,
            });
        }
        Ok(Self {
            displayed_month,
            selected_date,
            range,
        })
    }

    /// Start on today's local date.
    pub fn today(range: YearRange) -> Result<Self, CalendarError> {
        Self::starting_at(CalendarDate::from(Local::now().date_naive()), range)
    }

    pub fn displayed_month(&self) -> YearMonth {
        self.displayed_month
    }

    pub fn selected_date(&self) -> CalendarDate {
        self.selected_date
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    /// The grid for the displayed month with the current selection marked.
    pub fn grid(&self) -> Vec<CalendarCell> {
        build_grid(self.displayed_month, Some(self.selected_date))
    }

    /// Apply one event. On error the state is unchanged.
    pub fn apply(&mut self, event: CalendarEvent) -> Result<(), CalendarError> {
        match event {
            CalendarEvent::Prev => self.prev(),
            CalendarEvent::Next => self.next(),
            CalendarEvent::Pick { date } => self.pick(date),
            CalendarEvent::Jump { year, month } => self.jump(year, month),
        }
    }

    pub fn prev(&mut self) -> Result<(), CalendarError> {
        self.step(-1)
    }

    pub fn next(&mut self) -> Result<(), CalendarError> {
        self.step(1)
    }

    /// Select a day of the displayed month.
    pub fn pick(&mut self, date: CalendarDate) -> Result<(), CalendarError> {
        if !self.displayed_month.contains(date) {
            return Err(CalendarError::OutsideDisplayedMonth {
                date,
                displayed: self.displayed_month,
            });
        }
        tracing::debug!(%date, "calendar date picked");
        self.selected_date = date;
        Ok(())
    }

    /// Display `year`-`month`, keeping the selected day-of-month where it exists.
    pub fn jump(&mut self, year: i32, month: u32) -> Result<(), CalendarError> {
        let target = YearMonth::new(year, month)
            .ok()
            .filter(|ym| self.range.contains(*ym))
            .ok_or(CalendarError::InvalidMonthJump { year, month })?;
        self.move_to(target);
        Ok(())
    }

    fn step(&mut self, delta: i64) -> Result<(), CalendarError> {
        let target = advance_month(self.displayed_month, delta)?;
        if !self.range.contains(target) {
            return Err(CalendarError::OutOfRange(self.displayed_month));
        }
        self.move_to(target);
        Ok(())
    }

    fn move_to(&mut self, target: YearMonth) {
        self.displayed_month = target;
        self.selected_date = select_date(target, self.selected_date.day());
        tracing::debug!(
            month = %self.displayed_month,
            selected = %self.selected_date,
            "calendar month changed"
        );
    }
}
