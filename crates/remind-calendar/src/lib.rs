//! Calendar grid and month navigation for the Remind diary.
//!
//! Provides the week-aligned month grid and the navigation/selection state
//! machine behind the calendar view.

pub mod error;
pub mod grid;
pub mod state;
pub mod types;

pub use error::CalendarError;
pub use grid::{advance_month, build_grid, select_date, weeks};
pub use state::{CalendarEvent, CalendarState};
pub use types::{
    days_in_month, is_leap_year, CalendarCell, CalendarDate, YearMonth, YearRange, MAX_YEAR,
    MIN_YEAR,
};
