//! Calendar-specific error types.

use thiserror::Error;

use crate::types::{CalendarDate, YearMonth};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid year/month: {year}-{month}")]
    InvalidYearMonth { year: i32, month: u32 },

    #[error("Cannot jump to {year}-{month}: outside the supported range")]
    InvalidMonthJump { year: i32, month: u32 },

    #[error("Navigation would leave the supported range (from {0})")]
    OutOfRange(YearMonth),

    #[error("Date {date} is not in the displayed month {displayed}")]
    OutsideDisplayedMonth {
        date: CalendarDate,
        displayed: YearMonth,
    },

    #[error("Invalid year range: {min_year}..={max_year}")]
    InvalidYearRange { min_year: i32, max_year: i32 },

    #[error("Cannot parse year/month: {0}")]
    Parse(String),
}

impl CalendarError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidYearMonth { .. } | Self::Parse(_) => {
                "Please choose a valid year and month.".to_string()
            }
            Self::InvalidMonthJump { year, month } => {
                format!("{}년 {}월 is outside the calendar range.", year, month)
            }
            Self::OutOfRange(_) => "You have reached the end of the calendar.".to_string(),
            Self::OutsideDisplayedMonth { .. } => {
                "Only days of the displayed month can be selected.".to_string()
            }
            Self::InvalidYearRange { .. } => "Calendar year range is misconfigured.".to_string(),
        }
    }

    /// Whether the rejected input came from user navigation (state was kept).
    pub fn is_navigation_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidMonthJump { .. } | Self::OutOfRange(_) | Self::OutsideDisplayedMonth { .. }
        )
    }
}
