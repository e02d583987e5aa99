//! Calendar value types: months, dates and grid cells.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Smallest year a [`YearMonth`] can represent.
pub const MIN_YEAR: i32 = 1;
/// Largest year a [`YearMonth`] can represent.
pub const MAX_YEAR: i32 = 9999;

/// Whether `year` is a leap year in the proleptic Gregorian calendar.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given month. Returns 0 for a month outside 1–12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A calendar month of a specific year.
///
/// Always valid: the month is in 1–12 and the year in [`MIN_YEAR`]..=[`MAX_YEAR`].
/// Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Create a month, rejecting months outside 1–12 and unsupported years.
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYearMonth { year, month });
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(CalendarError::InvalidYearMonth { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: CalendarDate) -> Result<Self, CalendarError> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Number of days in this month.
    pub fn len_days(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Day 1 of this month.
    pub fn first_day(&self) -> CalendarDate {
        CalendarDate(self.first)
    }

    /// Last day of this month.
    pub fn last_day(&self) -> CalendarDate {
        CalendarDate(self.first + Days::new(u64::from(self.len_days() - 1)))
    }

    /// Weekday of day 1, Sunday = 0 through Saturday = 6.
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// The given day of this month, clamped into `1..=len_days()`.
    pub fn clamped_day(&self, day: u32) -> CalendarDate {
        let day = day.clamp(1, self.len_days());
        CalendarDate(self.first + Days::new(u64::from(day - 1)))
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: CalendarDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Add `delta` months, or `None` when the result leaves the representable years.
    pub fn checked_add_months(&self, delta: i64) -> Option<Self> {
        let index = self.month_index().checked_add(delta)?;
        Self::from_month_index(index)
    }

    /// Header text shown above the grid, e.g. `2024년 1월`.
    pub fn label(&self) -> String {
        format!("{}년 {}월", self.year(), self.month())
    }

    /// Months elapsed since January of year 0.
    pub(crate) fn month_index(&self) -> i64 {
        i64::from(self.year()) * 12 + i64::from(self.month()) - 1
    }

    pub(crate) fn from_month_index(index: i64) -> Option<Self> {
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
        Self::new(year, month).ok()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::Parse(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CalendarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A single day. Ordered chronologically; serialized as `"YYYY-MM-DD"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Create a date, or `None` if it does not exist.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Weekday index, Sunday = 0 through Saturday = 6.
    pub fn weekday(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// One cell of a rendered month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: CalendarDate,
    /// False for the padding days borrowed from the adjacent months.
    pub in_current_month: bool,
    pub is_selected: bool,
}

/// Inclusive range of years a calendar view lets the user navigate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "YearBounds")]
pub struct YearRange {
    min_year: i32,
    max_year: i32,
}

#[derive(Deserialize)]
struct YearBounds {
    min_year: i32,
    max_year: i32,
}

impl TryFrom<YearBounds> for YearRange {
    type Error = CalendarError;

    fn try_from(bounds: YearBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.min_year, bounds.max_year)
    }
}

impl YearRange {
    pub fn new(min_year: i32, max_year: i32) -> Result<Self, CalendarError> {
        if min_year > max_year || min_year < MIN_YEAR || max_year > MAX_YEAR {
            return Err(CalendarError::InvalidYearRange { min_year, max_year });
        }
        Ok(Self { min_year, max_year })
    }

    pub fn min_year(&self) -> i32 {
        self.min_year
    }

    pub fn max_year(&self) -> i32 {
        self.max_year
    }

    pub fn contains(&self, ym: YearMonth) -> bool {
        (self.min_year..=self.max_year).contains(&ym.year())
    }
}

impl Default for YearRange {
    /// The span offered by the year picker: 1900 through 2125.
    fn default() -> Self {
        Self {
            min_year: 1900,
            max_year: 2125,
        }
    }
}
