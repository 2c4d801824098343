//! Calendar periods used to select records for analytics, and the parsing of
//! the query parameters that name them.

use std::fmt::Display;

use time::{Date, Month};

use crate::validation::{ValidationErrors, display_name, require};

/// The earliest year that can be analysed.
pub const MIN_YEAR: i32 = 2000;

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Every day of `year`.
    pub fn year(year: i32) -> Option<Self> {
        Some(Self {
            start: Date::from_calendar_date(year, Month::January, 1).ok()?,
            end: Date::from_calendar_date(year, Month::December, 31).ok()?,
        })
    }
}

/// A calendar month of a specific year, written as "YYYY-MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    first_day: Date,
}

impl YearMonth {
    /// Create the month from its parts, or `None` if the year is out of range.
    pub fn new(year: i32, month: Month) -> Option<Self> {
        Date::from_calendar_date(year, month, 1)
            .ok()
            .map(|first_day| Self { first_day })
    }

    /// Parse exactly "YYYY-MM", e.g. "2024-01". "2024-1" and "2024-01-15" are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let bytes = raw.as_bytes();

        if bytes.len() != 7 || bytes[4] != b'-' {
            return None;
        }

        let (year, month) = (&raw[..4], &raw[5..]);

        if !year.bytes().chain(month.bytes()).all(|byte| byte.is_ascii_digit()) {
            return None;
        }

        let year: i32 = year.parse().ok()?;
        let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;

        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> Month {
        self.first_day.month()
    }

    /// The month before this one, e.g. 2023-12 for 2024-01.
    pub fn previous(&self) -> Option<Self> {
        match self.month() {
            Month::January => Self::new(self.year() - 1, Month::December),
            month => Self::new(self.year(), month.previous()),
        }
    }

    /// The month after this one, e.g. 2025-01 for 2024-12.
    pub fn next(&self) -> Option<Self> {
        match self.month() {
            Month::December => Self::new(self.year() + 1, Month::January),
            month => Self::new(self.year(), month.next()),
        }
    }

    /// Every day of the month.
    pub fn date_range(&self) -> DateRange {
        let end = self
            .next()
            .and_then(|next| next.first_day.previous_day())
            .unwrap_or(Date::MAX);

        DateRange {
            start: self.first_day,
            end,
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), u8::from(self.month()))
    }
}

/// The full English name of `month`, e.g. "January".
pub fn month_name(month: Month) -> String {
    month.to_string()
}

/// Check that a required month is present and formatted as "YYYY-MM".
pub(crate) fn require_month(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<YearMonth> {
    let value = require(errors, field, value)?;

    match YearMonth::parse(value) {
        Some(month) => Some(month),
        None => {
            errors.add(
                field,
                format!(
                    "The {} field must match the format Y-m.",
                    display_name(field)
                ),
            );
            None
        }
    }
}

/// Check that a required year is an integer from [MIN_YEAR] to `max_year`.
pub(crate) fn require_year(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_year: i32,
) -> Option<i32> {
    let value = require(errors, field, value)?;
    let name = display_name(field);

    match value.parse::<i32>() {
        Ok(year) if year < MIN_YEAR => {
            errors.add(field, format!("The {name} field must be at least {MIN_YEAR}."));
            None
        }
        Ok(year) if year > max_year => {
            errors.add(
                field,
                format!("The {name} field must not be greater than {max_year}."),
            );
            None
        }
        Ok(year) => Some(year),
        Err(_) => {
            errors.add(field, format!("The {name} field must be an integer."));
            None
        }
    }
}
