//! The period of time a report covers.

use serde::Deserialize;
use time::{Date, Month};

use crate::Error;

/// An inclusive range of dates that a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    start: Date,
    end: Date,
}

impl ReportWindow {
    /// The calendar month `month` (1 for January) of `year`.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not in 1..=12.
    pub fn month(year: i32, month: u8) -> Result<Self, Error> {
        let month_value = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;
        let start = Date::from_calendar_date(year, month_value, 1)
            .map_err(|_| Error::InvalidMonth(month))?;

        Ok(Self {
            start,
            end: last_day_of_month(start),
        })
    }

    /// The month that contains `date`.
    pub fn month_of(date: Date) -> Self {
        Self {
            start: date.replace_day(1).unwrap_or(date),
            end: last_day_of_month(date),
        }
    }

    /// Any inclusive date range.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `start` is after `end`.
    pub fn custom(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateRange(start, end));
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the window covers exactly one calendar month.
    pub fn is_calendar_month(&self) -> bool {
        Self::month_of(self.start) == *self
    }

    /// A human readable description, e.g. "January 2026" or
    /// "2026-01-01 to 2026-03-31".
    pub fn label(&self) -> String {
        if self.is_calendar_month() {
            format!("{} {}", self.start.month(), self.start.year())
        } else {
            format!("{} to {}", self.start, self.end)
        }
    }

    /// The month windows for `count` consecutive months, starting with the
    /// month that contains `first`.
    pub fn consecutive_months(first: Date, count: usize) -> Vec<Self> {
        let mut windows = Vec::with_capacity(count);
        let mut current = Self::month_of(first);

        for _ in 0..count {
            windows.push(current);

            match current.end.next_day() {
                Some(next) => current = Self::month_of(next),
                None => break,
            }
        }

        windows
    }

    /// The window for the month before this window's first month.
    pub fn previous_month(&self) -> Self {
        Self::month_of(self.start.previous_day().unwrap_or(self.start))
    }

    /// The window for the month after this window's last month.
    pub fn next_month(&self) -> Self {
        Self::month_of(self.end.next_day().unwrap_or(self.end))
    }
}

/// Query parameters that select a report window.
///
/// A start and end date select a custom window, otherwise `year` and `month`
/// select a calendar month. Missing values default to the month containing
/// today.
#[derive(Debug, Default, Deserialize)]
pub struct ReportWindowParams {
    pub year: Option<i32>,
    pub month: Option<u8>,
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl ReportWindowParams {
    /// Resolve the parameters to a window, using `today` to fill in blanks.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] or [Error::InvalidDateRange] for
    /// parameters that do not describe a valid window.
    pub fn window(&self, today: Date) -> Result<ReportWindow, Error> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => ReportWindow::custom(start, end),
            (Some(start), None) => ReportWindow::custom(start, today.max(start)),
            (None, Some(end)) => ReportWindow::custom(end.replace_day(1).unwrap_or(end), end),
            (None, None) => match (self.year, self.month) {
                (year, Some(month)) => ReportWindow::month(year.unwrap_or(today.year()), month),
                (Some(year), None) => ReportWindow::month(year, u8::from(today.month())),
                (None, None) => Ok(ReportWindow::month_of(today)),
            },
        }
    }
}

impl ReportWindow {
    /// The query string that selects this window, e.g. "start=2026-01-01&end=2026-01-31".
    pub fn query_string(&self) -> String {
        format!("start={}&end={}", self.start, self.end)
    }
}

fn last_day_of_month(date: Date) -> Date {
    let first_of_next_month = match date.month() {
        Month::December => Date::from_calendar_date(date.year() + 1, Month::January, 1),
        month => Date::from_calendar_date(date.year(), month.next(), 1),
    };

    first_of_next_month
        .ok()
        .and_then(|first| first.previous_day())
        .unwrap_or(date)
}
