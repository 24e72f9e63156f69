//! Date formats found in bank statements.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// Numeric formats, tried in order. Month-first wins over day-first when a
/// date fits both.
const NUMERIC_DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 9] = [
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[day padding:none]/[month padding:none]/[year]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[month padding:none]-[day padding:none]-[year]"),
    format_description!("[day padding:none]-[month padding:none]-[year]"),
    format_description!("[year].[month padding:none].[day padding:none]"),
    format_description!("[day padding:none].[month padding:none].[year]"),
    format_description!("[month padding:none].[day padding:none].[year]"),
];

/// Formats with a month name, e.g. "15 Jan 2026" or "15 January 2026".
const NAMED_MONTH_DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 2] = [
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
    format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
];

/// Parse a date written in one of the numeric formats used by CSV exports.
pub fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();

    NUMERIC_DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(text, format).ok())
}

/// Like [parse_date], but also accepts dates with a month name.
pub fn parse_statement_date(text: &str) -> Option<Date> {
    parse_date(text).or_else(|| {
        let text = text.trim();

        NAMED_MONTH_DATE_FORMATS
            .iter()
            .find_map(|format| Date::parse(text, format).ok())
    })
}
