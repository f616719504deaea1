use time::{format_description::FormatItem, macros::format_description, Date, Time};

use crate::error::AppError;

const DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CLOCK_HM: &[FormatItem<'static>] = format_description!("[hour]:[minute]");
const CLOCK_HMS: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// Serde adapter for calendar dates as `YYYY-MM-DD`.
pub mod iso_date {
    #[allow(unused_imports)]
    use time::Date;

    time::serde::format_description!(fmt, Date, "[year]-[month]-[day]");
    pub use fmt::{deserialize, option, serialize};
}

/// Serde adapter for row timestamps as written by SQLite's CURRENT_TIMESTAMP.
pub mod sql_timestamp {
    #[allow(unused_imports)]
    use time::PrimitiveDateTime;

    time::serde::format_description!(
        fmt,
        PrimitiveDateTime,
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    );
    pub use fmt::{deserialize, option, serialize};
}

pub fn parse_date(field: &str, raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), DATE)
        .map_err(|_| AppError::invalid(format!("{field} must be a date in YYYY-MM-DD format")))
}

pub fn parse_optional_date(field: &str, raw: Option<&str>) -> Result<Option<Date>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_date(field, s))
        .transpose()
}

/// Accepts `HH:MM` or `HH:MM:SS`, normalised to `HH:MM`.
pub fn parse_clock(field: &str, raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    let t = Time::parse(raw, CLOCK_HM)
        .or_else(|_| Time::parse(raw, CLOCK_HMS))
        .map_err(|_| AppError::invalid(format!("{field} must be a time in HH:MM format")))?;
    Ok(format!("{:02}:{:02}", t.hour(), t.minute()))
}

/// Inclusive bounds on a date column. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, AppError> {
        let range = Self {
            start: parse_optional_date("start_date", start)?,
            end: parse_optional_date("end_date", end)?,
        };
        if let (Some(s), Some(e)) = (range.start, range.end) {
            if s > e {
                return Err(AppError::invalid("start_date must not be after end_date"));
            }
        }
        Ok(range)
    }
}
