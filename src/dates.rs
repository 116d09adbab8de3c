//! Calendar helpers used as the timeline's tick function

use chrono::{Datelike, NaiveDate};

use crate::error::{AppraisalError, AppraisalResult};

/// Add `months` whole calendar months to `date`.
///
/// The day of month is kept unless the target month is shorter, in which
/// case it clamps to that month's last day (Jan 31 + 1 month = Feb 28/29).
/// `months` may be negative. Results past the representable range
/// saturate to `NaiveDate::MIN` / `NaiveDate::MAX`.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let month = total.rem_euclid(12) as u32 + 1;
    let saturated = if months < 0 { NaiveDate::MIN } else { NaiveDate::MAX };

    let Ok(year) = i32::try_from(total.div_euclid(12)) else {
        return saturated;
    };
    let day = date.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(saturated)
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Last calendar day of the month containing `date`
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}

/// Actual days from `from` to `to` divided by `basis`, floored at zero
pub fn year_fraction(from: NaiveDate, to: NaiveDate, basis: f64) -> f64 {
    let days = (to - from).num_days() as f64;
    (days / basis).max(0.0)
}

/// Parse an ISO `YYYY-MM-DD` date, naming the offending field on failure
pub fn parse_date(field: &str, value: &str) -> AppraisalResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| AppraisalError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}
