// Date utility functions

use chrono::{Datelike, Duration, NaiveDate};

/// First day of the week containing `date`.
///
/// `first_day_of_week` counts from Sunday (0) to Saturday (6).
pub fn get_week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    let weekday = date.weekday().num_days_from_sunday() as i64;
    let offset = (weekday - (first_day_of_week % 7) as i64 + 7) % 7;
    date - Duration::days(offset)
}

/// The seven consecutive dates starting at `start`.
pub fn week_dates(start: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(7).collect()
}

/// Short column header such as `Tue 10/06`.
pub fn format_day_header(date: NaiveDate) -> String {
    date.format("%a %d/%m").to_string()
}
