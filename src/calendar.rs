use chrono::{Days, Months, NaiveDate};

use crate::errors::{PayoffError, Result};

/// add calendar months, clamping to the last day of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| PayoffError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}

/// add calendar days
pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| PayoffError::InvalidDate {
            message: format!("{} + {} days is out of range", date, days),
        })
}
