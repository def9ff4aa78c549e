//! next-occurrence arithmetic for recurring transactions
//!
//! Occurrences are always computed from the anchor date, so a schedule that
//! starts on the 31st lands on the last day of short months and returns to the
//! 31st afterwards instead of drifting.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::calendar::{add_days, add_months};
use crate::errors::{PayoffError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(u64),
    Months(u32),
}

impl Frequency {
    fn step(self) -> Step {
        match self {
            Frequency::Daily => Step::Days(1),
            Frequency::Weekly => Step::Days(7),
            Frequency::Biweekly => Step::Days(14),
            Frequency::Monthly => Step::Months(1),
            Frequency::Quarterly => Step::Months(3),
            Frequency::Yearly => Step::Months(12),
        }
    }

    /// date `periods` steps after `anchor`
    pub fn advance(self, anchor: NaiveDate, periods: u32) -> Result<NaiveDate> {
        match self.step() {
            Step::Days(days) => add_days(anchor, days * u64::from(periods)),
            Step::Months(months) => {
                let total = months.checked_mul(periods).ok_or_else(|| PayoffError::InvalidDate {
                    message: format!("{} {:?} periods overflow", periods, self),
                })?;
                add_months(anchor, total)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    pub start: NaiveDate,
    pub frequency: Frequency,
    /// last date an occurrence may fall on
    pub end: Option<NaiveDate>,
}

impl RecurringSchedule {
    pub fn new(start: NaiveDate, frequency: Frequency) -> Self {
        Self {
            start,
            frequency,
            end: None,
        }
    }

    pub fn ends_on(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// the n-th occurrence, 0 being the start date; ignores `end`
    pub fn occurrence(&self, n: u32) -> Result<NaiveDate> {
        self.frequency.advance(self.start, n)
    }

    /// first occurrence strictly after `date`, `None` once the schedule has ended
    pub fn next_after(&self, date: NaiveDate) -> Result<Option<NaiveDate>> {
        if date < self.start {
            return Ok(self.within_end(self.start));
        }

        let mut n = self.periods_elapsed(date)?;
        loop {
            let candidate = self.occurrence(n)?;
            if candidate > date {
                return Ok(self.within_end(candidate));
            }
            n = n.checked_add(1).ok_or_else(|| PayoffError::InvalidDate {
                message: format!("no occurrence after {}", date),
            })?;
        }
    }

    /// occurrences after `last_generated` up to and including `as_of`, at most `limit` of them
    pub fn due_through(
        &self,
        last_generated: Option<NaiveDate>,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<NaiveDate>> {
        let mut due = Vec::new();
        let mut cursor = match last_generated {
            Some(date) => self.next_after(date)?,
            None => self.within_end(self.start),
        };

        while let Some(date) = cursor {
            if date > as_of {
                break;
            }
            if due.len() >= limit {
                debug!(
                    "catch-up for {:?} schedule from {} capped at {} occurrences",
                    self.frequency, self.start, limit
                );
                break;
            }
            due.push(date);
            cursor = self.next_after(date)?;
        }
        Ok(due)
    }

    fn within_end(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.end {
            Some(end) if date > end => None,
            _ => Some(date),
        }
    }

    /// whole steps between start and `date`, never past the answer of `next_after`
    fn periods_elapsed(&self, date: NaiveDate) -> Result<u32> {
        let elapsed = match self.frequency.step() {
            Step::Days(days) => {
                let span = (date - self.start).num_days().max(0) as u64;
                span / days
            }
            Step::Months(months) => {
                let span = (date.year() - self.start.year()) as i64 * 12 + date.month0() as i64
                    - self.start.month0() as i64;
                span.max(0) as u64 / u64::from(months)
            }
        };
        u32::try_from(elapsed).map_err(|_| PayoffError::InvalidDate {
            message: format!("{} is too far from {}", date, self.start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_does_not_drift() {
        let schedule = RecurringSchedule::new(date(2024, 1, 31), Frequency::Monthly);
        assert_eq!(schedule.occurrence(1).unwrap(), date(2024, 2, 29));
        assert_eq!(schedule.occurrence(2).unwrap(), date(2024, 3, 31));
        assert_eq!(schedule.occurrence(3).unwrap(), date(2024, 4, 30));

        assert_eq!(schedule.next_after(date(2024, 2, 29)).unwrap(), Some(date(2024, 3, 31)));
        assert_eq!(schedule.next_after(date(2024, 3, 15)).unwrap(), Some(date(2024, 3, 31)));
        assert_eq!(schedule.next_after(date(2024, 3, 31)).unwrap(), Some(date(2024, 4, 30)));
    }

    #[test]
    fn test_day_based_frequencies() {
        let weekly = RecurringSchedule::new(date(2024, 1, 1), Frequency::Weekly);
        assert_eq!(weekly.next_after(date(2024, 1, 1)).unwrap(), Some(date(2024, 1, 8)));
        assert_eq!(weekly.next_after(date(2024, 1, 10)).unwrap(), Some(date(2024, 1, 15)));

        let biweekly = RecurringSchedule::new(date(2024, 1, 5), Frequency::Biweekly);
        assert_eq!(biweekly.occurrence(2).unwrap(), date(2024, 2, 2));

        let daily = RecurringSchedule::new(date(2024, 2, 28), Frequency::Daily);
        assert_eq!(daily.next_after(date(2024, 2, 28)).unwrap(), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_quarterly_and_yearly() {
        let quarterly = RecurringSchedule::new(date(2024, 11, 30), Frequency::Quarterly);
        assert_eq!(quarterly.occurrence(1).unwrap(), date(2025, 2, 28));
        assert_eq!(quarterly.occurrence(2).unwrap(), date(2025, 5, 30));

        let yearly = RecurringSchedule::new(date(2024, 2, 29), Frequency::Yearly);
        assert_eq!(yearly.next_after(date(2024, 3, 1)).unwrap(), Some(date(2025, 2, 28)));
        assert_eq!(yearly.occurrence(4).unwrap(), date(2028, 2, 29));
    }

    #[test]
    fn test_before_start_and_after_end() {
        let schedule =
            RecurringSchedule::new(date(2024, 6, 1), Frequency::Monthly).ends_on(date(2024, 8, 1));
        assert_eq!(schedule.next_after(date(2024, 1, 1)).unwrap(), Some(date(2024, 6, 1)));
        assert_eq!(schedule.next_after(date(2024, 7, 1)).unwrap(), Some(date(2024, 8, 1)));
        assert_eq!(schedule.next_after(date(2024, 8, 1)).unwrap(), None);
    }

    #[test]
    fn test_due_through_catch_up() {
        let schedule = RecurringSchedule::new(date(2024, 1, 31), Frequency::Monthly);

        let due = schedule.due_through(Some(date(2024, 1, 31)), date(2024, 5, 1), 10).unwrap();
        assert_eq!(due, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);

        let capped = schedule.due_through(Some(date(2024, 1, 31)), date(2024, 5, 1), 2).unwrap();
        assert_eq!(capped, vec![date(2024, 2, 29), date(2024, 3, 31)]);

        let first_run = schedule.due_through(None, date(2024, 2, 1), 10).unwrap();
        assert_eq!(first_run, vec![date(2024, 1, 31)]);

        let nothing_due = schedule
            .due_through(Some(date(2024, 4, 30)), date(2024, 5, 1), 10)
            .unwrap();
        assert!(nothing_due.is_empty());
    }

    #[test]
    fn test_due_through_stops_at_end() {
        let schedule =
            RecurringSchedule::new(date(2024, 1, 1), Frequency::Weekly).ends_on(date(2024, 1, 20));
        let due = schedule.due_through(None, date(2024, 3, 1), 100).unwrap();
        assert_eq!(due, vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]);
    }
}
