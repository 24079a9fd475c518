//! Repeating schedules and their upcoming dates.

use std::fmt;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::parse_date;
use crate::error::TaskResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }

    fn unit(self) -> &'static str {
        match self {
            Frequency::Daily => "days",
            Frequency::Weekly => "weeks",
            Frequency::Monthly => "months",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Periods between occurrences. Zero is read as one.
    pub interval: u32,
}

impl Recurrence {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
        }
    }

    /// The date `steps` periods after `start`, or `None` past the end of the
    /// calendar.
    ///
    /// Monthly steps are always counted from `start` and clamp to the last
    /// day of a shorter month, so Jan 31 yields Feb 28 and then Mar 31.
    pub fn advance(&self, start: NaiveDate, steps: u32) -> Option<NaiveDate> {
        let periods = self.interval.max(1).checked_mul(steps)?;
        match self.frequency {
            Frequency::Daily => start.checked_add_days(Days::new(u64::from(periods))),
            Frequency::Weekly => start.checked_add_days(Days::new(u64::from(periods) * 7)),
            Frequency::Monthly => start.checked_add_months(Months::new(periods)),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval <= 1 {
            f.write_str(self.frequency.label())
        } else {
            write!(f, "Every {} {}", self.interval, self.frequency.unit())
        }
    }
}

/// The `count` dates following `start` (never `start` itself).
///
/// Stops early only if the calendar overflows.
pub fn next_occurrences(start: NaiveDate, rule: &Recurrence, count: usize) -> Vec<NaiveDate> {
    (1..=count)
        .map_while(|step| u32::try_from(step).ok().and_then(|s| rule.advance(start, s)))
        .collect()
}

/// [`next_occurrences`] over `YYYY-MM-DD` strings.
pub fn next_occurrences_from_str(
    start: &str,
    rule: &Recurrence,
    count: usize,
) -> TaskResult<Vec<String>> {
    let start = parse_date(start)?;
    Ok(next_occurrences(start, rule, count)
        .into_iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrences(start: &str, frequency: Frequency, interval: u32, count: usize) -> Vec<String> {
        next_occurrences_from_str(start, &Recurrence::new(frequency, interval), count).unwrap()
    }

    #[test]
    fn test_daily_and_weekly() {
        assert_eq!(
            occurrences("2026-01-30", Frequency::Daily, 1, 3),
            vec!["2026-01-31", "2026-02-01", "2026-02-02"]
        );
        assert_eq!(
            occurrences("2026-01-01", Frequency::Daily, 3, 2),
            vec!["2026-01-04", "2026-01-07"]
        );
        assert_eq!(
            occurrences("2026-12-24", Frequency::Weekly, 2, 2),
            vec!["2027-01-07", "2027-01-21"]
        );
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        assert_eq!(
            occurrences("2026-01-31", Frequency::Monthly, 1, 3),
            vec!["2026-02-28", "2026-03-31", "2026-04-30"]
        );
        assert_eq!(
            occurrences("2027-11-30", Frequency::Monthly, 3, 1),
            vec!["2028-02-29"]
        );
    }

    #[test]
    fn test_start_is_never_included() {
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let dates = next_occurrences(start, &Recurrence::new(Frequency::Weekly, 1), 3);
        assert_eq!(dates.len(), 3);
        assert!(dates.iter().all(|d| *d > start));
        assert!(next_occurrences(start, &Recurrence::new(Frequency::Daily, 1), 0).is_empty());
    }

    #[test]
    fn test_invalid_start_is_an_error() {
        let rule = Recurrence::new(Frequency::Daily, 1);
        assert!(next_occurrences_from_str("soon", &rule, 3).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Recurrence::new(Frequency::Daily, 1).to_string(), "Daily");
        assert_eq!(Recurrence::new(Frequency::Weekly, 1).to_string(), "Weekly");
        assert_eq!(Recurrence::new(Frequency::Monthly, 1).to_string(), "Monthly");
        assert_eq!(Recurrence::new(Frequency::Daily, 3).to_string(), "Every 3 days");
        assert_eq!(Recurrence::new(Frequency::Weekly, 2).to_string(), "Every 2 weeks");
        assert_eq!(Recurrence::new(Frequency::Monthly, 6).to_string(), "Every 6 months");
    }
}
