//! Due-date urgency: how far a date is from "today" and how to describe it.
//!
//! Every function takes the reference day explicitly. Callers that want the
//! wall clock pass [`today`].

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::error::{TaskError, TaskResult};

/// Days ahead (inclusive) that still count as "soon".
pub const SOON_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Overdue,
    Today,
    Soon,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Red,
    Orange,
    Yellow,
    Blue,
    Gray,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateInfo {
    pub text: String,
    pub color: ColorTag,
    pub urgency: Urgency,
}

/// The local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used.
pub fn parse_date(value: &str) -> TaskResult<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| TaskError::invalid_date(value))
}

/// Whole days from `today` to `due`; negative when `due` is in the past.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

pub fn urgency(due: NaiveDate, today: NaiveDate) -> Urgency {
    match days_until(due, today) {
        d if d < 0 => Urgency::Overdue,
        0 => Urgency::Today,
        d if d <= SOON_WINDOW_DAYS => Urgency::Soon,
        _ => Urgency::Future,
    }
}

pub fn is_overdue(due: NaiveDate, today: NaiveDate) -> bool {
    due < today
}

pub fn is_due_soon(due: NaiveDate, today: NaiveDate) -> bool {
    (0..=SOON_WINDOW_DAYS).contains(&days_until(due, today))
}

/// "Jan 15, 2026"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn date_info(due: NaiveDate, today: NaiveDate) -> DateInfo {
    let days = days_until(due, today);
    let (text, color) = match days {
        d if d < 0 => {
            let n = d.abs();
            let plural = if n == 1 { "" } else { "s" };
            (format!("Overdue by {} day{}", n, plural), ColorTag::Red)
        }
        0 => ("Due today".to_string(), ColorTag::Orange),
        1 => ("Due tomorrow".to_string(), ColorTag::Yellow),
        d if d <= SOON_WINDOW_DAYS => (format!("Due in {} days", d), ColorTag::Blue),
        _ => (format_date(due), ColorTag::Gray),
    };
    DateInfo {
        text,
        color,
        urgency: urgency(due, today),
    }
}

/// [`date_info`] for a raw date string.
pub fn classify(value: &str, today: NaiveDate) -> TaskResult<DateInfo> {
    parse_date(value).map(|due| date_info(due, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(day("2026-01-08"), NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
        assert_eq!(day("2026-01-08T23:10:00+00:00"), NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
        assert!(matches!(
            parse_date("08/01/2026"),
            Err(TaskError::InvalidDate { .. })
        ));
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_overdue_text_is_pluralized() {
        let today = day("2026-01-08");
        let one = classify("2026-01-07", today).unwrap();
        assert_eq!(one.text, "Overdue by 1 day");
        assert_eq!(one.urgency, Urgency::Overdue);
        assert_eq!(one.color, ColorTag::Red);

        let three = classify("2026-01-05", today).unwrap();
        assert_eq!(three.text, "Overdue by 3 days");
    }

    #[test]
    fn test_near_dates() {
        let today = day("2026-01-08");
        let info = classify("2026-01-08", today).unwrap();
        assert_eq!((info.text.as_str(), info.urgency), ("Due today", Urgency::Today));

        let info = classify("2026-01-09", today).unwrap();
        assert_eq!((info.text.as_str(), info.urgency), ("Due tomorrow", Urgency::Soon));

        let info = classify("2026-01-15", today).unwrap();
        assert_eq!((info.text.as_str(), info.urgency), ("Due in 7 days", Urgency::Soon));
    }

    #[test]
    fn test_future_uses_formatted_date() {
        let today = day("2026-01-01");
        let info = classify("2026-01-15", today).unwrap();
        assert_eq!(info.text, "Jan 15, 2026");
        assert_eq!(info.urgency, Urgency::Future);
        assert_eq!(info.color, ColorTag::Gray);
    }

    #[test]
    fn test_soon_window() {
        let today = day("2026-01-08");
        assert!(is_due_soon(day("2026-01-08"), today));
        assert!(is_due_soon(day("2026-01-15"), today));
        assert!(!is_due_soon(day("2026-01-16"), today));
        assert!(!is_due_soon(day("2026-01-07"), today));
        assert!(is_overdue(day("2026-01-07"), today));
        assert!(!is_overdue(today, today));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let today = day("2026-02-28");
        assert_eq!(
            classify("2026-03-01", today).unwrap(),
            classify("2026-03-01", today).unwrap()
        );
    }
}
