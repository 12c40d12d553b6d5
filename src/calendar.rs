use crate::models::{CalendarDay, SessionLog};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Logs bucketed by the date part of their timestamp.
///
/// Built from a whole collection and never updated in place; rebuild it
/// whenever the collection changes.
#[derive(Debug, Clone, Default)]
pub struct LogCalendar {
    by_date: BTreeMap<NaiveDate, Vec<SessionLog>>,
}

impl LogCalendar {
    pub fn build(logs: &[SessionLog]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<SessionLog>> = BTreeMap::new();
        for log in logs {
            by_date.entry(log.date()).or_default().push(log.clone());
        }
        Self { by_date }
    }

    /// Logs recorded on `date`, in collection order. Empty when there are none.
    pub fn day(&self, date: NaiveDate) -> &[SessionLog] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    /// Most recent date with at least one log.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next_back().copied()
    }

    /// Every day of the month with its log count, or `None` for an invalid month.
    pub fn month(&self, year: i32, month: u32) -> Option<Vec<CalendarDay>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let mut days = Vec::with_capacity(31);
        let mut date = first;
        while date.month0() == first.month0() {
            days.push(CalendarDay {
                date,
                log_count: self.day(date).len(),
            });
            date += Duration::days(1);
        }
        Some(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn log(id: &str, timestamp: &str) -> SessionLog {
        SessionLog {
            id: id.to_string(),
            exercise: "Squats".to_string(),
            pain_points: Vec::new(),
            fatigue_level: 3,
            work_time: 0.0,
            rest_time: 0.0,
            comments: String::new(),
            timestamp: timestamp.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn groups_by_date_in_collection_order() {
        let logs = vec![
            log("late", "2024-03-01T18:00:00Z"),
            log("next", "2024-03-02T09:00:00Z"),
            log("early", "2024-03-01T10:00:00Z"),
        ];
        let calendar = LogCalendar::build(&logs);

        assert_eq!(calendar.last_date(), Some(date(2024, 3, 2)));
        let first: Vec<_> = calendar.day(date(2024, 3, 1)).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(first, ["late", "early"]);
        assert_eq!(calendar.day(date(2024, 3, 2)).len(), 1);
    }

    #[test]
    fn missing_date_is_empty() {
        let calendar = LogCalendar::build(&[]);
        assert_eq!(calendar.last_date(), None);
        assert!(calendar.day(date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn month_covers_every_day() {
        let logs = vec![
            log("a", "2024-02-29T08:00:00Z"),
            log("b", "2024-02-29T20:00:00Z"),
            log("c", "2024-03-01T08:00:00Z"),
        ];
        let calendar = LogCalendar::build(&logs);
        let february = calendar.month(2024, 2).unwrap();
        assert_eq!(february.len(), 29);
        assert_eq!(february[0].date, date(2024, 2, 1));
        assert_eq!(february[28].log_count, 2);
        assert!(february[..28].iter().all(|day| day.log_count == 0));

        assert_eq!(calendar.month(2024, 12).unwrap().len(), 31);
        assert!(calendar.month(2024, 13).is_none());
    }
}
