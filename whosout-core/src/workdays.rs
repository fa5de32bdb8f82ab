//! Workday windows to report on.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

/// One reported calendar day, bounded in UTC from 00:00:00 to 23:59:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        DayWindow {
            date,
            start,
            end: start + Duration::seconds(86_399),
        }
    }

    /// `YYYY-MM-DD` key used in the result map.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The same window one day later.
    pub fn next(&self) -> Self {
        DayWindow {
            date: self.date + Duration::days(1),
            start: self.start + Duration::days(1),
            end: self.end + Duration::days(1),
        }
    }
}

pub fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Windows for the next `count` workdays, starting with `today` if it is one.
///
/// Weekends are stepped over without using up the count.
pub fn workday_windows(today: NaiveDate, count: usize) -> Vec<DayWindow> {
    let mut windows = Vec::with_capacity(count);
    let mut window = DayWindow::for_date(today);

    while windows.len() < count {
        if is_workday(window.date) {
            windows.push(window);
        }
        window = window.next();
    }

    windows
}
