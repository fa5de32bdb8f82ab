//! Projection of the cached feed onto the upcoming workdays.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::absence::{DayResult, TodayResult, group_events};
use crate::cache::CalendarCache;
use crate::error::WhosOutResult;
use crate::fetch::Fetcher;
use crate::ics::CalendarParser;
use crate::workdays::{DayWindow, workday_windows};

/// Workdays reported when nothing else is configured.
pub const DEFAULT_WORKDAYS: usize = 5;

pub struct AbsenceProjector<F, P> {
    cache: Arc<CalendarCache<F>>,
    parser: P,
}

impl<F: Fetcher, P: CalendarParser> AbsenceProjector<F, P> {
    pub fn new(cache: Arc<CalendarCache<F>>, parser: P) -> Self {
        AbsenceProjector { cache, parser }
    }

    pub fn cache(&self) -> &CalendarCache<F> {
        &self.cache
    }

    /// Absences for the next `workdays` workdays, starting from the local date.
    pub async fn today(&self, workdays: usize) -> WhosOutResult<TodayResult> {
        self.cache.ensure_fresh().await;
        self.today_on(Local::now().date_naive(), workdays).await
    }

    /// Absences for the next `workdays` workdays starting at `today`, from
    /// whatever the cache currently holds.
    ///
    /// Any day failing to parse fails the whole result.
    pub async fn today_on(&self, today: NaiveDate, workdays: usize) -> WhosOutResult<TodayResult> {
        let raw = self.cache.data().await;

        let mut result = TodayResult::new();
        for window in workday_windows(today, workdays) {
            result.insert(window.key(), self.calendar_day(&raw, &window)?);
        }
        Ok(result)
    }

    /// Group the events of a single day window.
    pub fn calendar_day(&self, raw: &[u8], window: &DayWindow) -> WhosOutResult<DayResult> {
        let events = self.parser.events_between(raw, window.start, window.end)?;
        tracing::debug!(date = %window.key(), events = events.len(), "grouping day");
        Ok(group_events(&events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::ScriptedFetcher;
    use crate::error::WhosOutError;
    use crate::event::EventRecord;
    use crate::ics::IcsParser;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;
    use std::time::Duration;

    const FEED: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:hol-1\r\n\
SUMMARY:Jane Doe - Holiday\r\n\
DTSTART;VALUE=DATE:20240307\r\n\
DTEND;VALUE=DATE:20240312\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:sick-1\r\n\
SUMMARY:John Smith - Sick\r\n\
DTSTART;VALUE=DATE:20240308\r\n\
DTEND;VALUE=DATE:20240309\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:picnic\r\n\
SUMMARY:Team Lunch - Other Events\r\n\
DESCRIPTION:Annual picnic\\nRSVP required\r\n\
DTSTART:20240308T120000Z\r\n\
DTEND:20240308T140000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:hol-2\r\n\
SUMMARY:Alex Roe - Holiday\r\n\
DTSTART;VALUE=DATE:20240308\r\n\
DTEND;VALUE=DATE:20240309\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn projector_with<P: CalendarParser>(
        responses: Vec<WhosOutResult<Vec<u8>>>,
        parser: P,
    ) -> AbsenceProjector<ScriptedFetcher, P> {
        let cache = Arc::new(CalendarCache::new(
            "https://example.com/calendar.ics",
            Duration::from_secs(3600),
            ScriptedFetcher::new(responses),
        ));
        cache.ensure_fresh().await;
        AbsenceProjector::new(cache, parser)
    }

    #[tokio::test]
    async fn test_groups_absences_across_workdays() {
        let projector = projector_with(vec![Ok(FEED.as_bytes().to_vec())], IcsParser).await;

        // Thursday: the working week ends Friday, then Monday to Wednesday.
        let result = projector.today_on(date(2024, 3, 7), 5).await.expect("Should project");

        let keys: Vec<&str> = result.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["2024-03-07", "2024-03-08", "2024-03-11", "2024-03-12", "2024-03-13"]
        );

        assert_eq!(result["2024-03-07"]["Holiday"], vec!["Jane Doe"]);

        let friday = &result["2024-03-08"];
        assert_eq!(friday["Holiday"], vec!["Jane Doe", "Alex Roe"]);
        assert_eq!(friday["Sick"], vec!["John Smith"]);
        assert_eq!(friday["Annual picnic"], vec!["Team Lunch"]);
        assert!(!friday.contains_key("Other Events"));

        assert_eq!(result["2024-03-11"]["Holiday"], vec!["Jane Doe"]);
        assert!(result["2024-03-12"].is_empty());
        assert!(result["2024-03-13"].is_empty());
    }

    #[tokio::test]
    async fn test_never_fetched_cache_yields_empty_days() {
        let projector = projector_with(
            vec![Err(WhosOutError::Fetch("offline".into()))],
            IcsParser,
        )
        .await;

        let result = projector.today_on(date(2024, 3, 9), 3).await.expect("Should project");

        assert_eq!(result.len(), 3);
        assert!(result.values().all(|day| day.is_empty()));
        assert_eq!(result.keys().next().map(String::as_str), Some("2024-03-11"));
    }

    #[tokio::test]
    async fn test_malformed_feed_fails_the_whole_request() {
        let projector = projector_with(vec![Ok(b"not a calendar".to_vec())], IcsParser).await;

        let err = projector.today_on(date(2024, 3, 4), 5).await.unwrap_err();
        assert!(matches!(err, WhosOutError::IcsParse(_)));
    }

    /// Parser that fails on one specific day and records every window asked for.
    struct FailingOn {
        day: DateTime<Utc>,
        seen: Mutex<Vec<DateTime<Utc>>>,
    }

    impl CalendarParser for FailingOn {
        fn events_between(
            &self,
            _raw: &[u8],
            start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> WhosOutResult<Vec<EventRecord>> {
            self.seen.lock().unwrap().push(start);
            if start == self.day {
                return Err(WhosOutError::IcsParse("bad day".into()));
            }
            Ok(vec![EventRecord::new("Jane Doe - Holiday", "")])
        }
    }

    #[tokio::test]
    async fn test_error_on_a_later_day_discards_earlier_days() {
        let parser = FailingOn {
            day: DayWindow::for_date(date(2024, 3, 6)).start,
            seen: Mutex::new(Vec::new()),
        };
        let projector = projector_with(vec![Ok(Vec::new())], parser).await;

        let err = projector.today_on(date(2024, 3, 4), 5).await.unwrap_err();

        assert!(matches!(err, WhosOutError::IcsParse(_)));
        // Fails fast: Thursday and Friday are never asked for.
        assert_eq!(projector.parser.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_today_reuses_data_within_refresh_interval() {
        let projector = projector_with(vec![Ok(FEED.as_bytes().to_vec())], IcsParser).await;
        let fetched_at = projector.cache().last_fetched_at().await;
        assert!(fetched_at.is_some());

        let result = projector.today(DEFAULT_WORKDAYS).await.expect("Should project");

        assert_eq!(result.len(), DEFAULT_WORKDAYS);
        assert!(result.keys().all(|key| {
            NaiveDate::parse_from_str(key, "%Y-%m-%d").is_ok_and(crate::workdays::is_workday)
        }));
        assert_eq!(projector.cache().last_fetched_at().await, fetched_at);
    }
}
