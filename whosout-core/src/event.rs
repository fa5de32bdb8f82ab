//! Event types decoded from the calendar feed.
//!
//! `CalendarEvent` is the full VEVENT view used while expanding recurrences.
//! `EventRecord` is the reduced text-only view the absence projection reads.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Start or end of an event as written in the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// All-day value (VALUE=DATE)
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl EventTime {
    /// Anchor this value on the UTC timeline.
    ///
    /// Days are bounded in UTC, so floating and zoned values keep their
    /// wall-clock fields. Dates resolve to midnight.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
            EventTime::DateTimeUtc(dt) => *dt,
            EventTime::DateTimeFloating(naive) => naive.and_utc(),
            EventTime::DateTimeZoned { datetime, .. } => datetime.and_utc(),
        }
    }

    /// End time for an event that has a DTSTART but no DTEND.
    ///
    /// All-day events cover their day; timed events are instantaneous.
    pub fn implied_end(&self) -> EventTime {
        match self {
            EventTime::Date(d) => EventTime::Date(*d + Duration::days(1)),
            other => other.clone(),
        }
    }
}

/// RRULE plus the excluded occurrence starts of a recurring master event.
#[derive(Debug, Clone, PartialEq)]
pub struct Recurrence {
    pub rrule: String,
    pub exdates: Vec<DateTime<Utc>>,
}

/// A VEVENT decoded from the feed.
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    /// STATUS:CANCELLED
    pub cancelled: bool,
    pub recurrence: Option<Recurrence>,
    /// Original start of the occurrence this VEVENT overrides
    pub recurrence_id: Option<EventTime>,
}

impl CalendarEvent {
    /// Whether the event occupies any part of `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        occurrence_overlaps(self.start.to_utc(), self.end.to_utc(), start, end)
    }

    pub fn record(&self) -> EventRecord {
        EventRecord {
            summary: self.summary.clone(),
            description: self.description.clone(),
        }
    }
}

/// Overlap test for a single occurrence against a half-open window.
fn occurrence_overlaps(
    occ_start: DateTime<Utc>,
    occ_end: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    if occ_end <= occ_start {
        return occ_start >= start && occ_start < end;
    }
    occ_start < end && occ_end > start
}

/// Text fields of one event occurrence, in the order the parser returned them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventRecord {
    pub summary: String,
    pub description: String,
}

impl EventRecord {
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        EventRecord {
            summary: summary.into(),
            description: description.into(),
        }
    }
}
