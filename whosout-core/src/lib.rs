//! Core of whosout: who is out of office over the next few workdays.
//!
//! - `cache` keeps the upstream ICS feed, refetching on an interval and
//!   falling back to stale bytes when the feed is unreachable
//! - `ics` and `recurrence` turn feed bytes into the events of a day window
//! - `projector` groups each workday's events into category → people

pub mod absence;
pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod fetch;
pub mod ics;
pub mod projector;
pub mod recurrence;
pub mod workdays;

pub use absence::{AbsenceEntry, DayResult, TodayData, TodayResult};
pub use cache::{CalendarCache, RefreshOutcome};
pub use config::FeedConfig;
pub use error::{WhosOutError, WhosOutResult};
pub use fetch::{Fetcher, HttpFetcher};
pub use ics::{CalendarParser, IcsParser};
pub use projector::{AbsenceProjector, DEFAULT_WORKDAYS};
