//! Day-window extraction from raw ICS feed bytes.
//!
//! The parser owns calendar-format semantics: unfolding, recurrence
//! expansion, EXDATEs, instance overrides and cancelled events. Callers only
//! see the text of the occurrences that touch a window.

mod parse;

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{WhosOutError, WhosOutResult};
use crate::event::EventRecord;
use crate::recurrence::expand_recurring_event;

pub use parse::parse_calendar;

/// Turns raw feed bytes plus a `[start, end)` window into event records.
pub trait CalendarParser: Send + Sync {
    fn events_between(
        &self,
        raw: &[u8],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> WhosOutResult<Vec<EventRecord>>;
}

/// `CalendarParser` for iCalendar (RFC 5545) feeds.
#[derive(Debug, Clone, Default)]
pub struct IcsParser;

impl CalendarParser for IcsParser {
    fn events_between(
        &self,
        raw: &[u8],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> WhosOutResult<Vec<EventRecord>> {
        let content = std::str::from_utf8(raw)
            .map_err(|e| WhosOutError::IcsParse(format!("feed is not valid UTF-8: {e}")))?;
        let events = parse_calendar(content)?;

        let overridden: HashSet<(String, DateTime<Utc>)> = events
            .iter()
            .filter_map(|ev| Some((ev.uid.clone(), ev.recurrence_id.as_ref()?.to_utc())))
            .collect();

        let mut records = Vec::new();
        for event in &events {
            if event.cancelled {
                continue;
            }

            if event.recurrence.is_some() {
                let skipped: HashSet<DateTime<Utc>> = overridden
                    .iter()
                    .filter(|(uid, _)| *uid == event.uid)
                    .map(|(_, at)| *at)
                    .collect();
                records.extend(
                    expand_recurring_event(event, start, end, &skipped)?
                        .iter()
                        .map(|instance| instance.record()),
                );
            } else if event.overlaps(start, end) {
                records.push(event.record());
            }
        }

        Ok(records)
    }
}
