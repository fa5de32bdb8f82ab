//! RRULE expansion for recurring events.
//!
//! Expands a master recurring event into the individual instances that touch
//! a window, respecting EXDATEs and instance overrides from the same feed.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;

use crate::error::{WhosOutError, WhosOutResult};
use crate::event::{CalendarEvent, EventTime, Recurrence};

/// Upper bound on occurrences generated for a single master per window.
const MAX_OCCURRENCES: u16 = 366;

/// Build an iCalendar-format RRULE string for the rrule crate parser.
///
/// Every value is written in UTC, matching how day windows are anchored.
fn build_rrule_string(start: &EventTime, recurrence: &Recurrence) -> String {
    let mut lines = vec![format!(
        "DTSTART:{}",
        start.to_utc().format("%Y%m%dT%H%M%SZ")
    )];

    lines.push(format!("RRULE:{}", normalize_until(&recurrence.rrule)));

    for exdate in &recurrence.exdates {
        lines.push(format!(
            "EXDATE:{}",
            exdate.format("%Y%m%dT%H%M%SZ")
        ));
    }

    lines.join("\n")
}

/// Rewrite UNTIL as a UTC date-time so it matches the UTC DTSTART.
///
/// Feeds commonly pair all-day events with `UNTIL=YYYYMMDD`, which the rrule
/// crate rejects against a date-time DTSTART.
fn normalize_until(rrule: &str) -> String {
    rrule
        .split(';')
        .map(|part| match part.split_once('=') {
            Some(("UNTIL", value)) if !value.contains('T') => format!("UNTIL={value}T235959Z"),
            Some(("UNTIL", value)) if !value.ends_with('Z') => format!("UNTIL={value}Z"),
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Convert an rrule occurrence back to an EventTime matching the master's variant.
fn occurrence_to_event_time(dt: DateTime<Utc>, master_start: &EventTime) -> EventTime {
    match master_start {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::DateTimeUtc(_) => EventTime::DateTimeUtc(dt),
        EventTime::DateTimeFloating(_) => EventTime::DateTimeFloating(dt.naive_utc()),
        EventTime::DateTimeZoned { tzid, .. } => EventTime::DateTimeZoned {
            datetime: dt.naive_utc(),
            tzid: tzid.clone(),
        },
    }
}

/// Expand a recurring master event into instances overlapping `[range_start, range_end)`.
///
/// - `overridden` holds the UTC starts of occurrences replaced by another
///   VEVENT (same UID with a RECURRENCE-ID). Those are skipped here; the
///   override is matched against the window on its own.
/// - The master itself is not returned; only its expanded instances.
pub fn expand_recurring_event(
    master: &CalendarEvent,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    overridden: &HashSet<DateTime<Utc>>,
) -> WhosOutResult<Vec<CalendarEvent>> {
    let Some(recurrence) = &master.recurrence else {
        return Ok(Vec::new());
    };

    let rrule_str = build_rrule_string(&master.start, recurrence);
    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        WhosOutError::IcsParse(format!(
            "Failed to parse RRULE for event '{}': {}",
            master.uid, e
        ))
    })?;

    let duration = master.end.to_utc() - master.start.to_utc();

    // Occurrences that started before the window can still run into it.
    // Widen by a second on each side so bound inclusivity never matters.
    let tz: rrule::Tz = Utc.into();
    let after = (range_start - duration.max(Duration::zero()) - Duration::seconds(1))
        .with_timezone(&tz);
    let before = (range_end + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_OCCURRENCES);

    let mut events = Vec::new();
    for occ in &result.dates {
        let occ_start = occ.with_timezone(&Utc);

        if overridden.contains(&occ_start) {
            continue;
        }

        let instance = CalendarEvent {
            uid: master.uid.clone(),
            summary: master.summary.clone(),
            description: master.description.clone(),
            start: occurrence_to_event_time(occ_start, &master.start),
            end: occurrence_to_event_time(occ_start + duration, &master.start),
            cancelled: master.cancelled,
            recurrence: None,
            recurrence_id: Some(occurrence_to_event_time(occ_start, &master.start)),
        };
        if instance.overlaps(range_start, range_end) {
            events.push(instance);
        }
    }

    Ok(events)
}
