//! ICS feed parsing using the icalendar crate's parser.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{WhosOutError, WhosOutResult};
use crate::event::{CalendarEvent, EventTime, Recurrence};
use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

/// Parse a whole feed into its VEVENTs, in document order.
pub fn parse_calendar(content: &str) -> WhosOutResult<Vec<CalendarEvent>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let unfolded = unfold(content);
    if !unfolded
        .trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with("BEGIN:VCALENDAR")
    {
        return Err(WhosOutError::IcsParse(
            "feed does not start with BEGIN:VCALENDAR".to_string(),
        ));
    }
    let calendar = read_calendar(&unfolded).map_err(|e| WhosOutError::IcsParse(e.to_string()))?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);

    Ok(vevents.into_iter().filter_map(parse_vevent).collect())
}

fn collect_vevents<'a>(components: &'a [Component<'a>], out: &mut Vec<&'a Component<'a>>) {
    for component in components {
        match component.name.as_ref() {
            "VEVENT" => out.push(component),
            "VCALENDAR" => collect_vevents(&component.components, out),
            _ => {}
        }
    }
}

fn parse_vevent(vevent: &Component<'_>) -> Option<CalendarEvent> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let Some(start) = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time)
    else {
        tracing::debug!(uid = %uid, "skipping VEVENT without a usable DTSTART");
        return None;
    };
    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time)
        .unwrap_or_else(|| start.implied_end());

    // Text is kept raw: escape sequences such as `\n` survive untouched.
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_default();
    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let cancelled = vevent
        .find_prop("STATUS")
        .is_some_and(|p| p.val.as_ref() == "CANCELLED");

    let rrule = vevent.find_prop("RRULE").map(|p| p.val.to_string());
    let exdates = vevent
        .properties
        .iter()
        .filter(|p| p.name == "EXDATE")
        .flat_map(exdates_utc)
        .collect();
    let recurrence = rrule.map(|rrule| Recurrence { rrule, exdates });

    let recurrence_id = vevent
        .find_prop("RECURRENCE-ID")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_time);

    Some(CalendarEvent {
        uid,
        summary,
        description,
        start,
        end,
        cancelled,
        recurrence,
        recurrence_id,
    })
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    }
}

/// EXDATE values anchored in UTC the same way `EventTime::to_utc` anchors
/// event times: wall-clock fields kept, dates at midnight. TZID and VALUE
/// parameters therefore do not change the result.
fn exdates_utc(prop: &Property) -> Vec<DateTime<Utc>> {
    prop.val
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter_map(|value| {
            NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y%m%dT%H%M%S")
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(value, "%Y%m%d")
                        .ok()
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .map(|naive| naive.and_utc())
        })
        .collect()
}
