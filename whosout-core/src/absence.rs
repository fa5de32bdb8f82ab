//! Grouping of event text into absence categories.
//!
//! Feed events are authored as `"<person> - <category>"`. Events filed
//! under `"Other Events"` carry their real category as the first line of
//! the description, where lines are separated by the two-character escape
//! `\n` rather than a newline.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::event::EventRecord;

const SUMMARY_SEPARATOR: &str = " - ";
const OTHER_EVENTS: &str = "Other Events";
const ESCAPED_NEWLINE: &str = "\\n";

/// Category → people absent for it, in feed order. Duplicates are kept.
pub type DayResult = BTreeMap<String, Vec<String>>;

/// `YYYY-MM-DD` → that day's absences.
pub type TodayResult = BTreeMap<String, DayResult>;

/// Response body: `{"Calendar": {"<date>": {"<category>": ["<name>", ...]}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodayData {
    #[serde(rename = "Calendar")]
    pub calendar: TodayResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceEntry {
    pub category: String,
    pub person: String,
}

impl AbsenceEntry {
    pub fn from_event(event: &EventRecord) -> Self {
        // Separators are matched left to right without overlap; the last
        // segment is the category and everything before its separator is the name.
        let summary = event.summary.as_str();
        let category = summary.split(SUMMARY_SEPARATOR).last().unwrap_or(summary);
        let person = summary
            .len()
            .checked_sub(category.len() + SUMMARY_SEPARATOR.len())
            .map_or("", |end| &summary[..end]);

        let category = if category == OTHER_EVENTS {
            event
                .description
                .split_once(ESCAPED_NEWLINE)
                .map_or(event.description.as_str(), |(first, _)| first)
        } else {
            category
        };

        AbsenceEntry {
            category: category.to_string(),
            person: person.to_string(),
        }
    }
}

/// Group one day's events by category, preserving event order.
pub fn group_events<'a>(events: impl IntoIterator<Item = &'a EventRecord>) -> DayResult {
    let mut day = DayResult::new();
    for event in events {
        let entry = AbsenceEntry::from_event(event);
        day.entry(entry.category).or_default().push(entry.person);
    }
    day
}
