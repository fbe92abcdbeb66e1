//! Day, week, month and year notes.
//!
//! Calendar notes live in a fixed tree under the calendar root: one note per
//! year, one per month below it, one per day below that. Each level is found
//! through a label (`calendarRoot`, `yearNote`, `monthNote`, `dateNote`) and
//! created on first use.

use serde_json::Value;
use time::{Date, Duration, Month, OffsetDateTime};

use super::graph::{NewNote, NoteGraph, ROOT_NOTE_ID};

const CALENDAR_ROOT_LABEL: &str = "calendarRoot";
const YEAR_LABEL: &str = "yearNote";
const MONTH_LABEL: &str = "monthNote";
const DATE_LABEL: &str = "dateNote";
const CALENDAR_TITLE: &str = "Calendar";

/// First day of a calendar week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// Reads `startOfTheWeek` from a week-note options object.
    pub(crate) fn from_options(options: Option<&Value>) -> Result<Self, String> {
        match options.and_then(|options| options.get("startOfTheWeek")) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(day)) if day == "monday" => Ok(Self::Monday),
            Some(Value::String(day)) if day == "sunday" => Ok(Self::Sunday),
            Some(other) => Err(format!(
                "startOfTheWeek must be \"monday\" or \"sunday\", got {other}"
            )),
        }
    }

    fn days_into_week(self, date: Date) -> u8 {
        match self {
            Self::Monday => date.weekday().number_days_from_monday(),
            Self::Sunday => date.weekday().number_days_from_sunday(),
        }
    }
}

/// Parses a `YYYY-MM-DD` date.
pub(crate) fn parse_date(text: &str) -> Result<Date, String> {
    let invalid = || format!("'{text}' is not a YYYY-MM-DD date");
    let mut parts = text.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let month = parse_month_number(month).ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let day = day.parse::<u8>().map_err(|_| invalid())?;
    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

/// Parses a `YYYY-MM` month, ignoring any trailing day.
pub(crate) fn parse_month(text: &str) -> Result<(i32, Month), String> {
    let invalid = || format!("'{text}' is not a YYYY-MM month");
    let mut parts = text.splitn(3, '-');
    let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = parse_month_number(month).ok_or_else(invalid)?;
    Ok((year, month))
}

/// Reads a year given as a number or as text starting with `YYYY`.
pub(crate) fn parse_year(value: &Value) -> Result<i32, String> {
    let invalid = || format!("{value} is not a year");
    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .ok_or_else(invalid),
        Value::String(text) => text
            .split('-')
            .next()
            .and_then(|year| year.parse::<i32>().ok())
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn parse_month_number(text: &str) -> Option<Month> {
    text.parse::<u8>()
        .ok()
        .and_then(|number| Month::try_from(number).ok())
}

/// Today's date in UTC.
pub(crate) fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// The date that opens the week containing `date`.
pub(crate) fn week_start(date: Date, start: WeekStart) -> Date {
    date - Duration::days(i64::from(start.days_into_week(date)))
}

/// The calendar root, created under the root note when missing.
pub(crate) fn root_note(graph: &mut NoteGraph) -> Result<String, String> {
    find_or_create(graph, ROOT_NOTE_ID, CALENDAR_ROOT_LABEL, "", CALENDAR_TITLE)
}

pub(crate) fn year_note(graph: &mut NoteGraph, year: i32) -> Result<String, String> {
    let parent = root_note(graph)?;
    let key = format!("{year:04}");
    find_or_create(graph, &parent, YEAR_LABEL, &key, &key)
}

pub(crate) fn month_note(graph: &mut NoteGraph, year: i32, month: Month) -> Result<String, String> {
    let parent = year_note(graph, year)?;
    let number = u8::from(month);
    let key = format!("{year:04}-{number:02}");
    let title = format!("{number:02} - {month}");
    find_or_create(graph, &parent, MONTH_LABEL, &key, &title)
}

pub(crate) fn date_note(graph: &mut NoteGraph, date: Date) -> Result<String, String> {
    let parent = month_note(graph, date.year(), date.month())?;
    let key = format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    );
    let title = format!("{:02} - {}", date.day(), date.weekday());
    find_or_create(graph, &parent, DATE_LABEL, &key, &title)
}

fn find_or_create(
    graph: &mut NoteGraph,
    parent_note_id: &str,
    label: &str,
    value: &str,
    title: &str,
) -> Result<String, String> {
    let wanted = (!value.is_empty()).then_some(value);
    let existing = graph
        .notes_with_label(label, wanted)
        .first()
        .map(|note| note.note_id.clone());
    if let Some(note_id) = existing {
        return Ok(note_id);
    }
    let (note_id, _) = graph.insert_note(NewNote::text(parent_note_id, title))?;
    graph.add_attribute(&note_id, "label", label, value, false, None)?;
    Ok(note_id)
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::host::memory::graph::HostSnapshot;

    fn date(year: i32, month: Month, day: u8) -> Date {
        Date::from_calendar_date(year, month, day).expect("valid date")
    }

    #[fixture]
    fn graph() -> NoteGraph {
        NoteGraph::from_snapshot(HostSnapshot::with_root())
    }

    #[rstest]
    fn day_notes_nest_under_month_and_year(mut graph: NoteGraph) {
        let day = date_note(&mut graph, date(2024, Month::March, 5)).expect("day note");
        assert_eq!(graph.note(&day).map(|note| note.title.as_str()), Some("05 - Tuesday"));

        let month = graph.parent_note_ids(&day);
        assert_eq!(
            month
                .first()
                .and_then(|id| graph.note(id))
                .map(|note| note.title.as_str()),
            Some("03 - March")
        );
        let year = graph.parent_note_ids(&month[0]);
        assert_eq!(
            year.first()
                .and_then(|id| graph.note(id))
                .map(|note| note.title.as_str()),
            Some("2024")
        );
        let calendar = graph.parent_note_ids(&year[0]);
        assert_eq!(graph.parent_note_ids(&calendar[0]), vec![ROOT_NOTE_ID.to_owned()]);
    }

    #[rstest]
    fn calendar_notes_are_reused(mut graph: NoteGraph) {
        let first = date_note(&mut graph, date(2024, Month::March, 5)).expect("first");
        let second = date_note(&mut graph, date(2024, Month::March, 5)).expect("second");
        assert_eq!(first, second);
        let sibling = date_note(&mut graph, date(2024, Month::March, 6)).expect("sibling");
        assert_eq!(graph.parent_note_ids(&first), graph.parent_note_ids(&sibling));
        assert_eq!(graph.notes_with_label(CALENDAR_ROOT_LABEL, None).len(), 1);
    }

    #[rstest]
    #[case::monday_start(WeekStart::Monday, date(2024, Month::March, 4))]
    #[case::sunday_start(WeekStart::Sunday, date(2024, Month::March, 3))]
    fn weeks_open_on_the_configured_day(#[case] start: WeekStart, #[case] expected: Date) {
        assert_eq!(week_start(date(2024, Month::March, 7), start), expected);
    }

    #[rstest]
    #[case::absent(None, WeekStart::Monday)]
    #[case::sunday(Some(json!({"startOfTheWeek": "sunday"})), WeekStart::Sunday)]
    #[case::other_keys(Some(json!({"locale": "en"})), WeekStart::Monday)]
    fn reads_week_start_options(#[case] options: Option<Value>, #[case] expected: WeekStart) {
        assert_eq!(WeekStart::from_options(options.as_ref()), Ok(expected));
    }

    #[test]
    fn rejects_unknown_week_starts() {
        let options = json!({"startOfTheWeek": "friday"});
        assert!(WeekStart::from_options(Some(&options)).is_err());
    }

    #[rstest]
    #[case::valid("2024-02-29", true)]
    #[case::not_leap("2023-02-29", false)]
    #[case::month_only("2024-02", false)]
    #[case::garbage("yesterday", false)]
    fn parses_iso_dates(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(parse_date(text).is_ok(), valid);
    }

    #[rstest]
    #[case::month("2024-07", Ok((2024, Month::July)))]
    #[case::full_date("2024-07-19", Ok((2024, Month::July)))]
    fn parses_months(#[case] text: &str, #[case] expected: Result<(i32, Month), String>) {
        assert_eq!(parse_month(text), expected);
    }

    #[rstest]
    #[case::number(json!(2024), Some(2024))]
    #[case::text(json!("2024"), Some(2024))]
    #[case::date_text(json!("2024-05-01"), Some(2024))]
    #[case::boolean(json!(true), None)]
    fn parses_years(#[case] value: Value, #[case] expected: Option<i32>) {
        assert_eq!(parse_year(&value).ok(), expected);
    }
}
