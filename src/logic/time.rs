// Time-related operations.
use serde::{Deserialize, Serialize};
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, Weekday};
use time_tz::{timezones, OffsetDateTimeExt, PrimitiveDateTimeExt, Tz};

use crate::logic::error::{EngineError, EngineResult};

// Use these formats for formatting and parsing dates and times of day.
static ISO_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
static HM_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");

// JSON serialisation and deserialisation for ISO dates.
pub mod iso_date_format {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::ISO_FORMAT;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        let s = date.format(&ISO_FORMAT).map_err(S::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        super::string_to_date(&s).map_err(D::Error::custom)
    }
}

// Same as above, for optional dates.
pub mod option_iso_date_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        match date {
            Some(d) => super::iso_date_format::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where D: Deserializer<'de> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::iso_date_format")] Date);

        let wrapper: Option<Wrapper> = Option::deserialize(deserializer)?;
        Ok(wrapper.map(|Wrapper(d)| d))
    }
}

// A time of day a match can start at. Serialised as "HH:MM".
#[derive(Debug, Clone, Copy)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(pub Time);

impl TimeOfDay {
    pub fn build(hour: u8, minute: u8) -> EngineResult<Self> {
        match Time::from_hms(hour, minute, 0) {
            Ok(t) => Ok(Self(t)),
            Err(e) => Err(EngineError::Validation(format!("invalid time of day {hour}:{minute}: {e}")))
        }
    }

    pub fn parse(s: &str) -> EngineResult<Self> {
        match Time::parse(s, HM_FORMAT) {
            Ok(t) => Ok(Self(t)),
            Err(e) => Err(EngineError::Validation(format!("invalid time of day '{s}': {e}")))
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0>2}:{:0>2}", self.0.hour(), self.0.minute())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

// Look up an IANA timezone by name.
pub fn resolve_timezone(name: &str) -> EngineResult<&'static Tz> {
    match timezones::get_by_name(name) {
        Some(tz) => Ok(tz),
        None => Err(EngineError::UnknownTimezone(name.to_string()))
    }
}

// Get the calendar date of an instant as seen in the given timezone.
pub fn local_date(now: OffsetDateTime, tz: &Tz) -> Date {
    now.to_timezone(tz).date()
}

// Matches are only played from Monday to Thursday.
pub fn is_match_day(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Monday | Weekday::Tuesday | Weekday::Wednesday | Weekday::Thursday)
}

// Get the first Monday strictly after the given date.
// A Sunday gives the next day, a Monday gives the Monday a week later.
pub fn next_monday_after(date: Date) -> EngineResult<Date> {
    let days_from_monday = date.weekday().number_days_from_monday() as i64;
    let days = 7 - days_from_monday;

    return add_days(date, days);
}

// Get the day the schedule begins on.
// An explicit Monday is kept as is, anything else moves forward to the next Monday.
pub fn resolve_start_date(explicit: Option<Date>, today: Date) -> EngineResult<Date> {
    match explicit {
        Some(date) if date.weekday() == Weekday::Monday => Ok(date),
        Some(date) => next_monday_after(date),
        None => next_monday_after(today),
    }
}

// Add days to a date without panicking at the end of the calendar.
pub fn add_days(date: Date, days: i64) -> EngineResult<Date> {
    match date.checked_add(Duration::days(days)) {
        Some(d) => Ok(d),
        None => Err(EngineError::Validation(format!("date out of range: {} + {days} days", date_to_string(date))))
    }
}

// Convert a local date and time of day into an absolute instant.
// Times skipped by a daylight saving jump are moved forward by an hour.
// Ambiguous times take the earlier instant.
pub fn to_instant(date: Date, time_of_day: TimeOfDay, tz: &Tz) -> EngineResult<OffsetDateTime> {
    let local = PrimitiveDateTime::new(date, time_of_day.0);
    if let Some(instant) = local.assume_timezone(tz).take_first() {
        return Ok(instant);
    }

    let shifted = local.checked_add(Duration::hours(1));
    match shifted.and_then(|dt| dt.assume_timezone(tz).take_first()) {
        Some(instant) => Ok(instant),
        None => Err(EngineError::Validation(format!("{} {} does not exist in the configured timezone", date_to_string(date), time_of_day)))
    }
}

// Convert a Date object to an ISO string.
pub fn date_to_string(date: Date) -> String {
    date.format(&ISO_FORMAT).unwrap_or_else(|_| date.to_string())
}

// Convert an ISO string to a Date object.
pub fn string_to_date(date: &str) -> EngineResult<Date> {
    match Date::parse(date, ISO_FORMAT) {
        Ok(d) => Ok(d),
        Err(e) => Err(EngineError::Validation(format!("invalid date '{date}': {e}")))
    }
}
