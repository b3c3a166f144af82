//! Weekly opening hours and the open/closed evaluation for one instant.
//!
//! Hours are stored the way the open-data provider reports them: a map from
//! `"{weekday}_{s|e}"` to a four-digit `HHMM` string. End times may run past
//! midnight (`"2600"` closes at 02:00 the following day).

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

/// Display text for a missing start or end time.
pub const NO_INFO: &str = "no info";

/// Literal that the overnight branch compares display end times against.
const MIDNIGHT_DISPLAY: &str = "24:00";

/// Which end of a daily opening window a value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Opening time (`_s`).
    Start,
    /// Closing time (`_e`).
    End,
}

impl Boundary {
    fn suffix(self) -> &'static str {
        match self {
            Self::Start => "s",
            Self::End => "e",
        }
    }
}

/// Day slot used as the key prefix in [`OperatingHours`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaySlot {
    /// A calendar weekday.
    Weekday(Weekday),
    /// Public holidays.
    Holiday,
}

impl DaySlot {
    /// Short key prefix (`mon` .. `sun`, `hol`).
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Weekday(weekday) => weekday_abbrev(weekday),
            Self::Holiday => "hol",
        }
    }
}

/// Lower-case three-letter abbreviation for `weekday`.
pub fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

/// Reformat a four-character `HHMM` string as `HH:MM`.
///
/// Anything that is not exactly four characters long is returned unchanged.
///
/// # Examples
/// ```
/// use pharmacy_locator::domain::format_hhmm;
///
/// assert_eq!(format_hhmm("1100"), "11:00");
/// assert_eq!(format_hhmm("900"), "900");
/// ```
pub fn format_hhmm(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    match chars.as_slice() {
        [h1, h2, m1, m2] => format!("{h1}{h2}:{m1}{m2}"),
        _ => raw.to_owned(),
    }
}

/// Weekly opening hours keyed by `"{day}_{s|e}"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatingHours(BTreeMap<String, String>);

impl OperatingHours {
    /// Create an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the storage key for one slot and boundary, e.g. `mon_s`.
    pub fn key(slot: DaySlot, boundary: Boundary) -> String {
        format!("{}_{}", slot.abbrev(), boundary.suffix())
    }

    /// Whether no hours have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded boundaries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Raw `HHMM` value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Record a raw `HHMM` value for one slot boundary.
    pub fn set(&mut self, slot: DaySlot, boundary: Boundary, hhmm: impl Into<String>) {
        self.0.insert(Self::key(slot, boundary), hhmm.into());
    }

    /// Iterate stored entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Display schedule for `weekday`.
    pub fn schedule_for(&self, weekday: Weekday) -> DailySchedule {
        let slot = DaySlot::Weekday(weekday);
        DailySchedule {
            start: self.get(&Self::key(slot, Boundary::Start)).map(format_hhmm),
            end: self.get(&Self::key(slot, Boundary::End)).map(format_hhmm),
        }
    }

    /// Whether the pharmacy is open at local wall-clock time `now`.
    ///
    /// Empty hours are never open.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, Weekday};
    /// use pharmacy_locator::domain::{Boundary, DaySlot, OperatingHours};
    ///
    /// let mut hours = OperatingHours::new();
    /// hours.set(DaySlot::Weekday(Weekday::Mon), Boundary::Start, "0900");
    /// hours.set(DaySlot::Weekday(Weekday::Mon), Boundary::End, "1800");
    ///
    /// // 2026-10-19 is a Monday.
    /// let noon = NaiveDate::from_ymd_opt(2026, 10, 19)
    ///     .and_then(|day| day.and_hms_opt(12, 0, 0))
    ///     .expect("valid time");
    /// assert!(hours.is_open_at(noon));
    /// ```
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        if self.is_empty() {
            return false;
        }
        self.schedule_for(now.weekday()).is_open_at(now)
    }
}

impl FromIterator<(String, String)> for OperatingHours {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One day's opening window in display form (`HH:MM`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    /// Opening time, if reported.
    pub start: Option<String>,
    /// Closing time, if reported. May exceed `24:00` for overnight hours.
    pub end: Option<String>,
}

impl DailySchedule {
    /// Opening time or [`NO_INFO`].
    pub fn start_display(&self) -> &str {
        self.start.as_deref().unwrap_or(NO_INFO)
    }

    /// Closing time or [`NO_INFO`].
    pub fn end_display(&self) -> &str {
        self.end.as_deref().unwrap_or(NO_INFO)
    }

    /// Whether the end time string sorts after `"24:00"`.
    ///
    /// This is a plain text comparison on the display value, so `"24:30"`
    /// counts as overnight while `"24:00"` does not.
    pub fn is_overnight(&self) -> bool {
        self.end
            .as_deref()
            .is_some_and(|end| end > MIDNIGHT_DISPLAY)
    }

    /// Opening and closing instants for the window that starts on `date`.
    ///
    /// End hours of 24 or more roll over onto the next calendar day. Returns
    /// `None` when either bound is missing or malformed.
    pub fn window_on(&self, date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (start_hour, start_minute) = parse_display_time(self.start.as_deref()?)?;
        let (end_hour, end_minute) = parse_display_time(self.end.as_deref()?)?;

        let start = date.and_time(NaiveTime::from_hms_opt(start_hour, start_minute, 0)?);
        let end = if end_hour >= 24 {
            let next_day = date.checked_add_signed(TimeDelta::days(1))?;
            next_day.and_time(NaiveTime::from_hms_opt(end_hour - 24, end_minute, 0)?)
        } else {
            date.and_time(NaiveTime::from_hms_opt(end_hour, end_minute, 0)?)
        };
        Some((start, end))
    }

    /// Whether `now` falls inside today's window.
    ///
    /// Overnight windows are open in the evening after opening or in the early
    /// morning before the rolled-over closing time.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        let Some((start, end)) = self.window_on(now.date()) else {
            return false;
        };
        if self.is_overnight() {
            now >= start || now.time() <= end.time()
        } else {
            start <= now && now <= end
        }
    }
}

fn parse_display_time(display: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = display.split_once(':')?;
    let hour = hours.parse::<u32>().ok()?;
    let minute = minutes.parse::<u32>().ok()?;
    Some((hour, minute))
}
