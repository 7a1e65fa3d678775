//! autoblock-types: Shared data model for the schedule compiler and its
//! collaborators.
//!
//! The week is a circular timeline of 10080 minutes starting at Monday 00:00;
//! everything that crosses a crate boundary speaks in these terms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;
/// Minutes in one week; offsets on the week timeline live in `[0, 10080)`.
pub const MINUTES_PER_WEEK: u32 = 7 * MINUTES_PER_DAY;

/// Day of the week, numbered the way launchd and the config file agree on:
/// Monday = 1 through Sunday = 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    /// All days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Minutes between Monday 00:00 and this day's midnight.
    pub fn minute_offset(self) -> u32 {
        (self as u32 - 1) * MINUTES_PER_DAY
    }

    /// The day containing the given minute of the week.
    pub fn from_minute_of_week(offset: u32) -> Self {
        Self::ALL[((offset % MINUTES_PER_WEEK) / MINUTES_PER_DAY) as usize]
    }
}

impl TryFrom<u8> for Weekday {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=7 => Ok(Self::ALL[(value - 1) as usize]),
            other => Err(format!(
                "weekday must be 1 (Monday) through 7 (Sunday), got {other}"
            )),
        }
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day as u8
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        };
        f.write_str(name)
    }
}

/// One user-authored weekly block window, as it appears in the config file.
///
/// Hours and minutes are carried as plain integers and validated by the
/// schedule compiler, so a bad value is reported with the offending entry
/// instead of as an opaque parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BlockSchedule {
    /// Day the window starts on. `None` applies the window to every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
    /// Invert the block into an allow-only list for this window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_as_whitelist: Option<bool>,
    /// Hosts to block during this window, overriding the global list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_blacklist: Option<Vec<String>>,
}

impl BlockSchedule {
    /// Plain window with no per-window blacklist overrides.
    pub fn new(weekday: Option<Weekday>, start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            weekday,
            start_hour: start.0,
            start_minute: start.1,
            end_hour: end.0,
            end_minute: end.1,
            block_as_whitelist: None,
            host_blacklist: None,
        }
    }
}

/// What the fired command should do at a trigger instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TriggerAction {
    /// A block window opens here. SelfControl is started with this duration
    /// so it self-terminates even if the stop trigger is missed.
    Start { duration_minutes: u32 },
    /// A block window closes here. Informational: the fired command finds no
    /// active window and exits without touching SelfControl.
    Stop,
}

/// An absolute calendar instant the OS scheduler fires on.
///
/// launchd's `StartCalendarInterval` matches exact day/hour/minute tuples
/// only, so every window edge gets its own record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerInstant {
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
    #[serde(flatten)]
    pub action: TriggerAction,
}

impl TriggerInstant {
    /// Instant at the given minute of the week (folded into one week).
    pub fn at(offset: u32, action: TriggerAction) -> Self {
        let offset = offset % MINUTES_PER_WEEK;
        let in_day = offset % MINUTES_PER_DAY;
        Self {
            weekday: Weekday::from_minute_of_week(offset),
            hour: in_day / 60,
            minute: in_day % 60,
            action,
        }
    }

    /// Minutes since Monday 00:00.
    pub fn minute_of_week(&self) -> u32 {
        self.weekday.minute_offset() + self.hour * 60 + self.minute
    }
}

impl fmt::Display for TriggerInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.weekday, self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_numbering() {
        assert_eq!(u8::from(Weekday::Monday), 1);
        assert_eq!(u8::from(Weekday::Sunday), 7);
        assert_eq!(Weekday::try_from(3), Ok(Weekday::Wednesday));
        assert!(Weekday::try_from(0).is_err());
        assert!(Weekday::try_from(8).is_err());
    }

    #[test]
    fn test_weekday_serde_as_integer() {
        let json = serde_json::to_string(&Weekday::Friday).unwrap();
        assert_eq!(json, "5");
        let day: Weekday = serde_json::from_str("7").unwrap();
        assert_eq!(day, Weekday::Sunday);
        assert!(serde_json::from_str::<Weekday>("9").is_err());
    }

    #[test]
    fn test_weekday_minute_offsets() {
        assert_eq!(Weekday::Monday.minute_offset(), 0);
        assert_eq!(Weekday::Sunday.minute_offset(), 6 * MINUTES_PER_DAY);
        assert_eq!(Weekday::from_minute_of_week(0), Weekday::Monday);
        assert_eq!(Weekday::from_minute_of_week(MINUTES_PER_WEEK - 1), Weekday::Sunday);
        assert_eq!(Weekday::from_minute_of_week(MINUTES_PER_WEEK), Weekday::Monday);
    }

    #[test]
    fn test_block_schedule_config_format() {
        // Kebab-case keys as authored in config.json.
        let raw = r#"{
            "weekday": 1,
            "start-hour": 9,
            "start-minute": 0,
            "end-hour": 17,
            "end-minute": 30
        }"#;
        let entry: BlockSchedule = json5::from_str(raw).unwrap();
        assert_eq!(entry.weekday, Some(Weekday::Monday));
        assert_eq!(entry.start_hour, 9);
        assert_eq!(entry.end_minute, 30);
        assert_eq!(entry.block_as_whitelist, None);
        assert_eq!(entry.host_blacklist, None);
    }

    #[test]
    fn test_block_schedule_without_weekday() {
        let raw = r#"{"start-hour": 22, "start-minute": 0, "end-hour": 6, "end-minute": 0}"#;
        let entry: BlockSchedule = json5::from_str(raw).unwrap();
        assert_eq!(entry.weekday, None);
    }

    #[test]
    fn test_trigger_instant_from_offset() {
        let t = TriggerInstant::at(0, TriggerAction::Stop);
        assert_eq!((t.weekday, t.hour, t.minute), (Weekday::Monday, 0, 0));

        // Sunday 23:00
        let offset = Weekday::Sunday.minute_offset() + 23 * 60;
        let t = TriggerInstant::at(offset, TriggerAction::Start { duration_minutes: 360 });
        assert_eq!((t.weekday, t.hour, t.minute), (Weekday::Sunday, 23, 0));
        assert_eq!(t.minute_of_week(), offset);

        // One past the week boundary folds back to Monday.
        let t = TriggerInstant::at(MINUTES_PER_WEEK + 5 * 60, TriggerAction::Stop);
        assert_eq!((t.weekday, t.hour, t.minute), (Weekday::Monday, 5, 0));
    }

    #[test]
    fn test_trigger_action_serde_tag() {
        let start = TriggerInstant::at(540, TriggerAction::Start { duration_minutes: 510 });
        let json = serde_json::to_string(&start).unwrap();
        assert!(json.contains("\"action\":\"start\""));
        assert!(json.contains("\"duration_minutes\":510"));

        let stop = TriggerInstant::at(540, TriggerAction::Stop);
        let json = serde_json::to_string(&stop).unwrap();
        assert!(json.contains("\"action\":\"stop\""));
        let parsed: TriggerInstant = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, stop);
    }
}
