use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::ScheduleError;

/// Upper bound on reminder times per routine, as offered by the routine editor.
pub const MAX_REMINDER_TIMES: usize = 10;

static TIME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").ok());

// ---------------------------------------------------------------------------
// ReminderTime
// ---------------------------------------------------------------------------

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime {
    hour: u32,
    minute: u32,
}

impl ReminderTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        // hour/minute are range-checked at construction
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for ReminderTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTime(s.to_string());
        let re = TIME_RE.as_ref().ok_or_else(invalid)?;
        let caps = re.captures(s.trim()).ok_or_else(invalid)?;
        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse a comma-separated list such as `"08:00,13:00"`.
pub fn parse_times(input: &str) -> Result<Vec<ReminderTime>, ScheduleError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

// ---------------------------------------------------------------------------
// WeekdayMask
// ---------------------------------------------------------------------------

/// Days of the week on which a routine is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekdayMask {
    pub mon: bool,
    pub tue: bool,
    pub wed: bool,
    pub thu: bool,
    pub fri: bool,
    pub sat: bool,
    pub sun: bool,
}

/// Platform weekday order: Sunday is day 0.
const PLATFORM_ORDER: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

impl WeekdayMask {
    pub fn all() -> Self {
        Self {
            mon: true,
            tue: true,
            wed: true,
            thu: true,
            fri: true,
            sat: true,
            sun: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn weekdays() -> Self {
        Self {
            sat: false,
            sun: false,
            ..Self::all()
        }
    }

    pub fn weekends() -> Self {
        Self {
            sat: true,
            sun: true,
            ..Self::none()
        }
    }

    pub fn of(days: &[Weekday]) -> Self {
        let mut mask = Self::none();
        for &d in days {
            mask.set(d, true);
        }
        mask
    }

    pub fn contains(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.mon,
            Weekday::Tue => self.tue,
            Weekday::Wed => self.wed,
            Weekday::Thu => self.thu,
            Weekday::Fri => self.fri,
            Weekday::Sat => self.sat,
            Weekday::Sun => self.sun,
        }
    }

    pub fn set(&mut self, day: Weekday, on: bool) {
        let slot = match day {
            Weekday::Mon => &mut self.mon,
            Weekday::Tue => &mut self.tue,
            Weekday::Wed => &mut self.wed,
            Weekday::Thu => &mut self.thu,
            Weekday::Fri => &mut self.fri,
            Weekday::Sat => &mut self.sat,
            Weekday::Sun => &mut self.sun,
        };
        *slot = on;
    }

    /// Selected days, Sunday first.
    pub fn days(&self) -> Vec<Weekday> {
        PLATFORM_ORDER
            .iter()
            .copied()
            .filter(|d| self.contains(*d))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.days().len()
    }

    pub fn is_daily(&self) -> bool {
        self.count() == 7
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

impl FromStr for WeekdayMask {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "daily" | "all" | "everyday" => return Ok(Self::all()),
            "weekdays" => return Ok(Self::weekdays()),
            "weekends" => return Ok(Self::weekends()),
            "none" | "" => return Ok(Self::none()),
            _ => {}
        }
        let mut mask = Self::none();
        for part in normalized.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day =
                parse_weekday(part).ok_or_else(|| ScheduleError::InvalidWeekday(part.to_string()))?;
            mask.set(day, true);
        }
        Ok(mask)
    }
}

impl fmt::Display for WeekdayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_daily() {
            return write!(f, "daily");
        }
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .iter()
        .filter(|d| self.contains(**d))
        .map(|d| d.to_string().to_lowercase())
        .collect();
        write!(f, "{}", names.join(","))
    }
}

// ---------------------------------------------------------------------------
// RoutineWindow
// ---------------------------------------------------------------------------

/// Inclusive date range of a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RoutineWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScheduleError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.end < self.start {
            return Err(ScheduleError::EndBeforeStart {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end < today
    }
}

// ---------------------------------------------------------------------------
// Routine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub times: Vec<ReminderTime>,
    pub days: WeekdayMask,
    pub window: RoutineWindow,
    pub created_at: DateTime<Utc>,
}

impl Routine {
    pub fn new(
        name: impl Into<String>,
        times: Vec<ReminderTime>,
        days: WeekdayMask,
        window: RoutineWindow,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            times,
            days,
            window,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Checks the invariants the routine editor enforces before scheduling.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.times.is_empty() {
            return Err(ScheduleError::NoReminderTimes);
        }
        if self.times.len() > MAX_REMINDER_TIMES {
            return Err(ScheduleError::TooManyReminderTimes(self.times.len()));
        }
        self.window.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- ReminderTime --------------------------------------------------------

    #[test]
    fn reminder_time_parses_24h() {
        let t: ReminderTime = "08:05".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (8, 5));
        let t: ReminderTime = "23:59".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (23, 59));
    }

    #[test]
    fn reminder_time_accepts_single_digit_hour() {
        let t: ReminderTime = "9:30".parse().unwrap();
        assert_eq!(t.to_string(), "09:30");
    }

    #[test]
    fn reminder_time_rejects_out_of_range() {
        assert!("24:00".parse::<ReminderTime>().is_err());
        assert!("12:60".parse::<ReminderTime>().is_err());
        assert!("noon".parse::<ReminderTime>().is_err());
        assert!("12:5".parse::<ReminderTime>().is_err());
    }

    #[test]
    fn reminder_time_serializes_as_string() {
        let t = ReminderTime::new(13, 0).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"13:00\"");
        let back: ReminderTime = serde_json::from_str("\"13:00\"").unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn parse_times_list() {
        let times = parse_times("08:00, 13:00,18:30").unwrap();
        assert_eq!(times.len(), 3);
        assert_eq!(times[2].to_string(), "18:30");
        assert_eq!(
            parse_times("08:00,25:00").unwrap_err(),
            ScheduleError::InvalidTime("25:00".to_string())
        );
    }

    // -- WeekdayMask ---------------------------------------------------------

    #[test]
    fn mask_days_are_sunday_first() {
        let mask = WeekdayMask::of(&[Weekday::Sat, Weekday::Mon, Weekday::Sun]);
        assert_eq!(mask.days(), vec![Weekday::Sun, Weekday::Mon, Weekday::Sat]);
    }

    #[test]
    fn mask_shorthands() {
        assert!("daily".parse::<WeekdayMask>().unwrap().is_daily());
        assert_eq!("weekdays".parse::<WeekdayMask>().unwrap().count(), 5);
        assert_eq!(
            "weekends".parse::<WeekdayMask>().unwrap().days(),
            vec![Weekday::Sun, Weekday::Sat]
        );
        assert!("none".parse::<WeekdayMask>().unwrap().is_empty());
    }

    #[test]
    fn mask_parses_list_and_rejects_unknown() {
        let mask: WeekdayMask = "Mon,wed, fri".parse().unwrap();
        assert_eq!(mask.to_string(), "mon,wed,fri");
        assert_eq!(
            "mon,funday".parse::<WeekdayMask>().unwrap_err(),
            ScheduleError::InvalidWeekday("funday".to_string())
        );
    }

    #[test]
    fn mask_serde_uses_three_letter_keys() {
        let json = serde_json::to_value(WeekdayMask::weekends()).unwrap();
        assert_eq!(json["sat"], true);
        assert_eq!(json["mon"], false);
    }

    // -- RoutineWindow / Routine ---------------------------------------------

    #[test]
    fn window_rejects_end_before_start() {
        let err = RoutineWindow::new(date(2025, 1, 10), date(2025, 1, 9)).unwrap_err();
        assert!(matches!(err, ScheduleError::EndBeforeStart { .. }));
        assert!(RoutineWindow::new(date(2025, 1, 10), date(2025, 1, 10)).is_ok());
    }

    #[test]
    fn routine_validate_bounds_time_count() {
        let window = RoutineWindow::new(date(2025, 1, 1), date(2025, 2, 1)).unwrap();
        let empty = Routine::new("vitamin d", vec![], WeekdayMask::all(), window);
        assert_eq!(empty.validate(), Err(ScheduleError::NoReminderTimes));

        let eleven = (0..11).map(|h| ReminderTime::new(h, 0).unwrap()).collect();
        let many = Routine::new("vitamin d", eleven, WeekdayMask::all(), window);
        assert_eq!(many.validate(), Err(ScheduleError::TooManyReminderTimes(11)));

        let ten = (0..10).map(|h| ReminderTime::new(h, 0).unwrap()).collect();
        assert!(Routine::new("vitamin d", ten, WeekdayMask::all(), window)
            .validate()
            .is_ok());
    }
}
