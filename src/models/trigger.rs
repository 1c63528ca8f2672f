use chrono::{Datelike, NaiveDateTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// RepeatFrequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatFrequency {
    None,
    Daily,
    Weekly,
}

impl RepeatFrequency {
    /// Interval the platform waits between firings, if the trigger repeats.
    pub fn period(&self) -> Option<TimeDelta> {
        match self {
            Self::None => None,
            Self::Daily => Some(TimeDelta::days(1)),
            Self::Weekly => Some(TimeDelta::weeks(1)),
        }
    }
}

impl FromStr for RepeatFrequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(anyhow::anyhow!("unknown repeat frequency: {other}")),
        }
    }
}

impl fmt::Display for RepeatFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
        }
    }
}

// ---------------------------------------------------------------------------
// TriggerHandle
// ---------------------------------------------------------------------------

/// Identifies one platform registration made on behalf of a routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerHandle {
    pub routine_id: String,
    pub reminder_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<Weekday>,
}

impl TriggerHandle {
    pub fn daily(routine_id: &str, reminder_index: usize) -> Self {
        Self {
            routine_id: routine_id.to_string(),
            reminder_index,
            weekday: None,
        }
    }

    pub fn weekly(routine_id: &str, reminder_index: usize, weekday: Weekday) -> Self {
        Self {
            routine_id: routine_id.to_string(),
            reminder_index,
            weekday: Some(weekday),
        }
    }

    /// Platform-level id: `{routine}-{index}` or `{routine}-{index}-day{d}` with
    /// `d` counted from Sunday = 0.
    pub fn id(&self) -> String {
        match self.weekday {
            None => format!("{}-{}", self.routine_id, self.reminder_index),
            Some(d) => format!(
                "{}-{}-day{}",
                self.routine_id,
                self.reminder_index,
                d.num_days_from_sunday()
            ),
        }
    }
}

impl fmt::Display for TriggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ---------------------------------------------------------------------------
// TriggerSpec
// ---------------------------------------------------------------------------

/// A concrete scheduling instruction: first local fire time plus repetition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub handle: TriggerHandle,
    pub fire_at: NaiveDateTime,
    pub repeat: RepeatFrequency,
}

impl TriggerSpec {
    pub fn id(&self) -> String {
        self.handle.id()
    }

    pub fn weekday(&self) -> Weekday {
        self.fire_at.weekday()
    }
}

// ---------------------------------------------------------------------------
// Platform payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Default,
    High,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Importance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "high" => Ok(Self::High),
            other => Err(anyhow::anyhow!("unknown importance: {other}")),
        }
    }
}

/// A notification channel the platform groups reminders under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub importance: Importance,
    pub sound: bool,
    pub vibration: bool,
}

/// A registered platform trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub channel_id: String,
    /// First fire instant, epoch milliseconds.
    pub timestamp_ms: i64,
    pub repeat: RepeatFrequency,
}

/// A notification shown immediately, without a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The platform does not gate notifications behind a runtime permission.
    NotRequired,
}

impl PermissionStatus {
    pub fn allows_display(&self) -> bool {
        !matches!(self, Self::Denied)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_handle_id() {
        assert_eq!(TriggerHandle::daily("r1", 0).id(), "r1-0");
        assert_eq!(TriggerHandle::daily("r1", 9).id(), "r1-9");
    }

    #[test]
    fn weekly_handle_id_counts_from_sunday() {
        assert_eq!(TriggerHandle::weekly("r1", 0, Weekday::Sun).id(), "r1-0-day0");
        assert_eq!(TriggerHandle::weekly("r1", 1, Weekday::Mon).id(), "r1-1-day1");
        assert_eq!(TriggerHandle::weekly("r1", 2, Weekday::Sat).id(), "r1-2-day6");
    }

    #[test]
    fn repeat_frequency_parse_and_display() {
        for f in [RepeatFrequency::None, RepeatFrequency::Daily, RepeatFrequency::Weekly] {
            assert_eq!(f.to_string().parse::<RepeatFrequency>().unwrap(), f);
        }
        assert!("hourly".parse::<RepeatFrequency>().is_err());
    }

    #[test]
    fn repeat_period() {
        assert_eq!(RepeatFrequency::None.period(), None);
        assert_eq!(RepeatFrequency::Daily.period(), Some(TimeDelta::hours(24)));
        assert_eq!(RepeatFrequency::Weekly.period(), Some(TimeDelta::days(7)));
    }

    #[test]
    fn permission_display_gate() {
        assert!(PermissionStatus::Granted.allows_display());
        assert!(PermissionStatus::NotRequired.allows_display());
        assert!(!PermissionStatus::Denied.allows_display());
    }
}
