use chrono::NaiveDate;
use thiserror::Error;

use crate::models::routine::MAX_REMINDER_TIMES;

/// Rejections raised before anything reaches the notification platform.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("a routine needs at least one reminder time")]
    NoReminderTimes,

    #[error("a routine accepts at most {max} reminder times, got {0}", max = MAX_REMINDER_TIMES)]
    TooManyReminderTimes(usize),

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("date {0} is too late to schedule")]
    DateOutOfRange(NaiveDate),

    #[error("invalid reminder time '{0}' (expected HH:MM, 24-hour)")]
    InvalidTime(String),

    #[error("invalid weekday '{0}' (expected mon,tue,wed,thu,fri,sat,sun, daily, weekdays, weekends or none)")]
    InvalidWeekday(String),

    #[error("routine '{0}' is already scheduled")]
    AlreadyScheduled(String),

    #[error("routine '{routine_id}' still has {failed} trigger(s) that could not be cancelled")]
    ReplaceIncomplete { routine_id: String, failed: usize },

    #[error("routine '{0}' not found")]
    UnknownRoutine(String),
}
