//! Expansion of a routine's recurrence rule into platform triggers.
//!
//! A routine active on every weekday needs one DAILY trigger per reminder
//! time. Any other selection needs one WEEKLY trigger per (reminder time,
//! selected weekday) pair, each first firing on the next occurrence of that
//! weekday.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Weekday};
use thiserror::Error;

use crate::models::routine::{ReminderTime, Routine, WeekdayMask};
use crate::models::trigger::{RepeatFrequency, TriggerHandle, TriggerSpec};

#[derive(Debug, Error, PartialEq)]
pub enum RecurrenceError {
    #[error("cannot expand a recurrence without reminder times")]
    EmptyReminderTimes,

    #[error("start date {0} is too late to schedule")]
    OutOfRange(NaiveDate),
}

/// Whether a routine's end date bounds its triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndDatePolicy {
    /// End date is informational; triggers repeat indefinitely.
    #[default]
    Ignore,
    /// Triggers whose first firing falls after the end date are dropped.
    Enforce,
}

impl EndDatePolicy {
    pub fn from_flag(enforce: bool) -> Self {
        if enforce { Self::Enforce } else { Self::Ignore }
    }
}

/// First fire instant for a reminder time: the start date at that time, or
/// one day later if that is already in the past.
pub fn first_candidate(
    start: NaiveDate,
    time: ReminderTime,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, RecurrenceError> {
    let candidate = start.and_time(time.as_naive_time());
    if candidate >= now {
        return Ok(candidate);
    }
    candidate
        .checked_add_signed(TimeDelta::days(1))
        .ok_or(RecurrenceError::OutOfRange(start))
}

/// Days to move forward from `from` to land on `day`, in `0..=6`.
pub fn days_until(from: Weekday, day: Weekday) -> u32 {
    let offset = (7 + day.num_days_from_monday() - from.num_days_from_monday()) % 7;
    debug_assert!(offset < 7);
    offset
}

/// The earliest instant at or after `from` that falls on `day`, keeping the
/// time of day.
pub fn advance_to_weekday(
    from: NaiveDateTime,
    day: Weekday,
) -> Result<NaiveDateTime, RecurrenceError> {
    let offset = TimeDelta::days(i64::from(days_until(from.weekday(), day)));
    from.checked_add_signed(offset)
        .ok_or(RecurrenceError::OutOfRange(from.date()))
}

/// Expand reminder times × weekday selection into trigger descriptors.
///
/// Output is grouped by reminder index; within a reminder, weekly triggers
/// follow Sunday-first order. An empty mask yields no triggers.
pub fn expand(
    routine_id: &str,
    times: &[ReminderTime],
    days: WeekdayMask,
    start: NaiveDate,
    now: NaiveDateTime,
) -> Result<Vec<TriggerSpec>, RecurrenceError> {
    if times.is_empty() {
        return Err(RecurrenceError::EmptyReminderTimes);
    }

    let selected = days.days();
    let mut triggers = Vec::with_capacity(times.len() * selected.len().max(1));

    for (index, &time) in times.iter().enumerate() {
        let candidate = first_candidate(start, time, now)?;

        if days.is_daily() {
            triggers.push(TriggerSpec {
                handle: TriggerHandle::daily(routine_id, index),
                fire_at: candidate,
                repeat: RepeatFrequency::Daily,
            });
            continue;
        }

        for &day in &selected {
            triggers.push(TriggerSpec {
                handle: TriggerHandle::weekly(routine_id, index, day),
                fire_at: advance_to_weekday(candidate, day)?,
                repeat: RepeatFrequency::Weekly,
            });
        }
    }

    if selected.is_empty() {
        tracing::warn!(routine_id, "no weekdays selected; routine will never fire");
    }

    Ok(triggers)
}

/// Drop triggers whose first firing is after `end`.
pub fn clip_to_end(triggers: Vec<TriggerSpec>, end: NaiveDate) -> Vec<TriggerSpec> {
    triggers
        .into_iter()
        .filter(|t| t.fire_at.date() <= end)
        .collect()
}

/// Expand a stored routine, honouring the end-date policy.
pub fn expand_routine(
    routine: &Routine,
    now: NaiveDateTime,
    policy: EndDatePolicy,
) -> Result<Vec<TriggerSpec>, RecurrenceError> {
    let triggers = expand(
        &routine.id,
        &routine.times,
        routine.days,
        routine.window.start,
        now,
    )?;
    Ok(match policy {
        EndDatePolicy::Ignore => triggers,
        EndDatePolicy::Enforce => clip_to_end(triggers, routine.window.end),
    })
}
