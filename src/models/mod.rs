pub mod config;
pub mod routine;
pub mod trigger;

pub use routine::{ReminderTime, Routine, RoutineWindow, WeekdayMask};
pub use trigger::{RepeatFrequency, TriggerHandle, TriggerNotification, TriggerSpec};
