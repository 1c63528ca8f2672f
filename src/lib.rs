//! Medication routine reminders.
//!
//! A routine is a medication plan: reminder times of day, the weekdays it is
//! active and a date window. [`core::recurrence`] turns it into platform
//! triggers, [`core::scheduler::Scheduler`] registers them with a
//! [`platform::NotificationPlatform`] and remembers exactly which triggers
//! belong to which routine so they can be cancelled later.

pub mod core;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod output;
pub mod platform;

pub use db::Database;
pub use error::ScheduleError;
