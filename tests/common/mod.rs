#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use pillroutine::core::clock::FixedClock;
use pillroutine::core::scheduler::{CancelToken, Scheduler, SchedulerSettings};
use pillroutine::db::Database;
use pillroutine::models::routine::{Routine, RoutineWindow, WeekdayMask, parse_times};
use pillroutine::models::trigger::{Channel, Notification, PermissionStatus, TriggerNotification};
use pillroutine::platform::{MemoryPlatform, NotificationPlatform, PlatformError};
use std::cell::Cell;
use tempfile::TempDir;

/// Create a temporary database for testing.
pub fn setup_db() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).unwrap();
    (dir, db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

/// A clock frozen at midnight UTC on 2024-12-31, before every test routine.
pub fn early_clock() -> FixedClock {
    FixedClock::utc(at(2024, 12, 31, 0, 0))
}

/// Build a routine from CLI-style strings.
pub fn routine(id: &str, times: &str, days: &str, start: NaiveDate, end: NaiveDate) -> Routine {
    Routine::new(
        "vitamin d",
        parse_times(times).unwrap(),
        days.parse::<WeekdayMask>().unwrap(),
        RoutineWindow::new(start, end).unwrap(),
    )
    .with_id(id)
}

pub fn scheduler<'db, P: NotificationPlatform>(
    db: &'db Database,
    platform: P,
) -> Scheduler<'db, P, FixedClock> {
    Scheduler::new(db, platform, early_clock(), SchedulerSettings::default())
}

/// Cancels the given token once `after` registrations went through.
pub struct CancellingPlatform {
    pub inner: MemoryPlatform,
    pub token: CancelToken,
    pub after: usize,
    seen: Cell<usize>,
}

impl CancellingPlatform {
    pub fn new(token: CancelToken, after: usize) -> Self {
        Self {
            inner: MemoryPlatform::new(),
            token,
            after,
            seen: Cell::new(0),
        }
    }
}

impl NotificationPlatform for CancellingPlatform {
    fn create_channel(&self, channel: &Channel) -> Result<(), PlatformError> {
        self.inner.create_channel(channel)
    }

    fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        self.inner.request_permission()
    }

    fn create_trigger(&self, notification: &TriggerNotification) -> Result<(), PlatformError> {
        self.inner.create_trigger(notification)?;
        self.seen.set(self.seen.get() + 1);
        if self.seen.get() >= self.after {
            self.token.cancel();
        }
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<(), PlatformError> {
        self.inner.cancel(id)
    }

    fn cancel_all(&self) -> Result<(), PlatformError> {
        self.inner.cancel_all()
    }

    fn trigger_notifications(&self) -> Result<Vec<TriggerNotification>, PlatformError> {
        self.inner.trigger_notifications()
    }

    fn display(&self, notification: &Notification) -> Result<(), PlatformError> {
        self.inner.display(notification)
    }
}
