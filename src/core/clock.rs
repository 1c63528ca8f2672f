use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};

/// Source of "now" and the local-time ↔ epoch conversion used when handing
/// triggers to the platform.
pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Epoch milliseconds of a local wall-clock time.
    fn to_epoch_millis(&self, local: NaiveDateTime) -> i64;

    /// Local wall-clock time of an epoch-millisecond instant.
    fn from_epoch_millis(&self, millis: i64) -> Option<NaiveDateTime>;
}

/// The host's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn to_epoch_millis(&self, local: NaiveDateTime) -> i64 {
        // A wall time skipped by a DST jump fires at the first instant after it.
        Local
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                let shifted = local.checked_add_signed(TimeDelta::hours(1))?;
                Local.from_local_datetime(&shifted).earliest()
            })
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| local.and_utc().timestamp_millis())
    }

    fn from_epoch_millis(&self, millis: i64) -> Option<NaiveDateTime> {
        DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&Local).naive_local())
    }
}

/// A frozen clock at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Frozen at `now` in UTC.
    pub fn utc(now: NaiveDateTime) -> Self {
        Self::new(now, Utc.fix())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn to_epoch_millis(&self, local: NaiveDateTime) -> i64 {
        (local - self.offset).and_utc().timestamp_millis()
    }

    fn from_epoch_millis(&self, millis: i64) -> Option<NaiveDateTime> {
        DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&self.offset).naive_local())
    }
}
