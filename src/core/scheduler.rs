//! Registration and cancellation of routine reminders.
//!
//! [`Scheduler`] is built once at startup and handed to whatever needs it.
//! It is the only writer of the routine → trigger handle registry, so
//! cancellation always removes exactly what registration created.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::core::clock::Clock;
use crate::core::recurrence::{self, EndDatePolicy};
use crate::db::Database;
use crate::error::ScheduleError;
use crate::models::config::{Config, DuplicatePolicy};
use crate::models::routine::Routine;
use crate::models::trigger::{
    Channel, Importance, Notification, PermissionStatus, RepeatFrequency, TriggerNotification,
    TriggerSpec,
};
use crate::platform::NotificationPlatform;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub channel: Channel,
    pub title: String,
    /// `{name}` is replaced with the routine name.
    pub body_template: String,
    pub on_duplicate: DuplicatePolicy,
    pub end_date_policy: EndDatePolicy,
    pub batch_timeout: Option<Duration>,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            channel: Channel {
                id: config.notifications.channel_id.clone(),
                name: config.notifications.channel_name.clone(),
                importance: Importance::High,
                sound: true,
                vibration: true,
            },
            title: config.notifications.title.clone(),
            body_template: config.notifications.body.clone(),
            on_duplicate: config.scheduling.on_duplicate,
            end_date_policy: EndDatePolicy::from_flag(config.scheduling.enforce_end_date),
            batch_timeout: config.scheduling.batch_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn body_for(&self, routine_name: &str) -> String {
        self.body_template.replace("{name}", routine_name)
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// ---------------------------------------------------------------------------
// Batch control
// ---------------------------------------------------------------------------

/// Shared flag that stops a running batch before its next registration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Bounds on one scheduling batch. A deadline set here overrides the
/// configured batch timeout.
#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    pub token: CancelToken,
    pub deadline: Option<Duration>,
}

impl BatchControl {
    pub fn with_token(token: CancelToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            token: CancelToken::new(),
            deadline: Some(deadline),
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Cancelled,
    DeadlineExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum Registration {
    Registered,
    Failed(String),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerOutcome {
    pub trigger_id: String,
    pub fire_at: NaiveDateTime,
    pub repeat: RepeatFrequency,
    #[serde(flatten)]
    pub registration: Registration,
}

impl TriggerOutcome {
    pub fn is_registered(&self) -> bool {
        self.registration == Registration::Registered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Every trigger registered.
    Scheduled,
    /// Some triggers registered, some did not.
    Partial,
    /// No trigger registered.
    Failed,
    /// Triggers may be registered but the user has refused notifications.
    PermissionDenied,
    /// The recurrence produced no triggers.
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub routine_id: String,
    pub permission: PermissionStatus,
    pub replaced: usize,
    pub outcomes: Vec<TriggerOutcome>,
}

impl ScheduleReport {
    pub fn registered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_registered()).count()
    }

    pub fn status(&self) -> ReportStatus {
        if self.permission == PermissionStatus::Denied {
            return ReportStatus::PermissionDenied;
        }
        if self.outcomes.is_empty() {
            return ReportStatus::Empty;
        }
        match self.registered() {
            0 => ReportStatus::Failed,
            n if n == self.outcomes.len() => ReportStatus::Scheduled,
            _ => ReportStatus::Partial,
        }
    }

    pub fn success(&self) -> bool {
        self.status() == ReportStatus::Scheduled
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelFailure {
    pub trigger_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CancelReport {
    pub routine_id: String,
    pub cancelled: Vec<String>,
    pub failed: Vec<CancelFailure>,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct Scheduler<'db, P: NotificationPlatform, C: Clock> {
    db: &'db Database,
    platform: P,
    clock: C,
    settings: SchedulerSettings,
    permission: Option<PermissionStatus>,
}

impl<'db, P: NotificationPlatform, C: Clock> Scheduler<'db, P, C> {
    pub fn new(db: &'db Database, platform: P, clock: C, settings: SchedulerSettings) -> Self {
        Self {
            db,
            platform,
            clock,
            settings,
            permission: None,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Create the notification channel and ask for permission. Only the first
    /// call reaches the platform; later calls return the cached answer.
    pub fn initialize(&mut self) -> Result<PermissionStatus> {
        if let Some(permission) = self.permission {
            return Ok(permission);
        }

        self.platform.create_channel(&self.settings.channel)?;

        let permission = match self.platform.request_permission() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "notification permission request failed");
                PermissionStatus::Denied
            }
        };
        if permission == PermissionStatus::Denied {
            tracing::warn!("notification permission denied; reminders will not be shown");
        }

        tracing::debug!(channel = %self.settings.channel.id, ?permission, "scheduler initialized");
        self.permission = Some(permission);
        Ok(permission)
    }

    /// Expand a routine and register every resulting trigger, one at a time.
    ///
    /// Triggers registered before a failure stay registered and recorded.
    pub fn schedule_routine(
        &mut self,
        routine: &Routine,
        control: &BatchControl,
    ) -> Result<ScheduleReport> {
        routine.validate()?;
        let permission = self.initialize()?;

        let existing = self.db.count_handles(&routine.id)?;
        let mut replaced = 0;
        if existing > 0 {
            match self.settings.on_duplicate {
                DuplicatePolicy::Reject => {
                    return Err(ScheduleError::AlreadyScheduled(routine.id.clone()).into());
                }
                DuplicatePolicy::Replace => {
                    let cancelled = self.cancel_routine(&routine.id)?;
                    if !cancelled.failed.is_empty() {
                        return Err(ScheduleError::ReplaceIncomplete {
                            routine_id: routine.id.clone(),
                            failed: cancelled.failed.len(),
                        }
                        .into());
                    }
                    replaced = cancelled.cancelled.len();
                    tracing::info!(routine_id = %routine.id, replaced, "replacing existing triggers");
                }
            }
        }

        let triggers =
            recurrence::expand_routine(routine, self.clock.now(), self.settings.end_date_policy)?;

        let deadline = control.deadline.or(self.settings.batch_timeout);
        let started = Instant::now();
        let body = self.settings.body_for(&routine.name);
        let mut outcomes = Vec::with_capacity(triggers.len());

        for spec in triggers {
            let registration = if control.token.is_cancelled() {
                Registration::Skipped(SkipReason::Cancelled)
            } else if deadline.is_some_and(|d| started.elapsed() >= d) {
                Registration::Skipped(SkipReason::DeadlineExceeded)
            } else {
                self.register(&spec, &body)
            };
            outcomes.push(TriggerOutcome {
                trigger_id: spec.id(),
                fire_at: spec.fire_at,
                repeat: spec.repeat,
                registration,
            });
        }

        let report = ScheduleReport {
            routine_id: routine.id.clone(),
            permission,
            replaced,
            outcomes,
        };
        tracing::info!(
            routine_id = %routine.id,
            name = %routine.name,
            registered = report.registered(),
            total = report.outcomes.len(),
            status = ?report.status(),
            "routine scheduled"
        );
        Ok(report)
    }

    /// A trigger counts as registered only once its handle is recorded; a
    /// trigger the registry cannot record is withdrawn from the platform.
    fn register(&self, spec: &TriggerSpec, body: &str) -> Registration {
        let notification = TriggerNotification {
            id: spec.id(),
            title: self.settings.title.clone(),
            body: body.to_string(),
            channel_id: self.settings.channel.id.clone(),
            timestamp_ms: self.clock.to_epoch_millis(spec.fire_at),
            repeat: spec.repeat,
        };
        if let Err(e) = self.platform.create_trigger(&notification) {
            tracing::warn!(trigger_id = %notification.id, error = %e, "trigger registration failed");
            return Registration::Failed(e.to_string());
        }
        match self.db.insert_handle(spec) {
            Ok(()) => Registration::Registered,
            Err(e) => {
                tracing::warn!(trigger_id = %notification.id, error = %e, "trigger handle not recorded");
                if let Err(cancel_err) = self.platform.cancel(&notification.id) {
                    tracing::warn!(
                        trigger_id = %notification.id,
                        error = %cancel_err,
                        "unrecorded trigger could not be withdrawn"
                    );
                }
                Registration::Failed(format!("handle not recorded: {e}"))
            }
        }
    }

    /// Cancel exactly the triggers recorded for a routine.
    pub fn cancel_routine(&self, routine_id: &str) -> Result<CancelReport> {
        let mut report = CancelReport {
            routine_id: routine_id.to_string(),
            ..CancelReport::default()
        };

        for spec in self.db.handles_for(routine_id)? {
            let id = spec.id();
            match self.platform.cancel(&id) {
                Ok(()) => {
                    self.db.delete_handle(&id)?;
                    report.cancelled.push(id);
                }
                Err(e) => {
                    tracing::warn!(trigger_id = %id, error = %e, "trigger cancellation failed");
                    report.failed.push(CancelFailure {
                        trigger_id: id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            routine_id,
            cancelled = report.cancelled.len(),
            failed = report.failed.len(),
            "routine cancelled"
        );
        Ok(report)
    }

    /// Cancel every trigger on the platform, whoever registered it.
    pub fn cancel_all(&self) -> Result<usize> {
        self.platform.cancel_all()?;
        let cleared = self.db.clear_handles()?;
        tracing::info!(cleared, "all notifications cancelled");
        Ok(cleared)
    }

    pub fn list_scheduled(&self) -> Result<Vec<TriggerNotification>> {
        Ok(self.platform.trigger_notifications()?)
    }

    pub fn handles_for(&self, routine_id: &str) -> Result<Vec<TriggerSpec>> {
        self.db.handles_for(routine_id)
    }

    /// Show a reminder for `routine_name` right away. Returns `false` without
    /// displaying when permission has been denied.
    pub fn display_test(&mut self, routine_name: &str) -> Result<bool> {
        if !self.initialize()?.allows_display() {
            tracing::warn!("test notification skipped: permission denied");
            return Ok(false);
        }
        self.platform.display(&Notification {
            title: self.settings.title.clone(),
            body: self.settings.body_for(routine_name),
            channel_id: self.settings.channel.id.clone(),
        })?;
        Ok(true)
    }

    /// Cancel the triggers of every routine whose end date is before `today`.
    /// Does nothing unless end dates are enforced.
    pub fn sweep_expired(&self, today: NaiveDate) -> Result<Vec<CancelReport>> {
        if self.settings.end_date_policy == EndDatePolicy::Ignore {
            tracing::debug!("end dates not enforced; sweep skipped");
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for routine in self.db.list_routines()? {
            if routine.window.has_ended(today) && self.db.count_handles(&routine.id)? > 0 {
                reports.push(self.cancel_routine(&routine.id)?);
            }
        }
        Ok(reports)
    }
}
