//! The host's local-notification facility.
//!
//! The scheduler only talks to [`NotificationPlatform`]. The facility owns
//! actual firing: once a trigger is registered it fires on its own schedule,
//! repeating DAILY or WEEKLY from its first timestamp, whether or not this
//! process is still running.

mod memory;
mod sqlite;

pub use memory::MemoryPlatform;
pub use sqlite::SqlitePlatform;

use thiserror::Error;

use crate::models::trigger::{Channel, Notification, PermissionStatus, TriggerNotification};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlatformError {
    #[error("notification facility unavailable: {0}")]
    Unavailable(String),

    #[error("trigger '{id}' rejected: {reason}")]
    Rejected { id: String, reason: String },

    #[error("notification storage failed: {0}")]
    Storage(String),
}

/// Trigger namespace is global and keyed by string id; registering an id
/// that already exists replaces it.
pub trait NotificationPlatform {
    fn create_channel(&self, channel: &Channel) -> Result<(), PlatformError>;

    fn request_permission(&self) -> Result<PermissionStatus, PlatformError>;

    fn create_trigger(&self, notification: &TriggerNotification) -> Result<(), PlatformError>;

    /// Cancelling an unknown id is not an error.
    fn cancel(&self, id: &str) -> Result<(), PlatformError>;

    fn cancel_all(&self) -> Result<(), PlatformError>;

    fn trigger_notifications(&self) -> Result<Vec<TriggerNotification>, PlatformError>;

    fn display(&self, notification: &Notification) -> Result<(), PlatformError>;
}

impl<T: NotificationPlatform + ?Sized> NotificationPlatform for &T {
    fn create_channel(&self, channel: &Channel) -> Result<(), PlatformError> {
        (**self).create_channel(channel)
    }

    fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        (**self).request_permission()
    }

    fn create_trigger(&self, notification: &TriggerNotification) -> Result<(), PlatformError> {
        (**self).create_trigger(notification)
    }

    fn cancel(&self, id: &str) -> Result<(), PlatformError> {
        (**self).cancel(id)
    }

    fn cancel_all(&self) -> Result<(), PlatformError> {
        (**self).cancel_all()
    }

    fn trigger_notifications(&self) -> Result<Vec<TriggerNotification>, PlatformError> {
        (**self).trigger_notifications()
    }

    fn display(&self, notification: &Notification) -> Result<(), PlatformError> {
        (**self).display(notification)
    }
}
