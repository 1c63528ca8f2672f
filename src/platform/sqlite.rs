use chrono::Utc;

use crate::db::Database;
use crate::models::trigger::{Channel, Notification, PermissionStatus, TriggerNotification};

use super::{NotificationPlatform, PlatformError};

/// Trigger table kept in the application database. This is the facility the
/// CLI registers against; `notify upcoming` reads it back to show firings.
pub struct SqlitePlatform<'db> {
    db: &'db Database,
    notifications_allowed: bool,
}

impl<'db> SqlitePlatform<'db> {
    pub fn new(db: &'db Database, notifications_allowed: bool) -> Self {
        Self {
            db,
            notifications_allowed,
        }
    }
}

fn storage(e: anyhow::Error) -> PlatformError {
    PlatformError::Storage(e.to_string())
}

impl NotificationPlatform for SqlitePlatform<'_> {
    fn create_channel(&self, channel: &Channel) -> Result<(), PlatformError> {
        self.db.upsert_channel(channel).map_err(storage)
    }

    fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        Ok(if self.notifications_allowed {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    fn create_trigger(&self, notification: &TriggerNotification) -> Result<(), PlatformError> {
        if self
            .db
            .get_channel(&notification.channel_id)
            .map_err(storage)?
            .is_none()
        {
            return Err(PlatformError::Rejected {
                id: notification.id.clone(),
                reason: format!("unknown channel '{}'", notification.channel_id),
            });
        }
        self.db
            .upsert_platform_trigger(notification)
            .map_err(storage)
    }

    fn cancel(&self, id: &str) -> Result<(), PlatformError> {
        self.db.delete_platform_trigger(id).map_err(storage)?;
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), PlatformError> {
        self.db.clear_platform_triggers().map_err(storage)?;
        Ok(())
    }

    fn trigger_notifications(&self) -> Result<Vec<TriggerNotification>, PlatformError> {
        self.db.list_platform_triggers().map_err(storage)
    }

    fn display(&self, notification: &Notification) -> Result<(), PlatformError> {
        self.db
            .insert_displayed(notification, Utc::now())
            .map_err(storage)?;
        tracing::info!(title = %notification.title, body = %notification.body, "notification displayed");
        Ok(())
    }
}
