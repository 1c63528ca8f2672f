use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use crate::models::trigger::{Channel, Notification, PermissionStatus, TriggerNotification};

use super::{NotificationPlatform, PlatformError};

#[derive(Debug, Default)]
struct State {
    channels: Vec<Channel>,
    triggers: BTreeMap<String, TriggerNotification>,
    displayed: Vec<Notification>,
    permission_requests: usize,
    registrations: usize,
}

/// In-process notification facility. Keeps everything in memory and can be
/// told to reject specific registrations.
#[derive(Debug)]
pub struct MemoryPlatform {
    state: RefCell<State>,
    permission: PermissionStatus,
    reject_ids: HashSet<String>,
    stuck_ids: HashSet<String>,
    accept_limit: Option<usize>,
    unavailable: bool,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State::default()),
            permission: PermissionStatus::Granted,
            reject_ids: HashSet::new(),
            stuck_ids: HashSet::new(),
            accept_limit: None,
            unavailable: false,
        }
    }

    pub fn with_permission(mut self, permission: PermissionStatus) -> Self {
        self.permission = permission;
        self
    }

    /// Reject registration of the given trigger id.
    pub fn rejecting(mut self, id: impl Into<String>) -> Self {
        self.reject_ids.insert(id.into());
        self
    }

    /// Refuse to cancel the given trigger id.
    pub fn refusing_cancel(mut self, id: impl Into<String>) -> Self {
        self.stuck_ids.insert(id.into());
        self
    }

    /// Accept the first `n` registrations, reject the rest.
    pub fn accepting_only(mut self, n: usize) -> Self {
        self.accept_limit = Some(n);
        self
    }

    /// Fail every call as if the facility were missing.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.state.borrow().channels.clone()
    }

    pub fn trigger(&self, id: &str) -> Option<TriggerNotification> {
        self.state.borrow().triggers.get(id).cloned()
    }

    pub fn trigger_ids(&self) -> Vec<String> {
        self.state.borrow().triggers.keys().cloned().collect()
    }

    pub fn displayed(&self) -> Vec<Notification> {
        self.state.borrow().displayed.clone()
    }

    pub fn permission_requests(&self) -> usize {
        self.state.borrow().permission_requests
    }

    fn check_available(&self) -> Result<(), PlatformError> {
        if self.unavailable {
            return Err(PlatformError::Unavailable("memory platform disabled".to_string()));
        }
        Ok(())
    }
}

impl NotificationPlatform for MemoryPlatform {
    fn create_channel(&self, channel: &Channel) -> Result<(), PlatformError> {
        self.check_available()?;
        let mut state = self.state.borrow_mut();
        state.channels.retain(|c| c.id != channel.id);
        state.channels.push(channel.clone());
        Ok(())
    }

    fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        self.check_available()?;
        self.state.borrow_mut().permission_requests += 1;
        Ok(self.permission)
    }

    fn create_trigger(&self, notification: &TriggerNotification) -> Result<(), PlatformError> {
        self.check_available()?;
        let mut state = self.state.borrow_mut();
        let over_limit = self.accept_limit.is_some_and(|n| state.registrations >= n);
        if over_limit || self.reject_ids.contains(&notification.id) {
            return Err(PlatformError::Rejected {
                id: notification.id.clone(),
                reason: "rejected by platform".to_string(),
            });
        }
        state.registrations += 1;
        state
            .triggers
            .insert(notification.id.clone(), notification.clone());
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<(), PlatformError> {
        self.check_available()?;
        if self.stuck_ids.contains(id) {
            return Err(PlatformError::Rejected {
                id: id.to_string(),
                reason: "cancellation refused by platform".to_string(),
            });
        }
        self.state.borrow_mut().triggers.remove(id);
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), PlatformError> {
        self.check_available()?;
        self.state.borrow_mut().triggers.clear();
        Ok(())
    }

    fn trigger_notifications(&self) -> Result<Vec<TriggerNotification>, PlatformError> {
        self.check_available()?;
        Ok(self.state.borrow().triggers.values().cloned().collect())
    }

    fn display(&self, notification: &Notification) -> Result<(), PlatformError> {
        self.check_available()?;
        self.state.borrow_mut().displayed.push(notification.clone());
        Ok(())
    }
}
