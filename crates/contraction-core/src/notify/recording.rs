use super::{NotificationPermission, Notifier, SystemNotification};
use crate::error::CoreError;

/// In-memory [`Notifier`] that records what it was asked to show.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    permission: NotificationPermission,
    /// What the simulated prompt answers when asked.
    answer: NotificationPermission,
    fail_show: bool,
    pub prompts: usize,
    pub shown: Vec<SystemNotification>,
}

impl RecordingNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission,
            answer: NotificationPermission::Granted,
            fail_show: false,
            prompts: 0,
            shown: Vec::new(),
        }
    }

    pub fn granted() -> Self {
        Self::new(NotificationPermission::Granted)
    }

    pub fn unsupported() -> Self {
        Self::new(NotificationPermission::Unsupported)
    }

    /// Set the answer the user gives when prompted.
    pub fn answering(mut self, answer: NotificationPermission) -> Self {
        self.answer = answer;
        self
    }

    /// Make `show` return an error.
    pub fn failing(mut self) -> Self {
        self.fail_show = true;
        self
    }
}

impl Notifier for RecordingNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn request_permission(&mut self) -> NotificationPermission {
        self.prompts += 1;
        self.permission = self.answer;
        self.permission
    }

    fn show(&mut self, notification: &SystemNotification) -> Result<(), CoreError> {
        if self.fail_show {
            return Err(CoreError::Notification("display refused".into()));
        }
        self.shown.push(notification.clone());
        Ok(())
    }
}
