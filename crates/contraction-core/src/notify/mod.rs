//! Provider alerts.
//!
//! The platform's notification API is reached only through [`Notifier`], so
//! the dispatcher can run against a recording fake in tests and against the
//! terminal in the CLI.

mod dispatcher;
mod recording;

pub use dispatcher::{AlertState, NotificationDispatcher};
pub use recording::RecordingNotifier;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// OS-level notification permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    /// Not yet decided; a request may prompt the user.
    #[default]
    Default,
    Granted,
    Denied,
    /// The platform has no notification API at all.
    Unsupported,
}

impl std::fmt::Display for NotificationPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// Payload for a system notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemNotification {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other.
    pub tag: String,
}

/// In-app alert shown when the 5-1-1 rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub description: String,
    /// Whether a system notification was also delivered.
    pub system_notified: bool,
}

pub const ALERT_TITLE: &str = "Time to Contact Your Healthcare Provider";
pub const ALERT_DESCRIPTION: &str = "Your contractions meet the 5-1-1 rule: 5 minutes apart, \
lasting 1 minute, for 1 hour consistently. It's time to call your hospital or healthcare provider.";
pub const SYSTEM_TITLE: &str = "Contraction Tracker - Hospital Alert";
pub const SYSTEM_BODY: &str =
    "Your contractions meet the 5-1-1 rule. Time to contact your healthcare provider!";
pub const SYSTEM_TAG: &str = "hospital-alert";

/// Platform notification capability.
pub trait Notifier {
    /// Current permission without prompting.
    fn permission(&self) -> NotificationPermission;

    /// Ask the user. Only called while the permission is `Default`.
    fn request_permission(&mut self) -> NotificationPermission;

    /// Deliver a system notification.
    fn show(&mut self, notification: &SystemNotification) -> Result<(), CoreError>;
}
