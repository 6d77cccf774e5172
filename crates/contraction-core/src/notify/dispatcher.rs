//! Rate-limited delivery of provider alerts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Alert, NotificationPermission, Notifier, SystemNotification, ALERT_DESCRIPTION, ALERT_TITLE,
    SYSTEM_BODY, SYSTEM_TAG, SYSTEM_TITLE,
};

/// Persistable alert bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertState {
    pub alert_shown: bool,
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// Decides when a satisfied rule becomes a user-facing alert.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    state: AlertState,
    cooldown: Duration,
}

impl NotificationDispatcher {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: AlertState::default(),
            cooldown,
        }
    }

    pub fn with_state(cooldown: Duration, state: AlertState) -> Self {
        Self { state, cooldown }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// React to a fresh rule result.
    ///
    /// Nothing happens before hydration. When the rule holds and either no
    /// alert has been shown yet or the cooldown has elapsed since the last
    /// one, an in-app alert is returned and, with permission granted, a
    /// system notification is shown. Delivery failures are logged only.
    pub fn evaluate<N: Notifier + ?Sized>(
        &mut self,
        meets_rule: bool,
        hydrated: bool,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Option<Alert> {
        if !hydrated || !meets_rule {
            return None;
        }
        if self.state.alert_shown && !self.cooldown_elapsed(now) {
            tracing::debug!("5-1-1 alert suppressed by cooldown");
            return None;
        }

        self.state.alert_shown = true;
        self.state.last_alert_at = Some(now);

        let system_notified = match notifier.permission() {
            NotificationPermission::Granted => {
                let notification = SystemNotification {
                    title: SYSTEM_TITLE.to_string(),
                    body: SYSTEM_BODY.to_string(),
                    tag: SYSTEM_TAG.to_string(),
                };
                match notifier.show(&notification) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "system notification failed, in-app alert only");
                        false
                    }
                }
            }
            other => {
                tracing::debug!(permission = %other, "no system notification permission");
                false
            }
        };

        tracing::info!(system_notified, "5-1-1 rule met, alerting");
        Some(Alert {
            title: ALERT_TITLE.to_string(),
            description: ALERT_DESCRIPTION.to_string(),
            system_notified,
        })
    }

    /// Ask for permission only while undecided. Granted, denied and
    /// unsupported are returned as-is without prompting.
    pub fn request_permission<N: Notifier + ?Sized>(notifier: &mut N) -> NotificationPermission {
        match notifier.permission() {
            NotificationPermission::Default => notifier.request_permission(),
            decided => decided,
        }
    }

    /// Forget any previous alert so the next satisfied rule alerts at once.
    pub fn reset(&mut self) {
        self.state = AlertState::default();
    }

    fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.state.last_alert_at {
            Some(last) => now - last > self.cooldown,
            None => true,
        }
    }
}
