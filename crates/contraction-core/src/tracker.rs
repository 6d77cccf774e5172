//! The application controller.
//!
//! One [`ContractionTracker`] is built per running application and handed to
//! the rendering layer. It owns the repository, the active session and the
//! alert bookkeeping, and sequences the data flow:
//!
//! ```text
//! action -> session / repository -> store write -> rule -> dispatcher -> view
//! ```
//!
//! Time is always passed in by the caller, so the whole flow is
//! deterministic under test.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::contraction::{Contraction, ContractionEdit};
use crate::events::Event;
use crate::notify::{AlertState, NotificationDispatcher, NotificationPermission, Notifier};
use crate::repository::ContractionRepository;
use crate::rule::{self, RuleConfig, RuleReport};
use crate::stats::{self, ContractionSummary};
use crate::storage::{Config, Store};
use crate::timer::{SessionController, StopOutcome};

/// Key holding the in-progress contraction when sessions are persisted.
pub const ACTIVE_KEY: &str = "active_contraction";
/// Key holding the alert cooldown bookkeeping when sessions are persisted.
pub const ALERT_STATE_KEY: &str = "alert_state";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub rule: RuleConfig,
    pub cooldown: Duration,
    pub storage_key: String,
    /// Also persist the active contraction and alert state. Needed when each
    /// action runs in a fresh process; a long-lived UI leaves this off.
    pub persist_session: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TrackerConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            rule: cfg.rule.clone(),
            cooldown: cfg.cooldown(),
            storage_key: cfg.storage.key.clone(),
            persist_session: false,
        }
    }
}

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerView {
    pub contractions: Vec<Contraction>,
    pub current_contraction: Option<Contraction>,
    pub is_tracking: bool,
    pub summary: ContractionSummary,
    pub meets_rule: bool,
    pub is_hydrated: bool,
}

pub struct ContractionTracker<S> {
    repo: ContractionRepository<S>,
    session: SessionController,
    dispatcher: NotificationDispatcher,
    config: TrackerConfig,
}

impl<S: Store> ContractionTracker<S> {
    pub fn new(backend: S, config: TrackerConfig) -> Self {
        Self {
            repo: ContractionRepository::new(backend, config.storage_key.clone()),
            session: SessionController::new(),
            dispatcher: NotificationDispatcher::new(config.cooldown),
            config,
        }
    }

    /// Complete the initial load, then evaluate the rule against the now
    /// authoritative list.
    ///
    /// Anything recorded before this call is merged into the stored history.
    pub fn hydrate<N: Notifier + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Vec<Event> {
        if self.config.persist_session {
            let store = self.repo.store();
            let active: Option<Contraction> = store.read(ACTIVE_KEY, None);
            let alert: AlertState = store.read(ALERT_STATE_KEY, AlertState::default());
            if !self.session.is_tracking() {
                self.session.restore(active);
            }
            self.dispatcher = NotificationDispatcher::with_state(self.config.cooldown, alert);
        }
        self.repo.hydrate();
        self.after_list_change(now, notifier).into_iter().collect()
    }

    pub fn is_hydrated(&self) -> bool {
        self.repo.is_hydrated()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn contractions(&self) -> &[Contraction] {
        self.repo.list()
    }

    pub fn current(&self) -> Option<&Contraction> {
        self.session.current()
    }

    pub fn is_tracking(&self) -> bool {
        self.session.is_tracking()
    }

    /// Seconds the active contraction has been running, if any.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.session.elapsed_secs(now)
    }

    pub fn summary(&self) -> ContractionSummary {
        stats::summarize(self.repo.list())
    }

    pub fn meets_rule(&self, now: DateTime<Utc>) -> bool {
        rule::check_511_rule(self.repo.list(), now, &self.config.rule)
    }

    pub fn rule_report(&self, now: DateTime<Utc>) -> RuleReport {
        rule::evaluate(self.repo.list(), now, &self.config.rule)
    }

    pub fn alert_state(&self) -> &AlertState {
        self.dispatcher.state()
    }

    pub fn view(&self, now: DateTime<Utc>) -> TrackerView {
        TrackerView {
            contractions: self.repo.list().to_vec(),
            current_contraction: self.session.current().cloned(),
            is_tracking: self.session.is_tracking(),
            summary: self.summary(),
            meets_rule: self.meets_rule(now),
            is_hydrated: self.is_hydrated(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin timing a contraction. Ignored while one is in progress.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let event = self.session.start(now)?;
        self.persist_active();
        Some(event)
    }

    /// Finish the active contraction, committing it if it lasted at least a
    /// second.
    pub fn stop<N: Notifier + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Vec<Event> {
        let Some(outcome) = self.session.stop(now) else {
            return Vec::new();
        };
        self.persist_active();

        match outcome {
            StopOutcome::Recorded(contraction) => {
                self.repo.insert(contraction.clone());
                let mut events = vec![Event::ContractionRecorded {
                    contraction,
                    at: now,
                }];
                events.extend(self.after_list_change(now, notifier));
                events
            }
            StopOutcome::Discarded { id, duration_secs } => vec![Event::ContractionDiscarded {
                id,
                duration_secs,
                at: now,
            }],
        }
    }

    /// Manually record a contraction.
    pub fn add<N: Notifier + ?Sized>(
        &mut self,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Vec<Event> {
        let contraction = self.repo.add(start_time, end_time);
        let mut events = vec![Event::ContractionAdded {
            contraction,
            at: now,
        }];
        events.extend(self.after_list_change(now, notifier));
        events
    }

    /// Replace the times of a recorded contraction. Unknown ids are a no-op.
    pub fn edit<N: Notifier + ?Sized>(
        &mut self,
        id: &str,
        edit: ContractionEdit,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Vec<Event> {
        let Some(contraction) = self.repo.edit(id, edit) else {
            tracing::debug!(id, "edit of unknown contraction ignored");
            return Vec::new();
        };
        let mut events = vec![Event::ContractionEdited {
            contraction,
            at: now,
        }];
        events.extend(self.after_list_change(now, notifier));
        events
    }

    /// Remove a recorded contraction. Unknown ids are a no-op.
    pub fn delete<N: Notifier + ?Sized>(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Vec<Event> {
        if !self.repo.delete(id) {
            tracing::debug!(id, "delete of unknown contraction ignored");
            return Vec::new();
        }
        let mut events = vec![Event::ContractionDeleted {
            id: id.to_string(),
            at: now,
        }];
        events.extend(self.after_list_change(now, notifier));
        events
    }

    /// Empty the list, drop the active contraction and forget past alerts.
    pub fn clear_all(&mut self, now: DateTime<Utc>) -> Event {
        let removed = self.repo.clear_all();
        self.session.reset();
        self.dispatcher.reset();
        self.persist_active();
        self.persist_alert_state();
        Event::ContractionsCleared { removed, at: now }
    }

    /// Ask for OS notification permission if it has not been decided yet.
    pub fn request_notification_permission<N: Notifier + ?Sized>(
        &self,
        notifier: &mut N,
    ) -> NotificationPermission {
        NotificationDispatcher::request_permission(notifier)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn after_list_change<N: Notifier + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Option<Event> {
        let meets_rule = self.meets_rule(now);
        let alert = self
            .dispatcher
            .evaluate(meets_rule, self.is_hydrated(), now, notifier)?;
        self.persist_alert_state();
        Some(Event::ProviderAlert {
            title: alert.title,
            body: alert.description,
            system_notified: alert.system_notified,
            at: now,
        })
    }

    fn persist_active(&mut self) {
        if !self.config.persist_session {
            return;
        }
        let active = self.session.current().cloned();
        let store = self.repo.store_mut();
        match active {
            Some(c) => {
                store.write(ACTIVE_KEY, &c);
            }
            None => {
                store.remove(ACTIVE_KEY);
            }
        }
    }

    fn persist_alert_state(&mut self) {
        if !self.config.persist_session {
            return;
        }
        let state = self.dispatcher.state().clone();
        self.repo.store_mut().write(ALERT_STATE_KEY, &state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn tracker() -> ContractionTracker<MemoryStore> {
        let mut t = ContractionTracker::new(MemoryStore::new(), TrackerConfig::default());
        t.hydrate(t0(), &mut RecordingNotifier::granted());
        t
    }

    #[test]
    fn stop_commits_long_contraction() {
        let mut t = tracker();
        let mut n = RecordingNotifier::granted();
        assert!(t.start(t0()).is_some());
        assert!(t.is_tracking());
        assert!(t.contractions().is_empty());

        let events = t.stop(t0() + Duration::seconds(55), &mut n);
        assert!(matches!(events[0], Event::ContractionRecorded { .. }));
        assert_eq!(t.contractions().len(), 1);
        assert_eq!(t.contractions()[0].duration(), Some(55));
        assert!(!t.is_tracking());
    }

    #[test]
    fn stop_discards_accidental_tap() {
        let mut t = tracker();
        let mut n = RecordingNotifier::granted();
        t.start(t0());
        let events = t.stop(t0() + Duration::milliseconds(300), &mut n);
        assert!(matches!(events[0], Event::ContractionDiscarded { .. }));
        assert!(t.contractions().is_empty());
        assert!(t.current().is_none());
    }

    #[test]
    fn stop_while_idle_does_nothing() {
        let mut t = tracker();
        assert!(t.stop(t0(), &mut RecordingNotifier::granted()).is_empty());
    }

    #[test]
    fn clear_all_resets_everything() {
        let mut t = tracker();
        let mut n = RecordingNotifier::granted();
        t.add(t0(), Some(t0() + Duration::seconds(60)), t0(), &mut n);
        t.start(t0() + Duration::minutes(5));

        let event = t.clear_all(t0() + Duration::minutes(6));
        assert!(matches!(event, Event::ContractionsCleared { removed: 1, .. }));
        assert!(t.contractions().is_empty());
        assert!(!t.is_tracking());
        assert_eq!(t.alert_state(), &AlertState::default());
    }

    #[test]
    fn view_reflects_state() {
        let mut t = tracker();
        let mut n = RecordingNotifier::granted();
        t.add(t0(), Some(t0() + Duration::seconds(60)), t0(), &mut n);
        t.start(t0() + Duration::minutes(5));

        assert_eq!(t.elapsed_secs(t0() + Duration::minutes(5) + Duration::seconds(20)), Some(20));
        let view = t.view(t0() + Duration::minutes(5));
        assert_eq!(view.contractions.len(), 1);
        assert!(view.is_tracking);
        assert!(view.current_contraction.is_some());
        assert_eq!(view.summary.total_contractions, 1);
        assert!(!view.meets_rule);
        assert!(view.is_hydrated);
    }

    #[test]
    fn unknown_ids_produce_no_events() {
        let mut t = tracker();
        let mut n = RecordingNotifier::granted();
        assert!(t.delete("missing", t0(), &mut n).is_empty());
        let edit = ContractionEdit {
            start_time: t0(),
            end_time: None,
        };
        assert!(t.edit("missing", edit, t0(), &mut n).is_empty());
    }

    #[test]
    fn persisted_session_survives_reload() {
        let config = TrackerConfig {
            persist_session: true,
            ..TrackerConfig::default()
        };
        let mut n = RecordingNotifier::granted();
        let mut t = ContractionTracker::new(MemoryStore::new(), config.clone());
        t.hydrate(t0(), &mut n);
        t.start(t0());

        let backend = t.repo.store().inner().clone();
        let mut reloaded = ContractionTracker::new(backend, config);
        reloaded.hydrate(t0() + Duration::seconds(30), &mut n);
        assert!(reloaded.is_tracking());

        let events = reloaded.stop(t0() + Duration::seconds(48), &mut n);
        assert!(matches!(events[0], Event::ContractionRecorded { .. }));
        assert_eq!(reloaded.contractions()[0].duration(), Some(48));
        assert!(reloaded.repo.store().inner().raw(ACTIVE_KEY).is_none());
    }

    #[test]
    fn unpersisted_session_is_not_written() {
        let mut t = tracker();
        t.start(t0());
        assert!(t.repo.store().inner().raw(ACTIVE_KEY).is_none());
    }
}
