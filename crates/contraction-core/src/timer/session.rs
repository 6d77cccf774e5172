//! Active-contraction session controller.
//!
//! A two-state machine. The active contraction lives here and only here
//! until `stop()` hands it back to be committed; it is never part of the
//! persisted list while in progress.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start()--> Tracking --stop()--> Idle
//! ```
//!
//! There is no cancel. A contraction stopped in under a second is dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contraction::Contraction;
use crate::events::Event;

/// Shortest contraction `stop()` will record, in seconds.
pub const MIN_RECORDED_SECS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Tracking,
}

/// Result of stopping the active contraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Long enough to keep; the caller commits it to the repository.
    Recorded(Contraction),
    /// Shorter than [`MIN_RECORDED_SECS`]; treated as an accidental tap.
    Discarded { id: String, duration_secs: i64 },
}

/// Owns the single in-progress contraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionController {
    current: Option<Contraction>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Tracking
        } else {
            SessionState::Idle
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Contraction> {
        self.current.as_ref()
    }

    /// Seconds the active contraction has been running, if any.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.current
            .as_ref()
            .map(|c| (now - c.start_time()).num_seconds().max(0))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin timing. Ignored while already tracking.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.current.is_some() {
            tracing::debug!("start ignored, contraction already in progress");
            return None;
        }
        let contraction = Contraction::begin(now);
        let id = contraction.id().to_string();
        self.current = Some(contraction);
        tracing::debug!(%id, "contraction started");
        Some(Event::ContractionStarted { id, at: now })
    }

    /// Finish timing and return to Idle. `None` when nothing was in progress.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<StopOutcome> {
        let finished = self.current.take()?.finish(now);
        let duration_secs = finished.duration().unwrap_or(0);
        if duration_secs >= MIN_RECORDED_SECS {
            tracing::debug!(id = finished.id(), duration_secs, "contraction stopped");
            Some(StopOutcome::Recorded(finished))
        } else {
            tracing::debug!(id = finished.id(), duration_secs, "contraction too short, discarded");
            Some(StopOutcome::Discarded {
                id: finished.id().to_string(),
                duration_secs,
            })
        }
    }

    /// Drop the active contraction without recording it.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Resume an in-progress contraction loaded from storage. Anything that
    /// has already ended is ignored.
    pub fn restore(&mut self, active: Option<Contraction>) {
        self.current = active.filter(|c| c.end_time().is_none());
    }
}
