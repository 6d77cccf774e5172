//! Summary statistics over the contraction list.
//!
//! Everything here is a pure function of the list; nothing is cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contraction::Contraction;

/// Aggregate view of the recorded contractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractionSummary {
    pub total_contractions: usize,
    /// Mean duration in seconds, 0 when nothing is resolved.
    pub average_duration: f64,
    /// Mean start-to-start gap in seconds, 0 with fewer than two resolved.
    pub average_interval: f64,
    pub last_contraction: Option<Contraction>,
}

impl Default for ContractionSummary {
    fn default() -> Self {
        Self {
            total_contractions: 0,
            average_duration: 0.0,
            average_interval: 0.0,
            last_contraction: None,
        }
    }
}

/// Summarize a newest-first list.
///
/// Intervals are measured start-to-start between each contraction and the
/// next older one, so they describe frequency rather than rest time.
pub fn summarize(contractions: &[Contraction]) -> ContractionSummary {
    let resolved: Vec<&Contraction> = contractions
        .iter()
        .filter(|c| c.duration().is_some())
        .collect();

    if resolved.is_empty() {
        return ContractionSummary::default();
    }

    let total_duration: i64 = resolved.iter().filter_map(|c| c.duration()).sum();
    let average_duration = total_duration as f64 / resolved.len() as f64;

    let average_interval = if resolved.len() > 1 {
        let intervals: Vec<f64> = resolved
            .windows(2)
            .map(|pair| (pair[0].start_time() - pair[1].start_time()).num_milliseconds() as f64 / 1000.0)
            .collect();
        intervals.iter().sum::<f64>() / intervals.len() as f64
    } else {
        0.0
    };

    ContractionSummary {
        total_contractions: resolved.len(),
        average_duration,
        average_interval,
        last_contraction: resolved.first().map(|c| (*c).clone()),
    }
}

/// Whole seconds since the last contraction ended (or started, if it has no
/// end). While a contraction is being timed the reference point freezes at
/// its start. Never negative.
pub fn time_since_last(
    summary: &ContractionSummary,
    current: Option<&Contraction>,
    now: DateTime<Utc>,
) -> i64 {
    let Some(last) = summary.last_contraction.as_ref() else {
        return 0;
    };
    let since = last.end_time().unwrap_or_else(|| last.start_time());
    let reference = current.map(|c| c.start_time()).unwrap_or(now);
    (reference - since).num_seconds().max(0)
}

/// The live "time since last" display ticks once a second, but only while
/// idle. While tracking the value is frozen, so ticking would be wasted work.
pub fn needs_tick(is_tracking: bool) -> bool {
    !is_tracking
}

/// Human-readable duration, e.g. `1 hour 2 minutes`, `45 seconds`.
///
/// Zero components are omitted; a zero total renders as `0 seconds`.
pub fn format_duration_secs(secs: i64) -> String {
    let secs = secs.max(0);
    if secs == 0 {
        return "0 seconds".to_string();
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut parts = Vec::new();
    for (value, unit) in [(hours, "hour"), (minutes, "minute"), (seconds, "second")] {
        match value {
            0 => {}
            1 => parts.push(format!("1 {unit}")),
            n => parts.push(format!("{n} {unit}s")),
        }
    }
    parts.join(" ")
}
