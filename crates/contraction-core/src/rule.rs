//! 5-1-1 rule evaluation.
//!
//! Contractions five minutes apart, lasting one minute each, for one hour.
//! The check walks adjacent pairs of the recent, newest-first history and
//! counts pairs whose duration and start-to-start gap both fall inside the
//! tolerance bands.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::contraction::Contraction;

/// Thresholds for the 5-1-1 rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Completed contractions required overall before the rule can fire.
    #[serde(default = "default_min_total")]
    pub min_total: usize,
    /// Look-back window measured from `now`.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
    /// Completed contractions required inside the window.
    #[serde(default = "default_min_recent")]
    pub min_recent: usize,
    #[serde(default = "default_min_duration_secs")]
    pub min_duration_secs: i64,
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: i64,
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: i64,
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: i64,
    /// Adjacent pairs that must be within tolerance.
    #[serde(default = "default_min_valid_pairs")]
    pub min_valid_pairs: usize,
}

fn default_min_total() -> usize {
    12
}
fn default_window_minutes() -> i64 {
    60
}
fn default_min_recent() -> usize {
    12
}
fn default_min_duration_secs() -> i64 {
    45
}
fn default_max_duration_secs() -> i64 {
    75
}
fn default_min_interval_secs() -> i64 {
    240
}
fn default_max_interval_secs() -> i64 {
    360
}
fn default_min_valid_pairs() -> usize {
    10
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_total: default_min_total(),
            window_minutes: default_window_minutes(),
            min_recent: default_min_recent(),
            min_duration_secs: default_min_duration_secs(),
            max_duration_secs: default_max_duration_secs(),
            min_interval_secs: default_min_interval_secs(),
            max_interval_secs: default_max_interval_secs(),
            min_valid_pairs: default_min_valid_pairs(),
        }
    }
}

/// Why the rule did or did not fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReport {
    pub completed: usize,
    pub recent: usize,
    pub pairs_checked: usize,
    pub valid_pairs: usize,
    pub met: bool,
}

/// Evaluate the rule and report the intermediate counts.
///
/// `contractions` must be newest-first, as the repository keeps it.
pub fn evaluate(contractions: &[Contraction], now: DateTime<Utc>, cfg: &RuleConfig) -> RuleReport {
    let completed: Vec<&Contraction> = contractions.iter().filter(|c| c.is_complete()).collect();

    let mut report = RuleReport {
        completed: completed.len(),
        recent: 0,
        pairs_checked: 0,
        valid_pairs: 0,
        met: false,
    };
    if completed.len() < cfg.min_total {
        return report;
    }

    let window_start = now - Duration::minutes(cfg.window_minutes);
    let recent: Vec<&Contraction> = completed
        .into_iter()
        .filter(|c| c.start_time() >= window_start)
        .collect();
    report.recent = recent.len();
    if recent.len() < cfg.min_recent {
        return report;
    }

    for pair in recent.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let duration = current.duration().unwrap_or(0);
        let duration_ok = (cfg.min_duration_secs..=cfg.max_duration_secs).contains(&duration);

        let interval = (current.start_time() - next.start_time()).num_milliseconds() as f64 / 1000.0;
        let interval_ok =
            interval >= cfg.min_interval_secs as f64 && interval <= cfg.max_interval_secs as f64;

        report.pairs_checked += 1;
        if duration_ok && interval_ok {
            report.valid_pairs += 1;
        }
    }

    report.met = report.valid_pairs >= cfg.min_valid_pairs;
    report
}

/// `true` when the recent history satisfies the 5-1-1 pattern.
pub fn check_511_rule(contractions: &[Contraction], now: DateTime<Utc>, cfg: &RuleConfig) -> bool {
    evaluate(contractions, now, cfg).met
}
