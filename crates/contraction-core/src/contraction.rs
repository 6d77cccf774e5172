//! The contraction record and its derived duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single timed contraction.
///
/// `duration` is derived from `start_time`/`end_time` and has no setter;
/// every constructor and edit path goes through [`derive_duration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contraction {
    id: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration: Option<i64>,
}

/// New times for an existing contraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractionEdit {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Contraction {
    /// A contraction in progress, starting at `start_time`.
    pub fn begin(start_time: DateTime<Utc>) -> Self {
        Self::new(start_time, None)
    }

    /// A contraction with a fresh id. Duration is derived when `end_time` is set.
    pub fn new(start_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time,
            duration: end_time.map(|end| derive_duration(start_time, end)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Whole seconds, absent until the contraction has ended.
    pub fn duration(&self) -> Option<i64> {
        self.duration
    }

    /// Both `end_time` and `duration` are resolved.
    pub fn is_complete(&self) -> bool {
        self.end_time.is_some() && self.duration.is_some()
    }

    /// Close the contraction at `end_time`, returning the finished record.
    pub fn finish(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self.duration = Some(derive_duration(self.start_time, end_time));
        self
    }

    /// Replace both times and recompute the duration.
    pub fn apply(&mut self, edit: ContractionEdit) {
        self.start_time = edit.start_time;
        self.end_time = edit.end_time;
        self.duration = edit
            .end_time
            .map(|end| derive_duration(edit.start_time, end));
    }

    /// Re-derive `duration` after deserialization so stored values cannot drift.
    pub(crate) fn normalized(mut self) -> Self {
        self.duration = self
            .end_time
            .map(|end| derive_duration(self.start_time, end));
        self
    }
}

/// `round((end - start) / 1000)` in whole seconds, halves rounded away from zero.
pub fn derive_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    (ms as f64 / 1000.0).round() as i64
}

/// Sort newest-first by start time.
pub(crate) fn sort_descending(list: &mut [Contraction]) {
    list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
}
