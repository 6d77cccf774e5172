use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contraction::Contraction;

/// Every state change in the tracker produces an Event.
/// The rendering layer prints or logs them; nothing else depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ContractionStarted {
        id: String,
        at: DateTime<Utc>,
    },
    /// A finished contraction was committed to the list.
    ContractionRecorded {
        contraction: Contraction,
        at: DateTime<Utc>,
    },
    /// `stop()` ran on a contraction shorter than one second.
    ContractionDiscarded {
        id: String,
        duration_secs: i64,
        at: DateTime<Utc>,
    },
    ContractionAdded {
        contraction: Contraction,
        at: DateTime<Utc>,
    },
    ContractionEdited {
        contraction: Contraction,
        at: DateTime<Utc>,
    },
    ContractionDeleted {
        id: String,
        at: DateTime<Utc>,
    },
    ContractionsCleared {
        removed: usize,
        at: DateTime<Utc>,
    },
    /// The 5-1-1 rule fired and the cooldown allowed an alert.
    ProviderAlert {
        title: String,
        body: String,
        system_notified: bool,
        at: DateTime<Utc>,
    },
}
