//! # Contraction Tracker Core Library
//!
//! Business logic for timing labor contractions. All operations are available
//! through the `contractions` CLI, which is a thin rendering layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Session controller**: the single in-progress contraction (start/stop)
//! - **Repository**: the persisted, newest-first contraction list
//! - **Storage**: key-value persistence with hydration signaling, SQLite
//!   backend and TOML configuration
//! - **Statistics / 5-1-1 rule**: pure functions recomputed on every read
//! - **Notifications**: rate-limited provider alerts behind a `Notifier` trait
//!
//! ## Key Components
//!
//! - [`ContractionTracker`]: the application controller
//! - [`Database`]: durable key-value store
//! - [`Config`]: application configuration management
//! - [`Notifier`]: trait for OS notification delivery

pub mod contraction;
pub mod error;
pub mod events;
pub mod export;
pub mod notify;
pub mod repository;
pub mod rule;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod tracker;

pub use contraction::{Contraction, ContractionEdit};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use notify::{Alert, NotificationDispatcher, NotificationPermission, Notifier, SystemNotification};
pub use repository::ContractionRepository;
pub use rule::{check_511_rule, RuleConfig, RuleReport};
pub use stats::{summarize, ContractionSummary};
pub use storage::{Config, Database, MemoryStore, PersistentStore, Store};
pub use timer::{SessionController, SessionState, StopOutcome};
pub use tracker::{ContractionTracker, TrackerConfig, TrackerView};
