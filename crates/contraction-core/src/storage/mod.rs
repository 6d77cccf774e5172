mod config;
pub mod database;
mod store;

pub use config::{Config, NotificationsConfig, StorageConfig};
pub use database::Database;
pub use store::{MemoryStore, PersistentStore, Store};

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns the data directory, creating it if needed.
///
/// `CONTRACTIONS_DATA_DIR` overrides the location outright. Otherwise the
/// directory is `~/.config/contractions[-dev]/`, with the `-dev` suffix
/// selected by `CONTRACTIONS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = match std::env::var_os("CONTRACTIONS_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("CONTRACTIONS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("contractions-dev")
            } else {
                base_dir.join("contractions")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(StoreError::DataDir)?;
    Ok(dir)
}
