//! Host-side persistence: the TOML config and the JSON fragment store.

mod config;
mod store;

pub use config::{Config, DisplayConfig, FragmentsConfig};
pub use store::{FragmentSource, MemoryStore};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/timetile[-dev]/` based on TIMETILE_ENV.
///
/// Set TIMETILE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMETILE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timetile-dev")
    } else {
        base_dir.join("timetile")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
