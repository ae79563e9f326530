mod config;
pub mod store;

pub use config::Config;
pub use store::{AppState, Store};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `VISITROTA_DATA_DIR` overrides the default `~/.config/visitrota`;
/// tests and the CLI test harness use the override for isolation.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("VISITROTA_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("visitrota");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
