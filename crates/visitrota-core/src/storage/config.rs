//! TOML-based application configuration.
//!
//! Stores the Google OAuth client credentials and the calendar time zone.
//! Configuration lives at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{Result, RotaError};

/// Google OAuth client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

/// Calendar event configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// IANA time zone attached to event start/end times.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
        }
    }
}

fn default_time_zone() -> String {
    "America/New_York".to_string()
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Config {
    /// Load the configuration, falling back to defaults if the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        let Ok(dir) = data_dir() else {
            return Self::default();
        };

        std::fs::read_to_string(dir.join("config.toml"))
            .ok()
            .and_then(|raw| toml::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<()> {
        let raw = toml::to_string_pretty(self)
            .map_err(|e| RotaError::invalid("config", e.to_string()))?;
        std::fs::write(data_dir()?.join("config.toml"), raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let decoded: Config = toml::from_str(&raw).unwrap();
        assert_eq!(decoded.calendar.time_zone, "America/New_York");
        assert!(decoded.google.client_id.is_empty());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let decoded: Config = toml::from_str("[google]\nclient_id = \"cid\"\n").unwrap();
        assert_eq!(decoded.google.client_id, "cid");
        assert_eq!(decoded.calendar.time_zone, "America/New_York");
    }
}
