//! Shared construction helpers for CLI commands.

use visitrota_core::{Config, GoogleCalendar, RotaService, Store};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Build the service from the on-disk config and store.
pub fn service() -> Result<RotaService<GoogleCalendar>, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = Store::open()?;
    let calendar = GoogleCalendar::from_config(&config);
    Ok(RotaService::new(store, calendar))
}
