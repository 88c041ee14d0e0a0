use std::path::PathBuf;

use crate::constants::{
    DEFAULT_DATABASE, DEFAULT_TIMEOUT_SECS, GEOCODING_API_BASE, OPEN_METEO_API_BASE, USER_AGENT,
};
use crate::error::StoreError;
use crate::store::Store;

/// Where and how to reach the weather source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub forecast_base: String,
    pub geocoding_base: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            forecast_base: OPEN_METEO_API_BASE.to_string(),
            geocoding_base: GEOCODING_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Everything a command needs besides its own arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: PathBuf,
    pub service: ServiceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            service: ServiceConfig::default(),
        }
    }
}

impl Config {
    /// Store handle for the configured database
    #[must_use]
    pub fn store(&self) -> Store {
        Store::new(&self.database)
    }

    /// Store handle whose table is guaranteed to exist
    pub fn open_store(&self) -> Result<Store, StoreError> {
        let store = self.store();
        store.initialize()?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let config = Config::default();
        assert_eq!(config.database, PathBuf::from("clothing_data.db"));
        assert!(config.service.forecast_base.starts_with("https://api.open-meteo.com"));
        assert!(config.service.geocoding_base.contains("geocoding-api"));
        assert_eq!(config.store().path(), config.database.as_path());
    }

    #[test]
    fn opened_store_on_a_fresh_path_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database: dir.path().join("fresh.db"),
            ..Config::default()
        };
        let store = config.open_store().unwrap();
        assert_eq!(store.load_all().unwrap(), Vec::new());
    }
}
