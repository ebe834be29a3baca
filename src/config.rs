//! Engine configuration
//!
//! Defaults suit a single-node deployment; everything can be overridden
//! through `MELETE_`-prefixed environment variables
//! (e.g. `MELETE_DATABASE_URL`, `MELETE_MAX_WRITE_RETRIES`).

use crate::error::Result;
use serde::Deserialize;

/// Runtime configuration for the progress engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite database URL for the default storage backend
    pub database_url: String,

    /// How many times the recorder retries a contended write before
    /// surfacing the conflict
    pub max_write_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://melete.db".to_string(),
            max_write_retries: 3,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MELETE"))
            .build()?;

        let mut resolved = Self::default();
        if let Ok(url) = config.get_string("database_url") {
            resolved.database_url = url;
        }
        if let Ok(retries) = config.get_int("max_write_retries") {
            resolved.max_write_retries = retries.max(0) as u32;
        }

        Ok(resolved)
    }
}
