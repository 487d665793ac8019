//! Layered configuration for the `watch` and `config` commands
//!
//! Sources, lowest priority first: struct defaults, the TOML file, then
//! `STREAMWATCH__*` environment variables (a `.env` file is read too).
//! Durations accept `"500ms"`, `"30s"`, `"5m"`, `"1h"` or a bare number
//! of milliseconds.
//!
//! ```no_run
//! use streamwatch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("tracking {} streams", config.streams.len());
//! ```
//!
//! Nested keys are joined with `__`, lists with `,`:
//! - `STREAMWATCH__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `STREAMWATCH__SESSION__INTERVAL=10s`
//! - `STREAMWATCH__STREAMS=https://a/live.m3u8,https://b/live.m3u8`
//!
//! The file defaults to `config/streamwatch.toml`; set `STREAMWATCH_CONFIG`
//! to point elsewhere.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, HttpClientConfig, ServerConfig, SessionConfig};
pub use validation::ValidationError;

use crate::settings::CrawlerSettings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Loads from the default file location plus the environment, then validates
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Same as [`Config::load`] with an explicit file path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Runtime scheduling settings for [`crate::crawler::HlsCrawler`]
    pub fn crawler_settings(&self) -> CrawlerSettings {
        CrawlerSettings::from(&self.session)
    }
}
