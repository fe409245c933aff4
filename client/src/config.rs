//! Configuration management for the INNOFarms planting client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with INNOFARMS__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

/// Main client configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Backend API configuration
    #[validate]
    pub api: ApiConfig,

    /// Farm the operator is working on
    #[validate]
    pub farm: FarmConfig,

    /// Durable client state
    pub state: StateConfig,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ApiConfig {
    /// Base URL of the INNOFarms REST backend
    #[validate(url)]
    pub base_url: String,

    /// Bearer token sent with every request, if any
    pub auth_token: Option<String>,

    /// Per-request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct FarmConfig {
    /// Farm identifier
    #[validate(range(min = 1))]
    pub id: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    /// JSON file holding flags shared with the dashboard
    pub path: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("INNOFARMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:5000")?
            .set_default("api.timeout_secs", 30)?
            .set_default("farm.id", 1)?
            .set_default("state.path", ".innofarms/client-state.json")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (INNOFARMS__ prefix)
            .add_source(
                Environment::with_prefix("INNOFARMS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }
}
