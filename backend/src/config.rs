//! Configuration management for the Agri Advisor server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with AGRI__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// On-disk locations for persisted state and pages
    pub storage: StorageConfig,

    /// Crop recommendation model configuration
    pub model: ModelConfig,

    /// Generative language API configuration
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding submitted locations
    pub locations_file: PathBuf,

    /// Directory receiving one archive file per generated solution
    pub solutions_dir: PathBuf,

    /// Directory holding the HTML pages
    pub templates_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// XGBoost tree dump of the crop classifier
    pub path: PathBuf,

    /// JSON array of class labels, in training order
    pub classes_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key; there is no default, it must come from the environment
    pub api_key: String,

    /// Model name, e.g. gemini-1.5-pro
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Upper bound on one generation call
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.locations_file", "user_locations/locations.json")?
            .set_default("storage.solutions_dir", "solutions")?
            .set_default("storage.templates_dir", "templates")?
            .set_default("model.path", "models/crop_recommender.model")?
            .set_default("model.classes_path", "models/crop_classes.json")?
            .set_default("gemini.model", "gemini-1.5-pro")?
            .set_default(
                "gemini.base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.timeout_secs", 60)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRI__ prefix)
            .add_source(
                Environment::with_prefix("AGRI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        if config.gemini.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "gemini.api_key is empty; set AGRI__GEMINI__API_KEY".into(),
            ));
        }
        Ok(config)
    }

    /// Address the server binds to
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
