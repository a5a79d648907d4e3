//! Application Configuration Module
//!
//! This module centralizes the configuration for the InterPrep service.
//! It loads settings from environment variables and provides a single,
//! shareable struct that can be passed throughout the application.

use std::env;
use tracing::Level;

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub vapi_api_key: String,
    pub vapi_base_url: String,
    /// Agent script for "generate" sessions. Only required when one runs.
    pub workflow_id: Option<String>,
    /// Agent script for interview sessions.
    pub interviewer_id: String,
    /// Base URL of the application backend hosting the identity session
    /// and feedback generation endpoints.
    pub app_base_url: String,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `VAPI_API_KEY`: Your secret key for the voice provider. Required.
    // *   `VAPI_BASE_URL`: (Optional) The provider's realtime endpoint.
    // *   `VAPI_WORKFLOW_ID`: The agent script for "generate" sessions. Required only for those.
    // *   `VAPI_INTERVIEWER_ID`: (Optional) The agent script for interview sessions. Defaults to "interviewer".
    // *   `APP_BASE_URL`: (Optional) The application backend. Defaults to "http://localhost:3000".
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();

        let vapi_api_key = env::var("VAPI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("VAPI_API_KEY".to_string()))?;
        let vapi_base_url =
            env::var("VAPI_BASE_URL").unwrap_or_else(|_| "wss://realtime.vapi.ai".to_string());

        let workflow_id = env::var("VAPI_WORKFLOW_ID").ok();
        let interviewer_id =
            env::var("VAPI_INTERVIEWER_ID").unwrap_or_else(|_| "interviewer".to_string());

        let app_base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        // Configure logging level from RUST_LOG, with a sensible default.
        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            vapi_api_key,
            vapi_base_url,
            workflow_id,
            interviewer_id,
            app_base_url,
            log_level,
        })
    }
}
