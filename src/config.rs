//! Environment configuration.
//!
//! `.env` is loaded by `main` through dotenvy before [`Config::from_env`] runs.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub base_currency: String,
    pub rates_api_url: String,
    pub image_upload_url: String,
    pub image_upload_key: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            base_currency: get("BASE_CURRENCY").unwrap_or_else(|| "USD".to_string()),
            rates_api_url: get("RATES_API_URL")
                .unwrap_or_else(|| "https://api.exchangerate-api.com/v4/latest".to_string()),
            image_upload_url: get("IMAGE_UPLOAD_URL")
                .unwrap_or_else(|| "https://api.imgbb.com/1/upload".to_string()),
            image_upload_key: get("IMAGE_UPLOAD_KEY"),
            cors_origins: get("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
