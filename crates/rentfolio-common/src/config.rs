use anyhow::{anyhow, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Process-level configuration for the dashboard's data-access layer.
///
/// Resolution order: built-in defaults, then `rentfolio.toml` (or an
/// explicit path), then `RENTFOLIO_*` environment variables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST backend, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// API key sent as the `X-API-Key` header on every request.
    pub api_key: String,
    /// Fixed ceiling for every network call, in seconds.
    pub timeout_secs: u64,
    /// Page size used by list controllers when none is given.
    pub default_page_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            default_page_limit: 25,
        }
    }
}

impl Config {
    pub fn load(path_override: Option<PathBuf>) -> Result<Self> {
        let default_config = Config::default();
        let mut figment = Figment::from(Serialized::defaults(default_config));

        if let Some(path) = path_override {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
            }
        } else {
            let default_path = PathBuf::from("rentfolio.toml");
            if default_path.exists() {
                figment = figment.merge(Toml::file(default_path));
            }
        }

        figment = figment.merge(Env::prefixed("RENTFOLIO_"));

        figment
            .extract()
            .map_err(|e| anyhow!("Configuration error: {}", e))
    }

    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }
}
