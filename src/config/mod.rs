mod api;
mod defaults;
mod validation;

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::{
    default_api_base_url, default_data_dir, DEFAULT_REFRESH_DEBOUNCE_MS,
    DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use validation::{expand_env_var_in_string, normalize_base_url};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
    #[serde(default)]
    pub refresh_debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub refresh_interval: Duration,
    pub refresh_debounce: Duration,
    pub data_dir: PathBuf,
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self, String> {
        // Load file configuration first
        let json_config = JsonConfig::load().map_err(|e| format!("{:#}", e))?;
        Self::resolve(args, json_config)
    }

    /// Merge sources: CLI args > env vars > config file > defaults
    pub fn resolve(args: &Args, json_config: JsonConfig) -> Result<Self, String> {
        let api_base_url = args
            .api_url
            .clone()
            .or_else(|| env::var("CINESYNC_API_URL").ok())
            .or(json_config.api.base_url.clone())
            .map(|url| expand_env_var_in_string(&url))
            .unwrap_or_else(default_api_base_url);
        let api_base_url = normalize_base_url(&api_base_url)?;

        let request_timeout = env::var("CINESYNC_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(json_config.api.timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let refresh_interval = env::var("CINESYNC_REFRESH_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(json_config.session.refresh_interval_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
        if refresh_interval == 0 {
            return Err("refresh interval must be at least one second".to_string());
        }

        let refresh_debounce = json_config
            .session
            .refresh_debounce_ms
            .unwrap_or(DEFAULT_REFRESH_DEBOUNCE_MS);

        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| env::var("CINESYNC_DATA_DIR").ok().map(PathBuf::from))
            .or(json_config.storage.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        let verbose = args.verbose
            || env::var("CINESYNC_VERBOSE")
                .ok()
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .or(json_config.logging.verbose)
                .unwrap_or(false);

        Ok(Config {
            api_base_url,
            request_timeout: Duration::from_secs(request_timeout),
            refresh_interval: Duration::from_secs(refresh_interval),
            refresh_debounce: Duration::from_millis(refresh_debounce),
            data_dir,
            verbose,
        })
    }
}

impl JsonConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str());
        let config: JsonConfig = if matches!(extension, Some("yaml") | Some("yml")) {
            serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse YAML config file: {}", path.display())
            })?
        } else {
            serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse JSON config file: {}", path.display())
            })?
        };
        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory (local override)
        paths.push(PathBuf::from(".cinesync.yaml"));
        paths.push(PathBuf::from(".cinesync.yml"));
        paths.push(PathBuf::from(".cinesync.json"));

        // 2. User's config directory
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("cinesync");
            paths.push(config_dir.join("cinesync.yaml"));
            paths.push(config_dir.join("cinesync.yml"));
            paths.push(config_dir.join("cinesync.json"));
        }

        paths
    }
}
