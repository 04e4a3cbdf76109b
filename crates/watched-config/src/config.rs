use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::paths::PathManager;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub serializd: SerializdConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializdConfig {
    /// Base URL for the JSON API (login and probe paths are appended to it)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Public site URL, used for request headers and the diary page
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Profile whose activity is probed
    #[serde(default = "default_username")]
    pub username: String,

    /// Candidate paths, tried in order; `{username}` is substituted
    #[serde(default = "default_probe_endpoints")]
    pub probe_endpoints: Vec<String>,

    /// Top-level response keys that may hold the record list, in priority order
    #[serde(default = "default_data_keys")]
    pub data_keys: Vec<String>,

    /// JSON array of raw records used when nothing could be fetched
    #[serde(default)]
    pub fallback_file: Option<PathBuf>,

    /// Scrape the public diary page before falling back to sample data
    #[serde(default)]
    pub scrape_diary: bool,

    /// Per-request timeout; unset means requests wait until they finish
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when neither `-v` nor RUST_LOG is given (e.g. "info", "warn")
    #[serde(default)]
    pub level: Option<String>,
    /// Force JSON (true) or plain (false) log lines; unset detects from stderr
    #[serde(default)]
    pub json: Option<bool>,
    /// Also write logs to a daily-rotated file at this path
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "https://www.serializd.com/api".to_string()
}

fn default_site_url() -> String {
    "https://www.serializd.com".to_string()
}

fn default_username() -> String {
    "sattiyans".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; serializd-watched/0.1)".to_string()
}

pub fn default_probe_endpoints() -> Vec<String> {
    [
        "/user/{username}",
        "/user/{username}/profile",
        "/user/{username}/activity",
        "/user/{username}/watching",
        "/user/{username}/recent",
        "/api/user/{username}",
        "/api/user/{username}/activity",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_data_keys() -> Vec<String> {
    [
        "shows",
        "watched",
        "activity",
        "episodes",
        "seasons",
        "currently_watching",
        "recent_activity",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SerializdConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            site_url: default_site_url(),
            username: default_username(),
            probe_endpoints: default_probe_endpoints(),
            data_keys: default_data_keys(),
            fallback_file: None,
            scrape_diary: false,
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration for a run.
    ///
    /// An explicit path must exist. Without one, the default config file is used
    /// when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let path = PathManager::default().config_file();
                if path.exists() {
                    Self::load_from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let serializd = &self.serializd;

        if !serializd.api_base_url.starts_with("http") {
            return Err(anyhow::anyhow!("api_base_url must be an http(s) URL: {}", serializd.api_base_url));
        }
        if !serializd.site_url.starts_with("http") {
            return Err(anyhow::anyhow!("site_url must be an http(s) URL: {}", serializd.site_url));
        }
        if serializd.username.trim().is_empty() {
            return Err(anyhow::anyhow!("username cannot be empty"));
        }
        if serializd.probe_endpoints.is_empty() {
            return Err(anyhow::anyhow!("probe_endpoints cannot be empty"));
        }
        if serializd.data_keys.is_empty() {
            return Err(anyhow::anyhow!("data_keys cannot be empty"));
        }

        Ok(())
    }
}
