use serde::{Deserialize, Serialize};

const CONFIG_FILE_PATH: &str = "config.toml";
const DEFAULT_API_BASE: &str = "http://localhost:5001/api";

/// Client configuration.
///
/// Read from `config.toml` in the working directory when present, then
/// overridden by environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix.
    pub api_base: String,
    /// Per-request timeout in seconds. `None` keeps reqwest's default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        let mut config = ClientConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: None,
        };

        //detect the config file exists
        if std::path::Path::new(CONFIG_FILE_PATH).exists() {
            if let Ok(content) = std::fs::read_to_string(CONFIG_FILE_PATH) {
                if let Ok(file_config) = toml::from_str::<ClientConfig>(&content) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables if they exist
        if let Ok(api_base) = std::env::var("API_BASE_URL") {
            config.api_base = api_base;
        }
        if let Ok(timeout) = std::env::var("AMSTERDAM_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.trim().parse() {
                config.timeout_secs = Some(secs);
            }
        }
        config
    }

    /// Config pointing at an explicit base URL, mainly for tests.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        ClientConfig {
            api_base: api_base.into(),
            timeout_secs: None,
        }
    }
}
