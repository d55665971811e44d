use image_catalog::{DEFAULT_COLLECTION, DEFAULT_OBJECT_KEY, DEFAULT_PAGE_SIZE, DEFAULT_SYNC_PATH};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Application configuration loaded from image-dash.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_function_base")]
    pub function_base: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_object_key")]
    pub object_key: String,
    #[serde(default = "default_sync_path")]
    pub sync_path: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Serve the built-in mock catalog instead of talking to the API
    #[serde(default)]
    pub mock: bool,
    /// JSON collection payload written by the seed command
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_api_base() -> String {
    "https://api.crowdstrike.com".to_string()
}

fn default_function_base() -> String {
    "https://api.crowdstrike.com/functions/syncimages".to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_object_key() -> String {
    DEFAULT_OBJECT_KEY.to_string()
}

fn default_sync_path() -> String {
    DEFAULT_SYNC_PATH.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            function_base: default_function_base(),
            collection: default_collection(),
            object_key: default_object_key(),
            sync_path: default_sync_path(),
            page_size: default_page_size(),
            mock: false,
            seed_file: None,
        }
    }
}

impl Config {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        const CONFIG_FILE: &str = "image-dash.toml";

        // Try current directory first
        if let Ok(content) = std::fs::read_to_string(CONFIG_FILE)
            && let Ok(config) = toml::from_str(&content)
        {
            log::debug!("Loaded config from {}", CONFIG_FILE);
            return config;
        }

        // Try home directory
        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home).join(format!(".{}", CONFIG_FILE));
            if let Ok(content) = std::fs::read_to_string(&home_config)
                && let Ok(config) = toml::from_str(&content)
            {
                log::debug!("Loaded config from {}", home_config.display());
                return config;
            }
        }

        log::debug!("Using default config");
        Self::default()
    }

    /// Mock mode is on when configured or forced via IMAGE_DASH_MOCK
    pub fn use_mock(&self) -> bool {
        self.mock
            || env::var("IMAGE_DASH_MOCK")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
    }
}
