//! Application configuration structures.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{SiteConfig, default_sites};

/// Hard ceiling on writes per Firestore commit.
pub const MAX_COMMIT_CEILING: usize = 500;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Page loading behavior
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Where postings are persisted
    #[serde(default)]
    pub store: StoreConfig,

    /// Push notification settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Job boards to watch
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.navigation_timeout_secs == 0 {
            return Err(AppError::validation(
                "scraper.navigation_timeout_secs must be > 0",
            ));
        }
        if self.scraper.wait_timeout_ms == 0 {
            return Err(AppError::validation("scraper.wait_timeout_ms must be > 0"));
        }
        if self.scraper.poll_interval_ms == 0 {
            return Err(AppError::validation("scraper.poll_interval_ms must be > 0"));
        }

        if self.store.collection.trim().is_empty() {
            return Err(AppError::validation("store.collection is empty"));
        }
        if self.store.max_ops_per_commit == 0 || self.store.max_ops_per_commit > MAX_COMMIT_CEILING
        {
            return Err(AppError::validation(format!(
                "store.max_ops_per_commit must be within 1..={MAX_COMMIT_CEILING}"
            )));
        }
        if self.store.backend == StoreBackend::Firestore && self.store.project_id.is_none() {
            return Err(AppError::validation(
                "store.project_id is required for the firestore backend",
            ));
        }

        if self.notifier.enabled {
            if self.notifier.topic.trim().is_empty() {
                return Err(AppError::validation("notifier.topic is empty"));
            }
            if self.notifier.backend == PushBackend::Fcm && self.notifier.project_id.is_none() {
                return Err(AppError::validation(
                    "notifier.project_id is required for the fcm backend",
                ));
            }
        }

        if self.sites.is_empty() {
            return Err(AppError::validation("No sites defined"));
        }
        let mut names = HashSet::new();
        for site in &self.sites {
            site.validate()?;
            if !names.insert(site.name.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate site name '{}'",
                    site.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            store: StoreConfig::default(),
            notifier: NotifierConfig::default(),
            sites: default_sites(),
        }
    }
}

/// Page loading behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Budget for loading one page, in seconds
    #[serde(default = "defaults::navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Budget for each container candidate, in milliseconds
    #[serde(default = "defaults::wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Delay between reloads while waiting for a container
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,
}

impl ScraperConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            navigation_timeout_secs: defaults::navigation_timeout(),
            wait_timeout_ms: defaults::wait_timeout(),
            poll_interval_ms: defaults::poll_interval(),
        }
    }
}

/// Document store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON file on local disk
    #[default]
    Local,
    /// Cloud Firestore over REST
    Firestore,
}

/// Where postings are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Collection holding one document per posting
    #[serde(default = "defaults::collection")]
    pub collection: String,

    /// Maximum writes per commit (backend ceiling minus safety margin)
    #[serde(default = "defaults::max_ops_per_commit")]
    pub max_ops_per_commit: usize,

    /// File used by the local backend
    #[serde(default = "defaults::local_path")]
    pub local_path: String,

    /// Google Cloud project for the firestore backend
    #[serde(default)]
    pub project_id: Option<String>,

    /// Environment variable holding an OAuth access token
    #[serde(default = "defaults::access_token_env")]
    pub access_token_env: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            collection: defaults::collection(),
            max_ops_per_commit: defaults::max_ops_per_commit(),
            local_path: defaults::local_path(),
            project_id: None,
            access_token_env: defaults::access_token_env(),
        }
    }
}

/// Push notification backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PushBackend {
    /// Write the message to the log only
    #[default]
    Log,
    /// Firebase Cloud Messaging HTTP v1
    Fcm,
}

/// Push notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: PushBackend,

    /// Topic the mobile clients subscribe to
    #[serde(default = "defaults::topic")]
    pub topic: String,

    /// Firebase project for the fcm backend
    #[serde(default)]
    pub project_id: Option<String>,

    /// Environment variable holding an OAuth access token
    #[serde(default = "defaults::access_token_env")]
    pub access_token_env: String,

    /// Routing metadata attached to every message
    #[serde(default = "defaults::routing_data")]
    pub data: BTreeMap<String, String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            backend: PushBackend::default(),
            topic: defaults::topic(),
            project_id: None,
            access_token_env: defaults::access_token_env(),
            data: defaults::routing_data(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; internscout/0.1)".into()
    }
    pub fn navigation_timeout() -> u64 {
        30
    }
    pub fn wait_timeout() -> u64 {
        5000
    }
    pub fn poll_interval() -> u64 {
        500
    }

    // Store defaults
    pub fn collection() -> String {
        "internships".into()
    }
    pub fn max_ops_per_commit() -> usize {
        400
    }
    pub fn local_path() -> String {
        "storage/internships.json".into()
    }
    pub fn access_token_env() -> String {
        "GOOGLE_ACCESS_TOKEN".into()
    }

    // Notifier defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn topic() -> String {
        "internships".into()
    }
    pub fn routing_data() -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "click_action".to_string(),
                "FLUTTER_NOTIFICATION_CLICK".to_string(),
            ),
            ("screen".to_string(), "Home".to_string()),
        ])
    }
}
