// src/config.rs

//! Configuration loading and service construction.
//!
//! [`Services`] holds the long-lived clients for one process: built once at
//! startup from [`Config`] and passed by reference to the pipeline.

use std::env;
use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, PushBackend, StoreBackend};
use crate::services::{Browser, FcmClient, HttpBrowser, LogPush, PushService};
use crate::storage::{DocumentStore, FirestoreStore, LocalStore};
use crate::utils::http;

/// Load configuration from a TOML file and validate it.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Read an access token from the environment variable `name`.
fn access_token(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AppError::config(format!(
            "Access token not set: export {name}"
        ))),
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| AppError::config(format!("{key} is required")))
}

/// Process-wide collaborators used by a pipeline run.
#[derive(Clone)]
pub struct Services {
    pub browser: Arc<dyn Browser>,
    pub store: Arc<dyn DocumentStore>,
    /// `None` when notifications are disabled
    pub push: Option<Arc<dyn PushService>>,
}

impl Services {
    /// Build every client named by `config`.
    ///
    /// Missing credentials for a remote backend are a fatal error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let page_client = http::create_async_client(&config.scraper)?;
        let browser: Arc<dyn Browser> =
            Arc::new(HttpBrowser::new(page_client, config.scraper.poll_interval()));

        let store = Self::build_store(config)?;
        let push = if config.notifier.enabled {
            Some(Self::build_push(config)?)
        } else {
            None
        };

        Ok(Self {
            browser,
            store,
            push,
        })
    }

    /// Build only the document store.
    pub fn build_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
        let store = &config.store;
        let built: Arc<dyn DocumentStore> = match store.backend {
            StoreBackend::Local => {
                log::info!("Using local store at {}", store.local_path);
                Arc::new(LocalStore::new(&store.local_path))
            }
            StoreBackend::Firestore => {
                let project = required(&store.project_id, "store.project_id")?;
                let token = access_token(&store.access_token_env)?;
                log::info!("Using Firestore project '{}'", project);
                Arc::new(FirestoreStore::new(
                    http::create_api_client()?,
                    project,
                    token,
                ))
            }
        };
        Ok(built)
    }

    fn build_push(config: &Config) -> Result<Arc<dyn PushService>> {
        let notifier = &config.notifier;
        let built: Arc<dyn PushService> = match notifier.backend {
            PushBackend::Log => Arc::new(LogPush),
            PushBackend::Fcm => {
                let project = required(&notifier.project_id, "notifier.project_id")?;
                let token = access_token(&notifier.access_token_env)?;
                Arc::new(FcmClient::new(http::create_api_client()?, project, token))
            }
        };
        Ok(built)
    }
}
