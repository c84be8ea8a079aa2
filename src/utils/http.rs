// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::ScraperConfig;

/// Create a configured asynchronous HTTP client for page loads.
pub fn create_async_client(config: &ScraperConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.navigation_timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a client for backend API calls (store, push).
pub fn create_api_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}
