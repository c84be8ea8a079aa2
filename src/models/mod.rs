// src/models/mod.rs

//! Domain models for the internship watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;
mod site;
mod strategy;

// Re-export all public types
pub use config::{
    Config, MAX_COMMIT_CEILING, NotifierConfig, PushBackend, ScraperConfig, StoreBackend,
    StoreConfig,
};
pub use posting::{Posting, SENTINEL, or_sentinel};
pub use site::{SiteConfig, SiteStrategies, default_sites};
pub use strategy::{ExtractionStrategy, Hit};
