//! Service layer for the internship watcher.
//!
//! This module contains the collaborators the pipeline talks to:
//! - Page loading and element lookup (`browser`)
//! - Per-site posting extraction (`SourceAdapter`)
//! - Push notification delivery (`push`)

mod adapter;
pub mod browser;
pub mod push;

pub use adapter::SourceAdapter;
pub use browser::{Browser, Document, HttpBrowser, Page};
pub use push::{FcmClient, LogPush, PushMessage, PushService};
