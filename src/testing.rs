// src/testing.rs

//! In-memory collaborators for tests.
//!
//! These stand in for the browser, the document store and the push service
//! so the pipeline can be exercised end to end without network access.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::services::browser::{Browser, Document, Page};
use crate::services::push::{PushMessage, PushService};
use crate::storage::DocumentStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Static Browser
// =============================================================================

/// Browser serving fixed HTML per URL.
#[derive(Clone, Default)]
pub struct StaticBrowser {
    pages: Arc<HashMap<String, String>>,
    failures: Arc<HashSet<String>>,
}

impl StaticBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), html.to_string());
        self
    }

    /// Make navigation to `url` fail.
    pub fn with_failure(mut self, url: &str) -> Self {
        Arc::make_mut(&mut self.failures).insert(url.to_string());
        self
    }
}

#[async_trait]
impl Browser for StaticBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(StaticPage {
            browser: self.clone(),
            html: None,
        }))
    }
}

struct StaticPage {
    browser: StaticBrowser,
    html: Option<String>,
}

#[async_trait]
impl Page for StaticPage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        if self.browser.failures.contains(url) {
            return Err(AppError::navigation(url, "connection refused"));
        }
        let html = self
            .browser
            .pages
            .get(url)
            .ok_or_else(|| AppError::navigation(url, "404 Not Found"))?;
        self.html = Some(html.clone());
        Ok(())
    }

    async fn wait_for_match(&mut self, selector: &str, _timeout: Duration) -> Result<bool> {
        match &self.html {
            Some(html) => Document::parse(html).matches(selector),
            None => Ok(false),
        }
    }

    fn content(&self) -> Option<&str> {
        self.html.as_deref()
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Document store held in memory, with injectable failures.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, Value>>>,
    commit_sizes: Mutex<Vec<usize>>,
    failing_commits: HashSet<usize>,
    fail_reads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `collection` with documents under `ids`.
    pub fn with_ids<I, S>(self, collection: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut collections = lock(&self.collections);
            let docs = collections.entry(collection.to_string()).or_default();
            for id in ids {
                docs.insert(id.into(), Value::Null);
            }
        }
        self
    }

    /// Fail the commit attempt with this 0-based index.
    pub fn failing_commit(mut self, attempt: usize) -> Self {
        self.failing_commits.insert(attempt);
        self
    }

    /// Fail every id snapshot read.
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Sizes of every commit attempted, including failed ones.
    pub fn commit_sizes(&self) -> Vec<usize> {
        lock(&self.commit_sizes).clone()
    }

    /// Stored document for `id`.
    pub fn document(&self, collection: &str, id: &str) -> Option<Value> {
        lock(&self.collections)
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        lock(&self.collections)
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn stream_all_ids(&self, collection: &str) -> Result<HashSet<String>> {
        if self.fail_reads {
            return Err(AppError::store("permission denied"));
        }
        Ok(lock(&self.collections)
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn commit(&self, collection: &str, writes: &[(String, Value)]) -> Result<usize> {
        let attempt = {
            let mut sizes = lock(&self.commit_sizes);
            sizes.push(writes.len());
            sizes.len() - 1
        };
        if self.failing_commits.contains(&attempt) {
            return Err(AppError::store(format!("commit #{attempt} aborted")));
        }

        let mut collections = lock(&self.collections);
        let docs = collections.entry(collection.to_string()).or_default();
        for (id, doc) in writes {
            docs.insert(id.clone(), doc.clone());
        }
        Ok(writes.len())
    }
}

// =============================================================================
// Recording Push Service
// =============================================================================

/// Push service that records every message.
#[derive(Default)]
pub struct RecordingPush {
    sent: Mutex<Vec<(String, PushMessage)>>,
    fail: bool,
}

impl RecordingPush {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every publish after recording it.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// All (topic, message) pairs published so far.
    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl PushService for RecordingPush {
    async fn publish(&self, topic: &str, message: &PushMessage) -> Result<String> {
        let receipt = {
            let mut sent = lock(&self.sent);
            sent.push((topic.to_string(), message.clone()));
            format!("projects/test/messages/{}", sent.len())
        };
        if self.fail {
            return Err(AppError::push("UNAVAILABLE"));
        }
        Ok(receipt)
    }
}
