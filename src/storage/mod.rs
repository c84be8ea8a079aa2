//! Storage abstractions for posting persistence.
//!
//! Postings live in a document store as one document per posting, keyed by
//! the posting id, inside a single collection:
//!
//! ```text
//! internships/
//! ├── 3f2a…c91e    { id, site, job_title, company, date, link, discovered_at }
//! └── 8b07…44d0
//! ```
//!
//! Writes are grouped into commits; each commit is atomic on the backend.

pub mod firestore;
pub mod local;

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// Re-export for convenience
pub use firestore::FirestoreStore;
pub use local::LocalStore;

/// Trait for document store backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ids of every document currently in `collection`.
    async fn stream_all_ids(&self, collection: &str) -> Result<HashSet<String>>;

    /// Write all `(id, document)` pairs in one atomic commit.
    ///
    /// Existing documents with the same id are replaced. Returns the number
    /// of documents written.
    async fn commit(&self, collection: &str, writes: &[(String, Value)]) -> Result<usize>;
}
