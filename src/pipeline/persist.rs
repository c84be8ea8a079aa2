// src/pipeline/persist.rs

//! Chunked persistence of new postings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{MAX_COMMIT_CEILING, Posting};
use crate::storage::DocumentStore;

/// Partial-result accounting for one batch write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Postings written by successful commits
    pub committed: usize,
    /// Postings in failed commits
    pub failed: usize,
    pub chunks: usize,
    pub failed_chunks: usize,
    /// Index (into the input) of the first committed posting
    pub first_committed: Option<usize>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed_chunks == 0
    }
}

/// Write `postings` to `collection` in commits of at most `max_ops` each.
///
/// A failed commit is logged and the remaining chunks are still attempted;
/// its postings stay unpersisted and are picked up again on the next run.
pub async fn batch_write(
    store: &dyn DocumentStore,
    collection: &str,
    postings: &[Posting],
    max_ops: usize,
    discovered_at: DateTime<Utc>,
) -> Result<BatchOutcome> {
    if max_ops == 0 || max_ops > MAX_COMMIT_CEILING {
        return Err(AppError::validation(format!(
            "max_ops_per_commit must be between 1 and {MAX_COMMIT_CEILING}, got {max_ops}"
        )));
    }

    let mut outcome = BatchOutcome::default();

    for (index, chunk) in postings.chunks(max_ops).enumerate() {
        let writes: Vec<(String, Value)> = chunk
            .iter()
            .map(|p| (p.id.clone(), p.to_document(discovered_at)))
            .collect();
        outcome.chunks += 1;

        match store.commit(collection, &writes).await {
            Ok(written) => {
                log::info!(
                    "Commit {} succeeded ({} documents)",
                    index + 1,
                    written
                );
                outcome.first_committed.get_or_insert(index * max_ops);
                outcome.committed += written;
            }
            Err(e) => {
                log::error!(
                    "Commit {} failed ({} documents): {}",
                    index + 1,
                    chunk.len(),
                    e
                );
                outcome.failed += chunk.len();
                outcome.failed_chunks += 1;
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn postings(n: usize) -> Vec<Posting> {
        (0..n)
            .map(|i| Posting {
                id: format!("id{i:04}"),
                site: "test".into(),
                title: format!("Intern {i}"),
                company: "Acme".into(),
                posted_date: "N/A".into(),
                link: format!("https://example.com/{i}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_chunks_never_exceed_limit() {
        for (n, expected) in [
            (0, vec![]),
            (1, vec![1]),
            (400, vec![400]),
            (800, vec![400, 400]),
            (801, vec![400, 400, 1]),
        ] {
            let store = MemoryStore::new();
            let outcome = batch_write(&store, "internships", &postings(n), 400, Utc::now())
                .await
                .unwrap();
            assert_eq!(store.commit_sizes(), expected, "n = {n}");
            assert_eq!(outcome.committed, n);
            assert!(outcome.is_complete());
        }
    }

    #[tokio::test]
    async fn test_failed_chunk_does_not_stop_later_chunks() {
        let store = MemoryStore::new().failing_commit(1);
        let input = postings(900);

        let outcome = batch_write(&store, "internships", &input, 400, Utc::now())
            .await
            .unwrap();

        assert_eq!(store.commit_sizes(), vec![400, 400, 100]);
        assert_eq!(outcome.committed, 500);
        assert_eq!(outcome.failed, 400);
        assert_eq!(outcome.chunks, 3);
        assert_eq!(outcome.failed_chunks, 1);
        assert_eq!(outcome.first_committed, Some(0));
        assert_eq!(store.len("internships"), 500);
        assert!(store.document("internships", "id0899").is_some());
        assert!(store.document("internships", "id0400").is_none());
    }

    #[tokio::test]
    async fn test_first_committed_skips_failed_chunk() {
        let store = MemoryStore::new().failing_commit(0);
        let outcome = batch_write(&store, "internships", &postings(5), 2, Utc::now())
            .await
            .unwrap();
        assert_eq!(outcome.first_committed, Some(2));
        assert_eq!(outcome.committed, 3);
    }

    #[tokio::test]
    async fn test_document_shape() {
        let store = MemoryStore::new();
        batch_write(&store, "internships", &postings(1), 10, Utc::now())
            .await
            .unwrap();

        let doc = store.document("internships", "id0000").unwrap();
        assert_eq!(doc["id"], "id0000");
        assert_eq!(doc["job_title"], "Intern 0");
        assert!(doc["discovered_at"].is_string());
    }

    #[tokio::test]
    async fn test_rejects_limit_out_of_range() {
        let store = MemoryStore::new();
        for max_ops in [0, MAX_COMMIT_CEILING + 1] {
            let result = batch_write(&store, "internships", &postings(3), max_ops, Utc::now()).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(store.commit_sizes().is_empty());
    }
}
