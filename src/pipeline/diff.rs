//! Diff calculation against the known id snapshot.
//!
//! Classifies freshly scraped postings as new or already known. This is the
//! only place that decision is made; the caller supplies the snapshot read
//! from the store and consumes the result.

use std::collections::HashSet;

use crate::models::Posting;

/// Classification of one run's postings.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Postings whose id is not in the snapshot, in input order
    pub new: Vec<Posting>,
    /// Postings already persisted by an earlier run
    pub already_known: usize,
    /// Postings without a usable id
    pub unaddressable: usize,
}

impl DiffResult {
    /// Check if there is anything new to persist.
    pub fn has_changes(&self) -> bool {
        !self.new.is_empty()
    }

    pub fn new_ids(&self) -> Vec<&str> {
        self.new.iter().map(|p| p.id.as_str()).collect()
    }
}

/// Compute the postings not yet present in `known`, preserving order.
///
/// Postings with an empty id are excluded and counted as unaddressable.
pub fn calculate_diff(known: &HashSet<String>, postings: &[Posting]) -> DiffResult {
    let mut result = DiffResult::default();

    for posting in postings {
        if !posting.has_id() {
            result.unaddressable += 1;
        } else if known.contains(&posting.id) {
            result.already_known += 1;
        } else {
            result.new.push(posting.clone());
        }
    }

    log::info!(
        "Diff: {} new, {} known, {} unaddressable",
        result.new.len(),
        result.already_known,
        result.unaddressable
    );
    result
}

/// Drop later postings that repeat an earlier id, keeping the first.
///
/// Returns the number of duplicates removed.
pub fn dedupe_by_id(postings: &mut Vec<Posting>) -> usize {
    let before = postings.len();
    let mut seen = HashSet::new();
    postings.retain(|p| !p.has_id() || seen.insert(p.id.clone()));
    before - postings.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_posting(id: &str, title: &str) -> Posting {
        Posting {
            id: id.to_string(),
            site: "Test".into(),
            title: title.to_string(),
            company: "Acme".into(),
            posted_date: "2026-02-02".into(),
            link: format!("https://example.com/{}", id),
        }
    }

    fn known(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_changes() {
        let postings = vec![make_posting("001", "Title 1"), make_posting("002", "Title 2")];

        let result = calculate_diff(&known(&["001", "002"]), &postings);
        assert!(!result.has_changes());
        assert_eq!(result.already_known, 2);
    }

    #[test]
    fn test_order_preserved_across_sites() {
        let postings = vec![
            make_posting("a1", "A"),
            make_posting("a3", "A"),
            make_posting("a4", "A"),
            make_posting("a2", "B"),
            make_posting("a5", "B"),
        ];

        let result = calculate_diff(&known(&["a1", "a2"]), &postings);
        assert_eq!(result.new_ids(), vec!["a3", "a4", "a5"]);
        assert_eq!(result.already_known, 2);
    }

    #[test]
    fn test_empty_id_never_new() {
        let postings = vec![make_posting("", "No link"), make_posting("003", "Has link")];

        let result = calculate_diff(&HashSet::new(), &postings);
        assert_eq!(result.new_ids(), vec!["003"]);
        assert_eq!(result.unaddressable, 1);
    }

    #[test]
    fn test_empty_to_full() {
        let postings = vec![make_posting("001", "First")];

        let result = calculate_diff(&HashSet::new(), &postings);
        assert_eq!(result.new.len(), 1);
        assert_eq!(result.already_known, 0);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let mut postings = vec![
            make_posting("001", "From A"),
            make_posting("002", "From A"),
            make_posting("001", "From B"),
            make_posting("", "x"),
            make_posting("", "y"),
        ];

        assert_eq!(dedupe_by_id(&mut postings), 1);
        assert_eq!(postings.len(), 4);
        assert_eq!(postings[0].title, "From A");
        assert_eq!(postings[1].id, "002");
    }
}
