//! Content-addressed posting identity.
//!
//! A posting's id is derived from its canonical link only, so the same
//! posting maps to the same document across runs and across sites.

use sha2::{Digest, Sha256};

use crate::models::{Posting, SENTINEL};
use crate::utils::is_absolute_http;

/// Number of digest bytes kept in an id (128 bits).
const ID_BYTES: usize = 16;

/// Hash a canonical link into a 32-character hex id.
pub fn content_id(link: &str) -> String {
    let digest = Sha256::digest(link.as_bytes());
    hex::encode(&digest[..ID_BYTES])
}

/// Whether `link` can identify a posting.
pub fn is_addressable(link: &str) -> bool {
    let link = link.trim();
    !link.is_empty() && link != SENTINEL && is_absolute_http(link)
}

/// Set the posting's id from its link; unaddressable postings get an empty id.
pub fn assign_id(mut posting: Posting) -> Posting {
    posting.id = if is_addressable(&posting.link) {
        content_id(posting.link.trim())
    } else {
        String::new()
    };
    posting
}

/// Assign ids to every posting, preserving order.
pub fn assign_ids(postings: Vec<Posting>) -> Vec<Posting> {
    postings.into_iter().map(assign_id).collect()
}

/// Separate id-bearing postings from unaddressable ones.
///
/// Returns the addressable postings in input order and the number
/// dropped.
pub fn split_addressable(postings: Vec<Posting>) -> (Vec<Posting>, usize) {
    let total = postings.len();
    let kept: Vec<Posting> = postings.into_iter().filter(Posting::has_id).collect();
    let dropped = total - kept.len();
    if dropped > 0 {
        log::debug!("Dropped {} postings without a usable link", dropped);
    }
    (kept, dropped)
}
