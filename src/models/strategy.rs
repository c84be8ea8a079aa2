// src/models/strategy.rs

//! Prioritized selector chains.
//!
//! Job boards change their markup without notice, so every logical field is
//! described by an ordered list of candidate selectors. Candidates are tried
//! in order and the first one producing a non-empty match wins.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ordered candidate selectors for one logical field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionStrategy {
    candidates: Vec<String>,
}

/// The candidate that matched and what it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit<'a, T> {
    /// Candidate selector that matched
    pub rule: &'a str,
    /// Position of the candidate in the chain (0 = preferred)
    pub position: usize,
    /// Value produced by the attempt
    pub value: T,
}

impl<T> Hit<'_, T> {
    /// Whether a fallback candidate was needed.
    pub fn is_fallback(&self) -> bool {
        self.position > 0
    }
}

impl ExtractionStrategy {
    /// Create a strategy from candidates in priority order.
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Candidates in priority order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Run `attempt` against each candidate until one yields a value.
    ///
    /// `Ok(None)` means "no match, try the next candidate". An `Err` from a
    /// single candidate is logged and treated the same way.
    pub fn first_match<T, F>(&self, mut attempt: F) -> Option<Hit<'_, T>>
    where
        F: FnMut(&str) -> Result<Option<T>>,
    {
        for (position, rule) in self.candidates.iter().enumerate() {
            match attempt(rule) {
                Ok(Some(value)) => {
                    return Some(Hit {
                        rule,
                        position,
                        value,
                    });
                }
                Ok(None) => {}
                Err(e) => log::debug!("Candidate '{}' failed: {}", rule, e),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_first_candidate_wins() {
        let strategy = ExtractionStrategy::new([".a", ".b"]);
        let hit = strategy.first_match(|rule| Ok(Some(rule.len()))).unwrap();
        assert_eq!(hit.rule, ".a");
        assert!(!hit.is_fallback());
    }

    #[test]
    fn test_falls_back_past_misses_and_errors() {
        let strategy = ExtractionStrategy::new(["[[bad", ".missing", ".present"]);
        let hit = strategy
            .first_match(|rule| match rule {
                "[[bad" => Err(AppError::selector(rule, "parse error")),
                ".missing" => Ok(None),
                _ => Ok(Some("found")),
            })
            .unwrap();
        assert_eq!(hit.rule, ".present");
        assert_eq!(hit.position, 2);
        assert!(hit.is_fallback());
    }

    #[test]
    fn test_no_match() {
        let strategy = ExtractionStrategy::new([".x", ".y"]);
        assert!(strategy.first_match(|_| Ok(None::<()>)).is_none());
        assert!(
            ExtractionStrategy::default()
                .first_match(|_| Ok(Some(())))
                .is_none()
        );
    }

    #[test]
    fn test_deserializes_from_list() {
        let strategy: ExtractionStrategy = serde_json::from_str(r#"[".one", ".two"]"#).unwrap();
        assert_eq!(strategy.candidates(), &[".one".to_string(), ".two".to_string()]);
    }
}
