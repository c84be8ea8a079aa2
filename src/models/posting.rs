//! Posting data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Placeholder stored for any field the source page did not provide.
pub const SENTINEL: &str = "N/A";

/// Resolve an optional field to its value or the sentinel.
pub fn or_sentinel(value: Option<String>) -> String {
    value.unwrap_or_else(|| SENTINEL.to_string())
}

/// An internship posting discovered on a job board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Content hash of the canonical link (empty when unaddressable)
    #[serde(default)]
    pub id: String,

    /// Name of the site the posting came from
    pub site: String,

    /// Job title
    #[serde(rename = "job_title")]
    pub title: String,

    /// Hiring company
    pub company: String,

    /// Posted date as displayed by the site
    #[serde(rename = "date")]
    pub posted_date: String,

    /// Absolute URL of the posting
    pub link: String,
}

impl Posting {
    /// Build a posting from extracted fields, filling gaps with the sentinel.
    ///
    /// The id is left empty; see [`crate::pipeline::identity::assign_id`].
    pub fn from_fields(
        site: impl Into<String>,
        title: Option<String>,
        company: Option<String>,
        posted_date: Option<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            id: String::new(),
            site: site.into(),
            title: or_sentinel(title),
            company: or_sentinel(company),
            posted_date: or_sentinel(posted_date),
            link: or_sentinel(link),
        }
    }

    /// Whether an id has been assigned.
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Document body written to the store.
    pub fn to_document(&self, discovered_at: DateTime<Utc>) -> Value {
        json!({
            "id": self.id,
            "site": self.site,
            "job_title": self.title,
            "company": self.company,
            "date": self.posted_date,
            "link": self.link,
            "discovered_at": discovered_at.to_rfc3339(),
        })
    }

    /// Format posting for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{site}`, `{title}`, `{company}`, `{date}`, `{link}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{id}", &self.id)
            .replace("{site}", &self.site)
            .replace("{title}", &self.title)
            .replace("{company}", &self.company)
            .replace("{date}", &self.posted_date)
            .replace("{link}", &self.link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_become_sentinel() {
        let posting = Posting::from_fields("jobhub", Some("Intern".into()), None, None, None);
        assert_eq!(posting.title, "Intern");
        assert_eq!(posting.company, SENTINEL);
        assert_eq!(posting.posted_date, SENTINEL);
        assert_eq!(posting.link, SENTINEL);
        assert!(!posting.has_id());
    }

    #[test]
    fn test_format() {
        let posting = Posting::from_fields(
            "jobhub",
            Some("Software Intern".into()),
            Some("Acme".into()),
            Some("2 days ago".into()),
            Some("https://jobhub.lk/job/1".into()),
        );
        assert_eq!(
            posting.format("[{site}] {company} - {title}"),
            "[jobhub] Acme - Software Intern"
        );
    }

    #[test]
    fn test_document_uses_client_field_names() {
        let mut posting = Posting::from_fields(
            "jobhub",
            Some("Intern".into()),
            Some("Acme".into()),
            None,
            Some("https://jobhub.lk/job/1".into()),
        );
        posting.id = "abc".into();

        let doc = posting.to_document(Utc::now());
        assert_eq!(doc["job_title"], "Intern");
        assert_eq!(doc["company"], "Acme");
        assert_eq!(doc["date"], SENTINEL);
        assert_eq!(doc["id"], "abc");
        assert!(doc["discovered_at"].is_string());
    }

    #[test]
    fn test_serde_round_trip_names() {
        let json = r#"{"id":"x","site":"s","job_title":"t","company":"c","date":"d","link":"l"}"#;
        let posting: Posting = serde_json::from_str(json).unwrap();
        assert_eq!(posting.title, "t");
        assert_eq!(posting.posted_date, "d");
    }
}
