// src/models/site.rs

//! Job board definitions.

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ExtractionStrategy;

/// A job board to scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site label stored on every posting
    pub name: String,

    /// Search results page to load
    pub url: String,

    /// Base URL for resolving relative links (defaults to `url`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// HTML attribute holding the posting link
    #[serde(default = "default_link_attr")]
    pub link_attr: String,

    /// Candidate selectors per field
    #[serde(default)]
    pub strategies: SiteStrategies,
}

/// Candidate selector chains for every field of a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteStrategies {
    /// Element whose presence means the listing has rendered
    #[serde(default)]
    pub container: ExtractionStrategy,

    /// One element per posting
    #[serde(default)]
    pub card: ExtractionStrategy,

    /// Title element within a card
    #[serde(default)]
    pub title: ExtractionStrategy,

    /// Company element within a card
    #[serde(default)]
    pub company: ExtractionStrategy,

    /// Posted date element within a card
    #[serde(default)]
    pub date: ExtractionStrategy,

    /// Link element within a card (falls back to the card itself)
    #[serde(default)]
    pub link: ExtractionStrategy,
}

impl SiteStrategies {
    /// All chains with their field names.
    pub fn named(&self) -> [(&'static str, &ExtractionStrategy); 6] {
        [
            ("container", &self.container),
            ("card", &self.card),
            ("title", &self.title),
            ("company", &self.company),
            ("date", &self.date),
            ("link", &self.link),
        ]
    }
}

fn default_link_attr() -> String {
    "href".to_string()
}

impl SiteConfig {
    /// Site with no selectors and the default link attribute.
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            base_url: None,
            link_attr: default_link_attr(),
            strategies: SiteStrategies::default(),
        }
    }

    /// URL that relative links are resolved against.
    pub fn base(&self) -> Result<Url> {
        let raw = self.base_url.as_deref().unwrap_or(&self.url);
        Ok(Url::parse(raw)?)
    }

    /// Validate the URLs and every candidate selector.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("site name is empty"));
        }

        let target = Url::parse(&self.url)?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "site '{}' url must be http(s): {}",
                self.name, self.url
            )));
        }
        self.base()?;

        if self.link_attr.trim().is_empty() {
            return Err(AppError::validation(format!(
                "site '{}' link_attr is empty",
                self.name
            )));
        }
        if self.strategies.card.is_empty() {
            return Err(AppError::validation(format!(
                "site '{}' has no card selectors",
                self.name
            )));
        }

        for (field, strategy) in self.strategies.named() {
            for candidate in strategy.candidates() {
                Selector::parse(candidate).map_err(|e| {
                    AppError::selector(
                        candidate.as_str(),
                        format!("site '{}' field '{}': {e:?}", self.name, field),
                    )
                })?;
            }
        }
        Ok(())
    }
}

/// Built-in job boards.
pub fn default_sites() -> Vec<SiteConfig> {
    vec![SiteConfig {
        name: "jobhub".to_string(),
        url: "https://jobhub.lk/en/Sri%20Lanka/search?q=software%20intern&type=Internship&sort-by=Relevance"
            .to_string(),
        base_url: Some("https://jobhub.lk".to_string()),
        link_attr: default_link_attr(),
        strategies: SiteStrategies {
            container: ExtractionStrategy::new([
                "listings-container margin-top-35",
                ".listings-container.margin-top-35",
                ".listings-container .margin-top-35",
                ".listings-container",
                "div.listings-container",
            ]),
            card: ExtractionStrategy::new([
                "job-listing",
                ".job-listing",
                "div.job-listing",
                "job-listing-card",
            ]),
            title: ExtractionStrategy::new(["job-listing-title", ".job-listing-title"]),
            company: ExtractionStrategy::new(["job-listing-company", ".job-listing-company"]),
            date: ExtractionStrategy::new([
                ".job-listing-footer li:has(.icon-material-outline-access-time)",
                ".job-listing-footer li",
            ]),
            link: ExtractionStrategy::new(["a[href]"]),
        },
    }]
}
