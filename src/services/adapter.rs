// src/services/adapter.rs

//! Per-site posting extraction.
//!
//! A [`SourceAdapter`] loads one job board and turns its cards into
//! [`Posting`]s. Every lookup goes through the site's selector chains, and
//! every miss degrades locally:
//!
//! - no container match: log and keep going with whatever loaded
//! - no card match: empty result
//! - missing field: sentinel for that field only
//! - broken card: skip that card

use scraper::ElementRef;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ExtractionStrategy, Posting, ScraperConfig, SiteConfig};
use crate::services::browser::{Browser, Document, Page};
use crate::utils::normalize_link;

/// Scrapes postings from one configured site.
pub struct SourceAdapter<'a> {
    site: &'a SiteConfig,
    settings: &'a ScraperConfig,
}

impl<'a> SourceAdapter<'a> {
    pub fn new(site: &'a SiteConfig, settings: &'a ScraperConfig) -> Self {
        Self { site, settings }
    }

    pub fn site(&self) -> &SiteConfig {
        self.site
    }

    /// Load the site and extract its postings.
    ///
    /// Only a failed navigation is returned as an error; every later miss
    /// degrades to a shorter (possibly empty) list.
    pub async fn run(&self, browser: &dyn Browser) -> Result<Vec<Posting>> {
        let mut page = browser.new_page().await?;
        log::info!("[{}] Navigating to {}", self.site.name, self.site.url);
        page.navigate(&self.site.url, self.settings.navigation_timeout())
            .await?;

        match self.wait_for_container(page.as_mut()).await {
            Some(rule) => log::debug!("[{}] Container matched '{}'", self.site.name, rule),
            None if self.site.strategies.container.is_empty() => {}
            None => log::warn!(
                "[{}] No container selector matched in time; continuing, results may be empty",
                self.site.name
            ),
        }

        let html = page.content().unwrap_or_default();
        Ok(self.extract(html))
    }

    /// Try each container candidate in order, each with its own timeout.
    async fn wait_for_container(&self, page: &mut dyn Page) -> Option<&'a str> {
        let timeout = self.settings.wait_timeout();

        for rule in self.site.strategies.container.candidates() {
            match page.wait_for_match(rule, timeout).await {
                Ok(true) => return Some(rule.as_str()),
                Ok(false) => {
                    log::debug!("[{}] Container '{}' did not match", self.site.name, rule)
                }
                Err(e) => log::debug!("[{}] Container '{}' failed: {}", self.site.name, rule, e),
            }
        }
        None
    }

    /// Extract postings from loaded page HTML, in card order.
    pub fn extract(&self, html: &str) -> Vec<Posting> {
        let document = Document::parse(html);
        let base = match self.site.base() {
            Ok(base) => Some(base),
            Err(e) => {
                log::warn!("[{}] Invalid base URL: {}", self.site.name, e);
                None
            }
        };

        let Some(cards) = self.site.strategies.card.first_match(|rule| {
            let found = document.find_all(rule)?;
            Ok((!found.is_empty()).then_some(found))
        }) else {
            log::warn!("[{}] No job cards found", self.site.name);
            return Vec::new();
        };

        log::info!(
            "[{}] Found {} cards via '{}'",
            self.site.name,
            cards.value.len(),
            cards.rule
        );
        if cards.is_fallback() {
            log::warn!(
                "[{}] Primary card selector missed; fell back to candidate #{}",
                self.site.name,
                cards.position
            );
        }

        let mut postings = Vec::with_capacity(cards.value.len());
        for (index, card) in cards.value.into_iter().enumerate() {
            match self.extract_card(card, base.as_ref()) {
                Ok(posting) => postings.push(posting),
                Err(e) => log::warn!("[{}] Skipping card #{}: {}", self.site.name, index, e),
            }
        }
        postings
    }

    fn extract_card(&self, card: ElementRef<'_>, base: Option<&Url>) -> Result<Posting> {
        let strategies = &self.site.strategies;

        let title = Self::field(card, &strategies.title);
        let company = Self::field(card, &strategies.company);
        let date = Self::field(card, &strategies.date);
        let link = self
            .raw_link(card)
            .and_then(|href| normalize_link(base, &href));

        let is_blank = title.is_none()
            && company.is_none()
            && date.is_none()
            && link.is_none()
            && Document::text(card).is_none();
        if is_blank {
            return Err(AppError::extraction(&self.site.name, "card has no content"));
        }

        Ok(Posting::from_fields(
            &self.site.name,
            title,
            company,
            date,
            link,
        ))
    }

    /// Text of the first candidate element inside the card.
    fn field(card: ElementRef<'_>, strategy: &ExtractionStrategy) -> Option<String> {
        strategy
            .first_match(|rule| Ok(Document::find_one(card, rule)?.and_then(Document::text)))
            .map(|hit| hit.value)
    }

    /// Link attribute from the first matching candidate, else the card itself.
    fn raw_link(&self, card: ElementRef<'_>) -> Option<String> {
        let attr = self.site.link_attr.as_str();
        self.site
            .strategies
            .link
            .first_match(|rule| {
                Ok(Document::find_one(card, rule)?.and_then(|el| Document::attr(el, attr)))
            })
            .map(|hit| hit.value)
            .or_else(|| Document::attr(card, attr))
    }
}
