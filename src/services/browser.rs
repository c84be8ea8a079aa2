// src/services/browser.rs

//! Page loading and element lookup.
//!
//! [`Browser`] and [`Page`] cover the asynchronous half of browsing
//! (navigation and waiting for elements). Once a page has settled, its
//! content is parsed into a [`Document`] and queried synchronously.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};

/// Source of independent browsing contexts.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a fresh page owned by the caller.
    async fn new_page(&self) -> Result<Box<dyn Page>>;
}

/// A single browsing context.
#[async_trait]
pub trait Page: Send {
    /// Load `url`, giving up after `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until `selector` matches something on the page.
    ///
    /// Returns `Ok(false)` when the timeout elapses without a match.
    async fn wait_for_match(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Current page HTML, if a page has been loaded.
    fn content(&self) -> Option<&str>;
}

/// Parsed page content.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Whether `selector` matches at least one element.
    pub fn matches(&self, selector: &str) -> Result<bool> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).next().is_some())
    }

    /// All elements matching `selector`, in document order.
    pub fn find_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).collect())
    }

    /// First descendant of `scope` matching `selector`.
    pub fn find_one<'a>(scope: ElementRef<'a>, selector: &str) -> Result<Option<ElementRef<'a>>> {
        let selector = parse_selector(selector)?;
        Ok(scope.select(&selector).next())
    }

    /// Whitespace-normalized text of an element; `None` when blank.
    pub fn text(element: ElementRef<'_>) -> Option<String> {
        let raw: String = element.text().collect();
        let normalized = normalize_whitespace(&raw);
        (!normalized.is_empty()).then_some(normalized)
    }

    /// Trimmed attribute value; `None` when missing or blank.
    pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
        element
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn html_matches(html: &str, selector: &str) -> Result<bool> {
    Document::parse(html).matches(selector)
}

/// Browser backed by plain HTTP fetches.
///
/// Pages are rendered server-side, so "waiting" for an element means
/// checking the loaded page, then reloading it once after `poll_interval`.
#[derive(Clone)]
pub struct HttpBrowser {
    client: Client,
    poll_interval: Duration,
}

impl HttpBrowser {
    pub fn new(client: Client, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            poll_interval: self.poll_interval,
            url: None,
            html: None,
        }))
    }
}

/// Page loaded over HTTP.
pub struct HttpPage {
    client: Client,
    poll_interval: Duration,
    url: Option<String>,
    html: Option<String>,
}

impl HttpPage {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let request = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(response.text().await?)
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result.map_err(|e| AppError::navigation(url, e)),
            Err(_) => Err(AppError::timeout(format!("navigate {url}"), timeout)),
        }
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        log::debug!("Navigating to {}", url);
        let html = self.fetch(url, timeout).await?;
        self.url = Some(url.to_string());
        self.html = Some(html);
        Ok(())
    }

    async fn wait_for_match(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        if let Some(html) = &self.html {
            if html_matches(html, selector)? {
                return Ok(true);
            }
        }

        let Some(url) = self.url.clone() else {
            return Ok(false);
        };
        if self.poll_interval >= timeout {
            return Ok(false);
        }

        // One reload per candidate; later candidates see the refreshed page.
        tokio::time::sleep(self.poll_interval).await;
        match self.fetch(&url, timeout - self.poll_interval).await {
            Ok(html) => {
                let found = html_matches(&html, selector)?;
                self.html = Some(html);
                Ok(found)
            }
            Err(e) => {
                log::debug!("Reload of {} while waiting failed: {}", url, e);
                Ok(false)
            }
        }
    }

    fn content(&self) -> Option<&str> {
        self.html.as_deref()
    }
}
