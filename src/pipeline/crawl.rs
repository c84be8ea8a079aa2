// src/pipeline/crawl.rs

//! Concurrent scraping across all configured sites.

use futures::future::join_all;
use serde::Serialize;

use crate::models::{Posting, ScraperConfig, SiteConfig};
use crate::services::{Browser, SourceAdapter};

use super::identity::assign_ids;

/// Outcome of scraping one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub site: String,
    pub postings: usize,
    /// Navigation or page setup failed; the site contributed nothing
    pub failed: bool,
}

/// Aggregated result of scraping every site.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    /// Id-assigned postings in site order, then card order
    pub postings: Vec<Posting>,
    pub sites: Vec<SiteReport>,
}

impl ScrapeOutcome {
    pub fn failed_sites(&self) -> usize {
        self.sites.iter().filter(|s| s.failed).count()
    }
}

/// Scrape one site, converting any adapter error into an empty list.
async fn scrape_site(
    browser: &dyn Browser,
    site: &SiteConfig,
    settings: &ScraperConfig,
) -> (Vec<Posting>, SiteReport) {
    let adapter = SourceAdapter::new(site, settings);
    let (postings, failed) = match adapter.run(browser).await {
        Ok(postings) => (assign_ids(postings), false),
        Err(e) => {
            log::error!("[{}] Scrape failed: {}", site.name, e);
            (Vec::new(), true)
        }
    };

    let report = SiteReport {
        site: site.name.clone(),
        postings: postings.len(),
        failed,
    };
    (postings, report)
}

/// Run every site's adapter concurrently and wait for all of them.
///
/// A failing site never cancels its siblings. Results are concatenated in
/// the configured site order.
pub async fn scrape_all(
    browser: &dyn Browser,
    sites: &[SiteConfig],
    settings: &ScraperConfig,
) -> ScrapeOutcome {
    log::info!("Scraping {} sites", sites.len());

    let results = join_all(
        sites
            .iter()
            .map(|site| scrape_site(browser, site, settings)),
    )
    .await;

    let mut outcome = ScrapeOutcome::default();
    for (postings, report) in results {
        log::info!("[{}] {} postings", report.site, report.postings);
        outcome.postings.extend(postings);
        outcome.sites.push(report);
    }
    outcome
}
