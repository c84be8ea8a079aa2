// src/pipeline/run.rs

//! One full scrape, diff, persist and notify cycle.

use chrono::Utc;
use serde::Serialize;

use crate::config::Services;
use crate::error::Result;
use crate::models::Config;

use super::crawl::{SiteReport, scrape_all};
use super::diff::{calculate_diff, dedupe_by_id};
use super::identity::split_addressable;
use super::notify::Notifier;
use super::persist::batch_write;

/// Per-run switches set from the command line.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Scrape and diff, but write and send nothing
    pub dry_run: bool,
    /// Send the summary notification
    pub notify: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            notify: true,
        }
    }
}

/// What one run found and did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub sites: Vec<SiteReport>,
    /// Postings extracted across all sites
    pub scraped: usize,
    pub unaddressable: usize,
    /// Repeats of an id already seen earlier in this run
    pub duplicates: usize,
    pub already_known: usize,
    /// Postings classified as new
    pub new: usize,
    pub committed: usize,
    pub failed: usize,
    /// Receipt of the summary notification, if one was delivered
    pub notification: Option<String>,
    pub dry_run: bool,
}

/// Run the pipeline once against the given services.
///
/// Only a failed id snapshot read is returned as an error; site, card,
/// commit and notification failures are logged and reflected in the report.
pub async fn run_pipeline(
    config: &Config,
    services: &Services,
    options: RunOptions,
) -> Result<RunReport> {
    let collection = config.store.collection.as_str();

    let known = services.store.stream_all_ids(collection).await?;
    log::info!("{} postings already known in '{}'", known.len(), collection);

    let scraped = scrape_all(services.browser.as_ref(), &config.sites, &config.scraper).await;
    let mut report = RunReport {
        sites: scraped.sites,
        scraped: scraped.postings.len(),
        dry_run: options.dry_run,
        ..RunReport::default()
    };

    let (mut postings, unaddressable) = split_addressable(scraped.postings);
    report.unaddressable = unaddressable;
    report.duplicates = dedupe_by_id(&mut postings);

    let diff = calculate_diff(&known, &postings);
    report.already_known = diff.already_known;
    report.new = diff.new.len();

    if !diff.has_changes() {
        log::info!("No new postings");
        return Ok(report);
    }
    if options.dry_run {
        for posting in &diff.new {
            log::info!("{}", posting.format("[dry-run] [{site}] {company} - {title} ({link})"));
        }
        return Ok(report);
    }

    let batch = batch_write(
        services.store.as_ref(),
        collection,
        &diff.new,
        config.store.max_ops_per_commit,
        Utc::now(),
    )
    .await?;
    report.committed = batch.committed;
    report.failed = batch.failed;

    if !batch.is_complete() {
        log::warn!(
            "{} of {} commits failed; {} postings will be retried next run",
            batch.failed_chunks,
            batch.chunks,
            batch.failed
        );
    }

    let sample = batch.first_committed.and_then(|i| diff.new.get(i));
    match (&services.push, sample) {
        (Some(push), Some(sample)) if options.notify => {
            let notifier = Notifier::from_config(push.clone(), &config.notifier);
            report.notification = notifier.notify(batch.committed, sample).await;
        }
        (_, Some(_)) => log::info!("Notifications disabled; skipping summary"),
        _ => {}
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{ExtractionStrategy, SiteConfig};
    use crate::testing::{MemoryStore, RecordingPush, StaticBrowser};

    const URL: &str = "https://jobs.example/list";

    fn config() -> Config {
        let mut site = SiteConfig::new("example", URL);
        site.strategies.card = ExtractionStrategy::new([".job"]);
        site.strategies.title = ExtractionStrategy::new(["h3"]);
        site.strategies.company = ExtractionStrategy::new([".co"]);
        site.strategies.link = ExtractionStrategy::new(["a"]);

        Config {
            sites: vec![site],
            ..Config::default()
        }
    }

    const PAGE: &str = r#"
        <div class="job"><h3>Intern</h3><span class="co">Acme</span><a href="/1">x</a></div>
        <div class="job"><h3>QA Intern</h3><span class="co">Globex</span><a href="/2">x</a></div>
        <div class="job"><h3>No link</h3></div>
    "#;

    fn services(store: Arc<MemoryStore>, push: Arc<RecordingPush>) -> Services {
        Services {
            browser: Arc::new(StaticBrowser::new().with_page(URL, PAGE)),
            store,
            push: Some(push),
        }
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(RecordingPush::new());
        let options = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };

        let report = run_pipeline(&config(), &services(store.clone(), push.clone()), options)
            .await
            .unwrap();

        assert_eq!(report.scraped, 3);
        assert_eq!(report.unaddressable, 1);
        assert_eq!(report.new, 2);
        assert_eq!(report.committed, 0);
        assert!(store.commit_sizes().is_empty());
        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn test_no_notify_still_persists() {
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(RecordingPush::new());
        let options = RunOptions {
            notify: false,
            ..RunOptions::default()
        };

        let report = run_pipeline(&config(), &services(store.clone(), push.clone()), options)
            .await
            .unwrap();

        assert_eq!(report.committed, 2);
        assert_eq!(store.len("internships"), 2);
        assert!(push.sent().is_empty());
        assert!(report.notification.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_failure_aborts() {
        let store = Arc::new(MemoryStore::new().failing_reads());
        let push = Arc::new(RecordingPush::new());

        let result = run_pipeline(
            &config(),
            &services(store.clone(), push),
            RunOptions::default(),
        )
        .await;

        assert!(result.is_err());
        assert!(store.commit_sizes().is_empty());
    }
}
