//! Pipeline stages for one watcher run.
//!
//! - `crawl`: scrape every site concurrently and assign ids
//! - `identity`: content-addressed posting ids
//! - `diff`: separate new postings from known ones
//! - `persist`: chunked commits to the document store
//! - `notify`: one summary push per run
//! - `run`: wires the stages together

pub mod crawl;
pub mod diff;
pub mod identity;
pub mod notify;
pub mod persist;
pub mod run;

pub use crawl::{ScrapeOutcome, SiteReport, scrape_all};
pub use diff::{DiffResult, calculate_diff, dedupe_by_id};
pub use notify::Notifier;
pub use persist::{BatchOutcome, batch_write};
pub use run::{RunOptions, RunReport, run_pipeline};
