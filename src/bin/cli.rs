//! internscout CLI
//!
//! Scrapes the configured job boards, stores new internship postings and
//! sends one summary notification per run.

use std::future::Future;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use internscout::{
    config::{Services, load_config},
    error::{AppError, Result},
    models::Config,
    pipeline::{self, RunOptions, RunReport},
    services::HttpBrowser,
    utils::http,
};

/// internscout - Internship Posting Watcher
#[derive(Parser, Debug)]
#[command(
    name = "internscout",
    version,
    about = "Watches job boards for new internship postings"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config/internscout.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape, store new postings and notify
    Run {
        /// Scrape and diff without writing or notifying
        #[arg(long)]
        dry_run: bool,

        /// Store new postings but skip the notification
        #[arg(long)]
        no_notify: bool,
    },

    /// Scrape only and write the postings as JSON
    Scrape {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration and site selectors
    Validate,

    /// Show configured sites and stored posting count
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Run `task` until it completes or Ctrl-C is pressed.
async fn until_interrupted<T>(task: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        result = task => result,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted; in-flight scrapes cancelled");
            Err(AppError::Interrupted)
        }
    }
}

fn print_report(report: &RunReport) {
    for site in &report.sites {
        let status = if site.failed { "failed" } else { "ok" };
        log::info!("  {:<20} {:>4} postings ({})", site.site, site.postings, status);
    }
    log::info!(
        "Scraped {} | unaddressable {} | duplicates {} | known {} | new {}",
        report.scraped,
        report.unaddressable,
        report.duplicates,
        report.already_known,
        report.new
    );
    if report.dry_run {
        log::info!("Dry run: nothing written");
    } else {
        log::info!(
            "Committed {} | failed {} | notification {}",
            report.committed,
            report.failed,
            report.notification.as_deref().unwrap_or("none")
        );
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("internscout starting...");

    match cli.command {
        Command::Run { dry_run, no_notify } => {
            let config = load_config(&cli.config)?;
            let services = Services::from_config(&config)?;
            let options = RunOptions {
                dry_run,
                notify: !no_notify,
            };

            let report =
                until_interrupted(pipeline::run_pipeline(&config, &services, options)).await?;
            print_report(&report);
        }

        Command::Scrape { output } => {
            let config = load_config(&cli.config)?;
            let client = http::create_async_client(&config.scraper)?;
            let browser = HttpBrowser::new(client, config.scraper.poll_interval());

            let outcome = until_interrupted(async {
                let outcome = pipeline::scrape_all(&browser, &config.sites, &config.scraper).await;
                Ok::<_, AppError>(outcome)
            })
            .await?;

            let json = serde_json::to_string_pretty(&outcome.postings)?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, json)?;
                    log::info!(
                        "Saved {} postings to {}",
                        outcome.postings.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            for site in &config.sites {
                log::info!("✓ {} ({})", site.name, site.url);
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            let config = Config::load_or_default(&cli.config);
            log::info!("Config: {}", cli.config.display());
            log::info!(
                "Store: {:?} / collection '{}' ({} writes per commit)",
                config.store.backend,
                config.store.collection,
                config.store.max_ops_per_commit
            );
            log::info!(
                "Notifier: {} via {:?} on topic '{}'",
                if config.notifier.enabled {
                    "enabled"
                } else {
                    "disabled"
                },
                config.notifier.backend,
                config.notifier.topic
            );

            for site in &config.sites {
                log::info!("Site {}: {}", site.name, site.url);
            }

            let store = Services::build_store(&config)?;
            let known = store.stream_all_ids(&config.store.collection).await?;
            log::info!("Known postings: {}", known.len());
        }
    }

    Ok(())
}
