//! # feedsweep
//!
//! A one-pass news harvester. Each invocation discovers recent article
//! links from a configured set of sources (RSS/Atom feeds and plain HTML
//! listing pages), fetches and enriches each candidate concurrently, and
//! keeps only the articles that pass freshness, length, and keyword
//! filters. Kept articles are written to a CSV report and the process
//! exits — no scheduling, no recursive crawling, no cross-run state.
//!
//! ## Usage
//!
//! ```sh
//! feedsweep -c harvest.yaml -o harvest_report.csv
//! ```
//!
//! ## Architecture
//!
//! The pass runs as a pipeline:
//! 1. **Discovery**: per source, extract candidate links (feed entries or
//!    anchors selected by a CSS selector), normalize, dedup, cap
//! 2. **Enrichment**: fetch each candidate concurrently (bounded by the
//!    configured concurrency), extract title/date/body, score keywords
//! 3. **Filtering**: inline freshness, length, keyword, and undated checks
//! 4. **Output**: sort kept articles by `(source, date)` and write CSV
//!
//! Ctrl-C stops issuing new fetches and writes whatever was collected.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod enrich;
mod harvest;
mod http;
mod links;
mod models;
mod outputs;

use cli::Cli;
use config::{HarvestConfig, KeywordSet};
use http::{HttpFetcher, RetryFetch};
use outputs::csv;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feedsweep starting up");

    let args = Cli::parse();

    // Config problems are the only fatal condition; nothing has been
    // fetched yet when this fails.
    let config = HarvestConfig::load(&args.config)?;
    let keywords = KeywordSet::compile(&config.keywords)?;

    let fetcher = RetryFetch::new(
        HttpFetcher::new(config.timeout_secs)?,
        1,
        std::time::Duration::from_millis(500),
    );

    // Ctrl-C flips the flag; the orchestrator stops issuing new fetches
    // and the partial kept set is still reported.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; finishing in-flight fetches and stopping");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let outcome = harvest::run_pass(&fetcher, &config, &keywords, &cancel).await;

    if outcome.cancelled {
        warn!("Pass cancelled by operator; reporting partial results");
    }
    info!(
        sources_attempted = outcome.sources_attempted,
        sources_skipped = outcome.sources_skipped,
        articles_kept = outcome.kept.len(),
        "Pass complete"
    );

    if let Err(e) = csv::write_report(&outcome.kept, &args.output).await {
        error!(path = %args.output, error = %e, "Failed to write report");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
