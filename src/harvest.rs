//! The fetch orchestrator: one discovery-and-harvest pass.
//!
//! Sources are visited sequentially — discovery is cheap and ordering keeps
//! the per-source log lines coherent — while enrichment fetches within a
//! source fan out concurrently, bounded by the configured concurrency.
//! Because only one source is in its fan-out phase at a time, the bound
//! holds globally across the pass.
//!
//! A source whose discovery fetch or parse fails is skipped and logged,
//! never fatal. Candidate URLs are deduplicated across the whole pass
//! (lexically ordered, then truncated to the per-source cap) so at most one
//! enrichment happens per distinct URL. Results are merged into a single
//! collection by this task alone; no locking is needed on the kept set.

use crate::config::{HarvestConfig, KeywordSet};
use crate::enrich::enrich_article;
use crate::http::FetchText;
use crate::links::{extract_links, normalize_href};
use crate::models::{EnrichedArticle, PassOutcome, SourceKind};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};
use url::Url;

/// Upper bound on candidate links taken from one source after dedup.
/// Bounds worst-case fan-out per source regardless of page size.
pub const LINK_CAP_PER_SOURCE: usize = 25;

/// Run one complete harvest pass over the configured sources.
///
/// Always returns an outcome, even when every source failed; a kept count
/// of zero is a valid result. When `cancel` becomes true the pass stops
/// issuing new fetches, drains whatever is in flight, and returns the
/// partial kept set.
#[instrument(level = "info", skip_all, fields(sources = config.sources.len()))]
pub async fn run_pass<F: FetchText>(
    fetcher: &F,
    config: &HarvestConfig,
    keywords: &KeywordSet,
    cancel: &AtomicBool,
) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();

    for source in &config.sources {
        if cancel.load(Ordering::SeqCst) {
            warn!("Cancellation requested; stopping before remaining sources");
            outcome.cancelled = true;
            break;
        }
        outcome.sources_attempted += 1;

        let kind = SourceKind::infer(&source.url);
        info!(name = %source.name, kind = kind.label(), url = %source.url, "Interrogating source");

        let content = match fetcher.fetch_text(&source.url).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                warn!(name = %source.name, "Source returned no content; skipping");
                outcome.sources_skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(name = %source.name, error = %e, "Source fetch failed; skipping");
                outcome.sources_skipped += 1;
                continue;
            }
        };

        // Source URLs are validated at config load; guard anyway.
        let base = match Url::parse(&source.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(name = %source.name, error = %e, "Source URL unparseable; skipping");
                outcome.sources_skipped += 1;
                continue;
            }
        };

        let raw = extract_links(&content, kind, source.article_selector.as_deref());
        let mut unique: BTreeSet<String> = BTreeSet::new();
        for href in &raw {
            if let Some(url) = normalize_href(&base, href) {
                let url = url.to_string();
                if !seen.contains(&url) {
                    unique.insert(url);
                }
            }
        }
        let links: Vec<String> = unique.into_iter().take(LINK_CAP_PER_SOURCE).collect();
        seen.extend(links.iter().cloned());
        info!(
            name = %source.name,
            discovered = raw.len(),
            candidates = links.len(),
            "Candidate links after normalization, dedup, and cap"
        );

        let results: Vec<Option<EnrichedArticle>> = stream::iter(links)
            .map(|url| {
                let source_name = source.name.as_str();
                async move {
                    if cancel.load(Ordering::SeqCst) {
                        return None;
                    }
                    enrich_article(fetcher, &url, source_name, config, keywords).await
                }
            })
            .buffer_unordered(config.concurrency)
            .collect()
            .await;

        let kept_before = outcome.kept.len();
        outcome.kept.extend(results.into_iter().flatten());
        info!(
            name = %source.name,
            kept = outcome.kept.len() - kept_before,
            "Source complete"
        );
    }

    if cancel.load(Ordering::SeqCst) {
        outcome.cancelled = true;
    }
    outcome
}
