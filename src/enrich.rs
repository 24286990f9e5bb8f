//! Per-article enrichment and the inline filter pipeline.
//!
//! Enrichment fetches one candidate URL, extracts the title, publication
//! date, and main body text, computes the keyword-hit and word counts,
//! and applies the retention checks. An absent result means "fetch failed
//! or article rejected" — the distinction only matters for logging, never
//! for pass-level control flow.
//!
//! # Filter order
//!
//! The checks are monotonic (each strictly narrows the candidate set), so
//! ordering only affects which rejection reason a log line attributes:
//!
//! 1. `require_keyword` is set and no configured keyword matched
//! 2. `reject_undated` is set and no date resolved
//! 3. a date resolved and its age exceeds `max_age_days`
//! 4. the word count falls below `min_words`

use crate::config::{HarvestConfig, KeywordSet};
use crate::dates::resolve_date;
use crate::http::FetchText;
use crate::models::EnrichedArticle;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

/// Main content regions, most specific first.
static CONTENT_REGIONS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "body"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// Fetch one candidate URL and enrich it.
///
/// Any transport failure or non-success status yields `None`; the caller
/// continues the pass. The fetch is the only suspension point.
#[instrument(level = "debug", skip_all, fields(%url, source = %source_name))]
pub async fn enrich_article<F: FetchText>(
    fetcher: &F,
    url: &str,
    source_name: &str,
    config: &HarvestConfig,
    keywords: &KeywordSet,
) -> Option<EnrichedArticle> {
    let body = match fetcher.fetch_text(url).await {
        Ok(Some(body)) => body,
        Ok(None) => {
            debug!("Article fetch returned no content; skipping");
            return None;
        }
        Err(e) => {
            debug!(error = %e, "Article fetch failed; skipping");
            return None;
        }
    };
    enrich_document(&body, url, source_name, config, keywords, Utc::now())
}

/// Extract, score, and filter a fetched article document.
///
/// Pure with respect to I/O: `now` is passed in so freshness is decided
/// against a single instant for the whole pass under test.
pub fn enrich_document(
    html: &str,
    url: &str,
    source_name: &str,
    config: &HarvestConfig,
    keywords: &KeywordSet,
    now: DateTime<Utc>,
) -> Option<EnrichedArticle> {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string());

    let published_at = resolve_date(&document, url);

    let body_text = CONTENT_REGIONS
        .iter()
        .find_map(|sel| document.select(sel).next())
        .map(|region| region.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    let word_count = body_text.split_whitespace().count();

    let haystack = format!("{title} {body_text}");
    let keyword_hits = keywords.count_hits(&haystack);

    if config.require_keyword && keyword_hits == 0 {
        debug!(%url, "Rejected: no keyword match");
        return None;
    }
    if config.reject_undated && published_at.is_none() {
        debug!(%url, "Rejected: undated");
        return None;
    }
    if let Some(dt) = published_at {
        let age_days = (now - dt).num_days();
        if age_days > config.max_age_days {
            debug!(%url, age_days, "Rejected: stale");
            return None;
        }
    }
    if word_count < config.min_words {
        debug!(%url, word_count, "Rejected: too short");
        return None;
    }

    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();

    Some(EnrichedArticle {
        title,
        url: url.to_string(),
        published_at,
        host,
        keyword_hits,
        word_count,
        source_name: source_name.to_string(),
    })
}
