//! Data models for discovered sources and harvested articles.
//!
//! This module defines the core data structures used throughout the pass:
//! - [`SourceKind`]: whether a source is interrogated as a feed or a listing page
//! - [`EnrichedArticle`]: the fully extracted article record produced by enrichment
//! - [`PassOutcome`]: aggregate counters and kept articles for one harvest pass
//!
//! All of these live only for the duration of a single pass; nothing here is
//! persisted by the core.

use chrono::{DateTime, Utc};

/// How a source's content is parsed during link discovery.
///
/// The kind is inferred from the source URL rather than configured
/// explicitly: URLs containing `rss` or `feed`, or ending in `.xml`,
/// are treated as feeds; everything else is a static listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// An RSS or Atom feed document.
    Feed,
    /// An HTML page whose anchors are harvested via a CSS selector.
    Static,
}

impl SourceKind {
    /// Infer the kind from a source URL.
    pub fn infer(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("rss") || lower.ends_with(".xml") || lower.contains("feed") {
            SourceKind::Feed
        } else {
            SourceKind::Static
        }
    }

    /// Human-readable label used in per-source log lines.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Feed => "feed",
            SourceKind::Static => "static",
        }
    }
}

/// A fully enriched article that survived the inline filter checks.
///
/// Created by the enricher, immutable once constructed, and consumed by
/// the CSV report writer. `word_count` is always computed, even when no
/// publication date could be resolved; `keyword_hits` counts *distinct*
/// configured keywords present, not raw occurrences.
#[derive(Debug, Clone)]
pub struct EnrichedArticle {
    /// Article title, whitespace-collapsed; `"Untitled"` when the page has none.
    pub title: String,
    /// Absolute article URL.
    pub url: String,
    /// Resolved publication timestamp, if any metadata or URL pattern yielded one.
    pub published_at: Option<DateTime<Utc>>,
    /// Host component of the article URL.
    pub host: String,
    /// Number of distinct configured keywords found in title + body.
    pub keyword_hits: usize,
    /// Whitespace-delimited token count of the main content region.
    pub word_count: usize,
    /// Name of the configured source this article was discovered from.
    pub source_name: String,
}

impl EnrichedArticle {
    /// Date column value for the report: `YYYY-MM-DD`, or `Undated`.
    pub fn date_label(&self) -> String {
        match self.published_at {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => "Undated".to_string(),
        }
    }
}

/// Result of one harvest pass.
///
/// A pass always produces an outcome, even when every source failed;
/// `kept` may be empty without that being an error condition. When the
/// operator interrupts the pass, `cancelled` is set and `kept` holds
/// whatever had been collected before the interrupt.
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Articles that passed every filter check, across all sources.
    pub kept: Vec<EnrichedArticle>,
    /// Number of sources whose discovery step was started.
    pub sources_attempted: usize,
    /// Number of sources skipped due to fetch or parse failure.
    pub sources_skipped: usize,
    /// Whether the pass was cut short by operator cancellation.
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(published_at: Option<DateTime<Utc>>) -> EnrichedArticle {
        EnrichedArticle {
            title: "T".to_string(),
            url: "https://example.com/a".to_string(),
            published_at,
            host: "example.com".to_string(),
            keyword_hits: 0,
            word_count: 10,
            source_name: "Example".to_string(),
        }
    }

    #[test]
    fn test_kind_inferred_from_rss_url() {
        assert_eq!(SourceKind::infer("https://example.com/rss"), SourceKind::Feed);
        assert_eq!(
            SourceKind::infer("https://example.com/news/RSS.php"),
            SourceKind::Feed
        );
    }

    #[test]
    fn test_kind_inferred_from_xml_extension() {
        assert_eq!(
            SourceKind::infer("https://example.com/latest.xml"),
            SourceKind::Feed
        );
    }

    #[test]
    fn test_kind_inferred_from_feed_path() {
        assert_eq!(
            SourceKind::infer("https://example.com/feed/"),
            SourceKind::Feed
        );
    }

    #[test]
    fn test_kind_defaults_to_static() {
        assert_eq!(
            SourceKind::infer("https://example.com/world"),
            SourceKind::Static
        );
    }

    #[test]
    fn test_date_label_formats_date() {
        let a = article(Some(Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()));
        assert_eq!(a.date_label(), "2026-08-20");
    }

    #[test]
    fn test_date_label_undated() {
        assert_eq!(article(None).date_label(), "Undated");
    }
}
