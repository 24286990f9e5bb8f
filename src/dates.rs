//! Publication date resolution.
//!
//! Articles declare their publish date in wildly inconsistent places and
//! formats. The resolver probes a fixed list of metadata locations first,
//! then falls back to recovering a date from the URL path. Failure to
//! resolve a date is never an error; the filter pipeline decides how to
//! treat undated articles.
//!
//! # Search order
//!
//! 1. Metadata probes, in order: `meta[property=article:published_time]`,
//!    `meta[name=article:published_time]`, `meta[itemprop=datePublished]`,
//!    `meta[name=pubdate]`, a visible `<time>` element, a feed `pubDate`
//!    element. The first probe that yields text which parses under one of
//!    the eleven timestamp formats wins.
//! 2. A URL path segment group matching `/YYYY/M/D/` or `/M/D/YYYY/`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// How a given format string is fed to chrono.
enum TsFormat {
    /// Date-only; resolves to midnight UTC.
    Date(&'static str),
    /// Date and time with no zone; assumed UTC.
    Naive(&'static str),
    /// Date, time, and numeric offset; converted to UTC.
    Zoned(&'static str),
}

/// The eleven accepted timestamp formats, tried in order.
const TIME_FORMATS: [TsFormat; 11] = [
    TsFormat::Date("%b %d, %Y"),
    TsFormat::Date("%B %d, %Y"),
    TsFormat::Date("%Y-%m-%d"),
    TsFormat::Date("%Y/%m/%d"),
    TsFormat::Zoned("%Y-%m-%dT%H:%M:%S%z"),
    TsFormat::Naive("%Y-%m-%dT%H:%M:%SZ"),
    TsFormat::Naive("%Y-%m-%dT%H:%M:%S"),
    TsFormat::Naive("%Y-%m-%d %H:%M:%S"),
    TsFormat::Date("%m/%d/%Y"),
    TsFormat::Zoned("%a, %d %b %Y %H:%M:%S %z"),
    TsFormat::Naive("%a, %d %b %Y %H:%M:%S GMT"),
];

/// Matches `/YYYY/M/D/` or `/M/D/YYYY/` path segment groups.
static DATE_URL_PAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"/(?:(?P<y>\d{4})/(?P<m>\d{1,2})/(?P<d>\d{1,2})|(?P<m2>\d{1,2})/(?P<d2>\d{1,2})/(?P<y2>\d{4}))(?:/|$)",
    )
    .unwrap()
});

/// Metadata locations conventionally holding a publish date, probed in order.
static DATE_PROBES: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[property="article:published_time"]"#,
        r#"meta[name="article:published_time"]"#,
        r#"meta[itemprop="datePublished"]"#,
        r#"meta[name="pubdate"]"#,
        "time",
        "pubdate",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Parse a raw timestamp string against the fixed format list.
///
/// The candidate is tried whole and truncated to its first 25 characters;
/// truncation tolerates trailing junk after an otherwise clean timestamp
/// without breaking the longer RFC-822 forms. A string matching no format
/// yields `None`, never an error.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let truncated = match trimmed.char_indices().nth(25) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    };
    let candidates: [&str; 2] = [trimmed, truncated.trim_end()];

    for (i, candidate) in candidates.iter().enumerate() {
        if i == 1 && candidates[0] == candidates[1] {
            break;
        }
        for format in &TIME_FORMATS {
            let parsed = match format {
                TsFormat::Date(fmt) => NaiveDate::parse_from_str(candidate, fmt)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN).and_utc()),
                TsFormat::Naive(fmt) => NaiveDateTime::parse_from_str(candidate, fmt)
                    .ok()
                    .map(|dt| dt.and_utc()),
                TsFormat::Zoned(fmt) => DateTime::parse_from_str(candidate, fmt)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            };
            if parsed.is_some() {
                return parsed;
            }
        }
    }
    None
}

/// Recover a publication date from the URL path itself.
fn date_from_url(url: &str) -> Option<DateTime<Utc>> {
    let caps = DATE_URL_PAT.captures(url)?;
    let field = |a: &str, b: &str| {
        caps.name(a)
            .or_else(|| caps.name(b))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    };
    let year = field("y", "y2")?;
    let month = field("m", "m2")?;
    let day = field("d", "d2")?;
    NaiveDate::from_ymd_opt(year as i32, month, day).map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Resolve an article's publication timestamp from its parsed document
/// and URL. Absence is a normal outcome, not an error.
pub fn resolve_date(document: &Html, url: &str) -> Option<DateTime<Utc>> {
    for probe in DATE_PROBES.iter() {
        if let Some(element) = document.select(probe).next() {
            let raw = element
                .value()
                .attr("content")
                .or_else(|| element.value().attr("datetime"))
                .map(str::to_string)
                .unwrap_or_else(|| element.text().collect::<Vec<_>>().join(" "));
            if raw.trim().is_empty() {
                continue;
            }
            if let Some(dt) = parse_timestamp(&raw) {
                return Some(dt);
            }
        }
    }
    date_from_url(url)
}
