//! Candidate link discovery and URL normalization.
//!
//! Link discovery is the first hop of the pass: given a source page's raw
//! content and its inferred kind, produce raw href candidates. Feeds are
//! read with a quick-xml event reader (one link per `item`/`entry`, href
//! attribute preferred over text content); static pages are read with
//! `scraper` using the source's configured CSS selector.
//!
//! A parse failure on one source must never abort the pass: if the feed
//! reader chokes on the content, discovery falls back to a permissive
//! HTML-document parse over all anchors and continues.

use crate::models::SourceKind;
use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, warn};
use url::Url;

/// File extensions that never point at article content.
const SKIP_EXTENSIONS: [&str; 7] = [".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".pdf"];

/// Extract raw href candidates from source content.
///
/// Returned strings are unnormalized and may be relative; the caller runs
/// each through [`normalize_href`] before deduplication. This function
/// never fails — parser errors degrade to the permissive HTML path.
pub fn extract_links(content: &str, kind: SourceKind, selector: Option<&str>) -> Vec<String> {
    match kind {
        SourceKind::Feed => match feed_links(content) {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "Feed parse failed; falling back to permissive HTML parse");
                html_links(content, None)
            }
        },
        SourceKind::Static => html_links(content, selector),
    }
}

/// Read a feed document, yielding one link value per `item`/`entry` node.
///
/// An href-style attribute wins over text content (Atom `<link href=…/>`
/// vs. RSS `<link>…</link>`); an entry with neither is skipped.
fn feed_links(content: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let mut reader = Reader::from_str(content);
    let mut links = Vec::new();
    let mut in_entry = false;
    let mut in_link = false;
    let mut entry_link: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    in_entry = true;
                    entry_link = None;
                }
                b"link" if in_entry && entry_link.is_none() => {
                    in_link = true;
                    if let Some(attr) = e.try_get_attribute("href")? {
                        entry_link = Some(attr.unescape_value()?.trim().to_string());
                    }
                }
                _ => {}
            },
            Event::Empty(e) => {
                if in_entry
                    && entry_link.is_none()
                    && e.local_name().as_ref() == b"link"
                    && let Some(attr) = e.try_get_attribute("href")?
                {
                    entry_link = Some(attr.unescape_value()?.trim().to_string());
                }
            }
            Event::Text(t) => {
                if in_link && entry_link.is_none() {
                    let text = t.unescape()?.trim().to_string();
                    if !text.is_empty() {
                        entry_link = Some(text);
                    }
                }
            }
            Event::CData(t) => {
                if in_link && entry_link.is_none() {
                    let text = String::from_utf8_lossy(&t).trim().to_string();
                    if !text.is_empty() {
                        entry_link = Some(text);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    in_entry = false;
                    if let Some(link) = entry_link.take()
                        && !link.is_empty()
                    {
                        links.push(link);
                    }
                }
                b"link" => in_link = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    debug!(count = links.len(), "Extracted feed links");
    Ok(links)
}

/// Select anchors from an HTML document using the configured selector.
///
/// Only elements that are actually anchors and carry an href become
/// candidates, no matter what the selector matched. An invalid configured
/// selector degrades to all anchors rather than skipping the source.
fn html_links(content: &str, selector: Option<&str>) -> Vec<String> {
    let all_anchors = Selector::parse("a").unwrap();
    let compiled = match selector {
        Some(raw) => match Selector::parse(raw) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(selector = raw, error = %e, "Invalid article selector; using all anchors");
                all_anchors
            }
        },
        None => all_anchors,
    };

    let document = Html::parse_document(content);
    let mut links = Vec::new();
    for element in document.select(&compiled) {
        if element.value().name() != "a" {
            continue;
        }
        if let Some(href) = element.value().attr("href") {
            links.push(href.to_string());
        }
    }
    debug!(count = links.len(), "Extracted anchor links");
    links
}

/// Resolve a raw href against a base URL, or reject it.
///
/// Rules, in order: blank, `javascript:`, `mailto:`, and bare-fragment
/// hrefs are rejected; any fragment is stripped; protocol-relative hrefs
/// are upgraded to https; the base URL's path is treated as a directory
/// before resolution; resolved URLs with an empty or root path, or a
/// known non-article extension, are rejected.
pub fn normalize_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with('#')
    {
        return None;
    }

    // Fragment stripping must precede the extension check.
    let href = href.split('#').next().unwrap_or_default();
    if href.is_empty() {
        return None;
    }

    let href = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href.to_string()
    };

    let mut base_dir = base.clone();
    if !base_dir.path().ends_with('/') {
        let path = format!("{}/", base_dir.path());
        base_dir.set_path(&path);
    }
    let resolved = base_dir.join(&href).ok()?;

    let path = resolved.path().to_lowercase();
    if path.is_empty() || path == "/" {
        return None;
    }
    if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return None;
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/news").unwrap()
    }

    #[test]
    fn test_rejection_completeness() {
        for href in ["javascript:void(0)", "mailto:a@b.com", "#top", "/img/pic.jpg"] {
            assert!(normalize_href(&base(), href).is_none(), "href: {href}");
        }
    }

    #[test]
    fn test_blank_and_whitespace_rejected() {
        assert!(normalize_href(&base(), "").is_none());
        assert!(normalize_href(&base(), "   ").is_none());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let absolute = "https://a.com/p";
        let once = normalize_href(&base(), absolute).unwrap();
        assert_eq!(once.as_str(), absolute);
        let twice = normalize_href(&base(), once.as_str()).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_fragment_variants_normalize_identically() {
        let plain = normalize_href(&base(), "https://a.com/p").unwrap();
        let fragged = normalize_href(&base(), "https://a.com/p#x").unwrap();
        assert_eq!(plain, fragged);
    }

    #[test]
    fn test_protocol_relative_upgraded_to_https() {
        let url = normalize_href(&base(), "//cdn.example.org/story/1").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/story/1");
    }

    #[test]
    fn test_relative_resolution_treats_base_path_as_directory() {
        let url = normalize_href(&base(), "story-one").unwrap();
        assert_eq!(url.as_str(), "https://example.com/news/story-one");
    }

    #[test]
    fn test_root_path_rejected() {
        assert!(normalize_href(&base(), "https://a.com").is_none());
        assert!(normalize_href(&base(), "https://a.com/").is_none());
    }

    #[test]
    fn test_document_extensions_rejected_case_insensitively() {
        assert!(normalize_href(&base(), "/brochure.PDF").is_none());
        assert!(normalize_href(&base(), "/photo.WebP").is_none());
        assert!(normalize_href(&base(), "/story.html").is_some());
    }

    #[test]
    fn test_rss_item_links_from_text_content() {
        let rss = r#"<?xml version="1.0"?>
            <rss><channel>
              <link>https://example.com</link>
              <item><title>A</title><link>https://example.com/a</link></item>
              <item><title>B</title><link> https://example.com/b </link></item>
              <item><title>No link here</title></item>
            </channel></rss>"#;
        let links = extract_links(rss, SourceKind::Feed, None);
        assert_eq!(
            links,
            vec!["https://example.com/a".to_string(), "https://example.com/b".to_string()]
        );
    }

    #[test]
    fn test_atom_entry_links_from_href_attribute() {
        let atom = r#"<?xml version="1.0"?>
            <feed xmlns="http://www.w3.org/2005/Atom">
              <link href="https://example.com/feed"/>
              <entry><title>A</title><link href="https://example.com/a"/></entry>
              <entry><title>B</title><link href="https://example.com/b"></link></entry>
            </feed>"#;
        let links = extract_links(atom, SourceKind::Feed, None);
        assert_eq!(
            links,
            vec!["https://example.com/a".to_string(), "https://example.com/b".to_string()]
        );
    }

    #[test]
    fn test_rss_cdata_link() {
        let rss = r#"<rss><channel>
              <item><link><![CDATA[https://example.com/cdata]]></link></item>
            </channel></rss>"#;
        let links = extract_links(rss, SourceKind::Feed, None);
        assert_eq!(links, vec!["https://example.com/cdata".to_string()]);
    }

    #[test]
    fn test_malformed_feed_falls_back_to_html_anchors() {
        let broken = r#"<a href="https://example.com/fallback">story</a><unclosed"#;
        let links = extract_links(broken, SourceKind::Feed, None);
        assert!(links.contains(&"https://example.com/fallback".to_string()));
    }

    #[test]
    fn test_static_page_with_custom_selector() {
        let html = r#"<html><body>
            <div class="story-card"><a href="/a">A</a></div>
            <div class="story-card"><a href="/b">B</a></div>
            <nav><a href="/ignored">nav</a></nav>
            </body></html>"#;
        let links = extract_links(html, SourceKind::Static, Some(".story-card a"));
        assert_eq!(links, vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn test_static_page_default_selector_is_all_anchors() {
        let html = r#"<html><body><a href="/a">A</a><a>no href</a><a href="/b">B</a></body></html>"#;
        let links = extract_links(html, SourceKind::Static, None);
        assert_eq!(links, vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn test_selector_matching_non_anchor_yields_nothing() {
        let html = r#"<html><body><div href="/x">not an anchor</div></body></html>"#;
        let links = extract_links(html, SourceKind::Static, Some("div"));
        assert!(links.is_empty());
    }

    #[test]
    fn test_invalid_selector_degrades_to_all_anchors() {
        let html = r#"<html><body><a href="/a">A</a></body></html>"#;
        let links = extract_links(html, SourceKind::Static, Some(":::not-a-selector"));
        assert_eq!(links, vec!["/a".to_string()]);
    }
}
