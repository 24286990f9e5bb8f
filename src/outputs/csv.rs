//! CSV report writer.
//!
//! Kept articles are sorted by `(source, date)` and written quote-all with
//! the header `title,url,date,host,hits,words,source`. Undated articles
//! serialize their date column as `Undated`.

use crate::models::EnrichedArticle;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

const HEADER: [&str; 7] = ["title", "url", "date", "host", "hits", "words", "source"];

/// Quote a field for CSV output, doubling any embedded quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render the full report as CSV text.
pub fn render_report(kept: &[EnrichedArticle]) -> String {
    let mut rows: Vec<&EnrichedArticle> = kept.iter().collect();
    rows.sort_by_key(|a| (a.source_name.clone(), a.date_label()));

    let mut out = String::new();
    out.push_str(&HEADER.map(quote).join(","));
    out.push_str("\r\n");
    for article in rows {
        let fields = [
            quote(&article.title),
            quote(&article.url),
            quote(&article.date_label()),
            quote(&article.host),
            quote(&article.keyword_hits.to_string()),
            quote(&article.word_count.to_string()),
            quote(&article.source_name),
        ];
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }
    out
}

/// Write the sorted report to `path`.
#[instrument(level = "info", skip_all, fields(path = %path, count = kept.len()))]
pub async fn write_report(kept: &[EnrichedArticle], path: &str) -> Result<(), Box<dyn Error>> {
    let csv = render_report(kept);
    fs::write(path, csv).await?;
    info!("Wrote harvest report");
    Ok(())
}
