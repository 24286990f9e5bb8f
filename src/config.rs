//! Configuration loading, validation, and the compiled keyword set.
//!
//! Configuration is read once at startup from a YAML file (or JSON, chosen
//! by file extension) and is read-only for the rest of the pass. A missing
//! or malformed file is the only fatal error in the whole program: the
//! process exits before any fetch begins.
//!
//! # Example config
//!
//! ```yaml
//! max_age_days: 14
//! min_words: 200
//! concurrency: 12
//! timeout_secs: 25
//! reject_undated: false
//! require_keyword: true
//! keywords:
//!   - election
//!   - ballot
//! sources:
//!   - name: Example Wire
//!     url: https://example.com/rss.xml
//!   - name: Example Front Page
//!     url: https://example.com/news
//!     article_selector: ".story-card a"
//! ```

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};
use url::Url;

/// One configured place to discover article links.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    /// Display name used in logs and the report's `source` column.
    pub name: String,
    /// Feed or listing-page URL; the source kind is inferred from it.
    pub url: String,
    /// CSS selector for anchors on static pages. Defaults to all anchors.
    #[serde(default)]
    pub article_selector: Option<String>,
}

/// Process-wide harvest configuration, loaded once before the pass.
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum article age in days; older dated articles are dropped.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
    /// Minimum whitespace-delimited word count for the main content region.
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    /// Maximum number of article fetches in flight at any instant.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Drop articles for which no publication date could be resolved.
    #[serde(default)]
    pub reject_undated: bool,
    /// Drop articles that match none of the configured keywords.
    #[serde(default)]
    pub require_keyword: bool,
    /// Case-insensitive keywords; blank entries are discarded at load.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Sources to interrogate, visited in order.
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

fn default_max_age_days() -> i64 {
    14
}

fn default_min_words() -> usize {
    200
}

fn default_concurrency() -> usize {
    12
}

fn default_timeout_secs() -> u64 {
    25
}

impl HarvestConfig {
    /// Load and validate configuration from a YAML or JSON file.
    ///
    /// The format is chosen by extension: `.json` parses as JSON,
    /// anything else as YAML. Any failure here is fatal to the pass.
    #[instrument(level = "info", skip_all, fields(path = %path))]
    pub fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {path}: {e}"))?;

        let is_json = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config: HarvestConfig = if is_json {
            serde_json::from_str(&raw).map_err(|e| format!("malformed JSON config: {e}"))?
        } else {
            serde_yaml::from_str(&raw).map_err(|e| format!("malformed YAML config: {e}"))?
        };

        config.keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        config.validate()?;
        info!(
            sources = config.sources.len(),
            keywords = config.keywords.len(),
            max_age_days = config.max_age_days,
            min_words = config.min_words,
            concurrency = config.concurrency,
            timeout_secs = config.timeout_secs,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Reject configurations that could never run a meaningful pass.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.concurrency == 0 {
            return Err("concurrency must be greater than zero".into());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".into());
        }
        for src in &self.sources {
            if src.name.trim().is_empty() {
                return Err(format!("source with url {} has an empty name", src.url).into());
            }
            Url::parse(&src.url)
                .map_err(|e| format!("source {} has an invalid url {}: {e}", src.name, src.url))?;
        }
        Ok(())
    }
}

/// Keyword patterns compiled once at config load and shared, read-only,
/// by every concurrent enrichment call. No recompilation per article.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    patterns: Vec<Regex>,
}

impl KeywordSet {
    /// Compile case-insensitive literal patterns from the configured keywords.
    pub fn compile(keywords: &[String]) -> Result<Self, Box<dyn Error>> {
        let mut patterns = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let pattern = RegexBuilder::new(&regex::escape(keyword))
                .case_insensitive(true)
                .build()
                .map_err(|e| format!("keyword {keyword:?} failed to compile: {e}"))?;
            patterns.push(pattern);
        }
        debug!(count = patterns.len(), "Compiled keyword patterns");
        Ok(Self { patterns })
    }

    /// Count how many *distinct* keywords appear in `text`.
    pub fn count_hits(&self, text: &str) -> usize {
        self.patterns.iter().filter(|re| re.is_match(text)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str, ext: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "feedsweep_config_test_{}_{}.{ext}",
            std::process::id(),
            contents.len()
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_applied_to_sparse_yaml() {
        let path = write_temp("sources: []\n", "yaml");
        let config = HarvestConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.max_age_days, 14);
        assert_eq!(config.min_words, 200);
        assert_eq!(config.concurrency, 12);
        assert_eq!(config.timeout_secs, 25);
        assert!(!config.reject_undated);
        assert!(!config.require_keyword);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_json_config_by_extension() {
        let path = write_temp(
            r#"{"min_words": 50, "keywords": [" election ", ""], "sources": []}"#,
            "json",
        );
        let config = HarvestConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.min_words, 50);
        assert_eq!(config.keywords, vec!["election".to_string()]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_config_is_fatal() {
        assert!(HarvestConfig::load("/nonexistent/feedsweep.yaml").is_err());
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let path = write_temp(": definitely not yaml {{{", "yaml");
        assert!(HarvestConfig::load(path.to_str().unwrap()).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let path = write_temp("concurrency: 0\nsources: []\n", "yaml");
        assert!(HarvestConfig::load(path.to_str().unwrap()).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_source_url_rejected() {
        let path = write_temp(
            "sources:\n  - name: Bad\n    url: 'not a url'\n",
            "yaml",
        );
        assert!(HarvestConfig::load(path.to_str().unwrap()).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_keyword_hits_are_distinct_and_case_insensitive() {
        let keywords = vec!["Election".to_string(), "ballot".to_string()];
        let set = KeywordSet::compile(&keywords).unwrap();
        assert_eq!(set.count_hits("the ELECTION election election"), 1);
        assert_eq!(set.count_hits("election day ballot box"), 2);
        assert_eq!(set.count_hits("no politics here"), 0);
    }

    #[test]
    fn test_empty_keyword_set_counts_zero() {
        let set = KeywordSet::compile(&[]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.count_hits("anything at all"), 0);
    }

    #[test]
    fn test_keywords_with_regex_metachars_match_literally() {
        let keywords = vec!["c++ (beta)".to_string()];
        let set = KeywordSet::compile(&keywords).unwrap();
        assert_eq!(set.count_hits("we love C++ (BETA) builds"), 1);
        assert_eq!(set.count_hits("cxx beta"), 0);
    }
}
