//! Wikipedia scraping: the museum catalog page and per-article summaries
//!
//! Both consumers share one HTTP client with a browser-like user agent and a
//! short per-request timeout. Pages are parsed as semi-structured markup;
//! nothing here assumes the site's layout beyond a few long-stable anchors
//! (heading ids, `div.colonnes`, `h1#firstHeading`, infobox/bandeau
//! containers).

pub mod catalog;
pub mod summary;

pub use catalog::{fetch_catalog, parse_catalog};
pub use summary::Summarizer;

use crate::Result;
use crate::config::ScrapingConfig;
use crate::error::AtlasError;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*[\w\s.\-]+\s*\]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Build the shared scraping client.
pub fn page_client(config: &ScrapingConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| AtlasError::general(format!("failed to create HTTP client: {e}")))
}

/// Strip citation brackets (`[1]`, `[réf. nécessaire]`) and collapse
/// whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let without_citations = CITATION.replace_all(text, "");
    WHITESPACE
        .replace_all(&without_citations, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_citations_and_whitespace() {
        assert_eq!(
            clean_text("Le musée[1]  ouvre \n ses portes [réf. nécessaire] en 1986."),
            "Le musée ouvre ses portes en 1986."
        );
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text("   "), "");
    }
}
