//! Record linkage between official museum records and scraped catalog rows
//!
//! The register and the catalog never agree on exact naming ("Musée d'Orsay"
//! vs "Musee dOrsay"), so the join goes through an ordered list of matcher
//! strategies: token-set overlap on names first, then a fallback comparing
//! the museum's own website URL against candidate names. Each strategy
//! returns an optional candidate; the first success wins and unmatched
//! museums are simply left unmatched.

use crate::models::{Museum, ScrapedMuseum};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, info};

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Lowercase, fold French diacritics, and drop apostrophes so that
/// `"Musée d'Orsay"` and `"Musee dOrsay"` normalize to the same tokens.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match c {
            '\'' | '\u{2019}' => {}
            'à' | 'â' | 'ä' => out.push('a'),
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'î' | 'ï' => out.push('i'),
            'ô' | 'ö' => out.push('o'),
            'ù' | 'û' | 'ü' => out.push('u'),
            'ç' => out.push('c'),
            'œ' => out.push_str("oe"),
            'æ' => out.push_str("ae"),
            other => out.push(other),
        }
    }
    out
}

/// Word tokens of the normalized text, as a set.
#[must_use]
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let normalized = normalize(text);
    WORD.find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Jaccard similarity of two token sets.
#[must_use]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// One way of matching a museum to a catalog row.
pub trait MatchStrategy {
    fn name(&self) -> &'static str;

    /// The best-scoring candidate at or above the threshold, or `None`.
    /// Ties break by insertion order: the first-seen candidate wins.
    fn find_match<'a>(
        &self,
        museum: &Museum,
        candidates: &'a [ScrapedMuseum],
    ) -> Option<&'a ScrapedMuseum>;
}

/// Pass 1: Jaccard similarity of name token sets.
pub struct TokenOverlapMatcher {
    pub threshold: f64,
}

impl MatchStrategy for TokenOverlapMatcher {
    fn name(&self) -> &'static str {
        "token-overlap"
    }

    fn find_match<'a>(
        &self,
        museum: &Museum,
        candidates: &'a [ScrapedMuseum],
    ) -> Option<&'a ScrapedMuseum> {
        let target = tokenize(&museum.name);
        if target.is_empty() {
            return None;
        }

        let mut best: Option<&ScrapedMuseum> = None;
        let mut best_score = 0.0;

        for candidate in candidates {
            let score = jaccard(&target, &tokenize(&candidate.name));
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        if best_score >= self.threshold { best } else { None }
    }
}

/// Pass 2: the museum's own website URL against candidate names, by exact
/// substring containment first and edit-distance ratio otherwise.
pub struct UrlFallbackMatcher {
    pub threshold: f64,
}

impl MatchStrategy for UrlFallbackMatcher {
    fn name(&self) -> &'static str {
        "url-fallback"
    }

    fn find_match<'a>(
        &self,
        museum: &Museum,
        candidates: &'a [ScrapedMuseum],
    ) -> Option<&'a ScrapedMuseum> {
        let url = museum.website.as_deref()?.trim().to_lowercase();
        if url.is_empty() {
            return None;
        }

        let mut best: Option<&ScrapedMuseum> = None;
        let mut best_score = 0.0;

        for candidate in candidates {
            let name = candidate.name.to_lowercase();
            let score = if name.contains(&url) {
                1.0
            } else {
                strsim::normalized_levenshtein(&url, &name)
            };
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        if best_score >= self.threshold { best } else { None }
    }
}

/// The standard strategy order.
#[must_use]
pub fn default_strategies(threshold: f64) -> Vec<Box<dyn MatchStrategy>> {
    vec![
        Box::new(TokenOverlapMatcher { threshold }),
        Box::new(UrlFallbackMatcher { threshold }),
    ]
}

/// Counts reported after a linking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub matched: usize,
    pub unmatched: usize,
}

/// Annotate each museum with its best-matching catalog row. The matched URL
/// is copied verbatim; unmatched museums are left untouched.
pub fn link_museums(
    museums: &mut [Museum],
    candidates: &[ScrapedMuseum],
    strategies: &[Box<dyn MatchStrategy>],
) -> LinkStats {
    let mut stats = LinkStats::default();

    for museum in museums.iter_mut() {
        let matched = strategies
            .iter()
            .find_map(|strategy| {
                strategy
                    .find_match(museum, candidates)
                    .inspect(|candidate| {
                        debug!(
                            museum = %museum.name,
                            candidate = %candidate.name,
                            strategy = strategy.name(),
                            "linked"
                        );
                    })
            });

        match matched {
            Some(candidate) => {
                museum.scraped_name = Some(candidate.name.clone());
                museum.scraped_url = Some(candidate.url.clone());
                stats.matched += 1;
            }
            None => {
                debug!(museum = %museum.name, "no catalog match");
                stats.unmatched += 1;
            }
        }
    }

    info!(
        matched = stats.matched,
        unmatched = stats.unmatched,
        "record linkage finished"
    );
    stats
}
