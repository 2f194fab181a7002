//! Best-effort summarizer for encyclopedia articles
//!
//! Extracts the lead paragraphs of an article by locating the first body
//! paragraph that references the page title (or a variant of it), then
//! truncates to a word budget at a sentence boundary. Every failure path
//! collapses to `None`; a museum without a summary is skipped, never fatal.

use super::clean_text;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1#firstHeading").expect("static selector"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("static selector"));
static TITLE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());
static DISAMBIGUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Pour les articles homonymes|Ne pas confondre)").unwrap()
});
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)modifier\s*-\s*modifier le code\s*-\s*modifier wikidata").unwrap(),
        Regex::new(r"(?i)\d+\s*m2\s*d['’]expositions permanentes").unwrap(),
        Regex::new(r"(?i)\d+\s*m²\s*d['’]expositions permanentes").unwrap(),
    ]
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Title words carrying no identity, dropped when deriving variants.
const STOPWORDS: [&str; 12] = [
    "musée", "musee", "de", "du", "des", "d", "la", "le", "l", "à", "a", "et",
];

/// Paragraphs shorter than this are furniture, not content.
const MIN_PARAGRAPH_CHARS: usize = 30;

/// Fetches article pages and produces plain-text summaries.
pub struct Summarizer {
    client: reqwest::Client,
    word_budget: usize,
}

impl Summarizer {
    #[must_use]
    pub fn new(client: reqwest::Client, word_budget: usize) -> Self {
        Self {
            client,
            word_budget,
        }
    }

    /// Fetch and summarize one article. Returns `None` on any failure:
    /// network error, non-success status, missing title, empty extraction.
    pub async fn summarize(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "article fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(url, status = %response.status(), "article returned non-success status");
            return None;
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "failed to read article body");
                return None;
            }
        };

        summarize_article(&html, self.word_budget)
    }
}

/// The parsing/summarizing half, independent of the network.
#[must_use]
pub fn summarize_article(html: &str, word_budget: usize) -> Option<String> {
    let document = Html::parse_document(html);

    let title = document
        .select(&HEADING)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())?;

    let variants = title_variants(&title);
    debug!(%title, variants = variants.len(), "derived title variants");

    let text = match lead_paragraphs(&document, &variants) {
        Some(lead) => lead,
        None => fallback_paragraph(&document)?,
    };

    let summary = truncate_to_budget(&text, word_budget);
    let cleaned = keep_from_first_uppercase(&strip_boilerplate(&summary));
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Variant strings used to find where the body first references the title:
/// the full lowercased title, its stopword-stripped form, and each
/// significant word on its own.
fn title_variants(title: &str) -> BTreeSet<String> {
    let title = title.to_lowercase();
    let words: Vec<&str> = TITLE_WORD
        .find_iter(&title)
        .map(|m| m.as_str())
        .filter(|w| !STOPWORDS.contains(w))
        .collect();

    let mut variants = BTreeSet::new();
    if words.is_empty() {
        variants.insert(title);
    } else {
        variants.insert(words.join(" "));
        variants.insert(title.clone());
        variants.extend(words.into_iter().map(String::from));
    }
    variants
}

/// Paragraphs from the first body paragraph matching a title variant,
/// skipping infobox/banner content and disambiguation notices.
fn lead_paragraphs(document: &Html, variants: &BTreeSet<String>) -> Option<String> {
    let mut found = false;
    let mut collected: Vec<String> = Vec::new();

    for paragraph in document.select(&PARAGRAPH) {
        if in_excluded_container(paragraph) {
            continue;
        }
        let text = clean_text(&paragraph.text().collect::<String>());
        if DISAMBIGUATION.is_match(&text) {
            continue;
        }
        if !found {
            let lower = text.to_lowercase();
            found = variants.iter().any(|v| lower.contains(v));
        }
        if found && text.chars().count() > MIN_PARAGRAPH_CHARS {
            collected.push(text);
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join(" "))
    }
}

/// Fallback: the second substantial body paragraph, or the first when the
/// page only has one.
fn fallback_paragraph(document: &Html) -> Option<String> {
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH)
        .map(|p| clean_text(&p.text().collect::<String>()))
        .filter(|t| t.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();

    match paragraphs.len() {
        0 => None,
        1 => Some(paragraphs[0].clone()),
        _ => Some(paragraphs[1].clone()),
    }
}

fn in_excluded_container(paragraph: ElementRef<'_>) -> bool {
    paragraph
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            let element = ancestor.value();
            match element.name() {
                "table" => element.classes().any(|c| c.contains("infobox")),
                "div" => element.classes().any(|c| c.contains("bandeau")),
                _ => false,
            }
        })
}

/// Keep whole sentences up to the word budget. The first sentence is always
/// kept, and the result ends with a period.
#[must_use]
pub fn truncate_to_budget(text: &str, max_words: usize) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut word_count = 0;

    for sentence in split_sentences(text) {
        let words = sentence.split_whitespace().count();
        if word_count + words > max_words && word_count > 0 {
            break;
        }
        kept.push(sentence);
        word_count += words;
    }

    let mut summary = kept.join(" ").trim().to_string();
    if !summary.ends_with('.') {
        summary.push('.');
    }
    summary
}

/// Split after sentence terminators followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if matches!(b, b'.' | b'!' | b'?')
            && bytes.get(i + 1).is_some_and(u8::is_ascii_whitespace)
        {
            let sentence = text[start..=i].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = i + 1;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Strip known page furniture regardless of which path produced the text.
#[must_use]
pub fn strip_boilerplate(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in BOILERPLATE.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    WHITESPACE.replace_all(&out, " ").trim().to_string()
}

/// Drop leading junk (list markers, stray digits) before the first
/// uppercase letter.
#[must_use]
pub fn keep_from_first_uppercase(text: &str) -> String {
    match text.char_indices().find(|(_, c)| c.is_uppercase()) {
        Some((index, _)) => text[index..].trim().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!(
            "<html><body><h1 id=\"firstHeading\">Musée de la Chasse</h1>{body}</body></html>"
        )
    }

    fn long_paragraph(lead: &str, sentences: usize) -> String {
        let mut text = String::from(lead);
        for i in 0..sentences {
            text.push_str(&format!(
                " La collection numéro {i} rassemble des œuvres remarquables venues de toute \
                 l'Europe au fil des siècles."
            ));
        }
        text
    }

    #[test]
    fn test_summary_is_truncated_to_budget_and_ends_with_period() {
        // A matching paragraph followed by well over 150 words
        let body = format!(
            "<p>{}</p>",
            long_paragraph("Le musée de la Chasse est un musée parisien.", 30)
        );
        let summary = summarize_article(&page(&body), 150).unwrap();

        assert!(summary.split_whitespace().count() <= 150);
        assert!(summary.ends_with('.'));
        assert!(summary.starts_with("Le musée de la Chasse"));
    }

    #[test]
    fn test_fallback_returns_second_paragraph() {
        // Neither paragraph mentions the title or a variant of it
        let body = "<p>Premier paragraphe générique sans rapport avec le sujet traité ici.</p>\
                    <p>Deuxième paragraphe générique, tout aussi éloigné du titre de la page.</p>";
        let summary = summarize_article(&page(body), 150).unwrap();
        assert!(summary.starts_with("Deuxième paragraphe"));
    }

    #[test]
    fn test_fallback_single_paragraph() {
        let body = "<p>Seul paragraphe générique de la page, sans mention utile du sujet.</p>";
        let summary = summarize_article(&page(body), 150).unwrap();
        assert!(summary.starts_with("Seul paragraphe"));
    }

    #[test]
    fn test_disambiguation_and_infobox_are_skipped() {
        let body = "<p>Pour les articles homonymes, voir Chasse (homonymie) et musée (liste).</p>\
                    <table class=\"infobox_v3\"><tr><td>\
                    <p>Texte d'infobox mentionnant le musée de la Chasse longuement.</p>\
                    </td></tr></table>\
                    <p>Le musée de la Chasse et de la Nature ouvre en 1967 dans le Marais.</p>";
        let summary = summarize_article(&page(body), 150).unwrap();
        assert!(summary.starts_with("Le musée de la Chasse et de la Nature"));
    }

    #[test]
    fn test_banner_divs_are_skipped() {
        let body = "<div class=\"bandeau-container\">\
                    <p>Bandeau mentionnant le musée de la Chasse à ignorer absolument ici.</p>\
                    </div>\
                    <p>La Chasse est le sujet de ce paragraphe substantiel du corps de page.</p>";
        let summary = summarize_article(&page(body), 150).unwrap();
        assert!(summary.starts_with("La Chasse est le sujet"));
    }

    #[test]
    fn test_missing_heading_yields_none() {
        let html = "<html><body><p>Un paragraphe sans titre de page au-dessus.</p></body></html>";
        assert!(summarize_article(html, 150).is_none());
    }

    #[test]
    fn test_empty_page_yields_none() {
        assert!(summarize_article(&page(""), 150).is_none());
    }

    #[test]
    fn test_boilerplate_is_stripped() {
        let body = "<p>Le musée de la Chasse expose 2500 m2 d'expositions permanentes \
                    modifier - modifier le code - modifier wikidata et des collections rares \
                    réparties sur plusieurs étages du bâtiment historique.</p>";
        let summary = summarize_article(&page(body), 150).unwrap();
        assert!(!summary.contains("modifier le code"));
        assert!(!summary.contains("m2 d'expositions"));
    }

    #[test]
    fn test_truncate_keeps_first_sentence_even_over_budget() {
        let text = "Une très longue première phrase qui dépasse le budget imparti de mots.";
        let result = truncate_to_budget(text, 3);
        assert_eq!(result, text);
    }

    #[test]
    fn test_truncate_appends_period() {
        let result = truncate_to_budget("Phrase sans point final", 150);
        assert_eq!(result, "Phrase sans point final.");
    }

    #[test]
    fn test_truncate_stops_at_sentence_boundary() {
        let text = "Première phrase de cinq mots exactement. Deuxième phrase de cinq mots \
                    aussi. Troisième phrase ici.";
        let result = truncate_to_budget(text, 12);
        assert!(result.ends_with("aussi."));
        assert!(!result.contains("Troisième"));
    }

    #[test]
    fn test_keep_from_first_uppercase() {
        assert_eq!(
            keep_from_first_uppercase("1986 - Le musée ouvre."),
            "Le musée ouvre."
        );
        // Accented uppercase counts as a start
        assert_eq!(
            keep_from_first_uppercase("« Élégant bâtiment »"),
            "Élégant bâtiment »"
        );
        // No uppercase at all: text is returned unchanged
        assert_eq!(keep_from_first_uppercase("1234"), "1234");
    }

    #[test]
    fn test_title_variants() {
        let variants = title_variants("Musée de la Chasse et de la Nature");
        assert!(variants.contains("musée de la chasse et de la nature"));
        assert!(variants.contains("chasse nature"));
        assert!(variants.contains("chasse"));
        assert!(variants.contains("nature"));
        assert!(!variants.contains("de"));
        assert!(!variants.contains("et"));
    }
}
