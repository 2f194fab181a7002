//! Scraper for the museum catalog page
//!
//! The "Musée de France" article lists Paris museums under a heading with
//! id `Paris`, inside the following `div.colonnes` block, one `li > a` per
//! museum. The parser walks the document in order: everything before the
//! heading is ignored, and collection stops at the end of that block.

use crate::models::ScrapedMuseum;
use crate::{AtlasError, Result};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{info, warn};

static LIST_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li a[href]").expect("static selector"));

/// Fetch the catalog page. A non-success status on the primary data source
/// aborts the run.
pub async fn fetch_catalog(client: &reqwest::Client, url: &str) -> Result<String> {
    info!(url, "fetching museum catalog page");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AtlasError::api(format!("catalog request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(AtlasError::api(format!(
            "catalog page returned HTTP {}",
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| AtlasError::api(format!("failed to read catalog page body: {e}")))
}

/// Extract the (name, absolute URL) rows of the Paris section.
#[must_use]
pub fn parse_catalog(html: &str, base_url: &str) -> Vec<ScrapedMuseum> {
    let document = Html::parse_document(html);
    let mut rows = Vec::new();
    let mut past_heading = false;

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        if !past_heading {
            if element.value().id() == Some("Paris") {
                past_heading = true;
            }
            continue;
        }

        if element.value().name() == "div"
            && element.value().classes().any(|c| c == "colonnes")
        {
            for link in element.select(&LIST_LINK) {
                let name: String = link
                    .text()
                    .map(str::trim)
                    .collect::<Vec<_>>()
                    .concat();
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                rows.push(ScrapedMuseum {
                    name,
                    url: absolutize(base_url, href),
                });
            }
            // One columns block per heading; stop at its end
            break;
        }
    }

    if rows.is_empty() {
        warn!("no museum rows found in the Paris section");
    } else {
        info!(count = rows.len(), "museums found in catalog");
    }
    rows
}

/// Resolve an href against the page's origin, the way a browser would for
/// the cases this page actually contains.
fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <h4 id="Lyon">Lyon</h4>
        <div class="colonnes"><ul>
            <li><a href="/wiki/Mus%C3%A9e_des_Confluences">Musée des Confluences</a></li>
        </ul></div>
        <h4 id="Paris">Paris</h4>
        <p>Intro text</p>
        <div class="colonnes"><ul>
            <li><a href="/wiki/Mus%C3%A9e_du_Louvre">Musée du Louvre</a></li>
            <li><a href="/wiki/Mus%C3%A9e_d%27Orsay">Musée d'Orsay</a></li>
            <li><a href="/wiki/Empty"></a></li>
            <li>No link here</li>
        </ul></div>
        <div class="colonnes"><ul>
            <li><a href="/wiki/Autre">Autre ville</a></li>
        </ul></div>
        </body></html>"#;

    #[test]
    fn test_parse_catalog_takes_only_the_paris_block() {
        let rows = parse_catalog(PAGE, "https://fr.wikipedia.org");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Musée du Louvre");
        assert_eq!(
            rows[0].url,
            "https://fr.wikipedia.org/wiki/Mus%C3%A9e_du_Louvre"
        );
        assert_eq!(rows[1].name, "Musée d'Orsay");
    }

    #[test]
    fn test_parse_catalog_without_paris_section() {
        let rows = parse_catalog("<html><body><p>nothing</p></body></html>", "https://fr.wikipedia.org");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("https://fr.wikipedia.org", "/wiki/Louvre"),
            "https://fr.wikipedia.org/wiki/Louvre"
        );
        assert_eq!(
            absolutize("https://fr.wikipedia.org", "https://example.org/x"),
            "https://example.org/x"
        );
        assert_eq!(
            absolutize("https://fr.wikipedia.org", "//upload.wikimedia.org/logo.svg"),
            "https://upload.wikimedia.org/logo.svg"
        );
    }
}
