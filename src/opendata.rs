//! Client for the Île-de-France open-data API (Opendatasoft explore v2.1)
//!
//! The museum register is fetched with a paginated JSON query filtered by
//! commune. A non-success response from this primary data source aborts the
//! whole run; individual records that cannot be narrowed (no coordinates)
//! are logged and skipped.

use crate::config::OpendataConfig;
use crate::models::Museum;
use crate::{AtlasError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// One page of the explore API response.
#[derive(Debug, Deserialize)]
struct RecordsPage {
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    results: Vec<Map<String, Value>>,
}

pub struct OpendataClient {
    client: reqwest::Client,
    config: OpendataConfig,
}

impl OpendataClient {
    pub fn new(config: &OpendataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("museatlas/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AtlasError::general(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch every museum of the configured commune, page by page.
    pub async fn fetch_museums(&self) -> Result<Vec<Museum>> {
        let mut museums = Vec::new();
        let mut skipped = 0usize;
        let mut offset = 0u32;

        loop {
            let page = self.fetch_page(offset).await?;
            let page_len = page.results.len() as u32;

            for record in &page.results {
                match Museum::from_record(record) {
                    Ok(museum) => museums.push(museum),
                    Err(e) => {
                        skipped += 1;
                        warn!(error = %e, "skipping record that cannot be narrowed");
                    }
                }
            }

            debug!(offset, page_len, "fetched open-data page");

            // Short page: that was the last one
            if page_len < self.config.page_size {
                break;
            }
            offset += page_len;
            if let Some(total) = page.total_count {
                if u64::from(offset) >= total {
                    break;
                }
            }
        }

        if museums.is_empty() {
            return Err(AtlasError::api(
                "open-data query returned no usable museum records",
            ));
        }

        info!(
            count = museums.len(),
            skipped, "museum records fetched from open data"
        );
        Ok(museums)
    }

    async fn fetch_page(&self, offset: u32) -> Result<RecordsPage> {
        let url = self.page_url(offset);
        debug!(%url, "querying open-data API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AtlasError::api(format!("open-data request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AtlasError::api(format!(
                "open-data API returned HTTP {status}: {body}"
            )));
        }

        response
            .json::<RecordsPage>()
            .await
            .map_err(|e| AtlasError::api(format!("failed to parse open-data response: {e}")))
    }

    fn page_url(&self, offset: u32) -> String {
        let filter = format!("commune = \"{}\"", self.config.commune);
        format!(
            "{}/catalog/datasets/{}/records?select=*&where={}&limit={}&offset={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.dataset,
            urlencoding::encode(&filter),
            self.config.page_size,
            offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OpendataConfig {
        OpendataConfig {
            base_url: "https://data.iledefrance.fr/api/explore/v2.1".to_string(),
            dataset: "liste_des_musees_franciliens".to_string(),
            commune: "Paris".to_string(),
            page_size: 100,
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_page_url_encodes_the_filter() {
        let client = OpendataClient::new(&test_config()).unwrap();
        let url = client.page_url(0);
        assert!(url.starts_with(
            "https://data.iledefrance.fr/api/explore/v2.1/catalog/datasets/liste_des_musees_franciliens/records?"
        ));
        assert!(url.contains("select=*"));
        assert!(url.contains("limit=100"));
        assert!(url.contains("offset=0"));
        assert!(url.contains("commune%20%3D%20%22Paris%22"));
    }

    #[test]
    fn test_records_page_deserializes_loose_records() {
        let json = r#"{
            "total_count": 2,
            "results": [
                {"nom_officiel_du_musee": "musée du Louvre",
                 "identifiant_museofile": "M0001",
                 "geolocalisation": {"lon": 2.3364, "lat": 48.8606}},
                {"nom_officiel_du_musee": "musée sans position"}
            ]
        }"#;
        let page: RecordsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_count, Some(2));
        assert_eq!(page.results.len(), 2);

        let narrowed: Vec<_> = page
            .results
            .iter()
            .filter_map(|r| Museum::from_record(r).ok())
            .collect();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].id, "M0001");
    }
}
