//! OpenRouteService isochrone client
//!
//! One POST per museum against the isochrones endpoint for the configured
//! travel profile. The raw GeoJSON response is persisted before parsing so
//! the reachable areas stay reloadable outside this run. A non-success
//! response aborts the whole run; there are no retries.

use crate::config::RoutingConfig;
use crate::models::{Coordinates, IsochroneSet};
use crate::{AtlasError, Result};
use geojson::FeatureCollection;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Request body of the isochrones endpoint.
#[derive(Debug, Serialize)]
struct IsochroneRequest {
    /// lon/lat pairs, one per start point
    locations: Vec<[f64; 2]>,
    /// Travel-time thresholds in seconds
    range: Vec<u32>,
    units: &'static str,
    location_type: &'static str,
}

pub struct OrsClient {
    client: reqwest::Client,
    config: RoutingConfig,
}

impl OrsClient {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
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

    /// Fetch walking isochrones around one point. Returns the raw GeoJSON
    /// text (for persistence) together with the parsed set.
    pub async fn walking_isochrones(
        &self,
        point: Coordinates,
    ) -> Result<(String, IsochroneSet)> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            AtlasError::config("routing API key is required to compute isochrones")
        })?;

        let url = format!(
            "{}/v2/isochrones/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        );

        let body = IsochroneRequest {
            locations: vec![[point.longitude, point.latitude]],
            range: self.config.ranges_seconds.clone(),
            units: "m",
            location_type: "start",
        };

        debug!(url, point = %point.format(), "requesting isochrones");

        let response = self
            .client
            .post(&url)
            .header("Authorization", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AtlasError::api(format!("routing request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AtlasError::api(format!(
                "routing API returned HTTP {status}: {body}"
            )));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AtlasError::api(format!("failed to read routing response: {e}")))?;

        let geojson: geojson::GeoJson = raw
            .parse()
            .map_err(|e| AtlasError::api(format!("routing response is not GeoJSON: {e}")))?;
        let collection = FeatureCollection::try_from(geojson).map_err(|e| {
            AtlasError::api(format!("routing response is not a feature collection: {e}"))
        })?;
        let set = IsochroneSet::from_feature_collection(&collection)?;

        if set.is_empty() {
            return Err(AtlasError::api("routing response contains no isochrones"));
        }

        info!(
            thresholds = ?set.thresholds(),
            "isochrones received"
        );
        Ok((raw, set))
    }
}
