//! Transit stations: loading, clipping to the Paris boundary, and the
//! accessibility test against one museum's isochrone

use crate::models::{Coordinates, IsochroneSet, Station};
use crate::{AtlasError, Result};
use geo::{Intersects, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use std::path::Path;
use tracing::{info, warn};

/// Accessibility is always judged against the 10-minute walking area.
pub const ACCESSIBLE_THRESHOLD_SECONDS: u32 = 600;

/// Load the stations file. A missing or unreadable file is a hard failure;
/// individual features without a point or a name are logged and skipped.
pub fn load_stations(path: &Path) -> Result<Vec<Station>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AtlasError::general(format!(
            "required stations file {} cannot be read: {e}",
            path.display()
        ))
    })?;

    let geojson: GeoJson = raw
        .parse()
        .map_err(|e| AtlasError::validation(format!("stations file is not GeoJSON: {e}")))?;
    let collection = FeatureCollection::try_from(geojson).map_err(|e| {
        AtlasError::validation(format!("stations file is not a feature collection: {e}"))
    })?;

    let mut stations = Vec::new();
    for (index, feature) in collection.features.iter().enumerate() {
        match station_from_feature(feature, index) {
            Some(station) => stations.push(station),
            None => warn!(index, "skipping station feature without point or name"),
        }
    }

    info!(count = stations.len(), path = %path.display(), "stations loaded");
    Ok(stations)
}

fn station_from_feature(feature: &geojson::Feature, index: usize) -> Option<Station> {
    let geometry = feature.geometry.as_ref()?;
    let geojson::Value::Point(position) = &geometry.value else {
        return None;
    };
    let (&lon, &lat) = (position.first()?, position.get(1)?);

    let props = feature.properties.as_ref()?;
    let name = props.get("nom_zda").and_then(serde_json::Value::as_str)?;

    let id = props
        .get("id_ref_zda")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| format!("station_{index}"), String::from);

    Some(Station {
        id,
        name: name.to_string(),
        mode: props
            .get("mode")
            .and_then(serde_json::Value::as_str)
            .map(String::from),
        network: props
            .get("res_com")
            .and_then(serde_json::Value::as_str)
            .map(String::from),
        point: Coordinates::new(lon, lat),
        accessible: false,
    })
}

/// Keep only the stations intersecting the boundary polygon.
#[must_use]
pub fn stations_within(stations: Vec<Station>, boundary: &MultiPolygon<f64>) -> Vec<Station> {
    let total = stations.len();
    let inside: Vec<Station> = stations
        .into_iter()
        .filter(|station| boundary.intersects(&station.point.to_point()))
        .collect();
    info!(kept = inside.len(), total, "stations clipped to boundary");
    inside
}

/// Set each station's flag from point-in-polygon containment against the
/// 600-second isochrone. Its absence is a hard failure: without that
/// polygon the accessibility question has no answer.
pub fn flag_accessibility(
    stations: &mut [Station],
    isochrones: &IsochroneSet,
) -> Result<(usize, usize)> {
    let threshold = isochrones
        .polygon_for(ACCESSIBLE_THRESHOLD_SECONDS)
        .ok_or_else(|| {
            AtlasError::geometry(format!(
                "no {ACCESSIBLE_THRESHOLD_SECONDS} s polygon in the isochrone set"
            ))
        })?;

    let mut inside = 0;
    for station in stations.iter_mut() {
        station.accessible = threshold.contains(station.point.to_point());
        if station.accessible {
            inside += 1;
        }
    }

    let outside = stations.len() - inside;
    info!(inside, outside, "stations flagged against the walking area");
    Ok((inside, outside))
}
