//! Isochrone records returned by the routing API

use crate::{AtlasError, Result};
use geo::{Intersects, MultiPolygon};
use geojson::FeatureCollection;

/// One reachable-area polygon for a travel-time threshold.
#[derive(Debug, Clone)]
pub struct Isochrone {
    /// Travel-time threshold in seconds
    pub seconds: u32,
    pub polygon: MultiPolygon<f64>,
}

impl Isochrone {
    /// Point-in-polygon test against this isochrone's area.
    #[must_use]
    pub fn contains(&self, point: geo::Point<f64>) -> bool {
        self.polygon.intersects(&point)
    }
}

/// The isochrones of one museum, one polygon per threshold value.
#[derive(Debug, Clone, Default)]
pub struct IsochroneSet {
    isochrones: Vec<Isochrone>,
}

impl IsochroneSet {
    /// Parse the routing API's GeoJSON response. Each feature carries its
    /// threshold in the `value` property and a (multi)polygon geometry.
    /// Duplicate thresholds violate the one-polygon-per-value invariant.
    pub fn from_feature_collection(collection: &FeatureCollection) -> Result<Self> {
        let mut isochrones: Vec<Isochrone> = Vec::new();

        for feature in &collection.features {
            let seconds = feature
                .properties
                .as_ref()
                .and_then(|props| props.get("value"))
                .and_then(serde_json::Value::as_f64)
                .ok_or_else(|| {
                    AtlasError::validation("isochrone feature has no numeric 'value' property")
                })?;
            let seconds = seconds as u32;

            if isochrones.iter().any(|iso| iso.seconds == seconds) {
                return Err(AtlasError::validation(format!(
                    "duplicate isochrone threshold {seconds} s"
                )));
            }

            let geometry = feature.geometry.as_ref().ok_or_else(|| {
                AtlasError::validation("isochrone feature has no geometry")
            })?;
            let geometry = geo::Geometry::<f64>::try_from(&geometry.value).map_err(|e| {
                AtlasError::validation(format!("isochrone geometry is not convertible: {e}"))
            })?;

            let polygon = match geometry {
                geo::Geometry::Polygon(polygon) => MultiPolygon(vec![polygon]),
                geo::Geometry::MultiPolygon(multi) => multi,
                other => {
                    return Err(AtlasError::validation(format!(
                        "isochrone geometry is not a polygon: {other:?}"
                    )));
                }
            };

            isochrones.push(Isochrone { seconds, polygon });
        }

        Ok(Self { isochrones })
    }

    /// The polygon for exactly the given threshold, if present.
    #[must_use]
    pub fn polygon_for(&self, seconds: u32) -> Option<&Isochrone> {
        self.isochrones.iter().find(|iso| iso.seconds == seconds)
    }

    #[must_use]
    pub fn thresholds(&self) -> Vec<u32> {
        self.isochrones.iter().map(|iso| iso.seconds).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.isochrones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(center: (f64, f64), half: f64, value: u32) -> geojson::Feature {
        let (cx, cy) = center;
        let ring = vec![
            vec![cx - half, cy - half],
            vec![cx + half, cy - half],
            vec![cx + half, cy + half],
            vec![cx - half, cy + half],
            vec![cx - half, cy - half],
        ];
        let mut properties = serde_json::Map::new();
        properties.insert("value".to_string(), serde_json::json!(value));
        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    fn collection(features: Vec<geojson::Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[test]
    fn test_selects_exactly_the_600_polygon() {
        let set = IsochroneSet::from_feature_collection(&collection(vec![
            square((2.0, 48.0), 0.01, 300),
            square((2.0, 48.0), 0.02, 600),
        ]))
        .unwrap();

        let ten_min = set.polygon_for(600).unwrap();
        assert_eq!(ten_min.seconds, 600);

        // Inside the 600 s square but outside the 300 s one
        let point = geo::Point::new(2.015, 48.0);
        assert!(ten_min.contains(point));
        assert!(!set.polygon_for(300).unwrap().contains(point));

        // Outside the 600 s square: not accessible
        assert!(!ten_min.contains(geo::Point::new(2.5, 48.0)));
    }

    #[test]
    fn test_duplicate_threshold_is_rejected() {
        let result = IsochroneSet::from_feature_collection(&collection(vec![
            square((2.0, 48.0), 0.01, 600),
            square((2.0, 48.0), 0.02, 600),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_value_property_is_rejected() {
        let mut feature = square((2.0, 48.0), 0.01, 300);
        feature.properties = None;
        let result = IsochroneSet::from_feature_collection(&collection(vec![feature]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_threshold_is_none() {
        let set = IsochroneSet::from_feature_collection(&collection(vec![square(
            (2.0, 48.0),
            0.01,
            300,
        )]))
        .unwrap();
        assert!(set.polygon_for(600).is_none());
    }
}
