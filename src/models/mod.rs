//! Record types flowing through the pipeline
//!
//! All records are transient and in-memory: they are read from their source,
//! annotated in a single pass, and written out as flat files.

pub mod isochrone;
pub mod museum;
pub mod station;

pub use isochrone::{Isochrone, IsochroneSet};
pub use museum::{Museum, ScrapedMuseum};
pub use station::Station;

use serde::{Deserialize, Serialize};

/// Geographic point in WGS84. Longitude comes first because every consumer
/// of this type (the routing payload, GeoJSON output) expects lon/lat order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    #[must_use]
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }

    /// Format as a lon/lat pair for logging
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.6}, {:.6}", self.longitude, self.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_to_point_keeps_order() {
        let c = Coordinates::new(2.3266, 48.8606);
        let p = c.to_point();
        assert_eq!(p.x(), 2.3266);
        assert_eq!(p.y(), 48.8606);
    }
}
