//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

use crate::CoordinateAxis;

/// A lat/lon bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Bounding box covering every point of a lat/lon grid.
    pub fn from_axes(lat: &CoordinateAxis, lon: &CoordinateAxis) -> Self {
        Self::new(lon.min(), lat.min(), lon.max(), lat.max())
    }

    /// Grow the box by `degrees` on every side.
    pub fn padded(&self, degrees: f64) -> Self {
        Self::new(
            self.min_lon - degrees,
            self.min_lat - degrees,
            self.max_lon + degrees,
            self.max_lat + degrees,
        )
    }

    /// Center point as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Check whether a point lies inside the box (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_axes_and_padding() {
        let lat = CoordinateAxis::new("lat", "lat", None, vec![30.0, 20.0, 10.0]).unwrap();
        let lon = CoordinateAxis::new("lon", "lon", None, vec![100.0, 110.0]).unwrap();

        let bbox = BoundingBox::from_axes(&lat, &lon);
        assert_eq!(bbox, BoundingBox::new(100.0, 10.0, 110.0, 30.0));

        let padded = bbox.padded(0.5);
        assert_eq!(padded, BoundingBox::new(99.5, 9.5, 110.5, 30.5));
        assert_eq!(bbox.center(), (20.0, 105.0));
    }

    #[test]
    fn test_contains_edges() {
        let bbox = BoundingBox::new(32.0, -6.0, 43.0, 6.0);
        assert!(bbox.contains(-6.0, 32.0));
        assert!(bbox.contains(0.0, 36.8));
        assert!(!bbox.contains(7.0, 36.8));
    }
}
