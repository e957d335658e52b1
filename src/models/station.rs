use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fixed geographic location of a citizen weather station.
///
/// Station identifiers are opaque strings (in practice colon-separated
/// MAC-like hex); the location is assumed stable across the observation
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationLocation {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Hashable grouping key for (near-)coincident locations.
///
/// With zero tolerance the key preserves exact bit equality; with a positive
/// tolerance coordinates are snapped to a grid of that cell size, so two
/// stations closer than the tolerance but straddling a cell edge are not
/// grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationKey {
    lat: i64,
    lon: i64,
}

impl StationLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn location_key(&self, tolerance_deg: f64) -> LocationKey {
        if tolerance_deg == 0.0 {
            LocationKey {
                lat: self.latitude.to_bits() as i64,
                lon: self.longitude.to_bits() as i64,
            }
        } else {
            LocationKey {
                lat: (self.latitude / tolerance_deg).round() as i64,
                lon: (self.longitude / tolerance_deg).round() as i64,
            }
        }
    }
}
