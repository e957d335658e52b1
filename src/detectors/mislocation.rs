use std::collections::HashMap;
use tracing::debug;

use crate::error::{QcError, Result};
use crate::models::{LocationKey, StationFlags, TemperatureMatrix};

/// Flags stations sharing a (near-)identical location with at least one
/// other station.
///
/// Multiple stations reporting the same coordinates usually indicate an
/// incorrect setup where the location was assigned automatically from the
/// IP address of the wireless network.
pub struct MislocationDetector {
    tolerance_deg: f64,
}

impl MislocationDetector {
    /// Detector requiring exact coordinate coincidence.
    pub fn new() -> Self {
        Self { tolerance_deg: 0.0 }
    }

    /// Group locations within a grid of the given cell size in degrees.
    pub fn with_tolerance(tolerance_deg: f64) -> Self {
        Self { tolerance_deg }
    }

    pub fn detect(&self, matrix: &TemperatureMatrix) -> Result<StationFlags> {
        let mut groups: HashMap<LocationKey, Vec<&str>> = HashMap::new();

        for station_id in matrix.station_ids() {
            let location =
                matrix
                    .location_of(station_id)
                    .ok_or_else(|| QcError::MissingLocation {
                        station_id: station_id.clone(),
                    })?;
            groups
                .entry(location.location_key(self.tolerance_deg))
                .or_default()
                .push(station_id);
        }

        let mut flags = StationFlags::all_clear(matrix.station_ids().iter().cloned());
        for members in groups.values() {
            if members.len() > 1 {
                debug!(
                    stations = members.len(),
                    "location shared by multiple stations"
                );
                for station_id in members {
                    flags.set(station_id, true);
                }
            }
        }

        Ok(flags)
    }
}

impl Default for MislocationDetector {
    fn default() -> Self {
        Self::new()
    }
}
