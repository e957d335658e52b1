use serde::{Deserialize, Serialize};

use crate::error::{QcError, Result};

/// Recognized quality-control options.
///
/// `low_alpha`/`high_alpha` are the two-sided tail probabilities of the
/// assumed-normal reference distribution used by the outlier detector;
/// `station_outlier_threshold` is the proportion of outlier readings above
/// which a station is flagged; `station_indoor_corr_threshold` is the minimum
/// Pearson correlation with the spatial-median series a station must reach to
/// be considered outdoors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcConfig {
    pub low_alpha: f64,
    pub high_alpha: f64,
    pub station_outlier_threshold: f64,
    pub station_indoor_corr_threshold: f64,

    /// Grid cell size in degrees used to group near-coincident locations.
    /// Zero requires exact coordinate equality.
    pub location_tolerance_deg: f64,

    /// Policy flag for stations whose correlation with the spatial-median
    /// series is undefined (fewer than 2 overlapping readings, or a constant
    /// series). `true` favors exclusion when uncertain.
    pub flag_insufficient_data: bool,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            low_alpha: 0.01,
            high_alpha: 0.99,
            station_outlier_threshold: 0.2,
            station_indoor_corr_threshold: 0.9,
            location_tolerance_deg: 0.0,
            flag_insufficient_data: true,
        }
    }
}

impl QcConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0 < self.low_alpha && self.low_alpha < 1.0) {
            return Err(QcError::InvalidConfig(format!(
                "low_alpha {} must be in (0, 1)",
                self.low_alpha
            )));
        }

        if !(0.0 < self.high_alpha && self.high_alpha < 1.0) {
            return Err(QcError::InvalidConfig(format!(
                "high_alpha {} must be in (0, 1)",
                self.high_alpha
            )));
        }

        if self.low_alpha >= self.high_alpha {
            return Err(QcError::InvalidConfig(format!(
                "low_alpha {} must be strictly below high_alpha {}",
                self.low_alpha, self.high_alpha
            )));
        }

        if !(0.0 < self.station_outlier_threshold && self.station_outlier_threshold <= 1.0) {
            return Err(QcError::InvalidConfig(format!(
                "station_outlier_threshold {} must be in (0, 1]",
                self.station_outlier_threshold
            )));
        }

        if self.station_indoor_corr_threshold <= -1.0 || self.station_indoor_corr_threshold >= 1.0 {
            return Err(QcError::InvalidConfig(format!(
                "station_indoor_corr_threshold {} must be in (-1, 1)",
                self.station_indoor_corr_threshold
            )));
        }

        if self.location_tolerance_deg < 0.0 || !self.location_tolerance_deg.is_finite() {
            return Err(QcError::InvalidConfig(format!(
                "location_tolerance_deg {} must be a finite value >= 0",
                self.location_tolerance_deg
            )));
        }

        Ok(())
    }
}
