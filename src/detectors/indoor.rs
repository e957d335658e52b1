use tracing::warn;

use crate::config::QcConfig;
use crate::detectors::{DetectorReport, InsufficientData};
use crate::error::Result;
use crate::models::{StationFlags, TemperatureMatrix};
use crate::stats::{median, pearson_correlation};

/// Flags stations whose time series correlates poorly with the network's
/// spatial-median series.
///
/// Outdoor stations track the common diurnal signal of their surroundings;
/// a series that does not is likely measured indoors. The reference signal
/// is the per-timestamp median over all non-missing readings, and the
/// comparison is a pairwise-complete Pearson correlation. An undefined
/// correlation (fewer than 2 overlapping readings, or a zero-variance
/// series) is resolved by the `flag_insufficient_data` policy.
pub struct IndoorDetector {
    station_indoor_corr_threshold: f64,
    flag_insufficient_data: bool,
}

impl IndoorDetector {
    pub fn from_config(config: &QcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            station_indoor_corr_threshold: config.station_indoor_corr_threshold,
            flag_insufficient_data: config.flag_insufficient_data,
        })
    }

    pub fn detect(&self, matrix: &TemperatureMatrix) -> DetectorReport {
        let median_series = Self::spatial_median_series(matrix);

        let mut flags = StationFlags::all_clear(matrix.station_ids().iter().cloned());
        let mut warnings = Vec::new();

        for (row, station_id) in matrix.station_ids().iter().enumerate() {
            // Restrict both series to timestamps where each has a value.
            let mut station_values = Vec::new();
            let mut reference_values = Vec::new();
            for (cell, reference) in matrix.row(row).iter().zip(&median_series) {
                if let (Some(value), Some(reference)) = (cell, reference) {
                    station_values.push(*value);
                    reference_values.push(*reference);
                }
            }

            match pearson_correlation(&station_values, &reference_values) {
                Some(correlation) => {
                    flags.set(station_id, correlation < self.station_indoor_corr_threshold);
                }
                None => {
                    let warning = if station_values.len() < 2 {
                        InsufficientData::ShortOverlap {
                            station_id: station_id.clone(),
                            overlap: station_values.len(),
                        }
                    } else {
                        InsufficientData::ConstantSeries {
                            station_id: station_id.clone(),
                        }
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    flags.set(station_id, self.flag_insufficient_data);
                }
            }
        }

        DetectorReport { flags, warnings }
    }

    /// Per-timestamp median over all non-missing readings; `None` for an
    /// all-missing column.
    fn spatial_median_series(matrix: &TemperatureMatrix) -> Vec<Option<f64>> {
        (0..matrix.n_timestamps())
            .map(|col| {
                let values: Vec<f64> = matrix
                    .column_entries(col)
                    .into_iter()
                    .map(|(_, value)| value)
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(median(&values))
                }
            })
            .collect()
    }
}
