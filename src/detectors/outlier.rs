use rayon::prelude::*;
use tracing::warn;

use crate::config::QcConfig;
use crate::detectors::{DetectorReport, InsufficientData};
use crate::error::Result;
use crate::models::{StationFlags, TemperatureMatrix};
use crate::stats::{modified_z_scores, norm_ppf};

/// Flags stations with an unusually high proportion of per-timestamp
/// statistical outliers.
///
/// Each timestamp column is screened independently: readings are converted
/// to modified z-scores against the column median and Qn robust scale, and a
/// reading is an outlier when its score falls outside the two-sided bounds
/// implied by `low_alpha`/`high_alpha`. A station is flagged when its outlier
/// proportion (over its own non-missing readings) exceeds
/// `station_outlier_threshold`. High proportions typically trace back to
/// radiative errors in non-shaded setups.
pub struct OutlierDetector {
    low_z: f64,
    high_z: f64,
    station_outlier_threshold: f64,
}

impl OutlierDetector {
    pub fn from_config(config: &QcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            low_z: norm_ppf(config.low_alpha),
            high_z: norm_ppf(config.high_alpha),
            station_outlier_threshold: config.station_outlier_threshold,
        })
    }

    pub fn detect(&self, matrix: &TemperatureMatrix) -> DetectorReport {
        // Columns are independent, so screen them in parallel.
        let column_results: Vec<(Vec<usize>, Option<InsufficientData>)> = (0..matrix
            .n_timestamps())
            .into_par_iter()
            .map(|col| self.screen_column(matrix, col))
            .collect();

        let mut outlier_counts = vec![0usize; matrix.n_stations()];
        let mut warnings = Vec::new();
        for (outlier_rows, warning) in column_results {
            for row in outlier_rows {
                outlier_counts[row] += 1;
            }
            if let Some(warning) = warning {
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        let mut flags = StationFlags::all_clear(matrix.station_ids().iter().cloned());
        for (row, station_id) in matrix.station_ids().iter().enumerate() {
            let readings = matrix.row(row).iter().flatten().count();
            if readings == 0 {
                // No data, so not an outlier; an explicit decision rather
                // than a division by zero.
                let warning = InsufficientData::NoReadings {
                    station_id: station_id.clone(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                continue;
            }

            let proportion = outlier_counts[row] as f64 / readings as f64;
            flags.set(station_id, proportion > self.station_outlier_threshold);
        }

        DetectorReport { flags, warnings }
    }

    /// Rows holding outlier readings in one column, or the insufficient-data
    /// condition that made the column unclassifiable.
    fn screen_column(
        &self,
        matrix: &TemperatureMatrix,
        col: usize,
    ) -> (Vec<usize>, Option<InsufficientData>) {
        let entries = matrix.column_entries(col);
        if entries.len() < 2 {
            return (
                Vec::new(),
                Some(InsufficientData::ShortColumn {
                    timestamp: matrix.timestamps()[col],
                    samples: entries.len(),
                }),
            );
        }

        let values: Vec<f64> = entries.iter().map(|&(_, value)| value).collect();
        match modified_z_scores(&values) {
            Some(scores) => {
                let outlier_rows = entries
                    .iter()
                    .zip(&scores)
                    .filter(|&(_, &z)| !(z > self.low_z && z < self.high_z))
                    .map(|(&(row, _), _)| row)
                    .collect();
                (outlier_rows, None)
            }
            None => (
                Vec::new(),
                Some(InsufficientData::ConstantColumn {
                    timestamp: matrix.timestamps()[col],
                }),
            ),
        }
    }
}
