use tracing::info;

use crate::config::QcConfig;
use crate::detectors::{IndoorDetector, InsufficientData, MislocationDetector, OutlierDetector};
use crate::error::Result;
use crate::models::{StationFlags, TemperatureMatrix};

/// Runs the full quality-control battery over one assembled matrix.
///
/// The detectors are pure functions over the read-only matrix, so they run
/// in parallel; their flags combine with logical OR into the exclusion mask.
pub struct QcAnalyzer {
    mislocation: MislocationDetector,
    outlier: OutlierDetector,
    indoor: IndoorDetector,
}

#[derive(Debug, Clone)]
pub struct QcReport {
    pub n_stations: usize,
    pub n_timestamps: usize,
    pub completeness: f64,
    pub mislocated: StationFlags,
    pub outlier: StationFlags,
    pub indoor: StationFlags,
    pub excluded: StationFlags,
    pub warnings: Vec<InsufficientData>,
}

impl QcAnalyzer {
    pub fn from_config(config: &QcConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mislocation: MislocationDetector::with_tolerance(config.location_tolerance_deg),
            outlier: OutlierDetector::from_config(config)?,
            indoor: IndoorDetector::from_config(config)?,
        })
    }

    pub fn analyze(&self, matrix: &TemperatureMatrix) -> Result<QcReport> {
        info!(
            stations = matrix.n_stations(),
            timestamps = matrix.n_timestamps(),
            "running quality controls"
        );

        let (mislocated, (outlier_report, indoor_report)) = rayon::join(
            || self.mislocation.detect(matrix),
            || {
                rayon::join(
                    || self.outlier.detect(matrix),
                    || self.indoor.detect(matrix),
                )
            },
        );
        let mislocated = mislocated?;

        let excluded = mislocated
            .or(&outlier_report.flags)
            .or(&indoor_report.flags);

        let mut warnings = outlier_report.warnings;
        warnings.extend(indoor_report.warnings);

        Ok(QcReport {
            n_stations: matrix.n_stations(),
            n_timestamps: matrix.n_timestamps(),
            completeness: matrix.completeness(),
            mislocated,
            outlier: outlier_report.flags,
            indoor: indoor_report.flags,
            excluded,
            warnings,
        })
    }
}

impl QcReport {
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== CWS Quality Control Report ===\n");
        summary.push_str(&format!(
            "Stations: {} over {} snapshots ({:.1}% cell coverage)\n",
            self.n_stations,
            self.n_timestamps,
            self.completeness * 100.0
        ));
        summary.push_str(&format!(
            "Mislocated: {} ({:.1}%)\n",
            self.mislocated.count_flagged(),
            self.percentage(self.mislocated.count_flagged())
        ));
        summary.push_str(&format!(
            "Outlier: {} ({:.1}%)\n",
            self.outlier.count_flagged(),
            self.percentage(self.outlier.count_flagged())
        ));
        summary.push_str(&format!(
            "Likely indoor: {} ({:.1}%)\n",
            self.indoor.count_flagged(),
            self.percentage(self.indoor.count_flagged())
        ));
        summary.push_str(&format!(
            "Excluded (any flag): {} of {}\n",
            self.excluded.count_flagged(),
            self.n_stations
        ));

        if !self.warnings.is_empty() {
            summary.push_str(&format!(
                "\nInsufficient-data conditions: {}\n",
                self.warnings.len()
            ));
            for (i, warning) in self.warnings.iter().take(10).enumerate() {
                summary.push_str(&format!("  {}. {}\n", i + 1, warning));
            }
            if self.warnings.len() > 10 {
                summary.push_str(&format!("  ... and {} more\n", self.warnings.len() - 10));
            }
        }

        summary
    }

    fn percentage(&self, count: usize) -> f64 {
        if self.n_stations == 0 {
            return 0.0;
        }
        100.0 * count as f64 / self.n_stations as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationLocation;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 7, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_matrix() -> TemperatureMatrix {
        let mut builder = TemperatureMatrix::builder();
        // Two stations at the same spot, one well-behaved unique one.
        builder.add_station("dup-1", StationLocation::new(0.0, 0.0));
        builder.add_station("dup-2", StationLocation::new(0.0, 0.0));
        builder.add_station("lone", StationLocation::new(1.0, 1.0));
        for (col, base) in [15.0, 18.0, 21.0, 19.0].into_iter().enumerate() {
            builder.add_reading("dup-1", ts(col as u32), base);
            builder.add_reading("dup-2", ts(col as u32), base + 0.5);
            builder.add_reading("lone", ts(col as u32), base - 0.5);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_exclusion_mask_is_or_of_detectors() {
        let analyzer = QcAnalyzer::from_config(&QcConfig::default()).unwrap();
        let report = analyzer.analyze(&sample_matrix()).unwrap();

        assert_eq!(report.mislocated.get("dup-1"), Some(true));
        assert_eq!(report.mislocated.get("dup-2"), Some(true));
        assert_eq!(report.mislocated.get("lone"), Some(false));

        for station_id in ["dup-1", "dup-2", "lone"] {
            let expected = report.mislocated.get(station_id).unwrap()
                || report.outlier.get(station_id).unwrap()
                || report.indoor.get(station_id).unwrap();
            assert_eq!(report.excluded.get(station_id), Some(expected));
        }
    }

    #[test]
    fn test_report_key_sets_match_matrix() {
        let matrix = sample_matrix();
        let analyzer = QcAnalyzer::from_config(&QcConfig::default()).unwrap();
        let report = analyzer.analyze(&matrix).unwrap();

        for flags in [
            &report.mislocated,
            &report.outlier,
            &report.indoor,
            &report.excluded,
        ] {
            assert_eq!(flags.len(), matrix.n_stations());
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = QcConfig {
            low_alpha: 0.99,
            high_alpha: 0.01,
            ..QcConfig::default()
        };
        assert!(QcAnalyzer::from_config(&config).is_err());
    }

    #[test]
    fn test_summary_renders() {
        let analyzer = QcAnalyzer::from_config(&QcConfig::default()).unwrap();
        let report = analyzer.analyze(&sample_matrix()).unwrap();
        let summary = report.summary();
        assert!(summary.contains("Quality Control Report"));
        assert!(summary.contains("Mislocated: 2"));
    }
}
