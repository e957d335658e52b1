use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

use cws_qc::analyzers::QcAnalyzer;
use cws_qc::config::QcConfig;
use cws_qc::detectors::{IndoorDetector, MislocationDetector, OutlierDetector};
use cws_qc::models::{StationLocation, TemperatureMatrix};
use cws_qc::readers::SnapshotReader;

fn ts(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 7, 15)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[test]
fn test_mislocation_scenario() {
    // A and B share (0, 0); C sits alone at (1, 1).
    let mut builder = TemperatureMatrix::builder();
    builder.add_station("A", StationLocation::new(0.0, 0.0));
    builder.add_station("B", StationLocation::new(0.0, 0.0));
    builder.add_station("C", StationLocation::new(1.0, 1.0));
    let matrix = builder.build().unwrap();

    let flags = MislocationDetector::new().detect(&matrix).unwrap();

    assert_eq!(flags.get("A"), Some(true));
    assert_eq!(flags.get("B"), Some(true));
    assert_eq!(flags.get("C"), Some(false));
}

#[test]
fn test_outlier_scenario_five_by_ten() {
    // Station X reads +1000 in 9 of 10 snapshots; the other four stations
    // stay within [0, 30].
    let mut builder = TemperatureMatrix::builder();
    let bases = [("a", 10.0), ("b", 12.0), ("c", 14.0), ("d", 16.0)];
    for (i, (id, base)) in bases.iter().enumerate() {
        builder.add_station(*id, StationLocation::new(i as f64, 0.0));
        for col in 0..10 {
            builder.add_reading(*id, ts(col), *base);
        }
    }
    builder.add_station("x", StationLocation::new(9.0, 9.0));
    for col in 0..9 {
        builder.add_reading("x", ts(col), 1000.0);
    }
    builder.add_reading("x", ts(9), 14.0);

    let config = QcConfig {
        low_alpha: 0.01,
        high_alpha: 0.99,
        station_outlier_threshold: 0.5,
        ..QcConfig::default()
    };
    let report = OutlierDetector::from_config(&config)
        .unwrap()
        .detect(&matrix_of(builder));

    assert_eq!(report.flags.get("x"), Some(true));
    for (id, _) in bases {
        assert_eq!(report.flags.get(id), Some(false), "station {}", id);
    }
}

fn matrix_of(builder: cws_qc::models::TemperatureMatrixBuilder) -> TemperatureMatrix {
    builder.build().unwrap()
}

#[test]
fn test_outlier_threshold_sweep_is_monotone() {
    let mut builder = TemperatureMatrix::builder();
    for station in 0..12 {
        let id = format!("s{:02}", station);
        builder.add_station(id.clone(), StationLocation::new(station as f64, 0.0));
        for col in 0..20 {
            // Smooth diurnal-ish signal with two erratic stations.
            let mut value = 15.0 + 5.0 * ((col as f64) * 0.6).sin() + station as f64 * 0.1;
            if station >= 10 && col % 3 == 0 {
                value += 400.0;
            }
            builder.add_reading(id.clone(), ts(col), value);
        }
    }
    let matrix = builder.build().unwrap();

    let mut previous = usize::MAX;
    for threshold in [0.05, 0.15, 0.25, 0.35, 0.5, 0.65, 0.8, 0.95] {
        let config = QcConfig {
            station_outlier_threshold: threshold,
            ..QcConfig::default()
        };
        let flagged = OutlierDetector::from_config(&config)
            .unwrap()
            .detect(&matrix)
            .flags
            .count_flagged();
        assert!(
            flagged <= previous,
            "raising the threshold to {} increased flagged stations",
            threshold
        );
        previous = flagged;
    }
}

#[test]
fn test_indoor_median_identical_station() {
    let mut builder = TemperatureMatrix::builder();
    builder.add_station("high", StationLocation::new(0.0, 0.0));
    builder.add_station("mid", StationLocation::new(1.0, 0.0));
    builder.add_station("low", StationLocation::new(2.0, 0.0));
    for (col, base) in [10.0, 14.0, 19.0, 16.0, 12.0].into_iter().enumerate() {
        builder.add_reading("high", ts(col as u32), base + 5.0);
        builder.add_reading("mid", ts(col as u32), base);
        builder.add_reading("low", ts(col as u32), base - 5.0);
    }
    let matrix = builder.build().unwrap();

    // "mid" equals the spatial median everywhere: correlation 1.0, never
    // flagged for a threshold below 1.
    for threshold in [-0.5, 0.0, 0.5, 0.99] {
        let config = QcConfig {
            station_indoor_corr_threshold: threshold,
            ..QcConfig::default()
        };
        let report = IndoorDetector::from_config(&config).unwrap().detect(&matrix);
        assert_eq!(report.flags.get("mid"), Some(false), "threshold {}", threshold);
    }
}

#[test]
fn test_indoor_short_overlap_always_flagged() {
    let mut builder = TemperatureMatrix::builder();
    builder.add_station("a", StationLocation::new(0.0, 0.0));
    builder.add_station("b", StationLocation::new(1.0, 0.0));
    builder.add_station("sparse", StationLocation::new(2.0, 0.0));
    for (col, base) in [10.0, 14.0, 19.0, 16.0].into_iter().enumerate() {
        builder.add_reading("a", ts(col as u32), base);
        builder.add_reading("b", ts(col as u32), base + 1.0);
    }
    builder.add_reading("sparse", ts(0), 12.0);
    let matrix = builder.build().unwrap();

    for threshold in [-0.9, 0.0, 0.9] {
        let config = QcConfig {
            station_indoor_corr_threshold: threshold,
            ..QcConfig::default()
        };
        let report = IndoorDetector::from_config(&config).unwrap().detect(&matrix);
        assert_eq!(report.flags.get("sparse"), Some(true), "threshold {}", threshold);
    }
}

#[test]
fn test_snapshot_directory_to_exclusion_mask() {
    let dir = TempDir::new().unwrap();
    // Three snapshots; stations "dup-1"/"dup-2" share coordinates, and
    // "drift" never tracks the network signal.
    for (name, time, temps) in [
        ("00.json", "2023-07-15T10:00", [18.0, 18.5, 17.5, 30.0]),
        ("01.json", "2023-07-15T11:00", [21.0, 21.5, 20.5, 22.0]),
        ("02.json", "2023-07-15T12:00", [24.0, 24.5, 23.5, 14.0]),
    ] {
        let body = format!(
            r#"{{
                "time": "{time}",
                "stations": {{
                    "dup-1": {{"latitude": 41.39, "longitude": 2.17, "temperature": {}}},
                    "dup-2": {{"latitude": 41.39, "longitude": 2.17, "temperature": {}}},
                    "good":  {{"latitude": 41.42, "longitude": 2.12, "temperature": {}}},
                    "drift": {{"latitude": 41.45, "longitude": 2.10, "temperature": {}}}
                }}
            }}"#,
            temps[0], temps[1], temps[2], temps[3]
        );
        let mut file = File::create(dir.path().join(name)).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    let matrix = SnapshotReader::with_silent(true).read_dir(dir.path()).unwrap();
    let analyzer = QcAnalyzer::from_config(&QcConfig::default()).unwrap();
    let report = analyzer.analyze(&matrix).unwrap();

    // Every detector output preserves the matrix key set.
    for flags in [
        &report.mislocated,
        &report.outlier,
        &report.indoor,
        &report.excluded,
    ] {
        assert_eq!(flags.len(), matrix.n_stations());
        for station_id in matrix.station_ids() {
            assert!(flags.get(station_id).is_some());
        }
    }

    assert_eq!(report.mislocated.get("dup-1"), Some(true));
    assert_eq!(report.mislocated.get("dup-2"), Some(true));
    assert_eq!(report.mislocated.get("good"), Some(false));
    assert_eq!(report.indoor.get("drift"), Some(true));
    assert_eq!(report.indoor.get("good"), Some(false));

    // The exclusion mask is the OR of the three flags.
    for station_id in matrix.station_ids() {
        let expected = report.mislocated.get(station_id).unwrap()
            || report.outlier.get(station_id).unwrap()
            || report.indoor.get(station_id).unwrap();
        assert_eq!(report.excluded.get(station_id), Some(expected));
    }
    assert_eq!(report.excluded.get("good"), Some(false));
}
