use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use validator::Validate;

use crate::error::{QcError, Result};
use crate::models::{StationLocation, TemperatureMatrix};
use crate::utils::progress::ProgressReporter;

/// One recorded snapshot: every station seen at a single server timestamp.
#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    time: String,
    stations: BTreeMap<String, StationReading>,
}

#[derive(Debug, Deserialize)]
struct StationReading {
    latitude: f64,
    longitude: f64,
    temperature: f64,
}

/// Assembles a directory of snapshot JSON files into a `TemperatureMatrix`.
///
/// Files are taken in name order; each contributes one timestamp column.
/// Stations absent from a snapshot simply leave their cell missing.
pub struct SnapshotReader {
    silent: bool,
}

impl SnapshotReader {
    pub fn new() -> Self {
        Self { silent: false }
    }

    pub fn with_silent(silent: bool) -> Self {
        Self { silent }
    }

    /// Read every `*.json` snapshot under `dir` and build the matrix.
    pub fn read_dir(&self, dir: &Path) -> Result<TemperatureMatrix> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(QcError::EmptyDataset(format!(
                "no snapshot files found in '{}'",
                dir.display()
            )));
        }

        info!(snapshots = paths.len(), dir = %dir.display(), "assembling matrix");
        let progress =
            ProgressReporter::new(paths.len() as u64, "Reading snapshots...", self.silent);

        let mut builder = TemperatureMatrix::builder();
        for path in &paths {
            let (timestamp, readings) = self.read_snapshot(path)?;
            debug!(file = %path.display(), stations = readings.len(), "snapshot parsed");
            builder.add_snapshot(timestamp, readings)?;
            progress.increment(1);
        }
        progress.finish_with_message("Snapshots assembled");

        builder.build()
    }

    /// Parse a single snapshot file into its timestamp and readings.
    pub fn read_snapshot(
        &self,
        path: &Path,
    ) -> Result<(NaiveDateTime, Vec<(String, StationLocation, f64)>)> {
        let file = File::open(path)?;
        let record: SnapshotRecord = serde_json::from_reader(BufReader::new(file))?;

        let timestamp = parse_timestamp(&record.time)?;

        let mut readings = Vec::with_capacity(record.stations.len());
        for (station_id, reading) in record.stations {
            let location = StationLocation::new(reading.latitude, reading.longitude);
            location.validate()?;
            readings.push((station_id, location, reading.temperature));
        }

        Ok((timestamp, readings))
    }
}

impl Default for SnapshotReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot timestamps come with or without seconds.
fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(QcError::from)
}
