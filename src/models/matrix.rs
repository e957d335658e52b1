use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{QcError, Result};
use crate::models::station::StationLocation;

/// Station x timestamp temperature table with an explicit missing-value
/// marker.
///
/// Rows are indexed by unique station identifier (sorted), columns by
/// observation timestamp (strictly increasing, irregular spacing allowed).
/// Every row carries a location; a row without one is rejected at build time.
/// The matrix is read-only once built: detectors are pure functions over it.
#[derive(Debug, Clone)]
pub struct TemperatureMatrix {
    station_ids: Vec<String>,
    row_index: HashMap<String, usize>,
    locations: Vec<StationLocation>,
    timestamps: Vec<NaiveDateTime>,
    cells: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl TemperatureMatrix {
    pub fn builder() -> TemperatureMatrixBuilder {
        TemperatureMatrixBuilder::default()
    }

    pub fn n_stations(&self) -> usize {
        self.station_ids.len()
    }

    pub fn n_timestamps(&self) -> usize {
        self.timestamps.len()
    }

    pub fn station_ids(&self) -> &[String] {
        &self.station_ids
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn row_of(&self, station_id: &str) -> Option<usize> {
        self.row_index.get(station_id).copied()
    }

    pub fn location(&self, row: usize) -> &StationLocation {
        &self.locations[row]
    }

    pub fn location_of(&self, station_id: &str) -> Option<&StationLocation> {
        self.row_of(station_id).map(|row| &self.locations[row])
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[row * self.timestamps.len() + col]
    }

    pub fn get(&self, station_id: &str, col: usize) -> Option<f64> {
        self.row_of(station_id).and_then(|row| self.value(row, col))
    }

    /// Full reading row for one station, aligned to `timestamps()`.
    pub fn row(&self, row: usize) -> &[Option<f64>] {
        let width = self.timestamps.len();
        &self.cells[row * width..(row + 1) * width]
    }

    /// Non-missing readings in one timestamp column, as (row, value) pairs.
    pub fn column_entries(&self, col: usize) -> Vec<(usize, f64)> {
        (0..self.station_ids.len())
            .filter_map(|row| self.value(row, col).map(|value| (row, value)))
            .collect()
    }

    /// Fraction of cells holding a reading.
    pub fn completeness(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let present = self.cells.iter().filter(|cell| cell.is_some()).count();
        present as f64 / self.cells.len() as f64
    }

    pub fn bounds(&self) -> Option<GeographicBounds> {
        let first = self.locations.first()?;
        let mut bounds = GeographicBounds {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lon: first.longitude,
            max_lon: first.longitude,
        };

        for location in &self.locations[1..] {
            bounds.min_lat = bounds.min_lat.min(location.latitude);
            bounds.max_lat = bounds.max_lat.max(location.latitude);
            bounds.min_lon = bounds.min_lon.min(location.longitude);
            bounds.max_lon = bounds.max_lon.max(location.longitude);
        }

        Some(bounds)
    }
}

/// Incremental assembly of snapshots into a `TemperatureMatrix`.
///
/// `add_snapshot` consumes one SnapshotSource output (station ->
/// location + reading at a single timestamp); `add_station`/`add_reading`
/// are the granular equivalent. The first recorded location for a station
/// wins: a station that changes location mid-window is out of scope.
#[derive(Debug, Default)]
pub struct TemperatureMatrixBuilder {
    locations: BTreeMap<String, StationLocation>,
    readings: BTreeMap<String, BTreeMap<NaiveDateTime, f64>>,
    snapshot_timestamps: BTreeSet<NaiveDateTime>,
}

impl TemperatureMatrixBuilder {
    pub fn add_snapshot<I>(&mut self, timestamp: NaiveDateTime, readings: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, StationLocation, f64)>,
    {
        if !self.snapshot_timestamps.insert(timestamp) {
            return Err(QcError::DuplicateTimestamp(timestamp));
        }

        for (station_id, location, temperature) in readings {
            self.locations.entry(station_id.clone()).or_insert(location);
            self.readings
                .entry(station_id)
                .or_default()
                .insert(timestamp, temperature);
        }

        Ok(())
    }

    /// Register a station row (and its location) without any readings.
    pub fn add_station(&mut self, station_id: impl Into<String>, location: StationLocation) {
        self.locations.entry(station_id.into()).or_insert(location);
    }

    /// Record a single reading. The station's location must be registered
    /// before `build`, otherwise the row is invalid input.
    pub fn add_reading(
        &mut self,
        station_id: impl Into<String>,
        timestamp: NaiveDateTime,
        temperature: f64,
    ) {
        self.readings
            .entry(station_id.into())
            .or_default()
            .insert(timestamp, temperature);
    }

    pub fn build(self) -> Result<TemperatureMatrix> {
        // Rows are the union of stations with readings and registered
        // stations; every one of them needs a location.
        let mut station_ids: BTreeSet<String> = self.locations.keys().cloned().collect();
        station_ids.extend(self.readings.keys().cloned());

        if station_ids.is_empty() {
            return Err(QcError::EmptyDataset(
                "no stations recorded".to_string(),
            ));
        }

        let mut timestamps: BTreeSet<NaiveDateTime> = self.snapshot_timestamps;
        for series in self.readings.values() {
            timestamps.extend(series.keys().copied());
        }
        let timestamps: Vec<NaiveDateTime> = timestamps.into_iter().collect();

        let station_ids: Vec<String> = station_ids.into_iter().collect();
        let mut locations = Vec::with_capacity(station_ids.len());
        let mut row_index = HashMap::with_capacity(station_ids.len());
        let mut cells = vec![None; station_ids.len() * timestamps.len()];

        for (row, station_id) in station_ids.iter().enumerate() {
            let location =
                self.locations
                    .get(station_id)
                    .copied()
                    .ok_or_else(|| QcError::MissingLocation {
                        station_id: station_id.clone(),
                    })?;
            locations.push(location);
            row_index.insert(station_id.clone(), row);

            if let Some(series) = self.readings.get(station_id) {
                for (col, timestamp) in timestamps.iter().enumerate() {
                    if let Some(&temperature) = series.get(timestamp) {
                        cells[row * timestamps.len() + col] = Some(temperature);
                    }
                }
            }
        }

        Ok(TemperatureMatrix {
            station_ids,
            row_index,
            locations,
            timestamps,
            cells,
        })
    }
}
