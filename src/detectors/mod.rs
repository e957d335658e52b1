pub mod indoor;
pub mod mislocation;
pub mod outlier;

pub use indoor::IndoorDetector;
pub use mislocation::MislocationDetector;
pub use outlier::OutlierDetector;

use chrono::NaiveDateTime;
use std::fmt;

use crate::models::StationFlags;

/// Non-fatal insufficient-data conditions met during detection.
///
/// Each is resolved locally by a documented fallback policy and reported in
/// the detector output, never surfaced as a numeric error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsufficientData {
    /// Column had fewer than 2 readings; robust scale is undefined and the
    /// whole column is classified non-outlier.
    ShortColumn {
        timestamp: NaiveDateTime,
        samples: usize,
    },
    /// Column readings were all identical; zero scale means no reading
    /// deviates.
    ConstantColumn { timestamp: NaiveDateTime },
    /// Station had no readings at all; it cannot be an outlier.
    NoReadings { station_id: String },
    /// Station overlapped the spatial-median series on fewer than 2
    /// timestamps; correlation is undefined.
    ShortOverlap {
        station_id: String,
        overlap: usize,
    },
    /// Station (or reference) series had zero variance over the overlap;
    /// correlation is undefined.
    ConstantSeries { station_id: String },
}

impl fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientData::ShortColumn { timestamp, samples } => write!(
                f,
                "column {} has {} reading(s), too few for robust statistics",
                timestamp, samples
            ),
            InsufficientData::ConstantColumn { timestamp } => {
                write!(f, "column {} is constant, zero robust scale", timestamp)
            }
            InsufficientData::NoReadings { station_id } => {
                write!(f, "station {} has no readings", station_id)
            }
            InsufficientData::ShortOverlap {
                station_id,
                overlap,
            } => write!(
                f,
                "station {} overlaps the median series on {} timestamp(s)",
                station_id, overlap
            ),
            InsufficientData::ConstantSeries { station_id } => {
                write!(f, "station {} has a zero-variance series", station_id)
            }
        }
    }
}

/// Flags produced by one detector, plus the insufficient-data conditions it
/// policy-resolved along the way.
#[derive(Debug, Clone)]
pub struct DetectorReport {
    pub flags: StationFlags,
    pub warnings: Vec<InsufficientData>,
}
