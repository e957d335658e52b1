pub mod flags;
pub mod matrix;
pub mod station;

pub use flags::StationFlags;
pub use matrix::{GeographicBounds, TemperatureMatrix, TemperatureMatrixBuilder};
pub use station::{LocationKey, StationLocation};
