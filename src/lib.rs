pub mod analyzers;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod error;
pub mod models;
pub mod readers;
pub mod stats;
pub mod utils;

pub use config::QcConfig;
pub use error::{QcError, Result};
