use thiserror::Error;

pub type Result<T> = std::result::Result<T, QcError>;

#[derive(Error, Debug)]
pub enum QcError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timestamp parsing error: {0}")]
    TimestampParse(#[from] chrono::ParseError),

    #[error("Station {station_id} has no location entry")]
    MissingLocation { station_id: String },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Duplicate snapshot timestamp: {0}")]
    DuplicateTimestamp(chrono::NaiveDateTime),

    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
