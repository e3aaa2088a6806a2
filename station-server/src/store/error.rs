//! Schedule store error types.

use std::path::PathBuf;

use crate::domain::TrainId;

/// Errors from loading, saving or updating the schedule.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing or copying a schedule file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schedule document is not valid JSON for the expected schema
    #[error("malformed schedule {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record parsed but holds an invalid value
    #[error("invalid record for train {train}: {message}")]
    InvalidRecord { train: u32, message: String },

    /// No train with this id is loaded
    #[error("train {0} does not exist")]
    UnknownTrain(TrainId),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
