use std::time::Duration;

use storage::error::StorageError;
use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Source unavailable: {endpoint} returned status {status}: {body}")]
    SourceUnavailable {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record conflict: {0}")]
    RecordConflict(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Data transformation error: {0}")]
    TransformationError(String),

    #[error("Import job exceeded its {0:?} deadline")]
    Timeout(Duration),
}

impl ImporterError {
    /// True for failures of the upstream source, which abort a whole run.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Self::RequestError(_) | Self::SourceUnavailable { .. } | Self::MalformedResponse { .. }
        )
    }

    /// Classifies a store failure for a single record. Uniqueness collisions
    /// and dangling team references become `RecordConflict`, everything else
    /// stays a storage error.
    pub fn from_store(error: StorageError) -> Self {
        if error.is_unique_violation() {
            Self::RecordConflict(error.to_string())
        } else if error.is_foreign_key_violation() {
            warn!("Store rejected a record referencing a missing team: {}", error);
            Self::RecordConflict(error.to_string())
        } else {
            Self::StorageError(error)
        }
    }
}
