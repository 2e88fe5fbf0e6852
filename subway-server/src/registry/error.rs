//! Registry error types.

use crate::domain::{InvalidStationName, StationId};

/// Errors that can occur when operating on the station registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The supplied station name failed validation
    #[error(transparent)]
    InvalidName(#[from] InvalidStationName),

    /// No station has the given id
    #[error("station {0} not found")]
    NotFound(StationId),

    /// Every station id has been handed out
    #[error("station ids exhausted")]
    IdsExhausted,

    /// Reading or writing the snapshot file failed
    #[error("storage error: {message}")]
    Storage { message: String },
}
