//! Error types for playsync-importer

use crate::locator::LocatorError;
use crate::normalizer::NormalizeError;
use crate::types::{DestinationError, SourceError};
use thiserror::Error;

/// Anything that aborts an import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Malformed detection event: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Earliest-date search failed: {0}")]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Common(#[from] playsync_common::Error),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
