//! Core types and collaborator traits
//!
//! - Raw detection events as delivered by the source
//! - `DetectionSource` / `PlayStore`, the two external collaborators
//! - Their error types

use async_trait::async_trait;
use chrono::NaiveDate;
use playsync_common::Play;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Raw detection events
// ============================================================================

/// One entry of the source's per-day detection log
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDetectionEvent {
    /// Absent for silence/ambient detections
    #[serde(default)]
    pub metadata: Option<DetectionMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectionMetadata {
    /// `YYYY-MM-DD HH:MM:SS`, UTC
    #[serde(default)]
    pub timestamp_utc: Option<String>,
    /// Seconds the match was heard
    #[serde(default)]
    pub played_duration: Option<f64>,
    /// Music matches ranked by the source's confidence, best first
    #[serde(default)]
    pub music: Option<Vec<MusicMatch>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MusicMatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<ArtistCredit>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    pub name: String,
}

// ============================================================================
// Collaborators
// ============================================================================

/// Read-only per-day detection log
#[async_trait]
pub trait DetectionSource: Send + Sync {
    /// All detection events recorded on `date`
    ///
    /// A date without data yields an empty vector, never an error.
    async fn fetch_events(&self, date: NaiveDate) -> Result<Vec<RawDetectionEvent>, SourceError>;
}

/// Canonical play-history store
#[async_trait]
pub trait PlayStore: Send + Sync {
    /// Play with the latest start, `None` when the store is empty
    async fn fetch_latest(&self) -> Result<Option<Play>, DestinationError>;

    /// Persist one play
    async fn create(&self, play: &Play) -> Result<(), DestinationError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Detection source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Play store errors
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Play rejected ({status}): {body}")]
    Validation { status: u16, body: String },

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}
