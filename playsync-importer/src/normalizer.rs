//! Play-event normalizer
//!
//! Maps raw detection events to `Play`s. Pure: no I/O, no logging.

use crate::types::{ArtistCredit, RawDetectionEvent};
use chrono::Duration;
use playsync_common::time::parse_source_timestamp;
use playsync_common::Play;
use thiserror::Error;

/// Data-shape errors in an event that does carry a music match
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid played duration: {0}")]
    InvalidDuration(f64),
}

/// Convert one detection event
///
/// Returns `Ok(None)` for events without music metadata. Only the first
/// (highest ranked) music match is used.
pub fn normalize(raw: &RawDetectionEvent) -> Result<Option<Play>, NormalizeError> {
    let Some(metadata) = &raw.metadata else {
        return Ok(None);
    };
    let Some(music) = metadata.music.as_ref().and_then(|m| m.first()) else {
        return Ok(None);
    };

    let title = music
        .title
        .clone()
        .ok_or(NormalizeError::MissingField("music.title"))?;

    let timestamp = metadata
        .timestamp_utc
        .as_deref()
        .ok_or(NormalizeError::MissingField("timestamp_utc"))?;
    let started_at = parse_source_timestamp(timestamp)
        .map_err(|_| NormalizeError::InvalidTimestamp(timestamp.to_string()))?;

    let seconds = metadata
        .played_duration
        .ok_or(NormalizeError::MissingField("played_duration"))?;
    let finished_at = seconds
        .is_finite()
        .then(|| Duration::try_milliseconds((seconds * 1000.0).round() as i64))
        .flatten()
        .and_then(|played| started_at.checked_add_signed(played))
        .ok_or(NormalizeError::InvalidDuration(seconds))?;

    Ok(Some(Play::new(
        title,
        join_artists(music.artists.as_deref()),
        started_at,
        finished_at,
    )))
}

/// Normalize a whole day and sort by `(started_at, finished_at)`
pub fn normalize_day(events: &[RawDetectionEvent]) -> Result<Vec<Play>, NormalizeError> {
    let mut plays = Vec::with_capacity(events.len());
    for event in events {
        if let Some(play) = normalize(event)? {
            plays.push(play);
        }
    }
    plays.sort_by_key(|p| (p.started_at, p.finished_at));
    Ok(plays)
}

/// Unique names in original order, joined with ", "
///
/// A missing or empty list yields `None`, so the play carries a null
/// artist rather than an empty string.
fn join_artists(artists: Option<&[ArtistCredit]>) -> Option<String> {
    let artists = artists?;
    let mut names: Vec<&str> = Vec::with_capacity(artists.len());
    for artist in artists {
        if !names.contains(&artist.name.as_str()) {
            names.push(&artist.name);
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}
