//! Canonical track play
//!
//! A `Play` is one detected (and later reconciled) playback of a track.
//! It serializes to exactly the attribute set the destination store accepts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One track play with an absolute start and end instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    /// Track title as reported by the source
    pub title: String,
    /// Comma-joined artist names, `None` when the source listed no artists
    pub artist: Option<String>,
    /// Start of playback (UTC)
    pub started_at: DateTime<Utc>,
    /// End of playback (UTC)
    pub finished_at: DateTime<Utc>,
}

impl Play {
    pub fn new(
        title: impl Into<String>,
        artist: Option<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            artist,
            started_at,
            finished_at,
        }
    }

    /// `finished_at - started_at`; negative when the play was trimmed past its start
    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }

    /// True when the play covers a non-empty span of time
    pub fn has_positive_duration(&self) -> bool {
        self.started_at < self.finished_at
    }

    /// Whether `other` reports the same track
    ///
    /// Title and artist are compared independently, ignoring case and
    /// surrounding whitespace. A missing artist equals an empty one.
    pub fn is_same(&self, other: &Play) -> bool {
        similar(Some(&self.title), Some(&other.title))
            && similar(self.artist.as_ref(), other.artist.as_ref())
    }
}

fn similar(a: Option<&String>, b: Option<&String>) -> bool {
    fold(a) == fold(b)
}

fn fold(value: Option<&String>) -> String {
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}
