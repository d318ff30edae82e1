//! Test Helper Utilities
//!
//! In-memory collaborators for driving the importer without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use playsync_common::Play;
use playsync_importer::types::{DestinationError, SourceError};
use playsync_importer::{DetectionSource, PlayStore, RawDetectionEvent};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn instant(date: NaiveDate, h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(h, m, s).unwrap())
}

/// Source event for a song heard at `date h:m:s` for `seconds`
pub fn detection(
    date: NaiveDate,
    (h, m, s): (u32, u32, u32),
    seconds: u32,
    title: &str,
    artist: &str,
) -> RawDetectionEvent {
    serde_json::from_value(json!({
        "metadata": {
            "timestamp_utc": instant(date, h, m, s).format("%Y-%m-%d %H:%M:%S").to_string(),
            "played_duration": seconds,
            "music": [{ "title": title, "artists": [{ "name": artist }] }]
        }
    }))
    .unwrap()
}

/// Detection without a music match (speech, silence)
pub fn ambient(date: NaiveDate, (h, m, s): (u32, u32, u32)) -> RawDetectionEvent {
    serde_json::from_value(json!({
        "metadata": {
            "timestamp_utc": instant(date, h, m, s).format("%Y-%m-%d %H:%M:%S").to_string(),
            "played_duration": 30
        }
    }))
    .unwrap()
}

/// Source backed by a date → events map; records every probed date
#[derive(Default)]
pub struct FakeSource {
    days: BTreeMap<NaiveDate, Vec<RawDetectionEvent>>,
    failing: HashSet<NaiveDate>,
    fetched: Mutex<Vec<NaiveDate>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every date in `first..=last` has one non-music record
    pub fn with_data_between(first: NaiveDate, last: NaiveDate) -> Self {
        let mut source = Self::new();
        for day in first.iter_days().take_while(|d| *d <= last) {
            source.days.insert(day, vec![ambient(day, (12, 0, 0))]);
        }
        source
    }

    pub fn day(mut self, date: NaiveDate, events: Vec<RawDetectionEvent>) -> Self {
        self.days.insert(date, events);
        self
    }

    /// Fetching `date` fails with a non-transient error
    pub fn failing_on(mut self, date: NaiveDate) -> Self {
        self.failing.insert(date);
        self
    }

    pub fn fetched(&self) -> Vec<NaiveDate> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl DetectionSource for FakeSource {
    async fn fetch_events(&self, date: NaiveDate) -> Result<Vec<RawDetectionEvent>, SourceError> {
        self.fetched.lock().unwrap().push(date);
        if self.failing.contains(&date) {
            return Err(SourceError::Api(503, "maintenance".to_string()));
        }
        Ok(self.days.get(&date).cloned().unwrap_or_default())
    }
}

/// Destination spy: fixed latest play, records every submission
#[derive(Default)]
pub struct SpyStore {
    latest: Option<Play>,
    reject_title: Option<String>,
    created: Mutex<Vec<Play>>,
}

impl SpyStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_latest(play: Play) -> Self {
        Self {
            latest: Some(play),
            ..Self::default()
        }
    }

    /// Answer `create` for plays titled `title` with a validation error
    pub fn rejecting(mut self, title: &str) -> Self {
        self.reject_title = Some(title.to_string());
        self
    }

    pub fn created(&self) -> Vec<Play> {
        self.created.lock().unwrap().clone()
    }

    pub fn created_titles(&self) -> Vec<String> {
        self.created().into_iter().map(|p| p.title).collect()
    }
}

#[async_trait]
impl PlayStore for SpyStore {
    async fn fetch_latest(&self) -> Result<Option<Play>, DestinationError> {
        Ok(self.latest.clone())
    }

    async fn create(&self, play: &Play) -> Result<(), DestinationError> {
        if self.reject_title.as_deref() == Some(play.title.as_str()) {
            return Err(DestinationError::Validation {
                status: 422,
                body: r#"{"errors":[{"detail":"is invalid"}]}"#.to_string(),
            });
        }
        self.created.lock().unwrap().push(play.clone());
        Ok(())
    }
}
