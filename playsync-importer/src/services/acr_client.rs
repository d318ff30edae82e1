//! Detection log client
//!
//! One request per calendar day: `GET {url}?access_key={key}&date={YYYYMMDD}`.
//! The response is a JSON array of detection events. A day without data is
//! reported either as `[]` or, for recent days, as HTTP 500 on the first
//! query; both mean "no events".

use super::USER_AGENT;
use crate::types::{DetectionSource, RawDetectionEvent, SourceError};
use async_trait::async_trait;
use chrono::NaiveDate;
use playsync_common::config::AcrSettings;
use playsync_common::time::compact_date;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Detection log API client
pub struct AcrClient {
    http_client: Client,
    url: String,
    access_key: String,
}

impl AcrClient {
    pub fn new(settings: &AcrSettings) -> Result<Self, SourceError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: settings.url.clone(),
            access_key: settings.access_key.clone(),
        })
    }
}

#[async_trait]
impl DetectionSource for AcrClient {
    async fn fetch_events(&self, date: NaiveDate) -> Result<Vec<RawDetectionEvent>, SourceError> {
        debug!(%date, "Fetching detections");

        let response = self
            .http_client
            .get(&self.url)
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("date", compact_date(date).as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            debug!(%date, "Source answered 500, treating date as empty");
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        parse_events(&body)
    }
}

/// Decode a response body; anything but a JSON array is rejected
pub fn parse_events(body: &str) -> Result<Vec<RawDetectionEvent>, SourceError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    match value {
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| SourceError::Parse(e.to_string()))
        }
        other => Err(SourceError::UnexpectedShape(truncate(&other.to_string(), 200))),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
