//! Play-history store client (JSON:API)
//!
//! Authenticates once with username/password when constructed and sends the
//! resulting API token with every later request.

use super::USER_AGENT;
use crate::types::{DestinationError, PlayStore};
use async_trait::async_trait;
use playsync_common::config::RaarSettings;
use playsync_common::Play;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// JSON:API document with a single resource
#[derive(Debug, Deserialize)]
struct Document<T> {
    data: Resource<T>,
}

/// JSON:API document with a resource collection
#[derive(Debug, Deserialize)]
struct CollectionDocument<T> {
    data: Vec<Resource<T>>,
}

#[derive(Debug, Deserialize)]
struct Resource<T> {
    attributes: T,
}

#[derive(Debug, Deserialize)]
struct LoginAttributes {
    api_token: String,
}

#[derive(Debug, Serialize)]
struct CreatePayload<'a> {
    api_token: &'a str,
    data: NewResource<'a>,
}

#[derive(Debug, Serialize)]
struct NewResource<'a> {
    #[serde(rename = "type")]
    resource_type: &'static str,
    attributes: &'a Play,
}

/// Play store API client
pub struct RaarClient {
    http_client: Client,
    base_url: String,
    api_token: String,
}

impl RaarClient {
    /// Build the HTTP client and log in
    ///
    /// Login failure is returned as `DestinationError::Authentication`.
    pub async fn connect(settings: &RaarSettings) -> Result<Self, DestinationError> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(settings.options.accept_invalid_certs);
        if let Some(secs) = settings.options.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| DestinationError::Network(e.to_string()))?;

        let base_url = settings.url.trim_end_matches('/').to_string();
        let api_token =
            login(&http_client, &base_url, &settings.username, &settings.password).await?;
        info!(url = %base_url, user = %settings.username, "Logged in to play store");

        Ok(Self {
            http_client,
            base_url,
            api_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn login(
    http_client: &Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<String, DestinationError> {
    let response = http_client
        .post(format!("{}/login", base_url))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .map_err(|e| DestinationError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(DestinationError::Authentication(format!(
            "login returned {}: {}",
            status.as_u16(),
            error_text
        )));
    }

    let document: Document<LoginAttributes> = response
        .json()
        .await
        .map_err(|e| DestinationError::Authentication(format!("unreadable login response: {}", e)))?;
    Ok(document.data.attributes.api_token)
}

/// Map non-success statuses that are not handled specifically
async fn check_status(response: Response) -> Result<Response, DestinationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
            DestinationError::Authentication(format!("{}: {}", status.as_u16(), error_text)),
        ),
        StatusCode::UNPROCESSABLE_ENTITY => Err(DestinationError::Validation {
            status: status.as_u16(),
            body: error_text,
        }),
        _ => Err(DestinationError::Api(status.as_u16(), error_text)),
    }
}

#[async_trait]
impl PlayStore for RaarClient {
    async fn fetch_latest(&self) -> Result<Option<Play>, DestinationError> {
        let response = self
            .http_client
            .get(self.endpoint("tracks"))
            .query(&[
                ("sort", "-started_at"),
                ("page[size]", "1"),
                ("api_token", self.api_token.as_str()),
            ])
            .header(ACCEPT, JSON_API_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| DestinationError::Network(e.to_string()))?;

        let document: CollectionDocument<Play> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| DestinationError::Parse(e.to_string()))?;

        Ok(document.data.into_iter().next().map(|r| r.attributes))
    }

    async fn create(&self, play: &Play) -> Result<(), DestinationError> {
        let payload = CreatePayload {
            api_token: &self.api_token,
            data: NewResource {
                resource_type: "track",
                attributes: play,
            },
        };
        let body =
            serde_json::to_vec(&payload).map_err(|e| DestinationError::Parse(e.to_string()))?;

        let response = self
            .http_client
            .post(self.endpoint("tracks"))
            .query(&[("api_token", self.api_token.as_str())])
            .header(CONTENT_TYPE, JSON_API_CONTENT_TYPE)
            .header(ACCEPT, JSON_API_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| DestinationError::Network(e.to_string()))?;

        match check_status(response).await {
            Ok(_) => {
                debug!(title = %play.title, started_at = %play.started_at, "Created play");
                Ok(())
            }
            Err(DestinationError::Validation { status, body }) => {
                error!(play = ?play, status, response = %body, "Could not create play");
                Err(DestinationError::Validation { status, body })
            }
            Err(e) => Err(e),
        }
    }
}
