//! WaniKani API client
//!
//! Implements `SummaryFetcher` over the v2 REST API. Response parsing works
//! on `(status, serde_json::Value)` pairs so it can be tested offline.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::client::SummaryFetcher;
use super::error::FetchError;
use super::types::{ReviewBatch, SummaryPayload, UserInfo};

/// WaniKani API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.wanikani.com/v2";

/// API revision sent with every request
pub const DEFAULT_REVISION: &str = "20170710";

/// Configuration for the WaniKani client
#[derive(Debug, Clone)]
pub struct WaniKaniConfig {
    pub base_url: String,
    pub revision: String,
    pub timeout: Duration,
}

impl Default for WaniKaniConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// WaniKani API client
pub struct WaniKaniClient {
    client: Client,
    config: WaniKaniConfig,
}

impl WaniKaniClient {
    /// Create a client with the given configuration
    pub fn new(config: WaniKaniConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET an endpoint and return its decoded, status-checked body
    async fn load_endpoint(&self, path: &str, token: &str) -> Result<Value, FetchError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("Wanikani-Revision", &self.config.revision)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Value =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed(format!("Invalid JSON: {}", e)))?;

        check_response(status, body)
    }
}

#[async_trait]
impl SummaryFetcher for WaniKaniClient {
    async fn fetch_summary(&self, token: &str) -> Result<SummaryPayload, FetchError> {
        let body = self.load_endpoint("summary", token).await?;
        parse_summary(&body)
    }

    async fn fetch_user(&self, token: &str) -> Result<UserInfo, FetchError> {
        let body = self.load_endpoint("user", token).await?;
        parse_user(&body)
    }
}

impl std::fmt::Debug for WaniKaniClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaniKaniClient")
            .field("base_url", &self.config.base_url)
            .field("revision", &self.config.revision)
            .finish()
    }
}

/// Classify a decoded response by status code
pub fn check_response(status: StatusCode, body: Value) -> Result<Value, FetchError> {
    if !body.is_object() {
        return Err(FetchError::Malformed("Response is not an object".to_string()));
    }

    match status.as_u16() {
        200 => Ok(body),
        401 => Err(FetchError::Unauthorized),
        _ => {
            let code = body["code"].as_i64();
            let message = body["error"].as_str();
            match (code, message) {
                (Some(code), Some(message)) => Err(FetchError::ServerError {
                    code,
                    message: message.to_string(),
                }),
                _ => Err(FetchError::Malformed(format!("Unexpected status {}", status))),
            }
        }
    }
}

/// Parse the body of the summary endpoint
pub fn parse_summary(body: &Value) -> Result<SummaryPayload, FetchError> {
    let data = &body["data"];
    let reviews = data["reviews"]
        .as_array()
        .ok_or_else(|| FetchError::Malformed("Missing data.reviews".to_string()))?;

    let data_updated_at = parse_timestamp(&body["data_updated_at"], "data_updated_at")?;

    let next_reviews_at = match &data["next_reviews_at"] {
        Value::Null => None,
        value => Some(parse_timestamp(value, "next_reviews_at")?),
    };

    let reviews = reviews.iter().map(parse_batch).collect::<Result<Vec<_>, _>>()?;

    Ok(SummaryPayload {
        data_updated_at,
        next_reviews_at,
        reviews,
    })
}

/// Parse the body of the user endpoint
pub fn parse_user(body: &Value) -> Result<UserInfo, FetchError> {
    let data = &body["data"];
    let username = data["username"]
        .as_str()
        .ok_or_else(|| FetchError::Malformed("Missing data.username".to_string()))?;
    let level = data["level"]
        .as_u64()
        .and_then(|level| u32::try_from(level).ok())
        .ok_or_else(|| FetchError::Malformed("Missing data.level".to_string()))?;

    Ok(UserInfo {
        username: username.to_string(),
        level,
    })
}

fn parse_batch(value: &Value) -> Result<ReviewBatch, FetchError> {
    let available_at = parse_timestamp(&value["available_at"], "available_at")?;
    let subject_ids = value["subject_ids"]
        .as_array()
        .ok_or_else(|| FetchError::Malformed("Missing subject_ids".to_string()))?
        .iter()
        .map(|id| {
            id.as_i64()
                .ok_or_else(|| FetchError::Malformed(format!("Invalid subject id: {}", id)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReviewBatch {
        available_at,
        subject_ids,
    })
}

fn parse_timestamp(value: &Value, field: &str) -> Result<DateTime<Utc>, FetchError> {
    let text = value
        .as_str()
        .ok_or_else(|| FetchError::Malformed(format!("Missing {}", field)))?;
    DateTime::parse_from_rfc3339(text)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| FetchError::Malformed(format!("Invalid {} '{}': {}", field, text, e)))
}
