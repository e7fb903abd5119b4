//! Client for the game server's question generation route.
//!
//! `POST {base_url}/api/generate_question` with a [`GenerateRequest`] body.
//! The server answers with either a JSON array of questions or
//! `{ "error": "..." }` (usually with HTTP 500).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::accept_batch;
use crate::traits::QuestionGenerator;
use crate::types::{GenerateRequest, Question};
use crate::{Result, SupplyError};

/// Default base URL of a locally running game server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const GENERATE_PATH: &str = "/api/generate_question";

#[derive(Deserialize)]
#[serde(untagged)]
enum Reply {
    Questions(Vec<Value>),
    Error { error: String },
}

/// [`QuestionGenerator`] backed by the game server's HTTP endpoint.
#[derive(Clone)]
pub struct EndpointGenerator {
    http: Client,
    base_url: String,
}

impl EndpointGenerator {
    /// Create a generator for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a generator with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            SupplyError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl QuestionGenerator for EndpointGenerator {
    fn name(&self) -> &str {
        "endpoint"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Question>> {
        let url = format!("{}{GENERATE_PATH}", self.base_url);
        debug!(%url, count = request.count, excluded = request.exclude_ids.len(), "requesting questions");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| SupplyError::RemoteTransport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SupplyError::RateLimited {
                retry_after: retry_after_header(&response),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SupplyError::RemoteTransport(e.to_string()))?;

        match serde_json::from_str::<Reply>(&body) {
            Ok(Reply::Error { error }) => Err(SupplyError::RemoteApplication(error)),
            _ if !status.is_success() => Err(SupplyError::RemoteTransport(format!(
                "generator returned HTTP {status}"
            ))),
            Ok(Reply::Questions(items)) => Ok(accept_batch(self.name(), items, request)),
            Err(e) => Err(SupplyError::RemoteTransport(format!(
                "malformed generator reply: {e}"
            ))),
        }
    }
}

/// Parse a `Retry-After` header given in seconds.
pub(crate) fn retry_after_header(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
