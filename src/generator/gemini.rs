//! Direct generation through the Gemini `generateContent` REST API.
//!
//! Sends the game prompt from [`prompt::build_prompt`](super::prompt::build_prompt)
//! and parses the model's JSON array. Model errors are reported the way the
//! game server reports them: as application errors carrying the message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::endpoint::retry_after_header;
use super::{accept_batch, prompt};
use crate::traits::QuestionGenerator;
use crate::types::{GenerateRequest, Question};
use crate::{Result, SupplyError};

/// Default base URL for the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// [`QuestionGenerator`] that prompts Gemini directly.
#[derive(Clone)]
pub struct GeminiGenerator {
    api_key: String,
    model: String,
    http: Client,
    base_url: String,
}

impl GeminiGenerator {
    /// Create a generator for the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a generator with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                SupplyError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Use a different model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replace the HTTP client, e.g. to change the timeout.
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn request_body(request: &GenerateRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt::build_prompt(&request.category, &request.difficulty, request.count),
                }],
            }],
            generation_config: GenerationConfig::default(),
            safety_settings: HARM_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        }
    }
}

#[async_trait]
impl QuestionGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Question>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!(model = %self.model, count = request.count, "prompting gemini");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(request))
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
        let reply: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(SupplyError::RemoteTransport(format!(
                    "gemini returned HTTP {status}"
                )));
            }
            Err(e) => return Err(SupplyError::RemoteApplication(e.to_string())),
        };

        if let Some(error) = reply.error {
            return Err(SupplyError::RemoteApplication(error.message));
        }
        if !status.is_success() {
            return Err(SupplyError::RemoteTransport(format!(
                "gemini returned HTTP {status}"
            )));
        }

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(SupplyError::RemoteApplication(
                "empty response from model".into(),
            ));
        }

        let items = prompt::parse_reply(&text)?;
        Ok(accept_batch(self.name(), items, request))
    }
}
