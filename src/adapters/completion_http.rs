//! Completion API client implementation using reqwest.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AppError;
use crate::domain::settings::ApiConfig;
use crate::ports::{CompletionClient, CompletionRequest};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

const DEFAULT_STATUS_MESSAGE: &str = "Completion API request failed";

/// HTTP transport for an OpenAI-compatible chat-completions endpoint.
///
/// This client performs a single request per call. Retry behavior is
/// implemented by a dedicated retry wrapper adapter.
#[derive(Clone)]
pub struct HttpCompletionClient {
    api_key: String,
    api_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpCompletionClient {
    /// Create a new HTTP client with the given API key and configuration.
    pub fn new(api_key: String, config: &ApiConfig) -> Result<Self, AppError> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            AppError::config_error(format!("Invalid api_url '{}': {e}", config.api_url))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::CompletionApi {
                message: format!("Failed to create HTTP client: {e}"),
                status: None,
            })?;

        Ok(Self { api_key, api_url, client })
    }

    /// Create from the `GROQ_API_KEY` environment variable.
    pub fn from_env(config: &ApiConfig) -> Result<Self, AppError> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| AppError::EnvironmentVariableMissing(API_KEY_VAR.into()))?;

        Self::new(api_key, config)
    }

    fn send_request(&self, request: &ApiRequest) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.api_url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(|e| AppError::CompletionApi {
                message: format!("HTTP request failed: {e}"),
                status: None,
            })?;

        let status = response.status();
        let retry_after_ms = response.headers().get(RETRY_AFTER).and_then(parse_retry_after_ms);
        let body_text = response.text().unwrap_or_default();

        if status.is_success() {
            let api_response: ApiResponse =
                serde_json::from_str(&body_text).map_err(|e| AppError::CompletionApi {
                    message: format!("Failed to parse response: {e}"),
                    status: Some(status.as_u16()),
                })?;

            let choice =
                api_response.choices.into_iter().next().ok_or_else(|| AppError::CompletionApi {
                    message: "No choices in response".into(),
                    status: Some(status.as_u16()),
                })?;

            return Ok(choice.message.content);
        }

        let mut message = extract_error_message(&body_text).unwrap_or_else(|| {
            if !body_text.trim().is_empty() {
                body_text.clone()
            } else if status.as_u16() == 429 {
                "Rate limited".to_string()
            } else if status.is_server_error() {
                "Server error".to_string()
            } else {
                DEFAULT_STATUS_MESSAGE.to_string()
            }
        });

        if let Some(value) = retry_after_ms {
            message.push_str(&format!(" (retry_after_ms={value})"));
        }

        Err(AppError::CompletionApi { message, status: Some(status.as_u16()) })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let api_request = ApiRequest {
            model: request.model.as_str().to_string(),
            messages: vec![ApiMessage { role: "user", content: request.prompt }],
            temperature: request.temperature,
        };

        self.send_request(&api_request)
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: String,
}

fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;

    if let Some(msg) = parsed
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Some(msg.to_string());
    }

    parsed.get("message").and_then(|message| message.as_str()).map(ToOwned::to_owned)
}

fn parse_retry_after_ms(value: &HeaderValue) -> Option<u64> {
    let raw = value.to_str().ok()?.trim();
    let seconds = raw.parse::<u64>().ok()?;
    Some(seconds.saturating_mul(1000))
}
