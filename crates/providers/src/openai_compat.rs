//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI and any endpoint exposing the same API shape.
//!
//! Supports:
//! - Legacy text completions (`/completions`) for flat prompts
//! - Chat completions (`/chat/completions`) for structured prompts

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tagtty_config::AppConfig;
use tagtty_core::error::ProviderError;
use tagtty_core::message::{Prompt, Turn};
use tagtty_core::provider::*;
use tracing::{debug, warn};

/// Fallback wait reported for 429s without a `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// An OpenAI-compatible completion provider.
///
/// The endpoint is chosen per request from the prompt shape: flat text goes
/// to `/completions`, turns go to `/chat/completions`.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    organization: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            organization: None,
            client,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(
            "openai",
            "https://api.openai.com/v1",
            api_key,
            Duration::from_secs(15),
        )
    }

    /// Build a provider from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured(
                    "no API key set (api_key in config.toml, TAGTTY_API_KEY or OPENAI_API_KEY)"
                        .into(),
                )
            })?;

        let provider = Self::new(
            "openai",
            config.api_url.clone(),
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        );
        Ok(match &config.org_id {
            Some(org) if !org.trim().is_empty() => provider.with_organization(org.trim()),
            _ => provider,
        })
    }

    /// Send an `OpenAI-Organization` header with every request.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// The endpoint URL and JSON body for a request.
    fn build_request(&self, request: &CompletionRequest) -> (String, serde_json::Value) {
        match &request.prompt {
            Prompt::Text(text) => {
                let mut body = serde_json::json!({
                    "model": request.model,
                    "prompt": text,
                    "temperature": request.temperature,
                    "n": 1,
                });
                if let Some(max_tokens) = request.max_tokens {
                    body["max_tokens"] = serde_json::json!(max_tokens);
                }
                (format!("{}/completions", self.base_url), body)
            }
            Prompt::Turns(turns) => {
                let mut body = serde_json::json!({
                    "model": request.model,
                    "messages": Self::to_api_messages(turns),
                    "temperature": request.temperature,
                    "n": 1,
                });
                if let Some(max_tokens) = request.max_tokens {
                    body["max_tokens"] = serde_json::json!(max_tokens);
                }
                (format!("{}/chat/completions", self.base_url), body)
            }
        }
    }

    /// Convert our turns to OpenAI API format.
    fn to_api_messages(turns: &[Turn]) -> Vec<ApiMessage> {
        turns
            .iter()
            .map(|t| ApiMessage {
                role: t.role.as_str().into(),
                content: Some(t.content.clone()),
            })
            .collect()
    }

    /// Map a non-success HTTP status to a provider error.
    fn error_for_status(
        status: u16,
        retry_after: Option<u64>,
        model: &str,
        body: String,
    ) -> ProviderError {
        match status {
            401 | 403 => ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            404 => ProviderError::ModelNotFound(model.to_string()),
            429 => ProviderError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            },
            _ => ProviderError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }

    /// Pull the answer text out of either response shape.
    fn into_completion(api_response: ApiResponse) -> Result<CompletionResponse, ProviderError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let text = choice
            .message
            .and_then(|m| m.content)
            .or(choice.text)
            .unwrap_or_default();

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            text,
            usage,
            model: api_response.model,
        })
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let (url, body) = self.build_request(&request);

        debug!(provider = %self.name, model = %request.model, url = %url, "Sending completion request");

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(Self::error_for_status(
                status,
                retry_after,
                &request.model,
                error_body,
            ));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::into_completion(api_response)
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

/// A choice from either endpoint: chat carries `message`, legacy carries `text`.
#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
