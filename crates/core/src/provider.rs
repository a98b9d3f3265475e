//! Provider trait, the abstraction over completion backends.
//!
//! A Provider takes an assembled [`Prompt`] and returns the model's answer.
//! Flat prompts go to legacy completion endpoints, structured prompts to
//! chat endpoints; the provider picks the endpoint from the prompt shape.

use crate::error::ProviderError;
use crate::message::Prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gpt-3.5-turbo", "text-davinci-003")
    pub model: String,

    /// The assembled prompt
    pub prompt: Prompt,

    /// Temperature (0.0 = deterministic)
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Turn;

    struct Echo;

    #[async_trait]
    impl Provider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse {
                text: request.prompt.render(),
                usage: None,
                model: request.model,
            })
        }
    }

    #[tokio::test]
    async fn provider_is_object_safe() {
        let provider: Box<dyn Provider> = Box::new(Echo);
        let response = provider
            .complete(CompletionRequest {
                model: "gpt-4o".into(),
                prompt: Prompt::Turns(vec![Turn::user("ping")]),
                temperature: 0.0,
                max_tokens: None,
            })
            .await
            .unwrap();
        assert_eq!(response.text, "user: ping");
        assert_eq!(provider.name(), "echo");
    }

    #[test]
    fn request_omits_unset_max_tokens() {
        let req = CompletionRequest {
            model: "text-davinci-003".into(),
            prompt: Prompt::Text("hello".into()),
            temperature: 0.0,
            max_tokens: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("max_tokens"));
        assert!(json.contains(r#""prompt":"hello""#));
    }
}
