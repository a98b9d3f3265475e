//! The chat session: assemble, complete, log.

use std::sync::Arc;

use tagtty_config::AppConfig;
use tagtty_core::log::{LogReader, LogRecord, LogWriter, strip_delimiter};
use tagtty_core::message::{Prompt, TurnFormat};
use tagtty_core::provider::{CompletionRequest, Provider, Usage};
use tracing::{debug, info};

use crate::context::{AssemblyInput, ContextAssembler};

/// Per-request settings, usually taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Context budget in words.
    pub max_context_length: usize,
    pub keywords_only: bool,
    pub turn_format: TurnFormat,
    /// Emit the assembler's debug report for every question.
    pub debug: bool,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
            max_context_length: config.max_context_length,
            keywords_only: config.context_keywords_only,
            turn_format: config.effective_turn_format(),
            debug: false,
        }
    }
}

/// One answered question.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub tag: String,
    pub question: String,
    /// The model's answer, trimmed. Newlines are kept.
    pub response: String,
    /// The prompt that was sent.
    pub prompt: Prompt,
    pub usage: Option<Usage>,
}

/// Answers questions against a provider, sharing context by tag through
/// the conversation log.
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    assembler: ContextAssembler,
    writer: Option<Arc<dyn LogWriter>>,
    settings: SessionSettings,
    logging: bool,
}

impl ChatSession {
    /// Create a session with no log. Only untagged questions can be asked.
    pub fn new(provider: Arc<dyn Provider>, settings: SessionSettings) -> Self {
        Self {
            provider,
            assembler: ContextAssembler::without_log(),
            writer: None,
            settings,
            logging: true,
        }
    }

    /// Read history from `reader` and append new exchanges to `writer`.
    pub fn with_log(mut self, reader: Arc<dyn LogReader>, writer: Arc<dyn LogWriter>) -> Self {
        self.assembler = ContextAssembler::new(reader);
        self.writer = Some(writer);
        self
    }

    /// Enable or disable appending exchanges to the log. History is still read.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Enable or disable the per-question assembly report.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.settings.debug = enabled;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Ask one question.
    ///
    /// The prompt is assembled from history tagged `tag`, sent to the
    /// provider, and the exchange is appended to the log before returning.
    /// The tag is stored without `|`, and history is looked up the same way.
    pub async fn ask(
        &self,
        tag: &str,
        question: &str,
        additional_context: &str,
    ) -> tagtty_core::Result<Exchange> {
        let tag = strip_delimiter(tag);
        let tag = tag.as_str();
        let input = AssemblyInput {
            tag,
            max_length: self.settings.max_context_length,
            model_name: &self.settings.model,
            keywords_only: self.settings.keywords_only,
            additional_context,
            turn_format: self.settings.turn_format,
            question,
            debug: self.settings.debug,
        };
        let prompt = self.assembler.assemble(&input)?;

        debug!(
            provider = self.provider.name(),
            model = %self.settings.model,
            tag = %tag,
            format = ?prompt.format(),
            "Sending completion request"
        );

        let response = self
            .provider
            .complete(CompletionRequest {
                model: self.settings.model.clone(),
                prompt: prompt.clone(),
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        let answer = response.text.trim().to_string();

        if let Some(usage) = &response.usage {
            info!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion received"
            );
        }

        if self.logging {
            if let Some(writer) = &self.writer {
                writer.append(&LogRecord::now(tag, question, &answer))?;
                debug!(tag = %tag, "Exchange logged");
            }
        }

        Ok(Exchange {
            tag: tag.to_string(),
            question: question.to_string(),
            response: answer,
            prompt,
            usage: response.usage,
        })
    }
}
