use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use tracing::debug;

use super::NarrativeGenerator;
use crate::config::{LlmConfig, Provider};
use crate::error::GenerationError;

fn map_backend(provider: Provider) -> LLMBackend {
    match provider {
        Provider::OpenAi => LLMBackend::OpenAI,
        Provider::Anthropic => LLMBackend::Anthropic,
        Provider::Google => LLMBackend::Google,
        Provider::Ollama => LLMBackend::Ollama,
        Provider::Groq => LLMBackend::Groq,
        Provider::Mistral => LLMBackend::Mistral,
        Provider::DeepSeek => LLMBackend::DeepSeek,
    }
}

/// Narrative generator backed by a hosted chat model.
#[derive(Debug, Clone)]
pub struct LlmNarrator {
    provider: Provider,
    model: String,
    api_key: String,
    base_url: Option<String>,
}

impl LlmNarrator {
    /// `None` when no provider is configured.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let provider = config.provider?;
        Some(Self {
            provider,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone().filter(|url| !url.trim().is_empty()),
        })
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError> {
        let mut builder = LLMBuilder::new()
            .backend(map_backend(self.provider))
            .model(&self.model)
            .system(system);

        if !self.api_key.is_empty() {
            builder = builder.api_key(&self.api_key);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }

        let llm = builder
            .build()
            .map_err(|e| GenerationError::Provider(format!("build LLM: {e}")))?;

        debug!(provider = %self.provider, model = %self.model, "sending prompt");
        let messages = vec![ChatMessage::user().content(prompt).build()];
        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| GenerationError::Provider(format!("chat: {e}")))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GenerationError::EmptyResponse),
        }
    }
}
