//! The hosted language model that turns numbers and form answers into text.
//!
//! Flows depend on [`NarrativeGenerator`] only, so the service can run with a
//! real provider, with none configured ([`DisabledNarrator`]), or with a
//! scripted stand-in under test.

mod hosted;
pub mod parse;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::LlmConfig;
use crate::error::GenerationError;

pub use self::hosted::LlmNarrator;

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Send one system + user prompt pair and return the raw reply text.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Used when no provider is configured. Every call fails immediately so
/// callers take their fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNarrator;

#[async_trait]
impl NarrativeGenerator for DisabledNarrator {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}

pub fn build_narrator(config: &LlmConfig) -> Arc<dyn NarrativeGenerator> {
    match LlmNarrator::from_config(config) {
        Some(narrator) => Arc::new(narrator),
        None => {
            warn!("no llm.provider configured; narrative text will use fallbacks");
            Arc::new(DisabledNarrator)
        }
    }
}

pub async fn generate_with_timeout(
    narrator: &dyn NarrativeGenerator,
    timeout: Duration,
    system: &str,
    prompt: &str,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(timeout, narrator.generate(system, prompt)).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout(timeout)),
    }
}
