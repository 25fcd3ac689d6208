//! Error types shared by the estimator, the flows and the HTTP boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Submitted form data failed its constraints.
///
/// Field errors are keyed by the form field name as submitted (camelCase),
/// so the caller can render them inline next to the offending input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field_errors: BTreeMap<String, Vec<String>>,
    pub form_errors: Vec<String>,
}

impl ValidationError {
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.push_field(name, message);
        err
    }

    pub fn push_field(&mut self, name: &str, message: impl Into<String>) {
        self.field_errors
            .entry(name.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn push_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.form_errors.is_empty()
    }

    pub fn messages_for(&self, name: &str) -> &[String] {
        self.field_errors
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            for message in messages {
                parts.push(format!("{field}: {message}"));
            }
        }
        if parts.is_empty() {
            write!(f, "validation failed")
        } else {
            write!(f, "validation failed: {}", parts.join("; "))
        }
    }
}

impl std::error::Error for ValidationError {}

/// The narrative collaborator could not produce usable output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("no language model provider is configured")]
    Disabled,

    #[error("provider request failed: {0}")]
    Provider(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("language model returned no text")]
    EmptyResponse,

    #[error("language model output is not valid JSON: {0}")]
    MalformedOutput(String),

    #[error("language model output failed its schema: {0}")]
    Schema(String),
}

/// Failure of a whole flow invocation.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Anything that is not the collaborator's fault, e.g. an input that
    /// could not be serialized into prompt variables.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
