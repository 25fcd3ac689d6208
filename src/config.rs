//! Service configuration.
//!
//! Precedence, highest first: CLI flags, `THRIVE_*` environment variables,
//! the TOML file passed with `--config`, built-in defaults.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Hosted model used for narrative text. No provider means every flow
/// falls back immediately.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    pub provider: Option<Provider>,
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: String::new(),
            api_key: String::new(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keeps the key out of logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(alias = "open-ai")]
    OpenAi,
    Anthropic,
    Google,
    Ollama,
    Groq,
    Mistral,
    #[serde(alias = "deep-seek")]
    DeepSeek,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Ollama => "ollama",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Local providers run without an API key.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "google" => Ok(Provider::Google),
            "ollama" => Ok(Provider::Ollama),
            "groq" => Ok(Provider::Groq),
            "mistral" => Ok(Provider::Mistral),
            "deepseek" | "deep-seek" => Ok(Provider::DeepSeek),
            other => Err(ConfigError::Invalid(format!("unknown provider: {other}"))),
        }
    }
}

/// Whether the command about to run may call the language model.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Usage {
    Offline,
    Model,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, apply environment overrides, then validate.
    pub fn resolve(path: Option<&Path>, usage: Usage) -> Result<Self, ConfigError> {
        Self::resolve_with(path, usage, |key| std::env::var(key).ok())
    }

    /// [`Config::resolve`] with the environment read through `lookup`.
    /// Offline use never reads the `[llm]` overrides or checks them.
    pub fn resolve_with(
        path: Option<&Path>,
        usage: Usage,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        match usage {
            Usage::Offline => Ok(config),
            Usage::Model => {
                let config = config.with_overrides(lookup)?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Apply `THRIVE_*` overrides read through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(provider) = lookup("THRIVE_LLM_PROVIDER") {
            self.llm.provider = if provider.trim().is_empty() {
                None
            } else {
                Some(provider.parse()?)
            };
        }
        if let Some(model) = lookup("THRIVE_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = lookup("THRIVE_LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(secs) = lookup("THRIVE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("THRIVE_LLM_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be > 0".to_string(),
            ));
        }

        if let Some(provider) = self.llm.provider {
            if self.llm.model.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "llm.model is required when llm.provider = \"{provider}\""
                )));
            }
            if provider.requires_api_key() && self.llm.api_key.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "llm.api_key (or THRIVE_LLM_API_KEY) is required for {provider}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).expect("config should parse")
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("");
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.timeout(), Duration::from_secs(30));
        assert!(config.llm.provider.is_none());
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn full_file_parses() {
        let config = parse(
            r#"
[server]
host = "127.0.0.1"
port = 9000

[llm]
provider = "anthropic"
model = "claude-3-5-haiku-latest"
api_key = "sk-test"
timeout_secs = 12
"#,
        );
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.provider, Some(Provider::Anthropic));
        assert_eq!(config.llm.timeout(), Duration::from_secs(12));
        config.validate().expect("valid");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = toml::from_str::<Config>("[server]\nportt = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let result = toml::from_str::<Config>("[llm]\nprovider = \"skynet\"\n");
        assert!(result.is_err());
        assert!("skynet".parse::<Provider>().is_err());
    }

    #[test]
    fn provider_requires_model_and_key() {
        let mut config = parse("[llm]\nprovider = \"openai\"\n");
        let err = config.validate().expect_err("model missing");
        assert!(err.to_string().contains("llm.model"));

        config.llm.model = "gpt-4o-mini".to_string();
        let err = config.validate().expect_err("key missing");
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn ollama_runs_without_key() {
        let config = parse("[llm]\nprovider = \"ollama\"\nmodel = \"llama3\"\n");
        config.validate().expect("ollama needs no key");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = parse("[llm]\ntimeout_secs = 0\n");
        let err = config.validate().expect_err("zero timeout");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("THRIVE_LLM_PROVIDER", "groq"),
            ("THRIVE_LLM_MODEL", "llama-3.1-8b-instant"),
            ("THRIVE_LLM_API_KEY", "from-env"),
            ("THRIVE_LLM_TIMEOUT_SECS", "5"),
        ]);
        let config = parse("[llm]\nprovider = \"openai\"\napi_key = \"from-file\"\n")
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .expect("overrides apply");

        assert_eq!(config.llm.provider, Some(Provider::Groq));
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.api_key, "from-env");
        assert_eq!(config.llm.timeout_secs, 5);
    }

    #[test]
    fn empty_provider_override_disables_llm() {
        let config = parse("[llm]\nprovider = \"openai\"\n")
            .with_overrides(|key| (key == "THRIVE_LLM_PROVIDER").then(String::new))
            .expect("overrides apply");
        assert!(config.llm.provider.is_none());
    }

    #[test]
    fn bad_timeout_override_is_reported() {
        let err = Config::default()
            .with_overrides(|key| (key == "THRIVE_LLM_TIMEOUT_SECS").then(|| "soon".to_string()))
            .expect_err("non-numeric timeout");
        assert!(err.to_string().contains("THRIVE_LLM_TIMEOUT_SECS"));
    }

    #[test]
    fn without_overrides_config_is_unchanged() {
        let config = Config::default().with_overrides(no_env).expect("no-op");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn offline_use_ignores_incomplete_llm_settings() {
        let lookup = |key: &str| (key == "THRIVE_LLM_PROVIDER").then(|| "openai".to_string());
        let config = Config::resolve_with(None, Usage::Offline, lookup).expect("offline");
        assert_eq!(config.server, ServerConfig::default());

        let err = Config::resolve_with(None, Usage::Model, lookup).expect_err("no model");
        assert!(err.to_string().contains("llm.model is required"));
    }

    #[test]
    fn offline_use_ignores_unknown_provider_override() {
        let lookup = |key: &str| (key == "THRIVE_LLM_PROVIDER").then(|| "skynet".to_string());
        Config::resolve_with(None, Usage::Offline, lookup).expect("offline");
        Config::resolve_with(None, Usage::Model, lookup).expect_err("unknown provider");
    }

    #[test]
    fn model_use_applies_overrides_and_validates() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("THRIVE_LLM_PROVIDER", "ollama"),
            ("THRIVE_LLM_MODEL", "llama3"),
        ]);
        let config = Config::resolve_with(None, Usage::Model, |key| {
            env.get(key).map(|v| v.to_string())
        })
        .expect("valid");
        assert_eq!(config.llm.provider, Some(Provider::Ollama));
        assert_eq!(config.llm.model, "llama3");
    }

    #[test]
    fn debug_output_masks_api_key() {
        let config = parse("[llm]\napi_key = \"sk-secret\"\n");
        let debug = format!("{:?}", config.llm);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load(Path::new("/nonexistent/thrive.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
