//! # Model Selection
//!
//! Which LLM provider and model each specialist talks to.
//!
//! API keys are read from the environment by the provider clients:
//! - Anthropic (Claude) - `ANTHROPIC_API_KEY`
//! - OpenAI (GPT) - `OPENAI_API_KEY`
//! - Gemini (Google) - `GEMINI_API_KEY`
//! - OpenRouter (Gateway) - `OPENROUTER_API_KEY`
//! - Grok (xAI) - `XAI_API_KEY`
//! - DeepSeek - `DEEPSEEK_API_KEY`

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    OpenRouter,
    Grok,
    DeepSeek,
}

impl LlmProvider {
    /// Get all available providers
    pub fn all() -> Vec<LlmProvider> {
        vec![
            LlmProvider::Anthropic,
            LlmProvider::OpenAI,
            LlmProvider::Gemini,
            LlmProvider::OpenRouter,
            LlmProvider::Grok,
            LlmProvider::DeepSeek,
        ]
    }

    /// Lowercase slug used in config files and CLI flags
    pub fn slug(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::OpenAI => "openai",
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenRouter => "openrouter",
            LlmProvider::Grok => "grok",
            LlmProvider::DeepSeek => "deepseek",
        }
    }

    /// Model used when neither a per-specialist nor a global model is set
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "claude-sonnet-4-20250514",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::OpenRouter => "anthropic/claude-3.5-sonnet",
            LlmProvider::Grok => "grok-2",
            LlmProvider::DeepSeek => "deepseek-chat",
        }
    }

    /// Environment variable the provider client reads its key from
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
            LlmProvider::Grok => "XAI_API_KEY",
            LlmProvider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Whether this provider supports custom base URL
    pub fn supports_base_url(&self) -> bool {
        matches!(self, LlmProvider::OpenAI)
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LlmProvider::all()
            .into_iter()
            .find(|p| p.slug() == wanted)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown provider '{}' (expected one of: {})",
                    s,
                    LlmProvider::all()
                        .iter()
                        .map(|p| p.slug())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Resolved provider + model for one LLM-backed evaluator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    /// LLM provider to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g., "claude-sonnet-4-20250514", "gpt-4o")
    pub model: String,
    /// Optional base URL override for OpenAI-compatible APIs
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::with_provider(LlmProvider::default(), LlmProvider::default().default_model())
    }
}

impl ModelConfig {
    /// Create config for a specific provider
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            base_url: None,
        }
    }

    /// Set base URL (for OpenAI-compatible endpoints)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.provider, LlmProvider::Anthropic);
        assert!(config.model.contains("claude"));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!(" grok ".parse::<LlmProvider>().unwrap(), LlmProvider::Grok);
        let err = "watson".parse::<LlmProvider>().unwrap_err();
        assert!(err.to_string().contains("deepseek"));
    }

    #[test]
    fn test_base_url_support() {
        assert!(LlmProvider::OpenAI.supports_base_url());
        assert!(!LlmProvider::Anthropic.supports_base_url());
    }

    #[test]
    fn test_model_config_serialization() {
        let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o")
            .with_base_url("http://localhost:11434/v1");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"openai\""));
        assert!(json.contains("gpt-4o"));
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
