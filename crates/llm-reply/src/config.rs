//! Configuration for the LLM reply generator.

use std::env;

use convo_core::GeneratorError;

/// Configuration for the chat completions API.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for the reply.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: Some(512),
            temperature: Some(0.7),
        }
    }
}

impl LlmConfig {
    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `LLM_API_KEY` - API key for authentication
    ///
    /// Optional:
    /// - `LLM_API_URL` - API URL (default: https://api.openai.com)
    /// - `LLM_MODEL` - Model name (default: gpt-4o-mini)
    /// - `LLM_MAX_TOKENS` - Max tokens (default: 512)
    /// - `LLM_TEMPERATURE` - Temperature (default: 0.7)
    pub fn from_env() -> Result<Self, GeneratorError> {
        let api_key = env::var("LLM_API_KEY")
            .map_err(|_| GeneratorError::Configuration("LLM_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        Ok(Self {
            api_url: env::var("LLM_API_URL").unwrap_or(defaults.api_url),
            api_key,
            model: env::var("LLM_MODEL").unwrap_or(defaults.model),
            max_tokens: env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.max_tokens),
            temperature: env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.temperature),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.api_url, "https://api.openai.com");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, Some(512));
    }
}
