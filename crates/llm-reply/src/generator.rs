//! The [`ReplyGenerator`] implementation.

use async_trait::async_trait;
use convo_core::{ChatTurn, GeneratorError, ReplyGenerator};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::LlmConfig;

/// Reply generator backed by an OpenAI-compatible chat completions API.
pub struct LlmReplyGenerator {
    client: Client,
    config: LlmConfig,
}

impl LlmReplyGenerator {
    /// Create a generator with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder().build().map_err(|e| {
            GeneratorError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        info!("Reply generator initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Create a generator from environment variables.
    ///
    /// See [`LlmConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, GeneratorError> {
        Self::new(LlmConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn build_messages(&self, system_prompt: &str, history: &[ChatTurn]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        for turn in history {
            messages.push(ChatMessage::with_role(turn.role.as_str(), &turn.content));
        }
        messages
    }
}

#[async_trait]
impl ReplyGenerator for LlmReplyGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, GeneratorError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: self.build_messages(system_prompt, history),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(turns = history.len(), "Requesting chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeneratorError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(GeneratorError::ProcessingFailed(format!(
                    "API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(GeneratorError::ProcessingFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::ProcessingFailed(format!("Invalid response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                GeneratorError::ProcessingFailed("No content in response".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_prepends_system_prompt() {
        let generator = LlmReplyGenerator::new(LlmConfig {
            api_key: "key".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();

        let history = vec![ChatTurn::assistant("hola"), ChatTurn::user("busco finca")];
        let messages = generator.build_messages("eres un asistente", &history);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content, "busco finca");
    }
}
