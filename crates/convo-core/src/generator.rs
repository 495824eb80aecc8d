//! Reply generator trait.

use async_trait::async_trait;

use crate::error::GeneratorError;
use crate::types::ChatTurn;

/// Trait for the text-generation collaborator.
///
/// Implementations receive the assembled system prompt and the recent
/// conversation history, and return the reply text.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a conversational reply.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, GeneratorError>;
}

/// A generator returning a fixed reply, for tests.
#[derive(Debug, Clone)]
pub struct FixedReplyGenerator {
    reply: String,
}

impl FixedReplyGenerator {
    /// Create a generator that always returns `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

#[async_trait]
impl ReplyGenerator for FixedReplyGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _history: &[ChatTurn],
    ) -> Result<String, GeneratorError> {
        Ok(self.reply.clone())
    }
}
