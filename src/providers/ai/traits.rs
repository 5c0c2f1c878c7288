//! LLM provider trait and supporting types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request for a completion from an LLM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Conversation messages.
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Single-turn request carrying one user message.
    pub fn single_turn(prompt: impl Into<String>) -> Self {
        Self::new(vec![Message::user(prompt)])
    }
}

/// Response from a completion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text content.
    pub text: String,

    /// Model that produced the reply, when reported.
    pub model: Option<String>,

    /// Number of generated tokens, when reported.
    pub eval_count: Option<u64>,
}

impl CompletionResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Trait for chat-completion providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider's name (e.g., "ollama").
    fn name(&self) -> &str;

    /// Returns the model identifier being used.
    fn model(&self) -> &str;

    /// Performs a non-streaming completion request and returns the full response.
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_request() {
        let request = CompletionRequest::single_turn("Categorize this");
        assert_eq!(request.messages, vec![Message::user("Categorize this")]);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Message::user("x")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"x"}"#);
    }

    #[test]
    fn test_error_display() {
        let err = LlmError::ApiError {
            status: 404,
            message: "model 'mistral' not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - model 'mistral' not found");

        let err = LlmError::Timeout(std::time::Duration::from_secs(30));
        assert_eq!(err.to_string(), "request timed out after 30s");
    }
}
