//! Ollama provider implementation.
//!
//! Talks to Ollama's native `/api/chat` endpoint with streaming disabled, so
//! each request yields exactly one JSON envelope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::traits::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, LlmResult, Message,
};
use crate::config::AiSettings;

/// Default Ollama chat URL.
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434/api/chat";

/// Default upper bound on a single request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Ollama chat response envelope.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: Option<String>,
    message: Option<OllamaResponseMessage>,
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: Option<String>,
}

/// Ollama error body.
#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Provider for Ollama's local LLM server.
pub struct OllamaProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl OllamaProvider {
    /// Creates a provider for the default localhost endpoint.
    pub fn new(model: impl Into<String>) -> LlmResult<Self> {
        Self::with_url(OLLAMA_DEFAULT_URL, model, DEFAULT_TIMEOUT)
    }

    /// Creates a provider for a custom chat URL and request timeout.
    pub fn with_url(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> LlmResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            timeout,
        })
    }

    /// Creates a provider from run settings.
    pub fn from_settings(settings: &AiSettings) -> LlmResult<Self> {
        Self::with_url(
            settings.endpoint.clone(),
            settings.model.clone(),
            settings.request_timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages: &request.messages,
            stream: false,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::HttpError(err)
        }
    }

    fn parse_envelope(body: &str) -> LlmResult<CompletionResponse> {
        let envelope: OllamaChatResponse = serde_json::from_str(body)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = envelope
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| LlmError::InvalidResponse("No message.content in response".to_string()))?;

        Ok(CompletionResponse {
            text,
            model: envelope.model,
            eval_count: envelope.eval_count,
        })
    }

    async fn handle_error_response(&self, response: reqwest::Response) -> LlmError {
        let status = response.status().as_u16();

        if let Ok(body) = response.text().await {
            if let Ok(error) = serde_json::from_str::<OllamaError>(&body) {
                return LlmError::ApiError {
                    status,
                    message: error.error,
                };
            }
        }

        LlmError::ApiError {
            status,
            message: format!("HTTP {}", status),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.handle_error_response(response).await);
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        Self::parse_envelope(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let provider = OllamaProvider::new("mistral").unwrap();
        let request = CompletionRequest::single_turn("Hello");

        let json = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "mistral",
                "messages": [{"role": "user", "content": "Hello"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_envelope_parsing() {
        let body = r#"{
            "model": "mistral",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "{\"category\":\"work\"}"},
            "done": true,
            "eval_count": 12
        }"#;

        let response = OllamaProvider::parse_envelope(body).unwrap();
        assert_eq!(response.text, r#"{"category":"work"}"#);
        assert_eq!(response.model.as_deref(), Some("mistral"));
        assert_eq!(response.eval_count, Some(12));
    }

    #[test]
    fn test_envelope_without_content() {
        let err = OllamaProvider::parse_envelope(r#"{"model": "mistral", "done": true}"#)
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));

        let err = OllamaProvider::parse_envelope(r#"{"message": {"role": "assistant"}}"#)
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_envelope_not_json() {
        let err = OllamaProvider::parse_envelope("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_envelope_with_non_string_content() {
        let err = OllamaProvider::parse_envelope(r#"{"message": {"content": 42}}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_default_provider() {
        let provider = OllamaProvider::new("mistral").unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.model(), "mistral");
        assert_eq!(provider.endpoint(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_from_settings() {
        let settings = AiSettings {
            endpoint: "http://172.18.0.1:11434/api/chat".to_string(),
            model: "llama3.2".to_string(),
            request_timeout_secs: 5,
            ..Default::default()
        };
        let provider = OllamaProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.endpoint(), "http://172.18.0.1:11434/api/chat");
        assert_eq!(provider.model(), "llama3.2");
        assert_eq!(provider.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Bind then release a port so nothing is listening on it.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/api/chat", port);
        let provider = OllamaProvider::with_url(url, "mistral", DEFAULT_TIMEOUT).unwrap();
        let err = provider
            .complete(&CompletionRequest::single_turn("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::HttpError(_) | LlmError::Timeout(_)));
    }
}
