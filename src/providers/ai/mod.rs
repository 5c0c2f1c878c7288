//! AI/LLM provider implementations.
//!
//! Providers implement [`LlmProvider`]; the classifier only depends on the
//! trait, so a local Ollama server and a test stub are interchangeable.
//!
//! # Example
//!
//! ```rust,no_run
//! use triage::providers::ai::{CompletionRequest, LlmProvider, OllamaProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ollama = OllamaProvider::new("mistral")?;
//! let response = ollama
//!     .complete(&CompletionRequest::single_turn("Hello!"))
//!     .await?;
//! println!("Response: {}", response.text);
//! # Ok(())
//! # }
//! ```

mod ollama;
mod traits;

pub use ollama::OllamaProvider;
pub use traits::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, LlmResult, Message, Role,
};
