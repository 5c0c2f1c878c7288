//! External service providers.
//!
//! - [`ai`] - chat-completion providers (Ollama)

pub mod ai;
