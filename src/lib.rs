//! triage - Batch email categorization with a local LLM
//!
//! Reads a JSON export of emails, asks a chat-completion endpoint to label
//! each one with a category and an emotion, and writes the labels to a JSON
//! results file. Per-email failures never stop the batch; they fall back to
//! the `"unknown"` classification.

pub mod app;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;

pub use app::{App, AppError, RunSummary};
