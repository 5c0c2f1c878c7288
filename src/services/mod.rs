//! Business services layer.
//!
//! The batch pipeline is assembled from these pieces:
//!
//! ```text
//! email_loader -> prompt -> (providers::ai) -> reply_validator -> result_writer
//!                 \_____________ analysis_service ___________/
//! ```
//!
//! # Services Overview
//!
//! - [`load_emails`]: Reads the input document and resolves the email list
//! - [`build_prompt`]: Renders the categorization prompt for one email
//! - [`validate_reply`]: Turns a model reply into a classification
//! - [`AnalysisService`]: Runs the per-email pipeline against a provider
//! - [`write_results`] / [`ConsoleReporter`]: Persist and echo results

mod analysis_service;
mod email_loader;
mod prompt;
mod reply_validator;
mod result_writer;

pub use analysis_service::{AnalysisError, AnalysisService, BatchStats};
pub use email_loader::{load_emails, try_load_emails, LoadError};
pub use prompt::build_prompt;
pub use reply_validator::{validate_reply, ReplyError};
pub use result_writer::{to_pretty_json, write_results, ConsoleReporter, WriteError};
