//! Batch run lifecycle: load, analyze, persist.

use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Settings;
use crate::providers::ai::{LlmError, LlmProvider, OllamaProvider};
use crate::services::{load_emails, write_results, AnalysisService, BatchStats, ConsoleReporter, WriteError};

/// Conditions that end a run early.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no emails to analyze in {}", .0.display())]
    NoEmails(PathBuf),

    #[error("failed to set up inference client: {0}")]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub stats: BatchStats,
}

/// Main application entry point
pub struct App {
    settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs the batch against the configured Ollama endpoint, echoing to stdout.
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        let provider = OllamaProvider::from_settings(&self.settings.ai)?;
        tracing::info!(
            provider = provider.name(),
            endpoint = provider.endpoint(),
            model = provider.model(),
            "Using inference endpoint"
        );
        self.run_with(provider, &mut ConsoleReporter::stdout()).await
    }

    /// Runs the batch against `provider`, echoing progress to `reporter`.
    pub async fn run_with<P, W>(
        &self,
        provider: P,
        reporter: &mut ConsoleReporter<W>,
    ) -> Result<RunSummary, AppError>
    where
        P: LlmProvider,
        W: Write,
    {
        let emails = load_emails(&self.settings.input_path);
        if emails.is_empty() {
            tracing::error!(path = %self.settings.input_path.display(), "No emails found");
            return Err(AppError::NoEmails(self.settings.input_path.clone()));
        }

        let service = AnalysisService::new(provider, self.settings.ai.reply_parsing);
        let (results, stats) = service
            .analyze_all(&emails, |row| reporter.report(row))
            .await;

        write_results(&self.settings.output_path, &results)?;
        reporter.complete(&self.settings.output_path);

        tracing::info!(
            total = stats.total,
            classified = stats.classified,
            fallback = stats.fallback,
            out_of_vocabulary = stats.out_of_vocabulary,
            "Analysis complete"
        );

        Ok(RunSummary {
            output_path: self.settings.output_path.clone(),
            stats,
        })
    }
}
