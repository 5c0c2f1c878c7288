//! Analysis service for classifying emails one at a time.
//!
//! Each email goes through prompt → provider → reply validation. Every failure
//! along the way is logged and replaced with the sentinel classification, so
//! callers always get exactly one [`AnalyzedEmail`] per input record.

use thiserror::Error;

use crate::config::ReplyParsing;
use crate::domain::{AnalyzedEmail, Classification, EmailRecord, RecordError};
use crate::providers::ai::{CompletionRequest, LlmError, LlmProvider};

use super::prompt::build_prompt;
use super::reply_validator::{validate_reply, ReplyError};

/// Reasons one email could not be classified.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("incomplete email: {0}")]
    Record(#[from] RecordError),

    #[error("provider error: {0}")]
    Provider(#[from] LlmError),

    #[error("unusable model reply: {0}")]
    Reply(#[from] ReplyError),
}

/// Counters for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Emails processed.
    pub total: usize,
    /// Emails with a classification from the model.
    pub classified: usize,
    /// Emails that fell back to the sentinel.
    pub fallback: usize,
    /// Classified emails whose values are outside the prompt vocabulary.
    pub out_of_vocabulary: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: &Result<Classification, AnalysisError>) {
        self.total += 1;
        match outcome {
            Ok(classification) => {
                self.classified += 1;
                if !classification.is_in_vocabulary() {
                    self.out_of_vocabulary += 1;
                }
            }
            Err(_) => self.fallback += 1,
        }
    }
}

/// Service classifying emails against a chat provider.
pub struct AnalysisService<P: LlmProvider> {
    provider: P,
    reply_parsing: ReplyParsing,
}

impl<P: LlmProvider> AnalysisService<P> {
    /// Creates a new analysis service.
    pub fn new(provider: P, reply_parsing: ReplyParsing) -> Self {
        Self {
            provider,
            reply_parsing,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Classifies one email.
    ///
    /// A record missing a prompt field never reaches the provider.
    pub async fn classify(&self, email: &EmailRecord) -> Result<Classification, AnalysisError> {
        let email_id = email.id.as_deref().unwrap_or("<missing id>");
        let prompt = build_prompt(email)?;

        let response = self
            .provider
            .complete(&CompletionRequest::single_turn(prompt))
            .await?;
        tracing::debug!(
            email_id,
            model = response.model.as_deref().unwrap_or(self.provider.model()),
            eval_count = response.eval_count,
            "Received classification reply"
        );

        let classification = match validate_reply(&response.text, self.reply_parsing) {
            Ok(classification) => classification,
            Err(e) => {
                tracing::debug!(email_id, raw = %response.text, "Rejected model reply");
                return Err(e.into());
            }
        };
        if !classification.is_in_vocabulary() {
            tracing::warn!(
                email_id,
                category = %classification.category,
                emotion = %classification.emotion,
                "Model answered outside the requested vocabulary"
            );
        }
        Ok(classification)
    }

    /// Classifies one email and joins the result with its projection,
    /// substituting the sentinel when classification fails.
    pub async fn analyze_email(&self, email: &EmailRecord) -> AnalyzedEmail {
        self.analyze_with_outcome(email).await.0
    }

    async fn analyze_with_outcome(
        &self,
        email: &EmailRecord,
    ) -> (AnalyzedEmail, Result<Classification, AnalysisError>) {
        let outcome = self.classify(email).await;
        let classification = match &outcome {
            Ok(classification) => classification.clone(),
            Err(e) => {
                tracing::warn!(
                    email_id = email.id.as_deref().unwrap_or("<missing id>"),
                    error = %e,
                    "Error analyzing email"
                );
                Classification::unknown()
            }
        };

        let row = AnalyzedEmail::new(
            email.id().unwrap_or_default(),
            email.subject().unwrap_or_default(),
            email.sender_address().unwrap_or_default(),
            classification,
        );
        (row, outcome)
    }

    /// Classifies all emails sequentially, in input order.
    ///
    /// `on_result` sees each row as soon as it is produced.
    pub async fn analyze_all<F>(
        &self,
        emails: &[EmailRecord],
        mut on_result: F,
    ) -> (Vec<AnalyzedEmail>, BatchStats)
    where
        F: FnMut(&AnalyzedEmail),
    {
        let mut results = Vec::with_capacity(emails.len());
        let mut stats = BatchStats::default();

        for email in emails {
            let (analyzed, outcome) = self.analyze_with_outcome(email).await;
            stats.record(&outcome);
            on_result(&analyzed);
            results.push(analyzed);
        }

        (results, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmailAddress, Sender};
    use crate::providers::ai::{CompletionResponse, LlmResult};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::time::Duration;

    enum StubReply {
        Text(&'static str),
        Timeout,
        Status(u16),
    }

    struct StubProvider {
        reply: StubReply,
        prompts: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn new(reply: StubReply) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
            self.prompts
                .lock()
                .unwrap()
                .push(request.messages[0].content.clone());

            match self.reply {
                StubReply::Text(text) => Ok(CompletionResponse::from_text(text)),
                StubReply::Timeout => Err(LlmError::Timeout(Duration::from_secs(30))),
                StubReply::Status(status) => Err(LlmError::ApiError {
                    status,
                    message: format!("HTTP {}", status),
                }),
            }
        }
    }

    fn email(id: &str, subject: &str) -> EmailRecord {
        EmailRecord {
            id: Some(id.to_string()),
            subject: Some(subject.to_string()),
            sender: Some(Sender {
                email_address: Some(EmailAddress {
                    name: Some("Bob".to_string()),
                    address: Some("bob@x.com".to_string()),
                }),
            }),
            received_date_time: Some("2024-01-01T00:00:00Z".to_string()),
            body_preview: Some("Let's meet".to_string()),
        }
    }

    fn service(reply: StubReply) -> AnalysisService<StubProvider> {
        AnalysisService::new(StubProvider::new(reply), ReplyParsing::Strict)
    }

    fn assert_unknown(row: &AnalyzedEmail) {
        assert_eq!(
            (row.category.as_str(), row.emotion.as_str()),
            ("unknown", "unknown")
        );
    }

    #[tokio::test]
    async fn successful_reply_is_joined_with_projection() {
        let service = service(StubReply::Text(r#"{"category":"work","emotion":"neutral"}"#));

        let row = service.analyze_email(&email("1", "Meeting")).await;
        assert_eq!(
            row,
            AnalyzedEmail::new("1", "Meeting", "bob@x.com", Classification::new("work", "neutral"))
        );
        assert!(service.provider().prompts.lock().unwrap()[0].contains("Email Subject: Meeting"));
    }

    #[tokio::test]
    async fn timeout_falls_back_to_unknown() {
        let service = service(StubReply::Timeout);
        let row = service.analyze_email(&email("1", "Meeting")).await;
        assert_unknown(&row);
        assert_eq!(row.id, "1");
        assert!(matches!(
            service.classify(&email("1", "Meeting")).await,
            Err(AnalysisError::Provider(LlmError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn error_status_falls_back_to_unknown() {
        let service = service(StubReply::Status(500));
        let row = service.analyze_email(&email("1", "Meeting")).await;
        assert_unknown(&row);
    }

    #[tokio::test]
    async fn malformed_reply_falls_back_to_unknown() {
        let service = service(StubReply::Text("I think this is a work email."));
        let row = service.analyze_email(&email("1", "Meeting")).await;
        assert_unknown(&row);
        assert!(matches!(
            service.classify(&email("1", "Meeting")).await,
            Err(AnalysisError::Reply(ReplyError::InvalidJson(_)))
        ));
    }

    #[tokio::test]
    async fn incomplete_record_skips_the_request() {
        let service = service(StubReply::Text(r#"{"category":"work","emotion":"neutral"}"#));
        let mut record = email("7", "No preview");
        record.body_preview = None;

        let row = service.analyze_email(&record).await;
        assert_eq!(row.id, "7");
        assert_eq!(row.sender, "bob@x.com");
        assert_unknown(&row);
        assert_eq!(service.provider().calls(), 0);
        assert!(matches!(
            service.classify(&record).await,
            Err(AnalysisError::Record(RecordError::MissingField("bodyPreview")))
        ));
    }

    #[tokio::test]
    async fn wrongly_typed_sender_keeps_id_and_subject() {
        let service = service(StubReply::Text(r#"{"category":"work","emotion":"neutral"}"#));
        let record: EmailRecord = serde_json::from_str(
            r#"{
                "id": "1",
                "subject": "Meeting",
                "sender": "bob@x.com",
                "receivedDateTime": "2024-01-01T00:00:00Z",
                "bodyPreview": "Let's meet"
            }"#,
        )
        .unwrap();

        let row = service.analyze_email(&record).await;
        assert_eq!(
            row,
            AnalyzedEmail::new("1", "Meeting", "", Classification::unknown())
        );
        assert_eq!(service.provider().calls(), 0);
    }

    #[tokio::test]
    async fn empty_record_yields_empty_projection() {
        let service = service(StubReply::Timeout);
        let row = service.analyze_email(&EmailRecord::default()).await;
        assert_eq!(
            row,
            AnalyzedEmail::new("", "", "", Classification::unknown())
        );
    }

    #[tokio::test]
    async fn analyze_all_preserves_order_and_reports_progress() {
        let service = service(StubReply::Text(r#"{"category":"finance","emotion":"calm"}"#));
        let emails = vec![email("a", "A"), email("b", "B"), email("c", "C")];

        let mut seen = Vec::new();
        let (results, stats) = service
            .analyze_all(&emails, |row| seen.push(row.id.clone()))
            .await;

        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(results[0].category, "finance");
        assert_eq!(
            stats,
            BatchStats {
                total: 3,
                classified: 3,
                fallback: 0,
                out_of_vocabulary: 3,
            }
        );
        assert_eq!(service.provider().calls(), 3);
    }

    #[tokio::test]
    async fn stats_count_fallbacks() {
        let service = service(StubReply::Timeout);
        let (_, stats) = service
            .analyze_all(&[email("a", "A"), EmailRecord::default()], |_| {})
            .await;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.fallback, 2);
        assert_eq!(stats.classified, 0);
        assert_eq!(service.provider().calls(), 1);
    }

    #[tokio::test]
    async fn literal_unknown_reply_counts_as_classified() {
        let service = service(StubReply::Text(r#"{"category":"unknown","emotion":"unknown"}"#));
        let (results, stats) = service.analyze_all(&[email("a", "A")], |_| {}).await;

        assert_unknown(&results[0]);
        assert_eq!(
            stats,
            BatchStats {
                total: 1,
                classified: 1,
                fallback: 0,
                out_of_vocabulary: 1,
            }
        );
    }
}
