//! Domain layer types for the triage classifier.
//!
//! Input email records, the classification vocabulary, and the per-email
//! output rows.

mod classification;
mod email;

pub use classification::{AnalyzedEmail, Category, Classification, Emotion, SENTINEL};
pub use email::{EmailAddress, EmailRecord, RecordError, Sender};
