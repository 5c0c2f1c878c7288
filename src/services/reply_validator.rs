//! Model reply validation.
//!
//! Turns the free-text content of a chat reply into a [`Classification`].
//! Only the presence and type of the two keys is checked; the values are not
//! matched against the prompt's vocabulary.

use serde_json::Value;
use thiserror::Error;

use crate::config::ReplyParsing;
use crate::domain::Classification;

const CATEGORY_KEY: &str = "category";
const EMOTION_KEY: &str = "emotion";

/// Reasons a reply could not be turned into a classification.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply is empty")]
    Empty,

    #[error("reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("reply is missing key `{0}`")]
    MissingKey(&'static str),

    #[error("reply key `{0}` is not a string")]
    NotAString(&'static str),
}

/// Validates `raw` and extracts the classification.
pub fn validate_reply(raw: &str, mode: ReplyParsing) -> Result<Classification, ReplyError> {
    let text = match mode {
        ReplyParsing::Strict => raw,
        ReplyParsing::Lenient => outermost_object(raw),
    };
    if text.trim().is_empty() {
        return Err(ReplyError::Empty);
    }

    let parsed: Value = serde_json::from_str(text)?;
    let category = string_field(&parsed, CATEGORY_KEY)?;
    let emotion = string_field(&parsed, EMOTION_KEY)?;

    Ok(Classification::new(category, emotion))
}

fn string_field<'a>(parsed: &'a Value, key: &'static str) -> Result<&'a str, ReplyError> {
    match parsed.get(key) {
        None => Err(ReplyError::MissingKey(key)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ReplyError::NotAString(key)),
    }
}

/// Slice from the first `{` to the last `}`, or the whole input if there is none.
fn outermost_object(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}
