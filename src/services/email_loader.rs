//! Email loader.
//!
//! Reads one JSON document and resolves the list of emails inside it. Three
//! shapes are accepted, checked in order: `{"value": [...]}` (Graph API
//! export), `{"emails": [...]}`, and a bare top-level array.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::EmailRecord;

/// Object keys probed for the email list, highest priority first.
const LIST_KEYS: [&str; 2] = ["value", "emails"];

/// Errors that can occur while loading emails.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no email list in {path}: expected a `value` or `emails` array, or a top-level array")]
    NoEmailList { path: PathBuf },
}

/// Loads emails from `path`, logging and returning an empty list on failure.
///
/// Whether an empty result is fatal is up to the caller.
pub fn load_emails(path: &Path) -> Vec<EmailRecord> {
    match try_load_emails(path) {
        Ok(emails) => {
            tracing::info!(path = %path.display(), count = emails.len(), "Loaded emails");
            emails
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load emails");
            Vec::new()
        }
    }
}

/// Loads emails from `path`.
pub fn try_load_emails(path: &Path) -> Result<Vec<EmailRecord>, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value = serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let list = resolve_email_list(document).ok_or_else(|| LoadError::NoEmailList {
        path: path.to_path_buf(),
    })?;

    Ok(list
        .into_iter()
        .enumerate()
        .map(|(index, value)| into_record(index, value))
        .collect())
}

/// Picks the email array out of a parsed document.
fn resolve_email_list(document: Value) -> Option<Vec<Value>> {
    match document {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => LIST_KEYS.iter().find_map(|key| match map.remove(*key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}

fn into_record(index: usize, value: Value) -> EmailRecord {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(index, error = %e, "Malformed email record, keeping it as empty");
        EmailRecord::default()
    })
}
