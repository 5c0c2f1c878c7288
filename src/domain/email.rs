//! Email record types.
//!
//! Mirrors the subset of a Microsoft Graph-style message export that the
//! classifier consumes. Every field is optional on the wire; absence only
//! becomes an error when a caller asks for the field. A field with the wrong
//! JSON type is treated as absent without discarding its siblings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised when a required field is absent from a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The named field is missing, null, or of the wrong type.
    #[error("email record is missing field `{0}`")]
    MissingField(&'static str),
}

/// One email as supplied by the input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    /// Opaque identifier assigned by the source mailbox.
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    /// Subject line.
    #[serde(default, deserialize_with = "lenient")]
    pub subject: Option<String>,
    /// Sender envelope.
    #[serde(default, deserialize_with = "lenient")]
    pub sender: Option<Sender>,
    /// Received timestamp, ISO-8601 expected but not validated.
    #[serde(default, deserialize_with = "lenient")]
    pub received_date_time: Option<String>,
    /// Short plain-text preview of the body.
    #[serde(default, deserialize_with = "lenient")]
    pub body_preview: Option<String>,
}

/// Sender wrapper (`sender.emailAddress`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    #[serde(default, deserialize_with = "lenient")]
    pub email_address: Option<EmailAddress>,
}

/// An address with display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<String>,
}

/// Deserializes a field, mapping a value of the wrong shape to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn required<'a>(value: Option<&'a String>, field: &'static str) -> Result<&'a str, RecordError> {
    value
        .map(String::as_str)
        .ok_or(RecordError::MissingField(field))
}

impl EmailRecord {
    /// Returns the record identifier.
    pub fn id(&self) -> Result<&str, RecordError> {
        required(self.id.as_ref(), "id")
    }

    /// Returns the subject line.
    pub fn subject(&self) -> Result<&str, RecordError> {
        required(self.subject.as_ref(), "subject")
    }

    fn email_address(&self) -> Option<&EmailAddress> {
        self.sender.as_ref()?.email_address.as_ref()
    }

    /// Returns the sender's display name.
    pub fn sender_name(&self) -> Result<&str, RecordError> {
        required(
            self.email_address().and_then(|a| a.name.as_ref()),
            "sender.emailAddress.name",
        )
    }

    /// Returns the sender's email address.
    pub fn sender_address(&self) -> Result<&str, RecordError> {
        required(
            self.email_address().and_then(|a| a.address.as_ref()),
            "sender.emailAddress.address",
        )
    }

    /// Returns the received timestamp as supplied.
    pub fn received_date_time(&self) -> Result<&str, RecordError> {
        required(self.received_date_time.as_ref(), "receivedDateTime")
    }

    /// Returns the body preview.
    pub fn body_preview(&self) -> Result<&str, RecordError> {
        required(self.body_preview.as_ref(), "bodyPreview")
    }
}
