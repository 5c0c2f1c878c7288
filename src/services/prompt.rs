//! Categorization prompt template.

use crate::domain::{Category, EmailRecord, Emotion, RecordError};

/// Builds the categorization prompt for one email.
///
/// Record fields are embedded verbatim. Fails if any embedded field is absent.
pub fn build_prompt(email: &EmailRecord) -> Result<String, RecordError> {
    let subject = email.subject()?;
    let sender_name = email.sender_name()?;
    let sender_address = email.sender_address()?;
    let received = email.received_date_time()?;
    let preview = email.body_preview()?;

    Ok(format!(
        r#"Categorize the following email and analyze its emotion.

Email Subject: {subject}
Sender: {sender_name} ({sender_address})
Received: {received}
Email Preview: {preview}

Provide the result in strict JSON format with exactly two keys from these options:
- "category": {categories}
- "emotion": {emotions}

Example Output:
```json
{{"category": "work", "emotion": "neutral"}}
```
"#,
        categories = vocabulary(Category::ALL.iter().map(Category::as_str)),
        emotions = vocabulary(Emotion::ALL.iter().map(Emotion::as_str)),
    ))
}

fn vocabulary<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}
