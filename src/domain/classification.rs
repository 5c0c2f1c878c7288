//! Classification vocabulary and result types.

use serde::{Deserialize, Serialize};

/// Value substituted for any classification field that could not be obtained.
pub const SENTINEL: &str = "unknown";

/// Email categories the model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Job-related correspondence.
    Work,
    /// Friends, family, private matters.
    Personal,
    /// Unsolicited bulk mail.
    Spam,
    /// Subscriptions and mailing lists.
    Newsletter,
    /// Automated system messages.
    Notification,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Spam,
        Category::Newsletter,
        Category::Notification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Spam => "spam",
            Category::Newsletter => "newsletter",
            Category::Notification => "notification",
        }
    }

    /// Looks up a category by its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Emotional tone the model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Neutral,
    Urgent,
    Frustrated,
    Excited,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Urgent,
        Emotion::Frustrated,
        Emotion::Excited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
            Emotion::Urgent => "urgent",
            Emotion::Frustrated => "frustrated",
            Emotion::Excited => "excited",
        }
    }

    /// Looks up an emotion by its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == s)
    }
}

/// Category and emotion as reported by the model.
///
/// Values are kept as free text: the model's wording passes through even when
/// it falls outside [`Category::ALL`] or [`Emotion::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub emotion: String,
}

impl Classification {
    pub fn new(category: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            emotion: emotion.into(),
        }
    }

    /// The fallback pair used whenever classification fails.
    pub fn unknown() -> Self {
        Self::new(SENTINEL, SENTINEL)
    }

    /// Whether both values belong to the closed vocabularies.
    pub fn is_in_vocabulary(&self) -> bool {
        Category::parse(&self.category).is_some() && Emotion::parse(&self.emotion).is_some()
    }
}

/// Per-email output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedEmail {
    pub id: String,
    pub subject: String,
    /// Sender email address.
    pub sender: String,
    pub category: String,
    pub emotion: String,
}

impl AnalyzedEmail {
    /// Joins the record projection with its classification.
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        sender: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            sender: sender.into(),
            category: classification.category,
            emotion: classification.emotion,
        }
    }
}
