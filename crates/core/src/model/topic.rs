use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::segment::segment;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic title cannot be empty")]
    EmptyTitle,

    #[error("topic text cannot be empty")]
    EmptyText,
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Difficulty label shown next to a topic, e.g. `A1`..`C1` or `Custom`.
///
/// The label is free-form; a blank label falls back to [`Level::CUSTOM`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Level(String);

impl Level {
    pub const CUSTOM: &'static str = "Custom";

    #[must_use]
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::custom();
        }
        Self(trimmed.to_owned())
    }

    #[must_use]
    pub fn custom() -> Self {
        Self(Self::CUSTOM.to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.0 == Self::CUSTOM
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::custom()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Level {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Level {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.0
    }
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A titled passage used as lesson source material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    title: String,
    level: Level,
    text: String,
}

impl Topic {
    /// Creates a new Topic.
    ///
    /// The title is trimmed; the text is kept as written so segmentation sees
    /// the original passage.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyTitle` or `TopicError::EmptyText` when either
    /// is empty or whitespace-only.
    pub fn new(
        title: impl Into<String>,
        level: Level,
        text: impl Into<String>,
    ) -> Result<Self, TopicError> {
        let title = title.into();
        let text = text.into();
        if title.trim().is_empty() {
            return Err(TopicError::EmptyTitle);
        }
        if text.trim().is_empty() {
            return Err(TopicError::EmptyText);
        }

        Ok(Self {
            title: title.trim().to_owned(),
            level,
            text,
        })
    }

    // Accessors
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of sentences a lesson on this topic will step through.
    #[must_use]
    pub fn sentence_count(&self) -> usize {
        segment(&self.text).len()
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated topic fields as collected from the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDraft {
    pub title: String,
    pub level: Level,
    pub text: String,
}

impl TopicDraft {
    pub fn new(title: impl Into<String>, level: Level, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level,
            text: text.into(),
        }
    }

    /// Validate the draft into a `Topic`.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the title or text is empty.
    pub fn validate(self) -> Result<Topic, TopicError> {
        Topic::new(self.title, self.level, self.text)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
