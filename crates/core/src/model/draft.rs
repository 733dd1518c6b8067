use thiserror::Error;

use crate::model::topic::{Level, TopicDraft, TopicError};
use crate::segment::{MIN_PASSAGE_CHARS, is_practicable};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DraftError {
    #[error("text must be at least {} characters long", MIN_PASSAGE_CHARS)]
    TextTooShort,

    #[error("draft is no longer collecting input")]
    Closed,

    #[error(transparent)]
    Topic(#[from] TopicError),
}

/// Lifecycle of a [`DraftTopic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftState {
    /// Text accepted; waiting for a title and level.
    Collecting,
    /// Title and level accepted; the topic is ready to be saved.
    Confirmed,
    /// The learner abandoned the draft.
    Cancelled,
}

/// Two-step workflow for turning pasted text into a saved topic.
///
/// The pasted text is checked when the draft begins. Title and level are
/// collected afterwards; a failed confirmation leaves the draft collecting so
/// the learner can correct the input and try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTopic {
    text: String,
    state: DraftState,
}

impl DraftTopic {
    /// Start a draft from pasted text.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::TextTooShort` if the trimmed text has fewer than
    /// [`MIN_PASSAGE_CHARS`] characters.
    pub fn begin(text: impl Into<String>) -> Result<Self, DraftError> {
        let text = text.into();
        if !is_practicable(&text) {
            return Err(DraftError::TextTooShort);
        }
        Ok(Self {
            text,
            state: DraftState::Collecting,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn state(&self) -> DraftState {
        self.state
    }

    #[must_use]
    pub fn is_collecting(&self) -> bool {
        self.state == DraftState::Collecting
    }

    /// Accept a title and level and produce the topic to save.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::Closed` if the draft was already confirmed or
    /// cancelled, or `DraftError::Topic` if the title or text is empty. On a
    /// validation failure the draft keeps collecting.
    pub fn confirm(&mut self, title: &str, level: Level) -> Result<TopicDraft, DraftError> {
        if !self.is_collecting() {
            return Err(DraftError::Closed);
        }
        if self.text.trim().is_empty() {
            return Err(TopicError::EmptyText.into());
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(TopicError::EmptyTitle.into());
        }

        self.state = DraftState::Confirmed;
        Ok(TopicDraft::new(title, level, self.text.clone()))
    }

    /// Abandon the draft. Has no effect once confirmed.
    pub fn cancel(&mut self) {
        if self.is_collecting() {
            self.state = DraftState::Cancelled;
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
