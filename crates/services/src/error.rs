//! Shared error types for the services crate.

use thiserror::Error;

use dictation_core::{DraftError, MIN_PASSAGE_CHARS, TopicError};
use storage::repository::StorageError;

/// Errors emitted by `TopicLibrary`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error("no topic at index {index} (library has {len})")]
    NoSuchTopic { index: usize, len: usize },
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LessonSession`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("text must be at least {} characters long", MIN_PASSAGE_CHARS)]
    TextTooShort,
    #[error("current sentence was already checked")]
    AlreadyEvaluated,
    #[error("lesson already finished")]
    Finished,
}

/// Errors emitted while configuring speech playback.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("speech rate must be between 0.1 and 10, got {0}")]
    InvalidRate(f32),
}

/// Errors emitted by `DictationTrainer`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrainerError {
    #[error("no custom text is waiting to be saved")]
    NoDraft,
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
