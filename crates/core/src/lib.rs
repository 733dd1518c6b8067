#![forbid(unsafe_code)]

pub mod builtin;
pub mod model;
pub mod segment;

pub use builtin::builtin_topics;
pub use model::{DraftError, DraftState, DraftTopic, Level, Topic, TopicDraft, TopicError};
pub use segment::{MIN_PASSAGE_CHARS, is_practicable, segment};
