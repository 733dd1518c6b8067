mod draft;
mod topic;

pub use draft::{DraftError, DraftState, DraftTopic};
pub use topic::{Level, Topic, TopicDraft, TopicError};
