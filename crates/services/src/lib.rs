#![forbid(unsafe_code)]

pub mod error;
pub mod lesson;
pub mod library;
pub mod speech;
pub mod trainer;

pub use error::{LibraryError, SessionError, SpeechError, TrainerError};
pub use lesson::{Advance, Evaluation, LessonProgress, LessonSession, LessonState};
pub use library::TopicLibrary;
pub use speech::{Narrator, SilentSynthesizer, SpeechRate, SpeechSynthesizer, Utterance};
pub use trainer::DictationTrainer;
