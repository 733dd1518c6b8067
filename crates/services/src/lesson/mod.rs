mod progress;
mod session;

pub use progress::LessonProgress;
pub use session::{Advance, Evaluation, LessonSession, LessonState};
