use std::fmt;

use dictation_core::{Level, is_practicable, segment};

use super::progress::LessonProgress;
use crate::error::SessionError;

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

/// Outcome of checking the learner's transcription against a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: bool,
    pub expected: String,
    pub actual: String,
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

/// Where the lesson is for the current sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonState {
    /// Sentence shown, waiting for input.
    Ready,
    /// Input checked; the result stays until the cursor moves.
    Evaluated(Evaluation),
    /// Learner confirmed the end of the lesson.
    Finished,
}

impl fmt::Display for LessonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonState::Ready => write!(f, "Ready"),
            LessonState::Evaluated(_) => write!(f, "Evaluated"),
            LessonState::Finished => write!(f, "Finished"),
        }
    }
}

/// Result of asking for the next sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to `cursor`.
    Moved { cursor: usize },
    /// Already on the last sentence; call [`LessonSession::confirm_finish`]
    /// to end the lesson. Nothing changed.
    FinishPending,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Steps a learner through the sentences of one passage.
///
/// Each sentence is checked at most once per visit; moving away and back
/// resets it to `Ready`.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSession {
    sentences: Vec<String>,
    cursor: usize,
    level: Level,
    state: LessonState,
}

impl LessonSession {
    /// Segment `text` and position the lesson on the first sentence.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::TextTooShort` if the trimmed text has fewer than
    /// five characters.
    pub fn start(text: &str, level: Level) -> Result<Self, SessionError> {
        if !is_practicable(text) {
            return Err(SessionError::TextTooShort);
        }
        let sentences = segment(text);
        if sentences.is_empty() {
            return Err(SessionError::TextTooShort);
        }

        tracing::debug!(sentences = sentences.len(), level = %level, "lesson started");
        Ok(Self {
            sentences,
            cursor: 0,
            level,
            state: LessonState::Ready,
        })
    }

    #[must_use]
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn state(&self) -> &LessonState {
        &self.state
    }

    #[must_use]
    pub fn current_sentence(&self) -> &str {
        &self.sentences[self.cursor]
    }

    /// The result shown for the current sentence, if it was checked.
    #[must_use]
    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        match &self.state {
            LessonState::Evaluated(evaluation) => Some(evaluation),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == LessonState::Finished
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.sentences.len()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    /// Compare `input` with the current sentence.
    ///
    /// Both sides are trimmed, then compared exactly: case, inner whitespace
    /// and punctuation all count.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyEvaluated` if this sentence was already
    /// checked during the current visit, or `SessionError::Finished` once the
    /// lesson is over.
    pub fn evaluate(&mut self, input: &str) -> Result<Evaluation, SessionError> {
        match self.state {
            LessonState::Ready => {}
            LessonState::Evaluated(_) => return Err(SessionError::AlreadyEvaluated),
            LessonState::Finished => return Err(SessionError::Finished),
        }

        let expected = self.current_sentence().trim().to_owned();
        let actual = input.trim().to_owned();
        let evaluation = Evaluation {
            correct: expected == actual,
            expected,
            actual,
        };

        tracing::debug!(
            cursor = self.cursor,
            correct = evaluation.correct,
            "sentence evaluated"
        );
        self.state = LessonState::Evaluated(evaluation.clone());
        Ok(evaluation)
    }

    /// Move to the previous sentence. Returns false at the first sentence or
    /// after the lesson finished.
    pub fn prev(&mut self) -> bool {
        if self.is_finished() || self.cursor == 0 {
            return false;
        }
        self.move_to(self.cursor - 1);
        true
    }

    /// Move to the next sentence, or report that the lesson can be finished.
    pub fn next(&mut self) -> Advance {
        if self.is_finished() || self.is_last() {
            return Advance::FinishPending;
        }
        self.move_to(self.cursor + 1);
        Advance::Moved {
            cursor: self.cursor,
        }
    }

    /// End the lesson after the learner confirmed it. Only has an effect on
    /// the last sentence; returns whether the lesson is now finished.
    pub fn confirm_finish(&mut self) -> bool {
        if self.is_last() && !self.is_finished() {
            tracing::debug!(from = %self.state, "lesson finished");
            self.state = LessonState::Finished;
        }
        self.is_finished()
    }

    /// Share of the lesson covered: `cursor / (len - 1)`, or `1.0` for a
    /// single-sentence lesson.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        let last = self.sentences.len().saturating_sub(1);
        if last == 0 {
            return 1.0;
        }
        self.cursor as f64 / last as f64
    }

    #[must_use]
    pub fn progress(&self) -> LessonProgress {
        LessonProgress {
            position: self.cursor + 1,
            total: self.sentences.len(),
            fraction: self.progress_fraction(),
            is_last: self.is_last(),
            can_go_back: self.can_go_back(),
            is_finished: self.is_finished(),
        }
    }

    fn move_to(&mut self, cursor: usize) {
        tracing::debug!(from = self.cursor, to = cursor, "cursor moved");
        self.cursor = cursor;
        self.state = LessonState::Ready;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
