use std::sync::Arc;

use dictation_core::{DraftTopic, Level, Topic};
use storage::repository::TopicRepository;

use crate::error::TrainerError;
use crate::lesson::LessonSession;
use crate::library::TopicLibrary;
use crate::speech::Narrator;

/// Everything a front-end needs: the topic library, the running lesson, the
/// custom text being turned into a topic, and speech playback.
///
/// At most one lesson runs at a time. Selecting a topic replaces the current
/// lesson; exiting drops it.
#[derive(Debug)]
pub struct DictationTrainer {
    library: TopicLibrary,
    narrator: Narrator,
    session: Option<LessonSession>,
    draft: Option<DraftTopic>,
}

impl DictationTrainer {
    /// Open the trainer over the shipped built-ins and the given store.
    pub async fn open(topics: Arc<dyn TopicRepository>, narrator: Narrator) -> Self {
        Self::new(TopicLibrary::open(topics).await, narrator)
    }

    #[must_use]
    pub fn new(library: TopicLibrary, narrator: Narrator) -> Self {
        Self {
            library,
            narrator,
            session: None,
            draft: None,
        }
    }

    #[must_use]
    pub fn library(&self) -> &[Topic] {
        self.library.library()
    }

    #[must_use]
    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn narrator_mut(&mut self) -> &mut Narrator {
        &mut self.narrator
    }

    //
    // ─── LESSONS ───────────────────────────────────────────────────────────────
    //

    /// Start a lesson on the topic at `index`, replacing any running lesson.
    ///
    /// # Errors
    ///
    /// Returns `TrainerError::Library` for an unknown index, or
    /// `TrainerError::Session` if the topic text is too short to practice.
    pub fn select_topic(&mut self, index: usize) -> Result<&mut LessonSession, TrainerError> {
        let topic = self.library.topic(index)?;
        tracing::info!(index, title = topic.title(), "topic selected");
        let session = LessonSession::start(topic.text(), topic.level().clone())?;
        Ok(self.begin_lesson(session))
    }

    #[must_use]
    pub fn session(&self) -> Option<&LessonSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut LessonSession> {
        self.session.as_mut()
    }

    /// Speak the current sentence. Returns false if no lesson is running.
    pub fn play_current(&self) -> bool {
        match &self.session {
            Some(session) if !session.is_finished() => {
                self.narrator.speak(session.current_sentence());
                true
            }
            _ => false,
        }
    }

    /// Stop playback and drop the running lesson.
    pub fn exit_session(&mut self) {
        self.narrator.stop();
        if self.session.take().is_some() {
            tracing::debug!("lesson closed");
        }
    }

    /// Confirm the end of the lesson and return to the library. Returns
    /// false, leaving the lesson running, unless it is on its last sentence.
    pub fn finish_session(&mut self) -> bool {
        let finished = self
            .session
            .as_mut()
            .is_some_and(LessonSession::confirm_finish);
        if finished {
            self.exit_session();
        }
        finished
    }

    fn begin_lesson(&mut self, session: LessonSession) -> &mut LessonSession {
        self.narrator.stop();
        self.session.insert(session)
    }

    //
    // ─── CUSTOM TOPICS ─────────────────────────────────────────────────────────
    //

    /// Hold pasted text while the learner picks a title and level.
    ///
    /// # Errors
    ///
    /// Returns `TrainerError::Draft` if the text is too short.
    pub fn begin_custom_topic(&mut self, text: impl Into<String>) -> Result<&DraftTopic, TrainerError> {
        let draft = DraftTopic::begin(text)?;
        Ok(&*self.draft.insert(draft))
    }

    #[must_use]
    pub fn draft(&self) -> Option<&DraftTopic> {
        self.draft.as_ref()
    }

    /// Save the pending text as a topic and start a lesson on it.
    ///
    /// Returns the new topic's library index. On any error the draft stays
    /// pending so the learner can fix the input.
    ///
    /// # Errors
    ///
    /// Returns `TrainerError::NoDraft` without pending text,
    /// `TrainerError::Draft` for an empty title, or `TrainerError::Library`
    /// if saving fails.
    pub async fn save_draft(&mut self, title: &str, level: Level) -> Result<usize, TrainerError> {
        let mut pending = self.draft.clone().ok_or(TrainerError::NoDraft)?;
        let topic = pending.confirm(title, level)?;
        let index = self.library.add_draft(topic).await?;
        self.draft = None;
        self.select_topic(index)?;
        Ok(index)
    }

    /// Start a lesson on the pending text without saving it.
    ///
    /// # Errors
    ///
    /// Returns `TrainerError::NoDraft` without pending text.
    pub fn practice_draft(&mut self) -> Result<&mut LessonSession, TrainerError> {
        let draft = self.draft.as_ref().ok_or(TrainerError::NoDraft)?;
        let session = LessonSession::start(draft.text(), Level::custom())?;
        self.draft = None;
        Ok(self.begin_lesson(session))
    }

    /// Drop the pending text.
    pub fn cancel_draft(&mut self) {
        if let Some(mut draft) = self.draft.take() {
            draft.cancel();
            tracing::debug!(state = ?draft.state(), "custom topic discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LibraryError, SessionError};
    use crate::lesson::Advance;
    use crate::speech::testing::{Call, RecordingSynthesizer};
    use dictation_core::{DraftError, TopicError, builtin_topics};
    use storage::repository::Storage;

    async fn trainer() -> (DictationTrainer, Arc<RecordingSynthesizer>, Storage) {
        let storage = Storage::in_memory();
        let recorder = Arc::new(RecordingSynthesizer::default());
        let trainer =
            DictationTrainer::open(storage.topics.clone(), Narrator::new(recorder.clone())).await;
        (trainer, recorder, storage)
    }

    #[tokio::test]
    async fn select_topic_starts_lesson() {
        let (mut trainer, _, _) = trainer().await;
        let session = trainer.select_topic(0).unwrap();
        assert_eq!(session.level().as_str(), "C1");
        assert_eq!(session.sentences().len(), 3);
        assert_eq!(
            session.current_sentence(),
            "Der Klimawandel ist eine der größten Herausforderungen unserer Zeit."
        );
    }

    #[tokio::test]
    async fn select_unknown_topic_fails() {
        let (mut trainer, _, _) = trainer().await;
        let err = trainer.select_topic(99).unwrap_err();
        assert!(matches!(
            err,
            TrainerError::Library(LibraryError::NoSuchTopic { index: 99, .. })
        ));
        assert!(trainer.session().is_none());
    }

    #[tokio::test]
    async fn play_speaks_current_sentence_after_cancelling() {
        let (mut trainer, recorder, _) = trainer().await;
        assert!(!trainer.play_current());

        trainer.select_topic(2).unwrap();
        assert!(trainer.play_current());

        let calls = recorder.calls();
        let last_two = &calls[calls.len() - 2..];
        assert_eq!(last_two[0], Call::Cancel);
        assert!(matches!(
            &last_two[1],
            Call::Speak(u) if u.text == "Die Inflation hat in den letzten Monaten stark zugenommen."
        ));
    }

    #[tokio::test]
    async fn exit_stops_playback_and_drops_lesson() {
        let (mut trainer, recorder, _) = trainer().await;
        trainer.select_topic(0).unwrap();
        trainer.play_current();
        trainer.exit_session();

        assert!(trainer.session().is_none());
        assert_eq!(recorder.calls().last(), Some(&Call::Cancel));
        assert!(!trainer.play_current());
    }

    #[tokio::test]
    async fn finish_requires_last_sentence() {
        let (mut trainer, _, _) = trainer().await;
        trainer.select_topic(1).unwrap();
        assert!(!trainer.finish_session());
        assert!(trainer.session().is_some());

        let session = trainer.session_mut().unwrap();
        session.next();
        session.next();
        assert_eq!(session.next(), Advance::FinishPending);
        assert!(trainer.finish_session());
        assert!(trainer.session().is_none());
    }

    #[tokio::test]
    async fn save_draft_persists_and_opens_new_topic() {
        let (mut trainer, _, storage) = trainer().await;
        trainer.begin_custom_topic("Ich lerne Deutsch. Es macht Spaß!").unwrap();

        let index = trainer.save_draft("Mein Text", Level::parse("B1")).await.unwrap();
        assert_eq!(index, builtin_topics().len());
        assert_eq!(trainer.library()[index].title(), "Mein Text");
        assert!(trainer.draft().is_none());

        let session = trainer.session().unwrap();
        assert_eq!(session.sentences(), ["Ich lerne Deutsch.", "Es macht Spaß!"]);
        assert_eq!(session.level().as_str(), "B1");

        let stored = storage.topics.load_topics().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title(), "Mein Text");
    }

    #[tokio::test]
    async fn save_draft_without_title_keeps_draft() {
        let (mut trainer, _, _) = trainer().await;
        trainer.begin_custom_topic("Ich lerne Deutsch.").unwrap();

        let err = trainer.save_draft("  ", Level::custom()).await.unwrap_err();
        assert!(matches!(
            err,
            TrainerError::Draft(DraftError::Topic(TopicError::EmptyTitle))
        ));
        assert!(trainer.draft().is_some_and(DraftTopic::is_collecting));
        assert_eq!(trainer.library().len(), builtin_topics().len());
    }

    #[tokio::test]
    async fn short_custom_text_is_rejected() {
        let (mut trainer, _, _) = trainer().await;
        let err = trainer.begin_custom_topic(" abc ").unwrap_err();
        assert!(matches!(err, TrainerError::Draft(DraftError::TextTooShort)));
        assert!(trainer.draft().is_none());
    }

    #[tokio::test]
    async fn save_without_draft_fails() {
        let (mut trainer, _, _) = trainer().await;
        let err = trainer.save_draft("Titel", Level::custom()).await.unwrap_err();
        assert!(matches!(err, TrainerError::NoDraft));
    }

    #[tokio::test]
    async fn practice_draft_skips_saving() {
        let (mut trainer, _, storage) = trainer().await;
        trainer.begin_custom_topic("Nur zum Üben. Nicht speichern.").unwrap();

        let session = trainer.practice_draft().unwrap();
        assert!(session.level().is_custom());
        assert_eq!(session.sentences().len(), 2);
        assert!(trainer.draft().is_none());
        assert!(storage.topics.load_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_draft_clears_pending_text() {
        let (mut trainer, _, _) = trainer().await;
        trainer.begin_custom_topic("Etwas Text.").unwrap();
        trainer.cancel_draft();
        assert!(trainer.draft().is_none());
        assert!(matches!(trainer.practice_draft(), Err(TrainerError::NoDraft)));
    }

    #[tokio::test]
    async fn evaluation_flows_through_session() {
        let (mut trainer, _, _) = trainer().await;
        trainer.begin_custom_topic("Hallo. Wie geht es dir?").unwrap();
        trainer.practice_draft().unwrap();

        let session = trainer.session_mut().unwrap();
        assert!(session.evaluate("Hallo.").unwrap().correct);
        assert_eq!(
            session.evaluate("Hallo.").unwrap_err(),
            SessionError::AlreadyEvaluated
        );
    }
}
