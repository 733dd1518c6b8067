use std::fmt;
use std::sync::Arc;

use dictation_core::{Level, Topic, TopicDraft, builtin_topics};
use storage::repository::{StorageError, TopicRepository};

use crate::error::LibraryError;

/// Merges the built-in topics with the learner's saved topics.
///
/// Index addressing follows the merged order: built-ins first, then saved
/// topics in the order they were added. The merged list is rebuilt from
/// storage after every change so indexes stay consistent with what is stored.
#[derive(Clone)]
pub struct TopicLibrary {
    builtins: Vec<Topic>,
    topics: Arc<dyn TopicRepository>,
    library: Vec<Topic>,
}

impl TopicLibrary {
    /// Build a library over the shipped built-in topics.
    pub async fn open(topics: Arc<dyn TopicRepository>) -> Self {
        Self::with_builtins(builtin_topics(), topics).await
    }

    /// Build a library over a custom built-in set.
    pub async fn with_builtins(builtins: Vec<Topic>, topics: Arc<dyn TopicRepository>) -> Self {
        let mut library = Self {
            builtins,
            topics,
            library: Vec::new(),
        };
        library.refresh().await;
        library
    }

    /// Read the saved topics.
    ///
    /// Missing or malformed storage yields an empty list; the failure is
    /// logged and never returned.
    pub async fn load_user_topics(&self) -> Vec<Topic> {
        match self.topics.load_topics().await {
            Ok(topics) => topics,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable user topics");
                Vec::new()
            }
        }
    }

    /// Overwrite the saved topics with `topics`.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Storage` if the collection cannot be written.
    pub async fn save_user_topics(&self, topics: &[Topic]) -> Result<(), LibraryError> {
        self.topics.save_topics(topics).await?;
        Ok(())
    }

    /// Built-ins followed by the saved topics, read fresh from storage.
    pub async fn build_library(&self) -> Vec<Topic> {
        let mut library = self.builtins.clone();
        library.extend(self.load_user_topics().await);
        library
    }

    /// Rebuild the merged list and return it.
    pub async fn refresh(&mut self) -> &[Topic] {
        self.library = self.build_library().await;
        &self.library
    }

    /// The merged list as of the last rebuild.
    #[must_use]
    pub fn library(&self) -> &[Topic] {
        &self.library
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.library.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.library.is_empty()
    }

    /// Look up a topic by its merged index.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NoSuchTopic` if `index` is out of range.
    pub fn topic(&self, index: usize) -> Result<&Topic, LibraryError> {
        self.library.get(index).ok_or(LibraryError::NoSuchTopic {
            index,
            len: self.library.len(),
        })
    }

    /// Validate, append and persist a new topic.
    ///
    /// Returns the topic's index in the rebuilt library, which is always the
    /// last one.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Topic` if the title or text is empty, or
    /// `LibraryError::Storage` if the saved topics cannot be read or written.
    /// Nothing is stored on error.
    pub async fn add_topic(
        &mut self,
        title: &str,
        level: Level,
        text: &str,
    ) -> Result<usize, LibraryError> {
        self.add_draft(TopicDraft::new(title, level, text)).await
    }

    /// Same as [`TopicLibrary::add_topic`], taking an already collected draft.
    ///
    /// # Errors
    ///
    /// See [`TopicLibrary::add_topic`].
    pub async fn add_draft(&mut self, draft: TopicDraft) -> Result<usize, LibraryError> {
        let topic = draft.validate()?;

        let mut users = self.stored_topics_for_update().await?;
        tracing::info!(title = topic.title(), level = %topic.level(), "saving topic");
        users.push(topic);
        self.save_user_topics(&users).await?;

        let library = self.refresh().await;
        Ok(library.len().saturating_sub(1))
    }

    /// Read the saved topics before appending to them. A malformed collection
    /// is replaced; a failed read aborts so nothing stored is overwritten.
    async fn stored_topics_for_update(&self) -> Result<Vec<Topic>, LibraryError> {
        match self.topics.load_topics().await {
            Ok(topics) => Ok(topics),
            Err(StorageError::Serialization(err)) => {
                tracing::warn!(error = %err, "replacing unreadable user topics");
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl fmt::Debug for TopicLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicLibrary")
            .field("builtins_len", &self.builtins.len())
            .field("library_len", &self.library.len())
            .finish_non_exhaustive()
    }
}
