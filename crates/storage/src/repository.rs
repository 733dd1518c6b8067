use async_trait::async_trait;
use dictation_core::{Level, Topic};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the user topic collection is stored.
pub const USER_TOPICS_KEY: &str = "userTopics";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── KEY-VALUE STORE ───────────────────────────────────────────────────────────
//

/// String-keyed store holding whole serialized values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

//
// ─── TOPIC RECORDS ─────────────────────────────────────────────────────────────
//

/// Persisted shape of a user topic.
///
/// `category` is written empty and ignored on read; it is kept so existing
/// collections stay readable. A missing or `null` level reads as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "level_or_custom")]
    pub level: Level,
    pub text: String,
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn level_or_custom<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Level::from)
        .unwrap_or_default())
}

impl TopicRecord {
    #[must_use]
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            title: topic.title().to_owned(),
            category: String::new(),
            level: topic.level().clone(),
            text: topic.text().to_owned(),
        }
    }

    /// Convert the record back into a domain `Topic`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the title or text is empty.
    pub fn into_topic(self) -> Result<Topic, StorageError> {
        Topic::new(self.title, self.level, self.text)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

//
// ─── TOPIC REPOSITORY ──────────────────────────────────────────────────────────
//

/// Repository contract for the user topic collection.
///
/// The collection is read and written as a whole; there is no partial update.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Load every stored topic in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed,
    /// or other storage errors.
    async fn load_topics(&self) -> Result<Vec<Topic>, StorageError>;

    /// Overwrite the stored collection with `topics`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be stored.
    async fn save_topics(&self, topics: &[Topic]) -> Result<(), StorageError>;
}

/// Stores the topic collection as one JSON array under [`USER_TOPICS_KEY`].
#[derive(Clone)]
pub struct KeyValueTopicRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueTopicRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TopicRepository for KeyValueTopicRepository {
    async fn load_topics(&self) -> Result<Vec<Topic>, StorageError> {
        let Some(raw) = self.store.get(USER_TOPICS_KEY).await? else {
            return Ok(Vec::new());
        };

        let records: Vec<TopicRecord> = serde_json::from_str(&raw)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        records.into_iter().map(TopicRecord::into_topic).collect()
    }

    async fn save_topics(&self, topics: &[Topic]) -> Result<(), StorageError> {
        let records: Vec<TopicRecord> = topics.iter().map(TopicRecord::from_topic).collect();
        let raw = serde_json::to_string(&records)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.set(USER_TOPICS_KEY, &raw).await
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub values: Arc<dyn KeyValueStore>,
    pub topics: Arc<dyn TopicRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_store(values: Arc<dyn KeyValueStore>) -> Self {
        let topics: Arc<dyn TopicRepository> =
            Arc::new(KeyValueTopicRepository::new(Arc::clone(&values)));
        Self { values, topics }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryKeyValueStore::new()))
    }
}
