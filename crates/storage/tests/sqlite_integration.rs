use dictation_core::{Level, Topic};
use storage::repository::{KeyValueStore, Storage, StorageError, USER_TOPICS_KEY};
use storage::sqlite::SqliteRepository;

fn topic(title: &str, level: &str) -> Topic {
    Topic::new(title, Level::parse(level), "Guten Tag. Wie spät ist es?").unwrap()
}

#[tokio::test]
async fn sqlite_key_value_upserts() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("greeting", "hallo").await.unwrap();
    repo.set("greeting", "servus").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap().as_deref(), Some("servus"));
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn sqlite_storage_round_trips_topics() {
    let storage = Storage::sqlite("sqlite:file:memdb_topics?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    assert!(storage.topics.load_topics().await.unwrap().is_empty());

    let topics = vec![topic("Einkaufen", "A1"), topic("Arbeit", "Custom")];
    storage.topics.save_topics(&topics).await.unwrap();

    let loaded = storage.topics.load_topics().await.unwrap();
    assert_eq!(loaded, topics);
}

#[tokio::test]
async fn sqlite_storage_reports_corrupt_collection() {
    let storage = Storage::sqlite("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    storage
        .values
        .set(USER_TOPICS_KEY, "[{\"title\": 42}]")
        .await
        .unwrap();

    let err = storage.topics.load_topics().await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}
