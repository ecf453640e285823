//! Integration tests for the JSON file snapshot store.

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use handle_resolver::infrastructure::storage::CACHE_KEY;
use handle_resolver::{
    CacheEntry, InMemoryStore, JsonFileStore, Priority, ResolutionService, ResolveError,
    Resolver, Snapshot, SnapshotStore, StoreError,
};

struct NoResolver;

#[async_trait::async_trait]
impl Resolver for NoResolver {
    async fn resolve(&self, _handle: &str) -> Result<Option<String>, ResolveError> {
        Ok(None)
    }
}

fn sample_snapshot() -> Snapshot {
    let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    let mut snapshot = Snapshot::new();
    snapshot.insert("@old".to_string(), CacheEntry::resolved("Old", at));
    snapshot.insert("@failing".to_string(), CacheEntry::failed(at));
    snapshot.insert("@new".to_string(), CacheEntry::resolved("New", at));
    snapshot
}

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));

    let snapshot = store.load_snapshot().await.unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_save_then_load_keeps_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested/dir/cache.json"));

    store.save_snapshot(sample_snapshot()).await.unwrap();
    let loaded = store.load_snapshot().await.unwrap();

    let order: Vec<&str> = loaded.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["@old", "@failing", "@new"]);
    assert_eq!(loaded["@failing"].failure_count, 1);
    assert!(!dir.path().join("nested/dir/cache.json.tmp").exists());
}

#[tokio::test]
async fn test_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let store = JsonFileStore::new(&path);

    store.save_snapshot(sample_snapshot()).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    let old = &raw[CACHE_KEY]["@old"];
    assert_eq!(old["name"], "Old");
    assert_eq!(old["timestamp"], 1_700_000_000_000_i64);
    assert_eq!(old["failures"], 0);
}

#[tokio::test]
async fn test_reads_entries_without_failure_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(
        &path,
        r#"{"yt_name_fix_cache_v2":{"@foo":{"name":"Foo","timestamp":1700000000000}}}"#,
    )
    .unwrap();

    let loaded = JsonFileStore::new(&path).load_snapshot().await.unwrap();
    assert_eq!(loaded["@foo"].name.as_deref(), Some("Foo"));
    assert_eq!(loaded["@foo"].failure_count, 0);
}

#[tokio::test]
async fn test_corrupt_file_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = JsonFileStore::new(&path).load_snapshot().await.unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}

#[tokio::test]
async fn test_service_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    let service = ResolutionService::builder(
        Arc::new(NoResolver),
        Arc::new(JsonFileStore::new(&path)),
    )
    .start();
    service.insert("@foo", "Foo").await.unwrap();
    service.shutdown().await.unwrap();

    let service = ResolutionService::builder(
        Arc::new(NoResolver),
        Arc::new(JsonFileStore::new(&path)),
    )
    .start();
    assert_eq!(
        service.resolve("@foo", Priority::Normal).await.unwrap().name(),
        Some("Foo")
    );
    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_in_memory_store_counts_saves() {
    let store = InMemoryStore::with_snapshot(sample_snapshot());
    assert_eq!(store.load_snapshot().await.unwrap().len(), 3);

    store.save_snapshot(Snapshot::new()).await.unwrap();
    assert_eq!(store.save_count(), 1);
    assert!(store.snapshot().is_empty());
}
