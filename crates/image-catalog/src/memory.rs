use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use chrono::Utc;
use log::debug;
use serde_json::Value;

use crate::{
    client::{CollectionStore, Connection, DEFAULT_COLLECTION, DEFAULT_OBJECT_KEY, RemoteTrigger},
    error::CatalogError,
    model::{CollectionErrorEntry, CollectionResponse},
};

/// Status code reported for a missing collection object
const NOT_FOUND: i64 = 404;

/// In-process collection with a simulated sync job
///
/// A sync copies the configured upstream snapshot into the default
/// collection object, stamping it with the current time. Failures can be
/// queued to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    connected: AtomicBool,
    refuse_connection: AtomicBool,
    objects: Mutex<HashMap<(String, String), CollectionResponse>>,
    upstream: Mutex<Option<CollectionResponse>>,
    read_failure: Mutex<Option<CatalogError>>,
    trigger_failure: Mutex<Option<CatalogError>>,
    reads: AtomicUsize,
    posts: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog whose default object already holds `response`
    pub fn with_images(response: CollectionResponse) -> Self {
        let catalog = Self::new();
        catalog.insert(DEFAULT_COLLECTION, DEFAULT_OBJECT_KEY, response);
        catalog
    }

    /// Snapshot the simulated sync job publishes
    pub fn with_upstream(self, upstream: CollectionResponse) -> Self {
        *lock(&self.upstream) = Some(upstream);
        self
    }

    /// Make `connect()` succeed without ever reporting connected
    pub fn refusing_connection(self) -> Self {
        self.refuse_connection.store(true, Ordering::SeqCst);
        self
    }

    pub fn insert(&self, collection: &str, key: &str, response: CollectionResponse) {
        lock(&self.objects).insert((collection.to_string(), key.to_string()), response);
    }

    pub fn get(&self, collection: &str, key: &str) -> Option<CollectionResponse> {
        lock(&self.objects)
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    /// Fail the next read with `err`
    pub fn fail_next_read(&self, err: CatalogError) {
        *lock(&self.read_failure) = Some(err);
    }

    /// Fail the next trigger post with `err`
    pub fn fail_next_trigger(&self, err: CatalogError) {
        *lock(&self.trigger_failure) = Some(err);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn post_count(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<(), CatalogError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CatalogError::NotConnected)
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Connection for InMemoryCatalog {
    async fn connect(&self) -> Result<(), CatalogError> {
        let refuse = self.refuse_connection.load(Ordering::SeqCst);
        self.connected.store(!refuse, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl CollectionStore for InMemoryCatalog {
    async fn read_all(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<CollectionResponse, CatalogError> {
        self.ensure_connected()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.read_failure).take() {
            return Err(err);
        }

        Ok(self.get(collection, key).unwrap_or_else(|| CollectionResponse {
            errors: Some(vec![CollectionErrorEntry {
                code: NOT_FOUND,
                message: format!("object {} not found in collection {}", key, collection),
            }]),
            ..CollectionResponse::default()
        }))
    }

    async fn write(
        &self,
        collection: &str,
        key: &str,
        record: &CollectionResponse,
    ) -> Result<(), CatalogError> {
        self.ensure_connected()?;
        self.insert(collection, key, record.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), CatalogError> {
        self.ensure_connected()?;
        lock(&self.objects).remove(&(collection.to_string(), key.to_string()));
        Ok(())
    }
}

impl RemoteTrigger for InMemoryCatalog {
    async fn post(&self, path: &str, _body: Option<Value>) -> Result<(), CatalogError> {
        self.ensure_connected()?;
        self.posts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.trigger_failure).take() {
            return Err(err);
        }

        let upstream = lock(&self.upstream).clone();
        if let Some(mut snapshot) = upstream {
            snapshot.updated_at = Some(Utc::now());
            debug!(
                "Simulated sync via {} published {} images",
                path,
                snapshot.images.len()
            );
            self.insert(DEFAULT_COLLECTION, DEFAULT_OBJECT_KEY, snapshot);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageRepository;

    #[tokio::test]
    async fn test_requires_connection() {
        let catalog = InMemoryCatalog::new();
        assert_eq!(
            catalog.read_all("images", "all").await,
            Err(CatalogError::NotConnected)
        );

        catalog.connect().await.unwrap();
        assert!(catalog.is_connected());
    }

    #[tokio::test]
    async fn test_missing_object_reports_not_found_record() {
        let catalog = InMemoryCatalog::new();
        catalog.connect().await.unwrap();

        let resp = catalog.read_all("images", "all").await.unwrap();
        assert_eq!(resp.reported_errors().unwrap()[0].code, NOT_FOUND);
    }

    #[tokio::test]
    async fn test_write_delete_roundtrip() {
        let catalog = InMemoryCatalog::new();
        catalog.connect().await.unwrap();

        let record = CollectionResponse {
            images: vec![ImageRepository::new("a", "registry.example.com/a")],
            ..CollectionResponse::default()
        };
        catalog.write("images", "all", &record).await.unwrap();
        assert_eq!(catalog.get("images", "all"), Some(record));

        catalog.delete("images", "all").await.unwrap();
        assert!(catalog.get("images", "all").is_none());
    }

    #[tokio::test]
    async fn test_trigger_publishes_upstream() {
        let upstream = CollectionResponse {
            images: vec![ImageRepository::new("a", "registry.example.com/a")],
            ..CollectionResponse::default()
        };
        let catalog = InMemoryCatalog::new().with_upstream(upstream);
        catalog.connect().await.unwrap();

        catalog.post("/sync-images", None).await.unwrap();
        let stored = catalog.get(DEFAULT_COLLECTION, DEFAULT_OBJECT_KEY).unwrap();
        assert_eq!(stored.images.len(), 1);
        assert!(stored.updated_at.is_some());
        assert_eq!(catalog.post_count(), 1);
    }
}
