//! In-process object store used by tests

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, PoisonError,
    },
};

use async_trait::async_trait;
use bytes::Bytes;

use super::{
    DeleteOutcome, ObjectStore, PutObject, ResourceType, StorageError, StorageProvider,
    StorageResult,
};

/// A stored object as seen by the memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Object contents
    pub bytes: Bytes,
    /// MIME type the object was stored with
    pub content_type: String,
}

/// Keeps objects in a map keyed by resource type and key
#[derive(Debug)]
pub struct MemoryStore {
    base_url: String,
    objects: Mutex<HashMap<(ResourceType, String), StoredBlob>>,
    puts: AtomicUsize,
    put_failure: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates an empty store whose URLs start with `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(HashMap::new()),
            puts: AtomicUsize::new(0),
            put_failure: Mutex::new(None),
        }
    }

    /// Makes every following `put` fail as if the provider answered 503 with `message`
    pub fn fail_puts(&self, message: impl Into<String>) {
        *self
            .put_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    /// Returns the object stored under `key`
    #[must_use]
    pub fn get(&self, key: &str, resource_type: ResourceType) -> Option<StoredBlob> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(resource_type, key.to_string()))
            .cloned()
    }

    /// Number of objects currently stored
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no objects
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times `put` has been called
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, object: PutObject) -> StorageResult<String> {
        let resource_type = object.resource_type.unwrap_or_default();
        let url = format!("{}/{resource_type}/{}", self.base_url, object.key);

        self.puts.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .put_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(message) = failure {
            return Err(StorageError::Rejected {
                status: 503,
                message,
            });
        }

        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (resource_type, object.key),
                StoredBlob {
                    bytes: object.bytes,
                    content_type: object.content_type,
                },
            );

        Ok(url)
    }

    async fn delete(
        &self,
        key: &str,
        resource_type: Option<ResourceType>,
    ) -> StorageResult<DeleteOutcome> {
        let resource_type = resource_type.unwrap_or_default();

        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(resource_type, key.to_string()))
            .map(|_| DeleteOutcome::Deleted)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn provider(&self) -> StorageProvider {
        StorageProvider::Memory
    }
}
