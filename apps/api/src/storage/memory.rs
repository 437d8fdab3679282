use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use super::{DocumentHandle, DocumentStore, StorageError, StoredDocument};

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<DocumentHandle, Bytes>>,
}

impl MemoryDocumentStore {
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, handle: &DocumentHandle) -> bool {
        self.documents.lock().unwrap().contains_key(handle)
    }

    pub fn bytes(&self, handle: &DocumentHandle) -> Option<Bytes> {
        self.documents.lock().unwrap().get(handle).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, handle: &DocumentHandle, bytes: Bytes) -> Result<(), StorageError> {
        self.documents.lock().unwrap().insert(handle.clone(), bytes);
        Ok(())
    }

    async fn open(&self, handle: &DocumentHandle) -> Result<Option<StoredDocument>, StorageError> {
        Ok(self.bytes(handle).map(|bytes| StoredDocument {
            size_bytes: bytes.len() as u64,
            body: stream::once(async move { Ok::<_, std::io::Error>(bytes) }).boxed(),
        }))
    }
}
