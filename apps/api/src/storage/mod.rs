//! Document storage: the only place rendered PDFs are persisted.
//!
//! The renderer writes through `DocumentStore` and the download route reads through it.
//! Production uses `FsDocumentStore` (one flat output directory); tests swap in
//! `MemoryDocumentStore`. Carried in `AppState` as `Arc<dyn DocumentStore>`.

mod handle;
mod local;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

pub use handle::DocumentHandle;
pub use local::FsDocumentStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chunked document body, ready for `Body::from_stream`.
pub type DocumentStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// A stored document opened for reading.
pub struct StoredDocument {
    pub size_bytes: u64,
    pub body: DocumentStream,
}

impl StoredDocument {
    #[cfg(test)]
    pub async fn read_all(self) -> Result<Vec<u8>, std::io::Error> {
        use futures::TryStreamExt;

        self.body
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
    }
}

/// Storage backend for rendered documents.
///
/// Documents are write-once: nothing in the service overwrites or deletes them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists a complete document. The handle must not be readable before this returns `Ok`.
    async fn put(&self, handle: &DocumentHandle, bytes: Bytes) -> Result<(), StorageError>;

    /// Opens the document for streaming, or `None` if no document exists under this handle.
    async fn open(&self, handle: &DocumentHandle) -> Result<Option<StoredDocument>, StorageError>;
}
