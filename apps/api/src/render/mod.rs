//! Document Renderer: turns the primary part of a generator response into a stored PDF.
//!
//! Steps per call:
//! 1. `spawn_blocking` → layout (wrap + paginate) and PDF encoding, both CPU-bound
//! 2. `DocumentStore::put` under a freshly generated handle
//!
//! A handle is only returned after the store confirms the write, so callers never see a
//! handle whose document is missing or partial.

pub mod pdf;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::{layout_document, DocumentLayout, PageConfig};
use crate::storage::{DocumentHandle, DocumentStore, StorageError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Encode(String),

    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A document that has been written to storage.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub handle: DocumentHandle,
    pub layout: DocumentLayout,
    pub size_bytes: usize,
}

/// Renders line sequences into PDFs and persists them. Cheap to clone.
#[derive(Clone)]
pub struct DocumentRenderer {
    config: PageConfig,
    store: Arc<dyn DocumentStore>,
}

impl DocumentRenderer {
    pub fn new(config: PageConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    /// Renders `lines` into a new document. Every call creates exactly one file with a
    /// new handle; nothing is overwritten.
    pub async fn render<S: AsRef<str>>(&self, lines: &[S]) -> Result<RenderedDocument, RenderError> {
        let owned: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
        let config = self.config.clone();
        let handle = DocumentHandle::generate();
        let title = handle.to_string();

        let (layout, bytes) = tokio::task::spawn_blocking(move || {
            let layout = layout_document(&owned, &config);
            let bytes = pdf::encode_pdf(&layout, &config, &title)?;
            Ok::<_, RenderError>((layout, bytes))
        })
        .await??;

        let size_bytes = bytes.len();
        self.store.put(&handle, Bytes::from(bytes)).await?;

        if layout.replaced_chars > 0 {
            warn!(
                document = %handle,
                replaced_chars = layout.replaced_chars,
                "Characters outside the PDF font encoding were printed as '?'"
            );
        }

        debug!(
            document = %handle,
            pages = layout.page_count,
            blocks = layout.blocks.len(),
            size_bytes,
            "Document rendered"
        );

        Ok(RenderedDocument {
            handle,
            layout,
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::layout::{default_page_config, FontFamily};
    use crate::storage::memory::MemoryDocumentStore;
    use crate::storage::StoredDocument;

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn put(&self, _handle: &DocumentHandle, _bytes: Bytes) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        async fn open(
            &self,
            _handle: &DocumentHandle,
        ) -> Result<Option<StoredDocument>, StorageError> {
            Ok(None)
        }
    }

    fn renderer_with(store: Arc<dyn DocumentStore>) -> DocumentRenderer {
        DocumentRenderer::new(default_page_config(FontFamily::Helvetica, 12.0), store)
    }

    #[tokio::test]
    async fn test_render_stores_pdf_under_returned_handle() {
        let store = Arc::new(MemoryDocumentStore::default());
        let renderer = renderer_with(store.clone());

        let rendered = renderer.render(&["Jane Doe", "", "Engineer"]).await.unwrap();

        assert!(store.contains(&rendered.handle));
        let bytes = store.bytes(&rendered.handle).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(bytes.len(), rendered.size_bytes);
    }

    #[tokio::test]
    async fn test_text_blocks_match_non_blank_lines() {
        let store = Arc::new(MemoryDocumentStore::default());
        let renderer = renderer_with(store);
        let lines = ["Summary", "", "Built things", "  ", "Skills: Rust"];

        let rendered = renderer.render(&lines).await.unwrap();

        let texts: Vec<String> = rendered.layout.blocks.iter().map(|b| b.text()).collect();
        assert_eq!(texts, vec!["Summary", "Built things", "Skills: Rust"]);
    }

    #[tokio::test]
    async fn test_unencodable_characters_are_counted() {
        let store = Arc::new(MemoryDocumentStore::default());
        let renderer = renderer_with(store.clone());

        let rendered = renderer.render(&["Jane Doe", "Привет"]).await.unwrap();

        assert_eq!(rendered.layout.replaced_chars, 6);
        assert_eq!(rendered.layout.blocks[1].text(), "??????");
        assert!(store.contains(&rendered.handle));
    }

    #[tokio::test]
    async fn test_same_lines_twice_yield_distinct_handles_and_equal_layouts() {
        let store = Arc::new(MemoryDocumentStore::default());
        let renderer = renderer_with(store.clone());
        let lines = ["Jane Doe", "Rust engineer"];

        let first = renderer.render(&lines).await.unwrap();
        let second = renderer.render(&lines).await.unwrap();

        assert_ne!(first.handle, second.handle);
        assert_eq!(first.layout, second.layout);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_lines_produce_valid_document() {
        let store = Arc::new(MemoryDocumentStore::default());
        let renderer = renderer_with(store.clone());

        let rendered = renderer.render::<&str>(&[]).await.unwrap();

        assert!(rendered.layout.blocks.is_empty());
        assert!(store.contains(&rendered.handle));
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_as_storage_error() {
        let renderer = renderer_with(Arc::new(FailingStore));

        let result = renderer.render(&["Jane Doe"]).await;

        assert!(matches!(result, Err(RenderError::Storage(_))));
    }
}
