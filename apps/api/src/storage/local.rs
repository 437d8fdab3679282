use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use tokio::{
    fs,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

use super::{DocumentHandle, DocumentStore, StorageError, StoredDocument};

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Filesystem-backed store rooted at the output directory.
///
/// Writes go to a hidden `.<name>.part` file which is renamed into place once flushed,
/// so a half-written PDF is never served. Hidden names can't be parsed as handles.
#[derive(Debug)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Opens the store, creating the output directory if it does not exist yet.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, handle: &DocumentHandle) -> PathBuf {
        self.root.join(handle.as_str())
    }

    fn partial_path_for(&self, handle: &DocumentHandle) -> PathBuf {
        self.root.join(format!(".{}.part", handle.as_str()))
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn put(&self, handle: &DocumentHandle, bytes: Bytes) -> Result<(), StorageError> {
        let partial = self.partial_path_for(handle);
        let mut file = fs::File::create(&partial).await?;

        let written = async {
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(err) = written {
            drop(file);
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::Io(err));
        }
        drop(file);

        fs::rename(&partial, self.path_for(handle)).await?;
        debug!(document = %handle, size_bytes = bytes.len(), "Document stored");
        Ok(())
    }

    async fn open(&self, handle: &DocumentHandle) -> Result<Option<StoredDocument>, StorageError> {
        let file = match fs::File::open(self.path_for(handle)).await {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err)),
        };
        let size_bytes = file.metadata().await?.len();

        let body = stream::try_unfold(file, |mut file| async move {
            let mut buf = BytesMut::with_capacity(READ_CHUNK_BYTES);
            let read = file.read_buf(&mut buf).await?;
            Ok::<_, std::io::Error>((read > 0).then(|| (buf.freeze(), file)))
        })
        .boxed();

        Ok(Some(StoredDocument { size_bytes, body }))
    }
}
