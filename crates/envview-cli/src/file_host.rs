//! File-backed document host
//!
//! Keeps the file in an in-memory buffer the way an editor does: patches land
//! in the buffer, `save` writes it out with the line terminator the file was
//! read with.

use async_trait::async_trait;
use envview_document::{LineDocument, PatchSet};
use envview_session::{DocumentHost, HostError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug)]
struct Buffer {
    document: LineDocument,
    dirty: bool,
}

/// Host editing one file on disk
#[derive(Debug)]
pub struct FileHost {
    path: PathBuf,
    buffer: Mutex<Buffer>,
}

impl FileHost {
    /// Read `path` into a buffer
    ///
    /// # Errors
    /// Returns `HostError::Io` if the file cannot be read
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref().to_path_buf();
        let text = tokio::fs::read_to_string(&path).await?;
        let document = LineDocument::from_text(&text);
        tracing::debug!(path = %path.display(), lines = document.len(), "opened file");
        Ok(Self {
            path,
            buffer: Mutex::new(Buffer {
                document,
                dirty: false,
            }),
        })
    }

    /// File this host edits
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentHost for FileHost {
    async fn read_lines(&self) -> Result<Vec<String>, HostError> {
        Ok(self.buffer.lock().await.document.lines().to_vec())
    }

    async fn apply_patch(&self, patch: &PatchSet) -> Result<(), HostError> {
        let mut buffer = self.buffer.lock().await;
        buffer.document = patch.apply_to(&buffer.document)?;
        buffer.dirty = true;
        Ok(())
    }

    async fn save(&self) -> Result<(), HostError> {
        let mut buffer = self.buffer.lock().await;
        if !buffer.dirty {
            return Ok(());
        }
        tokio::fs::write(&self.path, buffer.document.to_text()).await?;
        buffer.dirty = false;
        tracing::debug!(path = %self.path.display(), "saved file");
        Ok(())
    }
}
