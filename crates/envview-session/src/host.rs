//! Host seam
//!
//! The session never touches storage directly. A host owns the document
//! buffer: it hands out lines, applies line patches, and persists.

use crate::error::HostError;
use async_trait::async_trait;
use envview_document::PatchSet;
use std::sync::Arc;

/// Owner of the document buffer the session edits
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Current lines of the document, without terminators
    async fn read_lines(&self) -> Result<Vec<String>, HostError>;

    /// Replace whole lines in the buffer
    ///
    /// Hosts should reject a patch whose base hash does not match the buffer.
    async fn apply_patch(&self, patch: &PatchSet) -> Result<(), HostError>;

    /// Persist the buffer
    async fn save(&self) -> Result<(), HostError>;
}

#[async_trait]
impl<H: DocumentHost + ?Sized> DocumentHost for Arc<H> {
    async fn read_lines(&self) -> Result<Vec<String>, HostError> {
        (**self).read_lines().await
    }

    async fn apply_patch(&self, patch: &PatchSet) -> Result<(), HostError> {
        (**self).apply_patch(patch).await
    }

    async fn save(&self) -> Result<(), HostError> {
        (**self).save().await
    }
}
