//! Line patches
//!
//! A [`PatchSet`] is the only way an edit leaves the engine: an ordered list
//! of whole-line replacements plus the hash of the document it was computed
//! against. Line count never changes, so indices stay stable while the host
//! applies the set.

use crate::document::LineDocument;
use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};

/// Replace the full content of one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePatch {
    /// Zero-based target line
    pub line_index: usize,
    /// Replacement text, without terminator
    pub new_line_text: String,
}

impl LinePatch {
    /// Create new instruction
    #[inline]
    #[must_use]
    pub fn new(line_index: usize, new_line_text: impl Into<String>) -> Self {
        Self {
            line_index,
            new_line_text: new_line_text.into(),
        }
    }
}

/// Ordered set of line replacements
///
/// # Invariants
/// - `base_hash` identifies the document the instructions were computed against
/// - instructions are sorted by `line_index` and never repeat an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSet {
    base_hash: ContentHash,
    instructions: Vec<LinePatch>,
}

impl PatchSet {
    /// Create patch set against a base document hash
    #[must_use]
    pub fn new(base_hash: ContentHash, mut instructions: Vec<LinePatch>) -> Self {
        instructions.sort_by_key(|p| p.line_index);
        instructions.dedup_by_key(|p| p.line_index);
        Self {
            base_hash,
            instructions,
        }
    }

    /// Patch set that changes nothing
    #[inline]
    #[must_use]
    pub fn empty(base_hash: ContentHash) -> Self {
        Self {
            base_hash,
            instructions: Vec::new(),
        }
    }

    /// Hash of the document the patch expects
    #[inline]
    #[must_use]
    pub fn base_hash(&self) -> &ContentHash {
        &self.base_hash
    }

    /// Instructions in line order
    #[inline]
    #[must_use]
    pub fn instructions(&self) -> &[LinePatch] {
        &self.instructions
    }

    /// Number of instructions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether applying the set is a no-op by construction
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Contiguous line range covered, if any
    #[must_use]
    pub fn line_range(&self) -> Option<std::ops::Range<usize>> {
        let first = self.instructions.first()?.line_index;
        let last = self.instructions.last()?.line_index;
        Some(first..last + 1)
    }

    /// Verify the patch was computed against `document`
    ///
    /// # Errors
    /// Returns error if the document hash differs from the base hash
    pub fn validate_base(&self, document: &LineDocument) -> Result<(), PatchError> {
        let actual = *document.hash();
        if self.base_hash != actual {
            return Err(PatchError::BaseMismatch {
                expected: self.base_hash,
                actual,
            });
        }
        Ok(())
    }

    /// Drop instructions that would not change their line
    #[must_use]
    pub fn retain_changed(mut self, document: &LineDocument) -> Self {
        self.instructions
            .retain(|p| document.line(p.line_index) != Some(p.new_line_text.as_str()));
        self
    }

    /// Apply to an in-memory document
    ///
    /// # Errors
    /// - `PatchError::BaseMismatch` if the document is not the patch base
    /// - `PatchError::LineOutOfRange` if an instruction targets a missing line
    pub fn apply_to(&self, document: &LineDocument) -> Result<LineDocument, PatchError> {
        self.validate_base(document)?;
        if let Some(bad) = self
            .instructions
            .iter()
            .find(|p| p.line_index >= document.len())
        {
            return Err(PatchError::LineOutOfRange {
                index: bad.line_index,
                len: document.len(),
            });
        }
        Ok(document.with_replaced(
            self.instructions
                .iter()
                .map(|p| (p.line_index, p.new_line_text.clone())),
        ))
    }
}

impl<'a> IntoIterator for &'a PatchSet {
    type Item = &'a LinePatch;
    type IntoIter = std::slice::Iter<'a, LinePatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Errors applying a patch set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Base hash mismatch (document changed since the patch was computed)
    #[error("base hash mismatch: expected {expected}, got {actual}")]
    BaseMismatch {
        expected: ContentHash,
        actual: ContentHash,
    },

    /// Instruction targets a line the document does not have
    #[error("line {index} out of range for document of {len} lines")]
    LineOutOfRange { index: usize, len: usize },
}
