//! envview documents
//!
//! The line-level vocabulary shared by the engine, the session and hosts.
//!
//! # Core Concepts
//!
//! - [`LineDocument`]: immutable, hashed snapshot of a document's lines
//! - [`ContentHash`]: 32-byte Blake3 hash of a line sequence
//! - [`PatchSet`]: ordered whole-line replacements against a base hash
//!
//! # Example
//!
//! ```rust,ignore
//! use envview_document::{LineDocument, LinePatch, PatchSet};
//!
//! let doc = LineDocument::from_text("// @env-template\nPORT=3000\n");
//! let patch = PatchSet::new(*doc.hash(), vec![LinePatch::new(1, "PORT=8080")]);
//! let next = patch.apply_to(&doc)?;
//! ```

#![warn(unreachable_pub)]

mod document;
mod hash;
mod patch;

pub use document::{LineDocument, LineEnding};
pub use hash::{ContentHash, HashError};
pub use patch::{LinePatch, PatchError, PatchSet};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_patch_preserves_line_count(
            lines in proptest::collection::vec("[A-Z]{1,4}=[a-z0-9]{0,6}", 1..12),
            edits in proptest::collection::vec((0..12usize, "[A-Z]=[0-9]{1,3}"), 0..8)
        ) {
            let doc = LineDocument::from_lines(lines);
            let instructions = edits
                .into_iter()
                .filter(|(i, _)| *i < doc.len())
                .map(|(i, text)| LinePatch::new(i, text))
                .collect();
            let patch = PatchSet::new(*doc.hash(), instructions);
            let next = patch.apply_to(&doc).unwrap();

            prop_assert_eq!(next.len(), doc.len());
            for (i, line) in doc.lines().iter().enumerate() {
                if patch.instructions().iter().all(|p| p.line_index != i) {
                    prop_assert_eq!(next.line(i), Some(line.as_str()));
                }
            }
        }
    }

    #[test]
    fn text_patch_text_roundtrip() {
        let doc = LineDocument::from_text("# header\r\n// @env-template\r\nPORT=3000\r\n");
        let patch = PatchSet::new(*doc.hash(), vec![LinePatch::new(2, "PORT=8080")]);
        let next = patch.apply_to(&doc).unwrap();
        assert_eq!(next.to_text(), "# header\r\n// @env-template\r\nPORT=8080\r\n");
    }
}
