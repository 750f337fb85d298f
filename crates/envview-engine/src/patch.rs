//! Patch generator
//!
//! Turns an effective configuration back into whole-line replacements. The
//! template's N keys are expected on the N lines right after its tag, in
//! parse order; instruction `i` rewrites line `tag + 1 + i`. Keys are never
//! inserted or removed, so the line count of the document never changes.
//!
//! The layout is verified before anything is emitted: if a target line no
//! longer holds the expected key (hand-reordered template, comment between
//! assignments) or the body assigns a key twice, generation fails instead of
//! writing a value the next parse would not read back.

use crate::error::PatchGenError;
use crate::model::{Model, Template};
use crate::parsers::{parse_assignment, serialize_assignment};
use envview_document::{LinePatch, PatchSet};

/// Generate instructions writing `effective` into the model's document
///
/// # Errors
/// - `PatchGenError::MissingTarget` if there are values but no template tag
/// - `PatchGenError::LayoutMismatch` if a target line holds another key
/// - `PatchGenError::RepeatedKeys` if the target body assigns a key twice
pub fn generate_patch(model: &Model, effective: &Template) -> Result<PatchSet, PatchGenError> {
    let document = model.document();
    let base = *document.hash();
    if effective.is_empty() {
        return Ok(PatchSet::empty(base));
    }

    let target = model.patch_target().ok_or(PatchGenError::MissingTarget)?;
    let first = target.first_line();

    let mut instructions = Vec::with_capacity(effective.len());
    for (offset, (key, value)) in effective.iter().enumerate() {
        let line = first + offset;
        let holds_key = document
            .line(line)
            .and_then(parse_assignment)
            .is_some_and(|(found, _)| &found == key);
        if !holds_key {
            return Err(PatchGenError::LayoutMismatch {
                line,
                expected_key: key.clone(),
            });
        }
        instructions.push(LinePatch::new(line, serialize_assignment(key, value)));
    }

    if target.assignment_lines > effective.len() {
        return Err(PatchGenError::RepeatedKeys {
            tag_line: target.tag_line,
            assignments: target.assignment_lines,
            keys: effective.len(),
        });
    }

    Ok(PatchSet::new(base, instructions))
}
