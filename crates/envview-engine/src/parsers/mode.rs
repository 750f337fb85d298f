//! Mode section parser

use super::assignment::{parse_assignments, strip_comment_marker};
use super::SectionParser;
use crate::error::Diagnostic;
use crate::model::{ModeGroup, ModeId};
use crate::sectionizer::Group;
use crate::tag::{parse_mode_payload, TagKind};
use indexmap::IndexMap;

/// Parses `env-mode` groups into override maps keyed by `scope.mode`
///
/// Body lines are usually commented out (`// PORT=8080`) so the file stays
/// a valid env file; the comment opener is stripped before parsing. A
/// repeated `scope.mode` extends the earlier group.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeParser;

impl SectionParser for ModeParser {
    type Output = IndexMap<ModeId, ModeGroup>;

    fn kind(&self) -> TagKind {
        TagKind::Mode
    }

    fn parse(&self, groups: &[Group<'_>], diagnostics: &mut Vec<Diagnostic>) -> Self::Output {
        let mut modes: IndexMap<ModeId, ModeGroup> = IndexMap::new();

        for group in groups {
            let id = match parse_mode_payload(group.tag.payload.as_deref()) {
                Ok(id) => id,
                Err(error) => {
                    tracing::warn!(line = group.tag_line, %error, "dropping mode group");
                    diagnostics.push(Diagnostic::malformed(group.tag_line, &error));
                    continue;
                }
            };

            let overrides = parse_assignments(group.body_texts().map(strip_comment_marker));
            match modes.get_mut(&id) {
                Some(existing) => {
                    tracing::debug!(mode = %id, line = group.tag_line, "extending repeated mode group");
                    existing.overrides.extend(overrides);
                }
                None => {
                    modes.insert(
                        id.clone(),
                        ModeGroup {
                            id,
                            tag_line: group.tag_line,
                            overrides,
                        },
                    );
                }
            }
        }

        modes
    }
}
