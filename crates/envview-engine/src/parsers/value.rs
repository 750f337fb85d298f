//! Value-constraint section parser

use super::assignment::strip_comment_marker;
use super::SectionParser;
use crate::error::Diagnostic;
use crate::model::{InputKind, ValueConstraint};
use crate::sectionizer::Group;
use crate::tag::{parse_value_payload, TagKind};
use indexmap::IndexMap;

/// Parses `env-value` groups into constraints keyed by configuration key
///
/// The body lists allowed values, comma separated, one or more per line.
/// Without an explicit kind the constraint is `select` when values are
/// listed and `text` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueParser;

impl SectionParser for ValueParser {
    type Output = IndexMap<String, ValueConstraint>;

    fn kind(&self) -> TagKind {
        TagKind::Value
    }

    fn parse(&self, groups: &[Group<'_>], diagnostics: &mut Vec<Diagnostic>) -> Self::Output {
        let mut constraints = IndexMap::new();

        for group in groups {
            let spec = match parse_value_payload(group.tag.payload.as_deref()) {
                Ok(spec) => spec,
                Err(error) => {
                    tracing::warn!(line = group.tag_line, %error, "dropping value group");
                    diagnostics.push(Diagnostic::malformed(group.tag_line, &error));
                    continue;
                }
            };

            let values = allowed_values(group);
            let kind = spec.options.kind.unwrap_or(if values.is_empty() {
                InputKind::Text
            } else {
                InputKind::Select
            });
            let constraint = ValueConstraint {
                kind,
                values,
                flags: spec.options.flags,
            };

            for key in spec.keys {
                if constraints.contains_key(&key) {
                    tracing::debug!(%key, line = group.tag_line, "later value group replaces constraint");
                }
                constraints.insert(key, constraint.clone());
            }
        }

        constraints
    }
}

fn allowed_values(group: &Group<'_>) -> Vec<String> {
    let joined = group
        .body_texts()
        .map(strip_comment_marker)
        .collect::<Vec<_>>()
        .join(",");
    joined
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
