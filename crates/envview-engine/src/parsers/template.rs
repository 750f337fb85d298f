//! Template section parser

use super::assignment::{parse_assignment, parse_assignments};
use super::SectionParser;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::Template;
use crate::sectionizer::Group;
use crate::tag::TagKind;
use std::collections::HashMap;

/// Assignments of a template-like section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// Line of the section's tag
    pub tag_line: usize,
    pub values: Template,
    /// Body lines that parse as assignments, repeats included
    pub assignment_lines: usize,
}

/// Parses the first group of a template-like section as assignments
///
/// Later groups of the same kind are reported as duplicates and ignored.
#[derive(Debug, Clone, Copy)]
pub struct TemplateParser {
    kind: TagKind,
}

impl TemplateParser {
    /// Parser for `env-template`
    #[inline]
    #[must_use]
    pub const fn template() -> Self {
        Self {
            kind: TagKind::Template,
        }
    }

    /// Parser for legacy `env-overwritten`
    #[inline]
    #[must_use]
    pub const fn overwritten() -> Self {
        Self {
            kind: TagKind::Overwritten,
        }
    }
}

impl SectionParser for TemplateParser {
    type Output = Option<ParsedTemplate>;

    fn kind(&self) -> TagKind {
        self.kind
    }

    fn parse(&self, groups: &[Group<'_>], diagnostics: &mut Vec<Diagnostic>) -> Self::Output {
        let (first, rest) = groups.split_first()?;

        for duplicate in rest {
            tracing::warn!(line = duplicate.tag_line, kind = %self.kind, "ignoring duplicate section");
            diagnostics.push(Diagnostic::new(
                duplicate.tag_line,
                DiagnosticKind::DuplicateTemplate,
                format!(
                    "'@{}' already declared on line {}; section ignored",
                    self.kind,
                    first.tag_line + 1
                ),
            ));
        }

        let mut assignment_lines = 0;
        let mut seen: HashMap<String, usize> = HashMap::new();
        for line in &first.body {
            let Some((key, _)) = parse_assignment(line.text) else {
                continue;
            };
            assignment_lines += 1;
            if let Some(earlier) = seen.get(&key) {
                tracing::warn!(line = line.index, %key, "repeated key in section body");
                diagnostics.push(Diagnostic::new(
                    line.index,
                    DiagnosticKind::DuplicateKey,
                    format!("'{key}' already assigned on line {}", earlier + 1),
                ));
            } else {
                seen.insert(key, line.index);
            }
        }

        Some(ParsedTemplate {
            tag_line: first.tag_line,
            values: parse_assignments(first.body_texts()),
            assignment_lines,
        })
    }
}
