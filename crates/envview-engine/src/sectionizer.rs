//! Sectionizer
//!
//! Walks the lines once, tracking the current section (template until the
//! first tag), and splits every section into groups that each start at a tag
//! line. Lines before the first recognized tag are kept as a preamble; they
//! are free-form text and never parsed as data.
//!
//! ```text
//! # free text                 -> preamble
//! // @env-template            -> template group (tag line 1)
//! PORT=3000                   ->   body
//! // @env-mode:env.prod       -> mode group (tag line 3)
//! // PORT=8080                ->   body
//! // @env-bogus               -> skipped, diagnostic, still in mode group
//! // HOST=prod.example.com    ->   body
//! ```

use crate::error::Diagnostic;
use crate::tag::{scan_line, LineScan, Tag, TagKind};

/// A line together with its position in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// A tag line and the lines it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    /// Line index of the tag
    pub tag_line: usize,
    pub tag: Tag,
    /// Lines up to the next recognized tag
    pub body: Vec<SourceLine<'a>>,
}

impl<'a> Group<'a> {
    /// Body texts in order
    pub fn body_texts(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.body.iter().map(|line| line.text)
    }
}

/// Lines split by section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Lines before the first recognized tag
    pub preamble: Vec<SourceLine<'a>>,
    pub template: Vec<Group<'a>>,
    pub mode: Vec<Group<'a>>,
    pub value: Vec<Group<'a>>,
    pub overwritten: Vec<Group<'a>>,
}

impl<'a> Sections<'a> {
    /// Groups of one section
    #[must_use]
    pub fn groups(&self, kind: TagKind) -> &[Group<'a>] {
        match kind {
            TagKind::Template => &self.template,
            TagKind::Mode => &self.mode,
            TagKind::Value => &self.value,
            TagKind::Overwritten => &self.overwritten,
        }
    }

    fn groups_mut(&mut self, kind: TagKind) -> &mut Vec<Group<'a>> {
        match kind {
            TagKind::Template => &mut self.template,
            TagKind::Mode => &mut self.mode,
            TagKind::Value => &mut self.value,
            TagKind::Overwritten => &mut self.overwritten,
        }
    }
}

/// Split lines into sections and groups
///
/// Unknown tags are reported and skipped without changing the current
/// section or group.
pub fn sectionize<'a, S: AsRef<str>>(lines: &'a [S], diagnostics: &mut Vec<Diagnostic>) -> Sections<'a> {
    let mut sections = Sections::default();
    let mut current: Option<TagKind> = None;

    for (index, line) in lines.iter().enumerate() {
        let text = line.as_ref();
        match scan_line(text) {
            LineScan::Tag(tag) => {
                let kind = tag.kind;
                sections.groups_mut(kind).push(Group {
                    tag_line: index,
                    tag,
                    body: Vec::new(),
                });
                current = Some(kind);
            }
            LineScan::Malformed(error) => {
                tracing::warn!(line = index, %error, "skipping malformed tag");
                diagnostics.push(Diagnostic::malformed(index, &error));
            }
            LineScan::Plain => {
                let source = SourceLine { index, text };
                match current.and_then(|kind| sections.groups_mut(kind).last_mut()) {
                    Some(group) => group.body.push(source),
                    None => sections.preamble.push(source),
                }
            }
        }
    }

    sections
}
