//! Section parsers
//!
//! Turn sectionized groups into typed structures:
//! - [`TemplateParser`]: `env-template` (and legacy `env-overwritten`) bodies
//! - [`ModeParser`]: `env-mode` groups into override maps
//! - [`ValueParser`]: `env-value` groups into per-key constraints
//!
//! Parsers never fail. A group they cannot use is dropped with a
//! [`Diagnostic`] and the rest of the document is still parsed.

use crate::error::Diagnostic;
use crate::sectionizer::Group;
use crate::tag::TagKind;

pub mod assignment;
mod mode;
mod template;
mod value;

pub use assignment::{parse_assignment, parse_assignments, serialize_assignment, strip_comment_marker};
pub use mode::ModeParser;
pub use template::{ParsedTemplate, TemplateParser};
pub use value::ValueParser;

/// Parser for the groups of one section kind
pub trait SectionParser {
    /// Structure produced from the section
    type Output;

    /// Section this parser consumes
    fn kind(&self) -> TagKind;

    /// Parse every group of the section
    fn parse(&self, groups: &[Group<'_>], diagnostics: &mut Vec<Diagnostic>) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sectionizer::sectionize;

    #[test]
    fn parsers_report_their_section() {
        assert_eq!(TemplateParser::template().kind(), TagKind::Template);
        assert_eq!(TemplateParser::overwritten().kind(), TagKind::Overwritten);
        assert_eq!(ModeParser.kind(), TagKind::Mode);
        assert_eq!(ValueParser.kind(), TagKind::Value);
    }

    #[test]
    fn parsers_share_one_diagnostic_list() {
        let lines = [
            "// @env-template",
            "A=1",
            "// @env-mode:broken",
            "// A=2",
            "// @env-value:(,)",
            "// @env-template",
        ];
        let mut diags = Vec::new();
        let sections = sectionize(&lines, &mut diags);

        let template = TemplateParser::template().parse(&sections.template, &mut diags);
        let modes = ModeParser.parse(&sections.mode, &mut diags);
        let values = ValueParser.parse(&sections.value, &mut diags);

        assert_eq!(template.map(|t| t.values.len()), Some(1));
        assert!(modes.is_empty());
        assert!(values.is_empty());
        let lines: Vec<_> = diags.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![5, 2, 4]);
    }
}
