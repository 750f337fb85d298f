//! Parsed model of an annotated env document
//!
//! A [`Model`] is immutable: it is produced by a load or re-parse and
//! replaced wholesale afterwards. Overrides produce a new effective
//! [`Template`] next to it, never a mutated model.

use envview_document::LineDocument;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tag::TagKind;

/// Ordered key/value mapping; iteration order is source line order
pub type Template = IndexMap<String, String>;

/// Keys and values accepted by the most recent override
pub type ChangeRecord = IndexMap<String, String>;

/// Identifies a mode group: `<scope>.<mode>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModeId {
    /// Group of mutually exclusive modes, e.g. `env`
    pub scope: String,
    /// Mode within the scope, e.g. `prod`
    pub mode: String,
}

impl ModeId {
    /// Create mode id
    #[inline]
    #[must_use]
    pub fn new(scope: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            mode: mode.into(),
        }
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scope, self.mode)
    }
}

impl FromStr for ModeId {
    type Err = crate::error::TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::tag::parse_mode_payload(Some(s))
    }
}

impl Serialize for ModeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Overrides forced when a mode is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeGroup {
    pub id: ModeId,
    /// Line of the `env-mode` tag
    pub tag_line: usize,
    pub overrides: Template,
}

/// How a value is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Select,
    Boolean,
    Number,
}

impl InputKind {
    /// Match an option token
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "text" => Some(Self::Text),
            "select" => Some(Self::Select),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            _ => None,
        }
    }

    /// Token spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Select => "select",
            Self::Boolean => "boolean",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutability flags of a constrained key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConstraintFlags {
    /// Read-only in forms; modes may still override it
    pub disabled: bool,
    /// Never changes after the initial parse, by any mechanism
    pub constant: bool,
}

/// Allowed values, input kind and flags of one or more keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValueConstraint {
    pub kind: InputKind,
    /// Allowed values in source order; empty for free-form kinds
    pub values: Vec<String>,
    pub flags: ConstraintFlags,
}

/// Tag line whose following lines hold the effective assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatchTarget {
    /// Section the assignments live in
    pub section: TagKind,
    /// Line index of the section's tag
    pub tag_line: usize,
    /// Body lines holding assignments; more than the key count means repeats
    pub assignment_lines: usize,
}

impl PatchTarget {
    /// First line holding an assignment
    #[inline]
    #[must_use]
    pub const fn first_line(&self) -> usize {
        self.tag_line + 1
    }
}

/// Structured view of an annotated document
///
/// # Invariants
/// - every key of `baseline` is a key of `template`, in the same order
/// - for keys flagged constant, `baseline[key] == template[key]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    #[serde(skip)]
    document: LineDocument,
    template: Template,
    modes: IndexMap<ModeId, ModeGroup>,
    constraints: IndexMap<String, ValueConstraint>,
    baseline: Template,
    patch_target: Option<PatchTarget>,
}

impl Model {
    pub(crate) fn new(
        document: LineDocument,
        template: Template,
        modes: IndexMap<ModeId, ModeGroup>,
        constraints: IndexMap<String, ValueConstraint>,
        baseline: Template,
        patch_target: Option<PatchTarget>,
    ) -> Self {
        Self {
            document,
            template,
            modes,
            constraints,
            baseline,
            patch_target,
        }
    }

    /// Same model over an equal-content document, e.g. one with another line ending
    pub(crate) fn with_document(&self, document: LineDocument) -> Self {
        debug_assert_eq!(document.hash(), self.document.hash());
        Self {
            document,
            ..self.clone()
        }
    }

    /// Document the model was parsed from
    #[inline]
    #[must_use]
    pub fn document(&self) -> &LineDocument {
        &self.document
    }

    /// Template as parsed from the `env-template` section
    #[inline]
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Effective configuration at load time
    ///
    /// Equal to the template unless legacy overwritten mode applied a block.
    #[inline]
    #[must_use]
    pub fn baseline(&self) -> &Template {
        &self.baseline
    }

    /// All mode groups in source order
    #[inline]
    #[must_use]
    pub fn modes(&self) -> &IndexMap<ModeId, ModeGroup> {
        &self.modes
    }

    /// Mode group by id
    #[inline]
    #[must_use]
    pub fn mode(&self, id: &ModeId) -> Option<&ModeGroup> {
        self.modes.get(id)
    }

    /// Distinct scopes in source order
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        let mut scopes: Vec<&str> = Vec::new();
        for id in self.modes.keys() {
            if !scopes.contains(&id.scope.as_str()) {
                scopes.push(&id.scope);
            }
        }
        scopes
    }

    /// Mode groups belonging to `scope`
    pub fn modes_in_scope<'a>(&'a self, scope: &'a str) -> impl Iterator<Item = &'a ModeGroup> + 'a {
        self.modes.values().filter(move |g| g.id.scope == scope)
    }

    /// All value constraints by key
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &IndexMap<String, ValueConstraint> {
        &self.constraints
    }

    /// Constraint attached to `key`
    #[inline]
    #[must_use]
    pub fn constraint(&self, key: &str) -> Option<&ValueConstraint> {
        self.constraints.get(key)
    }

    /// Whether `key` is flagged constant
    #[inline]
    #[must_use]
    pub fn is_constant(&self, key: &str) -> bool {
        self.constraint(key).is_some_and(|c| c.flags.constant)
    }

    /// Section and tag line patches are written against
    #[inline]
    #[must_use]
    pub fn patch_target(&self) -> Option<PatchTarget> {
        self.patch_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_id_display_and_parse() {
        let id = ModeId::new("env", "prod");
        assert_eq!(id.to_string(), "env.prod");
        assert_eq!("env.prod".parse::<ModeId>().unwrap(), id);
        assert!("env".parse::<ModeId>().is_err());
        assert!("a.b.c".parse::<ModeId>().is_err());
    }

    #[test]
    fn mode_id_serializes_as_string() {
        let json = serde_json::to_string(&ModeId::new("db", "local")).unwrap();
        assert_eq!(json, "\"db.local\"");
        let back: ModeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ModeId::new("db", "local"));
    }

    #[test]
    fn input_kind_tokens() {
        assert_eq!(InputKind::from_token("number"), Some(InputKind::Number));
        assert_eq!(InputKind::from_token("Number"), None);
        assert_eq!(InputKind::Boolean.to_string(), "boolean");
    }
}
