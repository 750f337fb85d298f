//! Error and diagnostic types for the engine
//!
//! Parsing never fails: problems in the annotated text become
//! [`Diagnostic`]s and the offending line or group is dropped. Overrides and
//! patch generation return typed errors.

use crate::model::ModeId;
use serde::Serialize;
use std::fmt;

/// Kind of parse diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Unknown tag name, or a payload the tag grammar rejects
    MalformedTag,
    /// A second template-like section; only the first one is used
    DuplicateTemplate,
    /// `env-overwritten` section present while legacy mode is off
    LegacySectionIgnored,
    /// Key assigned twice in a template-like body; the section cannot be patched
    DuplicateKey,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MalformedTag => "malformed tag",
            Self::DuplicateTemplate => "duplicate template",
            Self::LegacySectionIgnored => "legacy section ignored",
            Self::DuplicateKey => "duplicate key",
        })
    }
}

/// Informational parse diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Zero-based line index
    pub line: usize,
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Human readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create diagnostic
    #[inline]
    #[must_use]
    pub fn new(line: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }

    /// Create malformed-tag diagnostic from a grammar error
    #[inline]
    #[must_use]
    pub fn malformed(line: usize, error: &TagError) -> Self {
        Self::new(line, DiagnosticKind::MalformedTag, error.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line + 1, self.kind, self.message)
    }
}

/// Errors from the tag grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// Marker present but the name is not a known tag
    #[error("unknown tag '@{0}'")]
    UnknownName(String),

    /// Tag requires a payload and has none
    #[error("'@{0}' requires a ':' payload")]
    MissingPayload(&'static str),

    /// Mode payload is not `<scope>.<mode>`
    #[error("invalid mode payload '{0}', expected <scope>.<mode>")]
    InvalidModePayload(String),

    /// Value payload matches none of the accepted forms
    #[error("invalid value payload '{0}'")]
    InvalidValuePayload(String),

    /// Value payload names no usable key
    #[error("value payload '{0}' names no keys")]
    EmptyKeyList(String),
}

/// Errors computing an override
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideError {
    /// No mode group for the requested scope/mode pair
    #[error("unknown mode: {0}")]
    UnknownMode(ModeId),

    /// Key does not exist in the template, so no line can hold it
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

/// Errors generating a patch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchGenError {
    /// No template tag to anchor the patch
    #[error("document has no template section to patch")]
    MissingTarget,

    /// The line expected to hold a key holds something else
    #[error("line {line} does not hold '{expected_key}'; template lines were reordered or interleaved")]
    LayoutMismatch { line: usize, expected_key: String },

    /// The target body assigns some key more than once
    #[error("section at line {tag_line} holds {assignments} assignments for {keys} keys; repeated keys cannot be patched")]
    RepeatedKeys {
        tag_line: usize,
        assignments: usize,
        keys: usize,
    },
}

/// Combined engine error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("override error: {0}")]
    Override(#[from] OverrideError),

    #[error("patch error: {0}")]
    Patch(#[from] PatchGenError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_error_display() {
        let err = TagError::UnknownName("env-bogus".to_string());
        assert_eq!(err.to_string(), "unknown tag '@env-bogus'");
    }

    #[test]
    fn diagnostic_display_is_one_based() {
        let diag = Diagnostic::malformed(3, &TagError::UnknownName("x".to_string()));
        assert_eq!(diag.to_string(), "line 4: malformed tag: unknown tag '@x'");
    }

    #[test]
    fn error_conversions() {
        let err: EngineError = OverrideError::UnknownKey("PORT".to_string()).into();
        assert!(matches!(err, EngineError::Override(_)));

        let err: EngineError = PatchGenError::MissingTarget.into();
        assert_eq!(
            err.to_string(),
            "patch error: document has no template section to patch"
        );
    }
}
