//! Line-addressed document snapshots
//!
//! Provides [`LineDocument`], the immutable line sequence every parse starts
//! from. Line indices are zero-based and are what patch instructions target.

use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};

/// Line terminator used when a document is written back as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Terminator string
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Platform default terminator
    #[inline]
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(windows) {
            Self::CrLf
        } else {
            Self::Lf
        }
    }
}

/// Immutable snapshot of a document as an ordered sequence of lines
///
/// # Invariants
/// - `hash` is always `ContentHash::of_lines(&lines)`
/// - lines never contain a line terminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDocument {
    lines: Vec<String>,
    hash: ContentHash,
    line_ending: LineEnding,
    trailing_newline: bool,
}

impl LineDocument {
    /// Create from already split lines
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        let hash = ContentHash::of_lines(&lines);
        Self {
            lines,
            hash,
            line_ending: LineEnding::native(),
            trailing_newline: true,
        }
    }

    /// Split raw text into lines
    ///
    /// A document is considered CRLF when its first line break is `\r\n`.
    /// A final terminator does not produce an extra empty line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let line_ending = match text.find('\n') {
            Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => LineEnding::CrLf,
            Some(_) => LineEnding::Lf,
            None => LineEnding::native(),
        };
        let trailing_newline = text.ends_with('\n');

        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect()
        };

        let hash = ContentHash::of_lines(&lines);
        Self {
            lines,
            hash,
            line_ending,
            trailing_newline,
        }
    }

    /// All lines
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line at index
    #[inline]
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Number of lines
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no lines
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Content hash of the lines
    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Terminator the document was read with
    #[inline]
    #[must_use]
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Join lines back into text with the original terminator
    #[must_use]
    pub fn to_text(&self) -> String {
        let eol = self.line_ending.as_str();
        let mut text = self.lines.join(eol);
        if self.trailing_newline && !self.lines.is_empty() {
            text.push_str(eol);
        }
        text
    }

    /// Produce a new snapshot with some lines replaced
    ///
    /// Used by patch application; keeps terminator settings.
    pub(crate) fn with_replaced(&self, replacements: impl IntoIterator<Item = (usize, String)>) -> Self {
        let mut lines = self.lines.clone();
        for (index, text) in replacements {
            lines[index] = text;
        }
        let hash = ContentHash::of_lines(&lines);
        Self {
            lines,
            hash,
            line_ending: self.line_ending,
            trailing_newline: self.trailing_newline,
        }
    }

    /// Consume into the raw lines
    #[inline]
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl From<Vec<String>> for LineDocument {
    fn from(lines: Vec<String>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<&str> for LineDocument {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}
