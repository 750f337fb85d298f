//! Tag grammar
//!
//! Recognizes annotation lines such as:
//!
//! ```text
//! // @env-template
//! // @env-mode:env.prod
//! // @env-value:(API_URL,CDN_URL)(select disabled)
//! // @env-value:PORT(number constant)
//! ```
//!
//! A marker is the `//` comment opener followed by `@` and a name. It may
//! follow other content on the line as long as whitespace separates them; a
//! line carries at most one tag (the first marker wins).

use crate::error::TagError;
use crate::model::{ConstraintFlags, InputKind, ModeId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Comment opener used by tag markers and commented body lines
pub const COMMENT_OPENER: &str = "//";

macro_rules! regex {
    ($pat:expr) => {{
        static RE: Lazy<Regex> = Lazy::new(|| Regex::new($pat).expect("static regex is valid"));
        &*RE
    }};
}

/// Known tag kinds; each one also names the section it opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// `env-template`: default assignments
    Template,
    /// `env-mode:<scope>.<mode>`: override preset
    Mode,
    /// `env-value:<keys>(<options>)`: value constraints
    Value,
    /// `env-overwritten`: deprecated second template block
    Overwritten,
}

impl TagKind {
    /// All kinds in grammar order
    pub const ALL: [Self; 4] = [Self::Template, Self::Mode, Self::Value, Self::Overwritten];

    /// Tag name as written after `@`
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Template => "env-template",
            Self::Mode => "env-mode",
            Self::Value => "env-value",
            Self::Overwritten => "env-overwritten",
        }
    }

    /// Look up a kind by tag name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognized tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    /// Trimmed text after `:`, if the tag has one
    pub payload: Option<String>,
}

/// Result of scanning one line for a tag marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineScan {
    /// No marker: ordinary line
    Plain,
    /// Known tag
    Tag(Tag),
    /// Marker with an unrecognized name
    Malformed(TagError),
}

/// Scan a line for a tag marker
#[must_use]
pub fn scan_line(line: &str) -> LineScan {
    let re = regex!(r"(?:^|\s)//\s*@([A-Za-z][\w-]*)(.*)$");
    let Some(caps) = re.captures(line) else {
        return LineScan::Plain;
    };

    let name = &caps[1];
    let Some(kind) = TagKind::from_name(name) else {
        return LineScan::Malformed(TagError::UnknownName(name.to_string()));
    };

    let payload = caps[2]
        .strip_prefix(':')
        .map(|rest| rest.trim().to_string());
    LineScan::Tag(Tag { kind, payload })
}

/// Parse a mode payload `<scope>.<mode>`
///
/// # Errors
/// Returns error if the payload is missing or not two word-character parts
pub fn parse_mode_payload(payload: Option<&str>) -> Result<ModeId, TagError> {
    let payload = payload.ok_or(TagError::MissingPayload(TagKind::Mode.name()))?;
    let re = regex!(r"^(\w+)\.(\w+)$");
    let caps = re
        .captures(payload.trim())
        .ok_or_else(|| TagError::InvalidModePayload(payload.to_string()))?;
    Ok(ModeId::new(&caps[1], &caps[2]))
}

/// Options parsed from a value tag's parenthesized option string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueOptions {
    /// First input-kind token, if any
    pub kind: Option<InputKind>,
    pub flags: ConstraintFlags,
}

/// Parse a space-separated option string
///
/// The first input-kind token wins; flags accumulate; anything else is
/// ignored so newer option words do not break older readers.
#[must_use]
pub fn parse_options(options: &str) -> ValueOptions {
    let mut parsed = ValueOptions::default();
    for token in options.split_whitespace() {
        if let Some(kind) = InputKind::from_token(token) {
            parsed.kind.get_or_insert(kind);
            continue;
        }
        match token {
            "disabled" => parsed.flags.disabled = true,
            "constant" => parsed.flags.constant = true,
            _ => {}
        }
    }
    parsed
}

/// Keys and options named by a value tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    /// Distinct keys in payload order
    pub keys: Vec<String>,
    pub options: ValueOptions,
}

/// Parse a value payload
///
/// Forms, first match wins:
/// 1. `(<key>,<key>)(<options>)`
/// 2. `<key>(<options>)`
/// 3. `(<key>,<key>)`
/// 4. `<key>`
///
/// # Errors
/// Returns error if the payload is missing, matches no form, or names no key
pub fn parse_value_payload(payload: Option<&str>) -> Result<ValueSpec, TagError> {
    let raw = payload.ok_or(TagError::MissingPayload(TagKind::Value.name()))?;
    let payload = raw.trim();

    let forms: [&Regex; 4] = [
        regex!(r"^\(([^()]*)\)\s*\(([^()]*)\)$"),
        regex!(r"^([\w.-]+)\s*\(([^()]*)\)$"),
        regex!(r"^\(([^()]*)\)$"),
        regex!(r"^([\w.-]+)$"),
    ];

    let (key_list, options) = forms
        .iter()
        .find_map(|re| re.captures(payload))
        .map(|caps| {
            let keys = caps.get(1).map_or("", |m| m.as_str());
            let options = caps.get(2).map_or("", |m| m.as_str());
            (keys, options)
        })
        .ok_or_else(|| TagError::InvalidValuePayload(raw.to_string()))?;

    let keys = parse_key_list(key_list);
    if keys.is_empty() {
        return Err(TagError::EmptyKeyList(raw.to_string()));
    }

    Ok(ValueSpec {
        keys,
        options: parse_options(options),
    })
}

/// Split a comma-separated key list, dropping empty, invalid and repeated entries
fn parse_key_list(list: &str) -> Vec<String> {
    let ident = regex!(r"^[\w.-]+$");
    let mut keys: Vec<String> = Vec::new();
    for entry in list.split(',').map(str::trim) {
        if ident.is_match(entry) && !keys.iter().any(|k| k == entry) {
            keys.push(entry.to_string());
        }
    }
    keys
}
