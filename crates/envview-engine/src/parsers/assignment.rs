//! `KEY=VALUE` assignment syntax
//!
//! Dotenv conventions, one assignment per physical line:
//! - optional `export ` prefix, whitespace around `=` ignored
//! - unquoted values end at the first `#` and are trimmed
//! - `'...'` and `` `...` `` values are literal
//! - `"..."` values unescape `\n`, `\r`, `\t`, `\"` and `\\`
//! - lines that are not assignments are ignored

use crate::model::Template;
use crate::tag::COMMENT_OPENER;
use once_cell::sync::Lazy;
use regex::Regex;

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?([\w.-]+)\s*=(.*)$").expect("static regex is valid")
});

/// Parse one line as an assignment
#[must_use]
pub fn parse_assignment(line: &str) -> Option<(String, String)> {
    let caps = ASSIGNMENT.captures(line)?;
    let key = caps[1].to_string();
    let value = parse_value(caps[2].trim_start());
    Some((key, value))
}

/// Parse lines into an ordered mapping
///
/// A repeated key keeps its first position and takes the last value.
pub fn parse_assignments<'a, I>(lines: I) -> Template
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values = Template::new();
    for line in lines {
        if let Some((key, value)) = parse_assignment(line) {
            values.insert(key, value);
        }
    }
    values
}

/// Render an assignment so that [`parse_assignment`] reads back the same value
///
/// Values survive unquoted whenever that is lossless; otherwise they are
/// written double-quoted with escapes.
#[must_use]
pub fn serialize_assignment(key: &str, value: &str) -> String {
    let plain = format!("{key}={value}");
    if parse_assignment(&plain).is_some_and(|(k, v)| k == key && v == value) {
        return plain;
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    format!("{key}=\"{quoted}\"")
}

/// Strip leading `//` comment openers from a body line
#[must_use]
pub fn strip_comment_marker(line: &str) -> &str {
    let mut rest = line.trim_start();
    let mut stripped = false;
    while let Some(after) = rest.strip_prefix(COMMENT_OPENER) {
        rest = after;
        stripped = true;
    }
    if stripped {
        rest.strip_prefix(' ').unwrap_or(rest)
    } else {
        rest
    }
}

fn parse_value(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some('"') => {
            if let Some(value) = unescape_double_quoted(chars.as_str()) {
                return value;
            }
        }
        Some(quote @ ('\'' | '`')) => {
            let body = chars.as_str();
            if let Some(end) = body.find(quote) {
                return body[..end].to_string();
            }
        }
        _ => {}
    }

    let unquoted = raw.split('#').next().unwrap_or_default();
    unquoted.trim().to_string()
}

/// Unescape up to the closing quote; `None` if the quote never closes
fn unescape_double_quoted(body: &str) -> Option<String> {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => return Some(value),
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some('t') => value.push('\t'),
                Some('"') => value.push('"'),
                Some('\\') => value.push('\\'),
                Some(other) => {
                    value.push('\\');
                    value.push(other);
                }
                None => return None,
            },
            other => value.push(other),
        }
    }
    None
}
