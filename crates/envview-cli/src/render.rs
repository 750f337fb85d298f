//! Human and JSON output

use envview_engine::{Diagnostic, InputKind, Model, Template, ValueConstraint};
use envview_session::Applied;
use serde::Serialize;
use std::io::Write;

/// Everything `show` prints
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub model: &'a Model,
    pub effective: &'a Template,
    pub diagnostics: &'a [Diagnostic],
}

fn describe(constraint: &ValueConstraint) -> String {
    let mut parts = vec![constraint.kind.to_string()];
    if constraint.kind == InputKind::Select && !constraint.values.is_empty() {
        parts[0] = format!("select: {}", constraint.values.join(" | "));
    }
    if constraint.flags.constant {
        parts.push("constant".to_string());
    }
    if constraint.flags.disabled {
        parts.push("disabled".to_string());
    }
    parts.join(", ")
}

/// Write the report as indented text
///
/// # Errors
/// Returns error if writing fails
pub fn write_text(out: &mut impl Write, report: &Report<'_>) -> std::io::Result<()> {
    let model = report.model;
    match model.patch_target() {
        Some(target) => writeln!(out, "template (line {}):", target.tag_line + 1)?,
        None => writeln!(out, "template: none")?,
    }
    for (key, value) in report.effective {
        match model.constraint(key) {
            Some(constraint) => writeln!(out, "  {key} = {value}  [{}]", describe(constraint))?,
            None => writeln!(out, "  {key} = {value}")?,
        }
    }

    let scopes = model.scopes();
    if !scopes.is_empty() {
        writeln!(out, "modes:")?;
        for scope in scopes {
            let modes: Vec<&str> = model.modes_in_scope(scope).map(|g| g.id.mode.as_str()).collect();
            writeln!(out, "  {scope}: {}", modes.join(", "))?;
        }
    }

    if !report.diagnostics.is_empty() {
        writeln!(out, "diagnostics:")?;
        for diagnostic in report.diagnostics {
            writeln!(out, "  {diagnostic}")?;
        }
    }
    Ok(())
}

/// Write the report as pretty JSON
///
/// # Errors
/// Returns error if serialization or writing fails
pub fn write_json(out: &mut impl Write, report: &Report<'_>) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Summarize an accepted override
///
/// # Errors
/// Returns error if writing fails
pub fn write_applied(out: &mut impl Write, applied: &Applied) -> std::io::Result<()> {
    if applied.changes.is_empty() {
        return writeln!(out, "no changes");
    }
    for (key, value) in &applied.changes {
        writeln!(out, "{key}={value}")?;
    }
    writeln!(
        out,
        "updated {} key(s), {} line(s) rewritten",
        applied.changes.len(),
        applied.patch.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use envview_engine::Engine;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_report() {
        let loaded = Engine::default().load(envview_test_utils::sample_lines());
        let report = Report {
            model: &loaded.model,
            effective: loaded.model.baseline(),
            diagnostics: &loaded.diagnostics,
        };
        let mut out = Vec::new();
        write_text(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\
template (line 2):
  PORT = 3000  [number, constant]
  NODE_ENV = development  [select: development | production]
  API_URL = http://localhost:4000
  DEBUG = true  [boolean]
modes:
  env: dev, prod
  log: verbose
"
        );
    }

    #[test]
    fn json_report_shape() {
        let loaded = Engine::default().load(envview_test_utils::lines("// @env-template\nA=1\n// @env-bogus\n"));
        let report = Report {
            model: &loaded.model,
            effective: loaded.model.baseline(),
            diagnostics: &loaded.diagnostics,
        };
        let mut out = Vec::new();
        write_json(&mut out, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["effective"]["A"], "1");
        assert_eq!(value["model"]["template"]["A"], "1");
        assert_eq!(value["diagnostics"][0]["kind"], "malformed-tag");
        assert_eq!(value["diagnostics"][0]["line"], 2);
    }
}
