//! End-to-end runs against files on disk

use envview_cli::{run, Invocation};
use envview_test_utils::SAMPLE;
use pretty_assertions::assert_eq;
use std::path::Path;

async fn invoke(args: &[&str]) -> anyhow::Result<String> {
    let invocation = Invocation::try_parse_from(std::iter::once("envview").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    run(&invocation, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

fn write(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn mode_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), ".env", SAMPLE);

    let out = invoke(&["mode", &file, "env.prod"]).await.unwrap();
    assert!(out.contains("NODE_ENV=production"));
    assert!(out.ends_with("updated 3 key(s), 4 line(s) rewritten\n"));

    let written = std::fs::read_to_string(&file).unwrap();
    let expected = SAMPLE
        .replacen("NODE_ENV=development\nAPI_URL=http://localhost:4000\nDEBUG=true", "NODE_ENV=production\nAPI_URL=https://api.example.com\nDEBUG=false", 1);
    assert_eq!(written, expected);
}

#[tokio::test]
async fn set_quotes_and_keeps_crlf() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), ".env", "// @env-template\r\nGREETING=hi\r\nPORT=1\r\n");

    invoke(&["set", &file, "GREETING", "hello # world"]).await.unwrap();
    let written = std::fs::read_to_string(&file).unwrap();
    assert_eq!(written, "// @env-template\r\nGREETING=\"hello # world\"\r\nPORT=1\r\n");

    let out = invoke(&["show", "--json", &file]).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["effective"]["GREETING"], "hello # world");
}

#[tokio::test]
async fn constant_set_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), ".env", SAMPLE);

    let out = invoke(&["set", &file, "PORT", "1"]).await.unwrap();
    assert_eq!(out, "no changes\n");
    assert_eq!(std::fs::read_to_string(&file).unwrap(), SAMPLE);
}

#[tokio::test]
async fn unknown_mode_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), ".env", SAMPLE);

    let err = invoke(&["mode", &file, "env.staging"]).await.unwrap_err();
    assert!(format!("{err:#}").contains("unknown mode"));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), SAMPLE);
}

#[tokio::test]
async fn legacy_flag_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), ".env", "// @env-template\nA=1\n// @env-overwritten\nA=2\n");
    let config = write(dir.path(), "envview.toml", "[load]\nlegacy_overwritten = true\n");

    invoke(&["--config", &config, "set", &file, "A", "3"]).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "// @env-template\nA=1\n// @env-overwritten\nA=3\n"
    );

    invoke(&["set", &file, "A", "4"]).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "// @env-template\nA=4\n// @env-overwritten\nA=3\n"
    );
}

#[tokio::test]
async fn show_lists_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), ".env", "// @env-template\nA=1\n// @env-overwritten\nA=2\n");

    let out = invoke(&["show", &file]).await.unwrap();
    assert!(out.contains("diagnostics:\n  line 3: legacy section ignored"));

    let out = invoke(&["--legacy-overwritten", "show", &file]).await.unwrap();
    assert!(out.contains("  A = 2\n"));
    assert!(!out.contains("diagnostics:"));
}

#[tokio::test]
async fn missing_file_reports_path() {
    let err = invoke(&["show", "/nonexistent/.env"]).await.unwrap_err();
    assert!(err.to_string().contains("/nonexistent/.env"));
}
