//! Session round trips against an in-memory host

use envview_document::PatchError;
use envview_engine::{DiagnosticKind, LoadOptions, ModeId, OverrideError, PatchGenError, TagKind};
use envview_session::{DocumentSession, HostError, SessionConfig, SessionError};
use envview_test_utils::{lines, sample_lines, MemoryHost};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

async fn open(host: MemoryHost) -> DocumentSession<MemoryHost> {
    open_with(host, SessionConfig::default()).await
}

async fn open_with(host: MemoryHost, config: SessionConfig) -> DocumentSession<MemoryHost> {
    let (session, diagnostics) = DocumentSession::open(host, config).await.unwrap();
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    session
}

#[tokio::test]
async fn open_exposes_model() {
    let session = open(MemoryHost::new(sample_lines())).await;
    let model = session.model().await;

    let keys: Vec<_> = model.template().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["PORT", "NODE_ENV", "API_URL", "DEBUG"]);
    assert_eq!(model.scopes(), vec!["env", "log"]);
    assert_eq!(model.modes_in_scope("env").count(), 2);
    assert_eq!(
        model.constraint("NODE_ENV").unwrap().values,
        vec!["development".to_string(), "production".to_string()]
    );
    assert!(model.is_constant("PORT"));
    assert_eq!(&session.effective().await, model.baseline());
    assert!(session.last_change().await.is_empty());
}

#[tokio::test]
async fn select_mode_writes_template_block() {
    let session = open(MemoryHost::new(sample_lines())).await;
    let applied = session.select_mode("env", "prod").await.unwrap();

    let changed: Vec<_> = applied.changes.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        changed,
        vec![
            ("NODE_ENV", "production"),
            ("API_URL", "https://api.example.com"),
            ("DEBUG", "false"),
        ]
    );
    assert_eq!(applied.patch.len(), 4);
    assert_eq!(applied.patch.line_range(), Some(2..6));

    let host = session.host();
    assert_eq!(host.save_count(), 1);
    let saved = host.saved();
    assert_eq!(&saved[2..6], &["PORT=3000", "NODE_ENV=production", "API_URL=https://api.example.com", "DEBUG=false"]);
    assert_eq!(saved.len(), sample_lines().len());

    let effective = session.effective().await;
    assert_eq!(effective["NODE_ENV"], "production");
    assert_eq!(session.last_change().await, applied.changes);
    assert_eq!(session.model().await.baseline(), &effective);
}

#[tokio::test]
async fn constant_write_is_silent_noop() {
    let session = open(MemoryHost::new(sample_lines())).await;
    let applied = session.set_value("PORT", "9999").await.unwrap();

    assert!(applied.patch.is_empty());
    assert!(applied.changes.is_empty());
    assert_eq!(session.host().patch_count(), 0);
    assert_eq!(session.host().save_count(), 0);
    assert_eq!(session.effective().await["PORT"], "3000");
}

#[tokio::test]
async fn unknown_key_and_mode_are_rejected() {
    let session = open(MemoryHost::new(sample_lines())).await;

    let err = session.set_value("MISSING", "1").await.unwrap_err();
    assert!(matches!(err, SessionError::Override(OverrideError::UnknownKey(k)) if k == "MISSING"));

    let err = session.select_mode("env", "staging").await.unwrap_err();
    assert!(matches!(err, SessionError::Override(OverrideError::UnknownMode(id)) if id == ModeId::new("env", "staging")));
    assert_eq!(session.host().save_count(), 0);
}

#[tokio::test]
async fn concurrent_override_is_busy() {
    let host = MemoryHost::new(sample_lines()).with_delay(Duration::from_millis(200));
    let session = open(host).await;

    let (first, second) = tokio::join!(session.select_mode("env", "prod"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.set_value("DEBUG", "true").await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(SessionError::Busy)));
    assert_eq!(session.host().save_count(), 1);
}

#[tokio::test]
async fn override_during_reload_waits_instead_of_busy() {
    let host = MemoryHost::new(sample_lines()).with_read_delay(Duration::from_millis(100));
    let session = open(host).await;
    session.host().edit_line(4, "API_URL=http://other:9000");

    let (reloaded, applied) = tokio::join!(session.reload(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.set_value("DEBUG", "false").await
    });

    assert!(reloaded.unwrap().is_empty());
    let applied = applied.unwrap();
    assert_eq!(applied.changes["DEBUG"], "false");
    let saved = session.host().saved();
    assert_eq!(saved[4], "API_URL=http://other:9000");
    assert_eq!(saved[5], "DEBUG=false");
}

#[tokio::test]
async fn repeated_template_key_is_not_written() {
    let text = "// @env-template\nA=1\nB=2\nA=3\n";
    let (session, diagnostics) = DocumentSession::open(MemoryHost::new(lines(text)), SessionConfig::default())
        .await
        .unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::DuplicateKey);

    let err = session.set_value("A", "9").await.unwrap_err();
    assert!(matches!(err, SessionError::Patch(PatchGenError::RepeatedKeys { assignments: 3, keys: 2, .. })));
    assert_eq!(session.host().patch_count(), 0);
    assert_eq!(session.host().saved(), lines(text));
    assert_eq!(session.effective().await["A"], "3");
}

#[tokio::test]
async fn external_change_waits_for_round_trip() {
    let host = MemoryHost::new(sample_lines()).with_delay(Duration::from_millis(100));
    let session = open(host).await;

    let mut after_save = sample_lines();
    after_save[3] = "NODE_ENV=production".to_string();
    after_save[4] = "API_URL=https://api.example.com".to_string();
    after_save[5] = "DEBUG=false".to_string();

    let (applied, diagnostics) = tokio::join!(session.select_mode("env", "prod"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.on_external_change(after_save).await
    });

    applied.unwrap();
    assert!(diagnostics.unwrap().is_empty());
    assert_eq!(session.effective().await["NODE_ENV"], "production");
    assert_eq!(session.model().await.document().lines(), session.host().saved().as_slice());
}

#[tokio::test]
async fn echo_of_own_save_keeps_model() {
    let session = open(MemoryHost::new(sample_lines())).await;
    session.select_mode("env", "prod").await.unwrap();

    let before = session.model().await;
    session.on_external_change(session.host().saved()).await.unwrap();
    assert!(Arc::ptr_eq(&before, &session.model().await));
}

#[tokio::test]
async fn external_edit_reparses() {
    let session = open(MemoryHost::new(sample_lines())).await;
    session.host().edit_line(3, "NODE_ENV=staging");

    let diagnostics = session.on_external_change(session.host().buffer()).await.unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(session.effective().await["NODE_ENV"], "staging");
}

#[tokio::test]
async fn reload_reads_host() {
    let session = open(MemoryHost::new(sample_lines())).await;
    session.host().edit_line(5, "DEBUG=false");
    session.host().edit_line(21, "// @env-bogus");

    let diagnostics = session.reload().await.unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedTag);
    assert_eq!(diagnostics[0].line, 21);
    assert_eq!(session.effective().await["DEBUG"], "false");
}

#[tokio::test]
async fn unnotified_edit_is_picked_up_before_override() {
    let session = open(MemoryHost::new(sample_lines())).await;
    session.host().edit_line(4, "API_URL=http://other:9000");

    session.set_value("DEBUG", "false").await.unwrap();

    let saved = session.host().saved();
    assert_eq!(saved[4], "API_URL=http://other:9000");
    assert_eq!(saved[5], "DEBUG=false");
}

#[tokio::test]
async fn unverified_stale_patch_is_rejected_by_host() {
    let config = SessionConfig::default().with_verify_before_override(false);
    let session = open_with(MemoryHost::new(sample_lines()), config).await;
    session.host().edit_line(4, "API_URL=http://other:9000");

    let err = session.set_value("DEBUG", "false").await.unwrap_err();
    assert!(matches!(err, SessionError::Host(HostError::Patch(PatchError::BaseMismatch { .. }))));
    assert!(err.is_retryable());
    assert_eq!(session.host().save_count(), 0);
}

#[tokio::test]
async fn minimal_patches_drop_unchanged_lines() {
    let config = SessionConfig::default().with_minimal_patches(true);
    let session = open_with(MemoryHost::new(sample_lines()), config).await;

    let applied = session.select_mode("env", "prod").await.unwrap();
    let indices: Vec<_> = applied.patch.instructions().iter().map(|p| p.line_index).collect();
    assert_eq!(indices, vec![3, 4, 5]);
    assert_eq!(session.host().saved()[2], "PORT=3000");
}

#[tokio::test]
async fn modes_merge_without_reverting() {
    let session = open(MemoryHost::new(sample_lines())).await;
    session.select_mode("env", "prod").await.unwrap();
    session.select_mode("env", "dev").await.unwrap();

    let effective = session.effective().await;
    assert_eq!(effective["NODE_ENV"], "development");
    assert_eq!(effective["API_URL"], "http://localhost:4000");
    assert_eq!(effective["DEBUG"], "false");
}

#[tokio::test]
async fn failed_save_leaves_state() {
    let session = open(MemoryHost::new(sample_lines()).with_failing_saves()).await;

    let err = session.select_mode("env", "prod").await.unwrap_err();
    assert!(matches!(err, SessionError::Host(HostError::Other(_))));
    assert_eq!(session.effective().await["NODE_ENV"], "development");
    assert!(session.last_change().await.is_empty());
}

#[tokio::test]
async fn legacy_overwritten_session() {
    let text = "\
// @env-template
A=1
B=1
// @env-overwritten
A=2
B=1
";
    let config = SessionConfig::default().with_load_options(LoadOptions::new().with_legacy_overwritten(true));
    let session = open_with(MemoryHost::new(lines(text)), config).await;

    let model = session.model().await;
    assert_eq!(model.patch_target().unwrap().section, TagKind::Overwritten);
    assert_eq!(session.effective().await["A"], "2");

    session.set_value("B", "5").await.unwrap();
    let saved = session.host().saved();
    assert_eq!(saved, lines("// @env-template\nA=1\nB=1\n// @env-overwritten\nA=2\nB=5\n"));
}

#[tokio::test]
async fn legacy_block_reported_when_disabled() {
    let (session, diagnostics) = DocumentSession::open(
        MemoryHost::new(lines("// @env-template\nA=1\n// @env-overwritten\nA=2\n")),
        SessionConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::LegacySectionIgnored);
    assert_eq!(session.effective().await["A"], "1");
}
