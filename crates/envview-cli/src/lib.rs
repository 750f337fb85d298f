//! envview command line
//!
//! A thin file host around [`envview_session`]:
//!
//! - `envview show <FILE> [--json]`
//! - `envview set <FILE> <KEY> <VALUE>`
//! - `envview mode <FILE> <SCOPE.MODE>`

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod file_host;
pub mod render;

pub use cli::{command, Action, Invocation};
pub use file_host::FileHost;

use anyhow::Context;
use envview_engine::OverrideRequest;
use envview_session::{DocumentSession, SessionConfig};
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; logs go to stderr
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("envview=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn session_config(invocation: &Invocation) -> anyhow::Result<SessionConfig> {
    let mut config = match &invocation.config {
        Some(path) => SessionConfig::load(path).await?,
        None => SessionConfig::default(),
    };
    if invocation.legacy_overwritten {
        config.load.legacy_overwritten = true;
    }
    Ok(config)
}

/// Execute an invocation, writing user-facing output to `out`
///
/// # Errors
/// Returns error if the file cannot be read or written, or the override is rejected
pub async fn run(invocation: &Invocation, out: &mut impl Write) -> anyhow::Result<()> {
    let config = session_config(invocation).await?;
    let file = invocation.action.file();
    let host = FileHost::open(file)
        .await
        .with_context(|| format!("failed to open {}", file.display()))?;
    let (session, diagnostics) = DocumentSession::open(host, config).await?;

    let request = match &invocation.action {
        Action::Show { json, .. } => {
            let model = session.model().await;
            let effective = session.effective().await;
            let report = render::Report {
                model: &model,
                effective: &effective,
                diagnostics: &diagnostics,
            };
            if *json {
                render::write_json(out, &report)?;
            } else {
                render::write_text(out, &report)?;
            }
            return Ok(());
        }
        Action::Set { key, value, .. } => OverrideRequest::set_value(key.as_str(), value.as_str()),
        Action::Mode { mode, .. } => OverrideRequest::SelectMode(mode.clone()),
    };

    let applied = session
        .run(request)
        .await
        .with_context(|| format!("failed to update {}", file.display()))?;
    render::write_applied(out, &applied)?;
    Ok(())
}
