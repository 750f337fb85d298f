//! Document session
//!
//! Owns the state of one open document and serializes override round trips:
//!
//! ```text
//! request -> (verify) -> Engine::apply -> host.apply_patch -> host.save -> host.read_lines -> re-parse
//! ```
//!
//! Only one round trip may be in flight. A second override is rejected with
//! [`SessionError::Busy`]; external-change notifications wait for the round
//! trip to finish and then re-parse. An override arriving during a reload
//! waits for it instead of failing.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::host::DocumentHost;
use envview_document::{LineDocument, PatchSet};
use envview_engine::{ChangeRecord, Diagnostic, Engine, Loaded, Model, ModeId, OverrideRequest, Template};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of an accepted override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Patch handed to the host; empty for a no-op
    pub patch: PatchSet,
    /// Keys whose values were accepted
    pub changes: ChangeRecord,
}

#[derive(Debug)]
struct SessionState {
    loaded: Loaded,
    effective: Template,
    last_change: ChangeRecord,
}

impl SessionState {
    fn new(loaded: Loaded) -> Self {
        let effective = loaded.model.baseline().clone();
        Self {
            loaded,
            effective,
            last_change: ChangeRecord::new(),
        }
    }

    /// Replace the model, resetting the effective configuration to its baseline
    fn replace(&mut self, loaded: Loaded) {
        self.effective = loaded.model.baseline().clone();
        self.loaded = loaded;
    }
}

/// One open annotated document
#[derive(Debug)]
pub struct DocumentSession<H> {
    host: H,
    engine: Engine,
    config: SessionConfig,
    /// Held for the whole override round trip
    in_flight: Mutex<()>,
    state: Mutex<SessionState>,
}

impl<H: DocumentHost> DocumentSession<H> {
    /// Read the document from `host` and parse it
    ///
    /// # Errors
    /// Returns `SessionError::Host` if the host cannot be read
    pub async fn open(host: H, config: SessionConfig) -> Result<(Self, Vec<Diagnostic>), SessionError> {
        let engine = Engine::new(config.load.clone());
        let lines = host.read_lines().await?;
        let loaded = engine.load(lines);
        let diagnostics = loaded.diagnostics.clone();
        tracing::info!(
            keys = loaded.model.template().len(),
            modes = loaded.model.modes().len(),
            "opened document session"
        );

        let session = Self {
            host,
            engine,
            config,
            in_flight: Mutex::new(()),
            state: Mutex::new(SessionState::new(loaded)),
        };
        Ok((session, diagnostics))
    }

    /// Set one key
    ///
    /// # Errors
    /// - `SessionError::Busy` if another override is in flight
    /// - `SessionError::Override` if the key is not in the template
    /// - `SessionError::Patch` / `SessionError::Host` if writing back fails
    pub async fn set_value(&self, key: impl Into<String>, value: impl Into<String>) -> Result<Applied, SessionError> {
        self.run(OverrideRequest::set_value(key, value)).await
    }

    /// Apply a mode's overrides
    ///
    /// # Errors
    /// - `SessionError::Busy` if another override is in flight
    /// - `SessionError::Override` if the mode does not exist
    /// - `SessionError::Patch` / `SessionError::Host` if writing back fails
    pub async fn select_mode(&self, scope: impl Into<String>, mode: impl Into<String>) -> Result<Applied, SessionError> {
        self.run(OverrideRequest::SelectMode(ModeId::new(scope, mode))).await
    }

    /// Run any override request
    ///
    /// # Errors
    /// See [`set_value`](Self::set_value) and [`select_mode`](Self::select_mode)
    pub async fn run(&self, request: OverrideRequest) -> Result<Applied, SessionError> {
        let _in_flight = self.in_flight.try_lock().map_err(|_| {
            tracing::debug!("rejecting override while another is in flight");
            SessionError::Busy
        })?;
        let mut state = self.state.lock().await;

        if self.config.verify_before_override {
            let current = LineDocument::from_lines(self.host.read_lines().await?);
            if current.hash() != state.loaded.model.document().hash() {
                tracing::warn!(hash = %current.hash().short(), "document changed outside session, re-parsing");
                state.replace(self.engine.load_document(current));
            }
        }

        let model = Arc::clone(&state.loaded.model);
        let edit = self.engine.apply(&model, &state.effective, &request)?;

        if edit.is_noop() {
            tracing::debug!(?request, "override changed nothing");
            state.effective = edit.effective;
            state.last_change = edit.changes;
            return Ok(Applied {
                patch: edit.patch,
                changes: ChangeRecord::new(),
            });
        }

        let patch = if self.config.minimal_patches {
            edit.patch.retain_changed(model.document())
        } else {
            edit.patch
        };

        self.host.apply_patch(&patch).await?;
        self.host.save().await?;
        let loaded = self.engine.load(self.host.read_lines().await?);

        tracing::info!(
            changes = edit.changes.len(),
            instructions = patch.len(),
            "applied override"
        );

        state.loaded = loaded;
        state.effective = edit.effective;
        state.last_change = edit.changes.clone();
        Ok(Applied {
            patch,
            changes: edit.changes,
        })
    }

    /// Notify the session that the document content changed
    ///
    /// Content identical to the current model (the echo of our own save) keeps
    /// the effective configuration; anything else re-parses.
    ///
    /// # Errors
    /// Currently infallible; kept fallible for hosts that validate lines
    pub async fn on_external_change(&self, lines: Vec<String>) -> Result<Vec<Diagnostic>, SessionError> {
        let document = LineDocument::from_lines(lines);
        let mut state = self.state.lock().await;
        Ok(self.refresh(&mut state, document))
    }

    /// Re-read the document from the host
    ///
    /// # Errors
    /// Returns `SessionError::Host` if the host cannot be read
    pub async fn reload(&self) -> Result<Vec<Diagnostic>, SessionError> {
        let mut state = self.state.lock().await;
        let document = LineDocument::from_lines(self.host.read_lines().await?);
        Ok(self.refresh(&mut state, document))
    }

    fn refresh(&self, state: &mut SessionState, document: LineDocument) -> Vec<Diagnostic> {
        if document.hash() == state.loaded.model.document().hash() {
            tracing::debug!("document unchanged, keeping effective configuration");
            return state.loaded.diagnostics.clone();
        }

        tracing::warn!(hash = %document.hash().short(), "external edit detected, re-parsing");
        state.replace(self.engine.load_document(document));
        state.loaded.diagnostics.clone()
    }

    /// Current effective configuration
    pub async fn effective(&self) -> Template {
        self.state.lock().await.effective.clone()
    }

    /// Change record of the most recent override
    pub async fn last_change(&self) -> ChangeRecord {
        self.state.lock().await.last_change.clone()
    }

    /// Current model
    pub async fn model(&self) -> Arc<Model> {
        Arc::clone(&self.state.lock().await.loaded.model)
    }

    /// The host this session edits
    #[inline]
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }
}
