//! Testing utilities for the envview workspace
//!
//! Shared fixtures and an in-memory [`DocumentHost`].

#![allow(missing_docs)]

use async_trait::async_trait;
use envview_document::{LineDocument, PatchSet};
use envview_session::{DocumentHost, HostError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Annotated document exercising every section kind
pub const SAMPLE: &str = "\
# Service configuration
// @env-template
PORT=3000
NODE_ENV=development
API_URL=http://localhost:4000
DEBUG=true

// @env-mode:env.dev
// NODE_ENV=development
// API_URL=http://localhost:4000

// @env-mode:env.prod
// NODE_ENV=production
// API_URL=https://api.example.com
// DEBUG=false

// @env-mode:log.verbose
// DEBUG=true

// @env-value:(NODE_ENV)(select)
// development, production
// @env-value:DEBUG(boolean)
// @env-value:PORT(number constant)
";

/// Split text into lines without terminators
pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

pub fn sample_lines() -> Vec<String> {
    lines(SAMPLE)
}

/// In-memory host
///
/// Patches are validated against the buffer's hash like a real editor would.
/// The saved snapshot only changes on [`DocumentHost::save`].
#[derive(Debug, Default)]
pub struct MemoryHost {
    buffer: Mutex<Vec<String>>,
    saved: Mutex<Vec<String>>,
    saves: AtomicUsize,
    patches: AtomicUsize,
    delay: Option<Duration>,
    read_delay: Option<Duration>,
    fail_saves: bool,
}

impl MemoryHost {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            buffer: Mutex::new(lines.clone()),
            saved: Mutex::new(lines),
            ..Self::default()
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(lines(text))
    }

    /// Sleep this long inside `apply_patch`
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep this long inside `read_lines`
    #[must_use]
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Make every `save` fail
    #[must_use]
    pub fn with_failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Simulate an edit made outside the session
    pub fn edit_line(&self, index: usize, text: &str) {
        self.buffer.lock()[index] = text.to_string();
    }

    pub fn buffer(&self) -> Vec<String> {
        self.buffer.lock().clone()
    }

    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn patch_count(&self) -> usize {
        self.patches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentHost for MemoryHost {
    async fn read_lines(&self) -> Result<Vec<String>, HostError> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.buffer())
    }

    async fn apply_patch(&self, patch: &PatchSet) -> Result<(), HostError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut buffer = self.buffer.lock();
        let current = LineDocument::from_lines(buffer.clone());
        *buffer = patch.apply_to(&current)?.into_lines();
        self.patches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save(&self) -> Result<(), HostError> {
        if self.fail_saves {
            return Err(HostError::Other("disk full".to_string()));
        }
        *self.saved.lock() = self.buffer();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
