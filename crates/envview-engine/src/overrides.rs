//! Override engine
//!
//! Computes a new effective configuration from a [`Model`], the current
//! effective configuration and one [`OverrideRequest`]. Pure: nothing here
//! touches the document lines.
//!
//! Constants are filtered out of every incoming change, so for a key flagged
//! `constant` the effective value always stays the one first parsed.

use crate::error::OverrideError;
use crate::model::{ChangeRecord, ModeId, Model, Template};
use serde::{Deserialize, Serialize};

/// A requested change to the effective configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRequest {
    /// Set one key
    SetValue { key: String, value: String },
    /// Merge a mode's overrides over the effective configuration
    SelectMode(ModeId),
}

impl OverrideRequest {
    /// Request to set one key
    #[inline]
    #[must_use]
    pub fn set_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Request to select `scope.mode`
    #[inline]
    #[must_use]
    pub fn select_mode(scope: impl Into<String>, mode: impl Into<String>) -> Self {
        Self::SelectMode(ModeId::new(scope, mode))
    }
}

/// Effective configuration after an override, plus what changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideOutcome {
    pub effective: Template,
    /// Accepted changes; empty when the request was a no-op
    pub changes: ChangeRecord,
}

impl OverrideOutcome {
    /// Whether the request changed nothing
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Apply one override request
///
/// # Errors
/// - `OverrideError::UnknownMode` if the mode group does not exist
/// - `OverrideError::UnknownKey` if `SetValue` names a key outside the template
pub fn compute_override(
    model: &Model,
    effective: &Template,
    request: &OverrideRequest,
) -> Result<OverrideOutcome, OverrideError> {
    let candidate = match request {
        OverrideRequest::SetValue { key, value } => {
            if model.is_constant(key) {
                tracing::debug!(%key, "ignoring write to constant key");
                ChangeRecord::new()
            } else if !effective.contains_key(key) {
                return Err(OverrideError::UnknownKey(key.clone()));
            } else {
                ChangeRecord::from([(key.clone(), value.clone())])
            }
        }
        OverrideRequest::SelectMode(id) => {
            let group = model
                .mode(id)
                .ok_or_else(|| OverrideError::UnknownMode(id.clone()))?;
            filter_candidate(model, effective, &group.overrides)
        }
    };

    let mut next = effective.clone();
    for (key, value) in &candidate {
        if let Some(slot) = next.get_mut(key) {
            slot.clone_from(value);
        }
    }

    Ok(OverrideOutcome {
        effective: next,
        changes: candidate,
    })
}

/// Drop constants and keys the template does not hold
fn filter_candidate(model: &Model, effective: &Template, overrides: &Template) -> ChangeRecord {
    overrides
        .iter()
        .filter(|(key, _)| {
            if model.is_constant(key) {
                tracing::debug!(%key, "mode override skips constant key");
                return false;
            }
            if !effective.contains_key(*key) {
                tracing::debug!(%key, "mode override names key outside template");
                return false;
            }
            true
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
