//! Engine - main entry point
//!
//! Provides the load and override operations:
//! - lines -> [`Model`] + diagnostics (sectionize, then section parsers)
//! - model + effective configuration + request -> [`Edit`]
//!
//! ```text
//! lines -> Sectionizer -> Section Parsers -> Model
//!                                              |
//!             request -> Override Engine -> effective -> Patch Generator -> PatchSet
//! ```

use crate::cache::ModelCache;
use crate::error::{Diagnostic, DiagnosticKind, EngineResult};
use crate::model::{ChangeRecord, Model, PatchTarget, Template};
use crate::overrides::{compute_override, OverrideRequest};
use crate::parsers::{ModeParser, SectionParser, TemplateParser, ValueParser};
use crate::patch::generate_patch;
use crate::sectionizer::{sectionize, Sections};
use crate::tag::TagKind;
use envview_document::{LineDocument, PatchSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Options fixed at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Apply the deprecated `env-overwritten` block and patch it instead of the template
    pub legacy_overwritten: bool,
    /// Maximum number of parsed models kept in the cache
    pub cache_capacity: u64,
}

impl LoadOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With legacy overwritten compatibility
    #[inline]
    #[must_use]
    pub fn with_legacy_overwritten(mut self, enabled: bool) -> Self {
        self.legacy_overwritten = enabled;
        self
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            legacy_overwritten: false,
            cache_capacity: 64,
        }
    }
}

/// Result of a load: the model and everything worth telling the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub model: Arc<Model>,
    /// Informational, ordered by line
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of an accepted override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Effective configuration once the patch lands
    pub effective: Template,
    /// Accepted changes; empty for a no-op
    pub changes: ChangeRecord,
    /// Line replacements; empty exactly when `changes` is empty
    pub patch: PatchSet,
}

impl Edit {
    /// Whether nothing needs to be written
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

fn run<P: SectionParser>(parser: &P, sections: &Sections<'_>, diagnostics: &mut Vec<Diagnostic>) -> P::Output {
    parser.parse(sections.groups(parser.kind()), diagnostics)
}

/// Parse a document into a model, uncached
#[must_use]
pub fn parse_document(document: LineDocument, options: &LoadOptions) -> Loaded {
    let mut diagnostics = Vec::new();

    let (template, overwritten, modes, constraints) = {
        let sections = sectionize(document.lines(), &mut diagnostics);
        (
            run(&TemplateParser::template(), &sections, &mut diagnostics),
            run(&TemplateParser::overwritten(), &sections, &mut diagnostics),
            run(&ModeParser, &sections, &mut diagnostics),
            run(&ValueParser, &sections, &mut diagnostics),
        )
    };

    let mut patch_target = template.as_ref().map(|t| PatchTarget {
        section: TagKind::Template,
        tag_line: t.tag_line,
        assignment_lines: t.assignment_lines,
    });
    let template = template.map(|t| t.values).unwrap_or_default();
    let mut baseline = template.clone();

    if let Some(block) = overwritten {
        if options.legacy_overwritten {
            let is_constant = |key: &str| constraints.get(key).is_some_and(|c| c.flags.constant);
            for (key, value) in block.values {
                match baseline.get_mut(&key) {
                    Some(slot) if !is_constant(&key) => *slot = value,
                    Some(_) => tracing::debug!(%key, "overwritten block skips constant key"),
                    None => tracing::debug!(%key, "overwritten block names key outside template"),
                }
            }
            patch_target = Some(PatchTarget {
                section: TagKind::Overwritten,
                tag_line: block.tag_line,
                assignment_lines: block.assignment_lines,
            });
        } else {
            tracing::warn!(line = block.tag_line, "legacy overwritten section ignored");
            diagnostics.push(Diagnostic::new(
                block.tag_line,
                DiagnosticKind::LegacySectionIgnored,
                format!("'@{}' is ignored unless legacy mode is enabled", TagKind::Overwritten),
            ));
        }
    }

    diagnostics.sort_by_key(|d| d.line);

    let model = Model::new(document, template, modes, constraints, baseline, patch_target);
    Loaded {
        model: Arc::new(model),
        diagnostics,
    }
}

/// Compute an override and the patch that writes it back
///
/// No-op requests yield an empty patch and never fail on layout.
///
/// # Errors
/// - `EngineError::Override` for unknown modes or keys
/// - `EngineError::Patch` if the template layout cannot be patched
pub fn apply_override(model: &Model, effective: &Template, request: &OverrideRequest) -> EngineResult<Edit> {
    let outcome = compute_override(model, effective, request)?;
    let patch = if outcome.is_noop() {
        PatchSet::empty(*model.document().hash())
    } else {
        generate_patch(model, &outcome.effective)?
    };

    Ok(Edit {
        effective: outcome.effective,
        changes: outcome.changes,
        patch,
    })
}

/// Loads documents with fixed options and a parsed-model cache
#[derive(Debug, Clone)]
pub struct Engine {
    options: LoadOptions,
    cache: ModelCache,
}

impl Engine {
    /// Create engine
    #[must_use]
    pub fn new(options: LoadOptions) -> Self {
        let cache = ModelCache::new(options.cache_capacity);
        Self { options, cache }
    }

    /// Parse raw lines
    #[must_use]
    pub fn load(&self, lines: Vec<String>) -> Loaded {
        self.load_document(LineDocument::from_lines(lines))
    }

    /// Parse a document, reusing a cached model for identical content
    #[must_use]
    pub fn load_document(&self, document: LineDocument) -> Loaded {
        let hash = *document.hash();
        if let Some(hit) = self.cache.get(&hash) {
            tracing::debug!(hash = %hash.short(), "model cache hit");
            if hit.model.document() == &document {
                return hit;
            }
            return Loaded {
                model: Arc::new(hit.model.with_document(document)),
                diagnostics: hit.diagnostics,
            };
        }

        let loaded = parse_document(document, &self.options);
        let model = &loaded.model;
        tracing::info!(
            hash = %hash.short(),
            lines = model.document().len(),
            keys = model.template().len(),
            modes = model.modes().len(),
            constraints = model.constraints().len(),
            diagnostics = loaded.diagnostics.len(),
            "parsed document"
        );

        self.cache.insert(hash, loaded.clone());
        loaded
    }

    /// Apply an override against a model
    ///
    /// # Errors
    /// See [`apply_override`]
    pub fn apply(&self, model: &Model, effective: &Template, request: &OverrideRequest) -> EngineResult<Edit> {
        apply_override(model, effective, request)
    }

    /// Parsed-model cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}
