//! envview engine
//!
//! Reads an env file annotated with `// @env-*` comment tags, exposes the
//! structure those tags describe, and turns user overrides into line patches
//! that write the new effective values back into the file.
//!
//! # Core Operations
//!
//! - **Load**: lines -> [`Model`] (template, modes, value constraints) + diagnostics
//! - **Override**: set a value or select a mode -> effective configuration + change record
//! - **Patch**: effective configuration -> [`PatchSet`] of whole-line replacements
//!
//! # Architecture
//!
//! ```text
//! lines -> sectionize -> TemplateParser / ModeParser / ValueParser -> Model
//!                                                                      |
//!                             OverrideRequest -> compute_override -> generate_patch -> PatchSet
//!                                  ModelCache (content-addressed) ___|
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use envview_engine::{Engine, LoadOptions, OverrideRequest};
//!
//! let engine = Engine::new(LoadOptions::default());
//! let loaded = engine.load(lines);
//! let model = &loaded.model;
//! let edit = engine.apply(model, model.baseline(), &OverrideRequest::select_mode("env", "prod"))?;
//! host.apply_patch(&edit.patch).await?;
//! ```
//!
//! [`PatchSet`]: envview_document::PatchSet

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod engine;
pub mod error;
pub mod model;
pub mod overrides;
pub mod parsers;
pub mod patch;
pub mod sectionizer;
pub mod tag;

pub use cache::ModelCache;
pub use engine::{apply_override, parse_document, Edit, Engine, LoadOptions, Loaded};
pub use error::{Diagnostic, DiagnosticKind, EngineError, EngineResult, OverrideError, PatchGenError, TagError};
pub use model::{
    ChangeRecord, ConstraintFlags, InputKind, ModeGroup, ModeId, Model, PatchTarget, Template, ValueConstraint,
};
pub use overrides::{compute_override, OverrideOutcome, OverrideRequest};
pub use patch::generate_patch;
pub use tag::TagKind;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the engine
    pub use crate::engine::{Edit, Engine, LoadOptions, Loaded};
    pub use crate::error::{Diagnostic, EngineError, OverrideError, PatchGenError};
    pub use crate::model::{ModeId, Model, Template};
    pub use crate::overrides::OverrideRequest;
    pub use envview_document::{ContentHash, LineDocument, LinePatch, PatchSet};
}
