//! envview sessions
//!
//! Binds the engine to a document owned by a host (editor buffer, file on
//! disk) and keeps the effective configuration across overrides and
//! external edits.
//!
//! # Example
//!
//! ```rust,ignore
//! use envview_session::{DocumentSession, SessionConfig};
//!
//! # async fn example(host: impl envview_session::DocumentHost) -> Result<(), envview_session::SessionError> {
//! let (session, diagnostics) = DocumentSession::open(host, SessionConfig::default()).await?;
//! let applied = session.select_mode("env", "prod").await?;
//! println!("changed {} keys", applied.changes.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod host;
pub mod session;

pub use config::SessionConfig;
pub use error::{ConfigError, HostError, SessionError};
pub use host::DocumentHost;
pub use session::{Applied, DocumentSession};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
