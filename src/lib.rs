//! SNSS session-file redaction.
//!
//! This crate edits Chrome/Chromium SNSS session-restore files: it drops
//! selected command records (visited URLs, navigations) while keeping the
//! file byte-identical otherwise, so the browser still loads the result.
//!
//! - [`snss`] — header validation and the command-stream rewriter
//! - [`plan`] — edit-plan records and their line notation
//! - [`session_path`] — collision-safe, WebKit-time-named output files
//! - [`error`] — the structural failure taxonomy
//!
//! The rewriter never interprets command payloads beyond their first byte
//! (the command type); it is a structural filter, not an SNSS decoder.

pub mod error;
pub mod plan;
pub mod session_path;
pub mod snss;

pub use error::{PlanParseError, RewriteError};
pub use plan::EditInstruction;
pub use snss::{RewriteMode, RewriteSummary};
