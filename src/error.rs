//! Error taxonomy for the rewriter and the plan parser.
//!
//! Every structural failure is a distinct variant carrying the offset and
//! the expected/actual values involved, so a stale or mismatched edit plan
//! can be diagnosed from the error alone.

use thiserror::Error;

/// Structural failures raised while validating or rewriting an SNSS stream.
///
/// All of these are fatal: the rewrite aborts on the first one and nothing
/// further is written.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The first four bytes were not the SNSS signature.
    #[error("not an SNSS file: signature {found:02x?} (expected {expected:02x?})")]
    InvalidFormat { found: [u8; 4], expected: [u8; 4] },

    /// The header version is not one we know how to preserve.
    #[error("unsupported SNSS version {found} (expected one of {supported:?})")]
    UnsupportedVersion { found: i32, supported: &'static [i32] },

    /// A record declared more bytes than the stream could supply.
    #[error("truncated record at offset {offset:#010x}: needed {needed} bytes, stream had {available}")]
    Truncation {
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// A command exists beyond the end of the edit plan.
    #[error("edit plan too short: command at offset {offset:#010x} has no instruction")]
    PlanTooShort { offset: u64 },

    /// The edit plan still has instructions after the input ran out.
    #[error("edit plan too long: {remaining} instruction(s) left after the last command")]
    PlanTooLong { remaining: usize },

    /// Plan and stream disagree on where a record starts.
    #[error("offset mismatch: plan says {expected:#010x}, stream is at {actual:#010x}")]
    OffsetMismatch { expected: u64, actual: u64 },

    /// Plan and stream disagree on a record's command type.
    #[error("command type mismatch at offset {offset:#010x}: plan says {expected}, stream has {actual}")]
    TypeMismatch {
        offset: u64,
        expected: u8,
        actual: u8,
    },

    /// Underlying read/write failure, propagated as-is.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures while parsing the textual edit-plan notation.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("plan line {line}: expected `OFFSET: Cnnn ...`, got {text:?}")]
    Malformed { line: usize, text: String },

    #[error("plan line {line}: offset must be 8 hex digits, got {text:?}")]
    BadOffset { line: usize, text: String },

    #[error("plan line {line}: command type must be 0-255, got {text:?}")]
    BadCommandType { line: usize, text: String },
}
