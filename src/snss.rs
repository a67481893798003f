//! SNSS command-stream reading and rewriting.
//!
//! SNSS file layout:
//!
//! ```text
//! offset  size  field
//!  0       4    signature   (b"SNSS")
//!  4       4    version     (i32 LE, 1 or 3)
//!  8       ..   records, each: [size u16 LE][payload: `size` bytes]
//! ```
//!
//! The first payload byte of each record is its command type; everything
//! after it is opaque to this crate. The rewriter is a structural filter:
//! output is byte-identical to input except for records an edit plan marks
//! for omission.

use std::io::{Read, Write};

use crate::error::RewriteError;
use crate::plan::EditInstruction;

/// Fixed 4-byte signature at the start of every SNSS file.
pub const SIGNATURE: [u8; 4] = *b"SNSS";

/// Header versions this crate preserves. Version 3 adds payload encryption
/// support in Chromium but the framing is unchanged.
pub const SUPPORTED_VERSIONS: &[i32] = &[1, 3];

/// Signature + version.
pub const HEADER_LEN: u64 = 8;

/// Command type Chromium writes once the initial tab/window state is fully
/// recorded (version 3 files). A v3 file without one was cut off mid-write.
pub const INITIAL_STATE_MARKER: u8 = 255;

/// How the per-record pass treats the stream.
///
/// Selected once before the pass begins; `CopyAll` is a pure pass-through,
/// `FilterByPlan` cross-validates every record against the plan in lockstep.
#[derive(Debug, Clone)]
pub enum RewriteMode {
    CopyAll,
    FilterByPlan(Vec<EditInstruction>),
}

/// What a completed rewrite did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteSummary {
    pub version: i32,
    pub commands_kept: usize,
    pub commands_dropped: usize,
}

/// One command as seen by [`list_commands`]: enough to write an edit plan,
/// nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    /// Absolute offset of the record's size prefix.
    pub offset: u64,
    pub command_type: u8,
    /// Total payload length, type byte included.
    pub size: u16,
    /// Up to the first 16 payload bytes, for display.
    pub preview: Vec<u8>,
}

/// Validate the 8-byte header and return the version.
pub fn read_header<R: Read>(input: &mut R) -> Result<i32, RewriteError> {
    let mut sig = [0u8; 4];
    input.read_exact(&mut sig)?;
    if sig != SIGNATURE {
        return Err(RewriteError::InvalidFormat {
            found: sig,
            expected: SIGNATURE,
        });
    }

    let mut ver = [0u8; 4];
    input.read_exact(&mut ver)?;
    let version = i32::from_le_bytes(ver);
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(RewriteError::UnsupportedVersion {
            found: version,
            supported: SUPPORTED_VERSIONS,
        });
    }

    Ok(version)
}

/// Read the 2-byte LE size prefix of the next record.
///
/// `Ok(None)` is the clean end of the stream: no prefix bytes were available
/// at all. A prefix cut off after one byte is a truncated file, not a clean
/// end.
fn read_size_prefix<R: Read>(input: &mut R, offset: u64) -> Result<Option<u16>, RewriteError> {
    let mut buf = [0u8; 2];
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(RewriteError::Truncation {
                    offset,
                    needed: buf.len(),
                    available: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(u16::from_le_bytes(buf)))
}

/// Read exactly `size` payload bytes, or report how far the stream got.
fn read_payload<R: Read>(
    input: &mut R,
    size: usize,
    offset: u64,
) -> Result<Vec<u8>, RewriteError> {
    let mut payload = vec![0u8; size];
    let mut filled = 0;
    while filled < size {
        match input.read(&mut payload[filled..]) {
            Ok(0) => {
                return Err(RewriteError::Truncation {
                    offset,
                    needed: size,
                    available: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(payload)
}

/// Rewrite an SNSS stream.
///
/// Validates the header, copies it verbatim, then walks every size-prefixed
/// record. With `CopyAll` each record passes through unchanged. With
/// `FilterByPlan` each record is matched against the next instruction:
/// offset and command type must agree exactly, and `should_omit` records are
/// dropped wholesale (size prefix + payload). Any disagreement between plan
/// and stream aborts immediately; nothing is written past the first
/// inconsistency, so a stale plan cannot silently corrupt the output.
pub fn rewrite<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    mode: RewriteMode,
) -> Result<RewriteSummary, RewriteError> {
    let version = read_header(&mut input)?;
    output.write_all(&SIGNATURE)?;
    output.write_all(&version.to_le_bytes())?;

    let mut plan = match mode {
        RewriteMode::CopyAll => None,
        RewriteMode::FilterByPlan(instructions) => Some(instructions.into_iter()),
    };

    let mut offset = HEADER_LEN;
    let mut kept = 0usize;
    let mut dropped = 0usize;

    loop {
        let Some(size) = read_size_prefix(&mut input, offset)? else {
            // Clean end of stream. A plan with instructions left over
            // described commands that never existed.
            if let Some(iter) = &plan {
                if iter.len() > 0 {
                    return Err(RewriteError::PlanTooLong {
                        remaining: iter.len(),
                    });
                }
            }
            break;
        };

        let payload = read_payload(&mut input, size as usize, offset)?;

        // A record's size counts its type byte, so a valid record is never
        // empty.
        let Some(&command_type) = payload.first() else {
            return Err(RewriteError::Truncation {
                offset,
                needed: 1,
                available: 0,
            });
        };

        let omit = match &mut plan {
            None => false,
            Some(iter) => {
                let Some(instruction) = iter.next() else {
                    return Err(RewriteError::PlanTooShort { offset });
                };
                if instruction.offset != offset {
                    return Err(RewriteError::OffsetMismatch {
                        expected: instruction.offset,
                        actual: offset,
                    });
                }
                if instruction.command_type != command_type {
                    return Err(RewriteError::TypeMismatch {
                        offset,
                        expected: instruction.command_type,
                        actual: command_type,
                    });
                }
                instruction.should_omit
            }
        };

        if omit {
            dropped += 1;
        } else {
            output.write_all(&size.to_le_bytes())?;
            output.write_all(&payload)?;
            kept += 1;
        }

        offset += 2 + u64::from(size);
    }

    output.flush()?;
    Ok(RewriteSummary {
        version,
        commands_kept: kept,
        commands_dropped: dropped,
    })
}

/// Walk an SNSS stream and return its version and one [`CommandInfo`] per
/// record, in file order. The output of `snss-redact list` is built from
/// this; edited, it becomes the edit plan fed back into [`rewrite`].
pub fn list_commands<R: Read>(mut input: R) -> Result<(i32, Vec<CommandInfo>), RewriteError> {
    let version = read_header(&mut input)?;

    let mut commands = Vec::new();
    let mut offset = HEADER_LEN;

    while let Some(size) = read_size_prefix(&mut input, offset)? {
        let payload = read_payload(&mut input, size as usize, offset)?;
        let Some(&command_type) = payload.first() else {
            return Err(RewriteError::Truncation {
                offset,
                needed: 1,
                available: 0,
            });
        };

        let preview_len = payload.len().min(16);
        commands.push(CommandInfo {
            offset,
            command_type,
            size,
            preview: payload[..preview_len].to_vec(),
        });

        offset += 2 + u64::from(size);
    }

    Ok((version, commands))
}
