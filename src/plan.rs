//! Edit-plan records and their line notation.
//!
//! A plan is the analyzer listing fed back in, one line per command, in file
//! order:
//!
//! ```text
//! 00000008: C6    1c bytes  06 f2 01 00 ...
//! -0000002c: C1   84 bytes  01 34 00 00 ...
//! ```
//!
//! A leading `-` marks that command for omission. Everything after the
//! `Cnnn` type token is commentary and ignored. Blank lines and `#` comments
//! are skipped. The plan must stay aligned 1:1 with the file's real command
//! sequence; the rewriter cross-checks every line against the stream.

use crate::error::PlanParseError;
use crate::snss::CommandInfo;

/// One planned action for one command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditInstruction {
    /// Absolute offset of the record's size prefix in the input file.
    pub offset: u64,
    /// Expected first payload byte.
    pub command_type: u8,
    /// Drop the record from the output instead of copying it.
    pub should_omit: bool,
}

/// Render one command in plan notation. `list` output is built from this,
/// so a listing can be edited and fed straight back as a plan.
pub fn format_command(info: &CommandInfo) -> String {
    let preview = info
        .preview
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    let ellipsis = if usize::from(info.size) > info.preview.len() {
        " .."
    } else {
        ""
    };
    format!(
        "{:08x}: C{:<3} {:>5} bytes  {}{}",
        info.offset, info.command_type, info.size, preview, ellipsis
    )
}

/// Parse plan text into an ordered instruction list.
pub fn parse_plan(text: &str) -> Result<Vec<EditInstruction>, PlanParseError> {
    let mut instructions = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (should_omit, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        let Some((offset_text, rest)) = rest.split_once(':') else {
            return Err(PlanParseError::Malformed {
                line,
                text: raw.to_string(),
            });
        };

        let offset_text = offset_text.trim();
        if offset_text.len() != 8 || !offset_text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PlanParseError::BadOffset {
                line,
                text: offset_text.to_string(),
            });
        }
        let offset = u64::from_str_radix(offset_text, 16).map_err(|_| PlanParseError::BadOffset {
            line,
            text: offset_text.to_string(),
        })?;

        let Some(type_token) = rest.split_whitespace().next() else {
            return Err(PlanParseError::Malformed {
                line,
                text: raw.to_string(),
            });
        };
        let Some(type_digits) = type_token.strip_prefix('C') else {
            return Err(PlanParseError::Malformed {
                line,
                text: raw.to_string(),
            });
        };
        let command_type = type_digits
            .parse::<u8>()
            .map_err(|_| PlanParseError::BadCommandType {
                line,
                text: type_token.to_string(),
            })?;

        instructions.push(EditInstruction {
            offset,
            command_type,
            should_omit,
        });
    }

    Ok(instructions)
}
