//! Output session-file allocation.
//!
//! Chromium names session files `Session_<id>` / `Tabs_<id>`, where `<id>`
//! is the creation instant in WebKit time: whole microseconds since
//! 1601-01-01 UTC. On restart it loads the file with the largest id, so a
//! redacted copy must get an id strictly above every existing file's and
//! above the current clock reading.
//!
//! Exclusive creation (`create_new`) is the only synchronization primitive:
//! if another process grabs the candidate name first, we bump the id and
//! retry. No lock file, no persistent counter.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

/// Seconds from the WebKit epoch (1601-01-01) to the Unix epoch.
const EPOCH_OFFSET_SECS: u64 = 11_644_473_600;

/// Which of Chromium's two session-file families to name the output after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Session,
    Tabs,
}

impl SessionKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "tabs" => Ok(Self::Tabs),
            _ => anyhow::bail!("Unknown session kind: {s}. Expected: session | tabs"),
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            SessionKind::Session => "Session_",
            SessionKind::Tabs => "Tabs_",
        }
    }
}

/// Current instant in WebKit time, truncated to whole microseconds.
pub fn webkit_now_micros() -> u64 {
    // A clock before 1970 reads as the Unix epoch; the allocator still
    // produces a valid id from the existing-file scan.
    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (EPOCH_OFFSET_SECS + unix.as_secs()) * 1_000_000 + u64::from(unix.subsec_micros())
}

/// Largest id among existing `<prefix><decimal>` entries in `dir`, or 0.
pub fn max_existing_id(dir: &Path, kind: SessionKind) -> Result<u64> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read session directory: {}", dir.display()))?;

    let mut max_id = 0u64;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("read session directory: {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(id_text) = name.strip_prefix(kind.prefix()) else {
            continue;
        };
        if let Ok(id) = id_text.parse::<u64>() {
            max_id = max_id.max(id);
        }
    }
    Ok(max_id)
}

/// Exclusively create `<prefix><id>` at the first free id >= `candidate`.
///
/// `AlreadyExists` means another creator got there first; any other failure
/// (permissions, missing directory) is fatal with no retry.
pub fn create_at_or_above(
    dir: &Path,
    kind: SessionKind,
    mut candidate: u64,
) -> Result<(File, PathBuf)> {
    loop {
        let path = dir.join(format!("{}{}", kind.prefix(), candidate));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => candidate += 1,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("create session file: {}", path.display()))
            }
        }
    }
}

/// Allocate the output file for a given "now" id. Split out from
/// [`allocate`] so the id arithmetic is testable without a real clock.
pub fn allocate_with_now(
    dir: &Path,
    kind: SessionKind,
    now_id: u64,
) -> Result<(File, PathBuf)> {
    let candidate = now_id.max(max_existing_id(dir, kind)? + 1);
    create_at_or_above(dir, kind, candidate)
}

/// Allocate a fresh, exclusively-owned session file in `dir`.
///
/// The chosen id is strictly greater than every existing session file's id
/// and at least the current WebKit-time reading, so the host browser treats
/// the result as the newest session.
pub fn allocate(dir: &Path, kind: SessionKind) -> Result<(File, PathBuf)> {
    allocate_with_now(dir, kind, webkit_now_micros())
}
