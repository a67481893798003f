#![no_main]
use libfuzzer_sys::fuzz_target;

use snss_redact::snss::{rewrite, RewriteMode};

/// Fuzz the SNSS rewriter with arbitrary bytes.
///
/// Pass-through mode exercises header validation and the full record walk
/// against malformed, truncated, and hostile inputs. The rewriter must never
/// panic — only return `Ok` or `Err`.
fuzz_target!(|data: &[u8]| {
    let mut out = Vec::new();
    let _ = rewrite(std::io::Cursor::new(data), &mut out, RewriteMode::CopyAll);
});
