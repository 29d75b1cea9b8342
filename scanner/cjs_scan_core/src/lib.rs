//! Lexical CommonJS export scanner.
//!
//! Inspects CommonJS module source and determines, without building a
//! syntax tree, which names the module exports and which other modules it
//! re-exports from — enough for a loader to synthesize named bindings
//! ahead of execution. One linear pass, bounded memory, no panics on
//! malformed input: structural trouble degrades the scan (see
//! [`ScanFlags`]) instead of aborting it.
//!
//! Detection is heuristic by design. Exports reachable only through
//! complex control or data flow are out of reach of a lexical pass and
//! are documented non-goals.
//!
//! # Example
//!
//! ```
//! use cjs_scan_core::scan_str;
//!
//! let out = scan_str("exports.foo = 1; exports.bar = function () {};")?;
//! assert_eq!(out.exports, ["foo", "bar"]);
//! assert!(out.is_complete());
//! # Ok::<(), cjs_scan_core::ScanError>(())
//! ```

mod cursor;
mod export_scanner;
pub mod flat;
mod nesting;
pub mod patterns;
mod raw_scanner;
mod results;
mod source_buffer;
mod tag;

pub use cursor::Cursor;
pub use export_scanner::ExportScanner;
pub use nesting::{BracketKind, BracketStack, DEFAULT_MAX_DEPTH};
pub use raw_scanner::{slash_starts_regex, PrevSignificant, RawScanner, TEMPLATE_DEPTH_LIMIT};
pub use results::{NameSet, ScanFlags, ScanOutput};
pub use source_buffer::{SourceBuffer, MAX_SOURCE_LEN};
pub use tag::{RawTag, RawToken};

/// How defensively to treat the input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Keep matching patterns after structural desync (default). CommonJS
    /// in the wild is frequently mangled; best-effort wins.
    #[default]
    Tolerant,
    /// Stop recording new detections after the first structural desync.
    /// Everything found up to that point is still returned, flagged
    /// partial.
    Strict,
}

/// Per-scan configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// Tolerant or strict treatment of malformed input.
    pub mode: ScanMode,
    /// Bracket nesting ceiling; `0` selects [`DEFAULT_MAX_DEPTH`].
    pub max_depth: u32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            mode: ScanMode::Tolerant,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Unrecoverable scan failure.
///
/// Malformed *source* is never an error — it degrades (see [`ScanFlags`]).
/// Errors are reserved for violated call contracts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// The input is too large for `u32` position tracking.
    #[error("source length {len} exceeds the supported maximum")]
    SourceTooLarge {
        /// Offending input length in bytes.
        len: usize,
    },
}

/// Scan module source bytes for exported names and re-export specifiers.
///
/// All state lives for this call only; concurrent scans share nothing.
///
/// # Errors
///
/// Returns [`ScanError::SourceTooLarge`] when `source` exceeds
/// [`MAX_SOURCE_LEN`]. Malformed source never errors.
pub fn scan_bytes(source: &[u8], options: &ScanOptions) -> Result<ScanOutput, ScanError> {
    let buffer = SourceBuffer::from_bytes(source)?;
    let matcher = ExportScanner::new(RawScanner::new(buffer.cursor()), options);
    Ok(matcher.run())
}

/// [`scan_bytes`] with default options, for string sources.
///
/// # Errors
///
/// Returns [`ScanError::SourceTooLarge`] for oversized input.
pub fn scan_str(source: &str) -> Result<ScanOutput, ScanError> {
    scan_bytes(source.as_bytes(), &ScanOptions::default())
}
