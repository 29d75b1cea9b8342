//! Sentinel-terminated source buffer for zero-bounds-check scanning.
//!
//! The buffer guarantees a `0x00` sentinel byte after the source content,
//! allowing the scanner to detect EOF without explicit bounds checking.
//! The total buffer size is rounded up to the next 64-byte boundary for
//! cache-line alignment, which also provides safe padding for `peek()`
//! and `peek2()` operations near the end of the buffer.
//!
//! Module source arrives from the host as raw bytes; no encoding validation
//! is performed. A leading UTF-8 BOM is detected so the cursor can start
//! past it (CommonJS files written on Windows frequently carry one).

use crate::{Cursor, ScanError};

/// Cache line size in bytes, used for buffer alignment padding.
const CACHE_LINE: usize = 64;

/// Largest accepted source length in bytes.
///
/// Positions are tracked as `u32`; the padding and sentinel must also fit,
/// so the ceiling sits one cache line below `u32::MAX`.
pub const MAX_SOURCE_LEN: usize = (u32::MAX as usize) - CACHE_LINE;

/// Sentinel-terminated source buffer for zero-bounds-check scanning.
///
/// # Layout
///
/// ```text
/// [source_bytes..., 0x00, padding_zeros...]
///  ^                ^     ^
///  0                |     rounded up to 64-byte boundary
///              source_len (sentinel)
/// ```
///
/// The sentinel byte at `source_len` is always `0x00`. All subsequent bytes
/// (cache-line padding) are also `0x00`, ensuring safe reads for `peek()`
/// and `peek2()` near the end of the buffer.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// Owned buffer: `[source_bytes..., 0x00 sentinel, 0x00 padding...]`.
    buf: Vec<u8>,
    /// Length of the actual source content (excludes sentinel and padding).
    source_len: u32,
    /// First byte of actual code: 3 when the source opens with a UTF-8 BOM,
    /// 0 otherwise.
    start: u32,
}

impl SourceBuffer {
    /// Create a new sentinel-terminated buffer from module source bytes.
    ///
    /// Copies the source into a cache-line-aligned buffer with a `0x00`
    /// sentinel byte appended.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::SourceTooLarge`] when `source` exceeds
    /// [`MAX_SOURCE_LEN`] — byte positions are tracked as `u32` and must
    /// not overflow.
    pub fn from_bytes(source: &[u8]) -> Result<Self, ScanError> {
        let source_len = source.len();
        if source_len > MAX_SOURCE_LEN {
            return Err(ScanError::SourceTooLarge { len: source_len });
        }

        // Round up to a 64-byte boundary while reserving a full cache line of
        // padding after the sentinel, so `peek()`/`peek2()` stay in bounds even
        // when the cursor sits on the sentinel at `source_len`.
        let padded_len = (source_len + 1 + CACHE_LINE + CACHE_LINE - 1) & !(CACHE_LINE - 1);

        // Allocate zero-filled buffer, then copy source bytes.
        // The sentinel (buf[source_len]) and padding are already 0x00.
        let mut buf = vec![0u8; padded_len];
        buf[..source_len].copy_from_slice(source);

        let start = if source.starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };

        #[allow(
            clippy::cast_possible_truncation,
            reason = "source_len <= MAX_SOURCE_LEN which fits in u32"
        )]
        let source_len = source_len as u32;

        Ok(Self {
            buf,
            source_len,
            start,
        })
    }

    /// Returns the source bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// Create a [`Cursor`] positioned at the first code byte (past any BOM).
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.source_len, self.start)
    }

    /// Length of the source content in bytes (excludes sentinel and padding).
    pub fn len(&self) -> u32 {
        self.source_len
    }

    /// Returns `true` if the source content is empty.
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }
}

/// Size assertion: Vec<u8> = 24, u32 = 4, u32 = 4 => 32 bytes on 64-bit.
const _: () = assert!(std::mem::size_of::<SourceBuffer>() <= 32);

#[cfg(test)]
mod tests;
