#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn empty_source() {
    let buf = SourceBuffer::from_bytes(b"").expect("empty source is valid");
    assert_eq!(buf.len(), 0);
    assert!(buf.is_empty());
    assert_eq!(buf.as_bytes(), b"");
}

#[test]
fn sentinel_follows_content() {
    let buf = SourceBuffer::from_bytes(b"exports.a = 1").expect("valid source");
    let full = buf.cursor();
    assert_eq!(buf.len(), 13);
    // The cursor can peek past the end without panicking; it sees the sentinel.
    let mut c = full;
    c.advance_n(13);
    assert_eq!(c.current(), 0);
    assert!(c.is_eof());
}

#[test]
fn padding_rounds_to_cache_line() {
    for len in [0usize, 1, 63, 64, 65, 127, 128] {
        let source = vec![b'x'; len];
        let buf = SourceBuffer::from_bytes(&source).expect("valid source");
        assert_eq!(buf.as_bytes().len(), len);
        // peek2 at the very end must stay in bounds.
        let mut c = buf.cursor();
        #[allow(clippy::cast_possible_truncation, reason = "test lengths are tiny")]
        c.advance_n(len as u32);
        assert_eq!(c.peek(), 0);
        assert_eq!(c.peek2(), 0);
    }
}

#[test]
fn bom_is_skipped_by_cursor() {
    let buf = SourceBuffer::from_bytes(b"\xEF\xBB\xBFexports").expect("valid source");
    let c = buf.cursor();
    assert_eq!(c.pos(), 3);
    assert_eq!(c.current(), b'e');
    // The BOM still counts toward the source length.
    assert_eq!(buf.len(), 10);
}

#[test]
fn bom_alone_is_immediate_eof() {
    let buf = SourceBuffer::from_bytes(b"\xEF\xBB\xBF").expect("valid source");
    let c = buf.cursor();
    assert!(c.is_eof());
}

#[test]
fn non_utf8_bytes_accepted() {
    let buf = SourceBuffer::from_bytes(b"\xFF\xFE hello").expect("raw bytes are fine");
    assert_eq!(buf.as_bytes()[0], 0xFF);
    // UTF-16 BOMs are not UTF-8 BOMs; the cursor starts at 0.
    assert_eq!(buf.cursor().pos(), 0);
}
