#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn empty_set_packs_to_count_zero() {
    let packed = pack_names::<&str>(&[]);
    assert_eq!(packed, vec![0, 0, 0, 0]);
    assert_eq!(unpack_names(&packed), Some(vec![]));
}

#[test]
fn round_trip_preserves_order() {
    let names = ["foo", "bar", "a-long-specifier/./path"];
    let packed = pack_names(&names);
    let unpacked = unpack_names(&packed).expect("well-formed region");
    assert_eq!(unpacked, names);
}

#[test]
fn layout_is_length_prefixed_little_endian() {
    let packed = pack_names(&["ab"]);
    assert_eq!(
        packed,
        vec![
            1, 0, 0, 0, // count
            2, 0, 0, 0, // entry length
            b'a', b'b', // entry bytes
        ]
    );
}

#[test]
fn truncated_region_rejected() {
    let packed = pack_names(&["hello"]);
    assert_eq!(unpack_names(&packed[..packed.len() - 1]), None);
    assert_eq!(unpack_names(&packed[..3]), None);
    assert_eq!(unpack_names(b""), None);
}

#[test]
fn trailing_garbage_rejected() {
    let mut packed = pack_names(&["x"]);
    packed.push(0);
    assert_eq!(unpack_names(&packed), None);
}

#[test]
fn overstated_count_rejected() {
    let mut packed = pack_names(&["x"]);
    packed[0] = 2;
    assert_eq!(unpack_names(&packed), None);
}

#[test]
fn empty_entry_survives() {
    // The scanner never records empty names, but the layout itself can
    // carry them; readers must not choke.
    let packed = pack_names(&[""]);
    assert_eq!(unpack_names(&packed), Some(vec![String::new()]));
}
