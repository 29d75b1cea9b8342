//! Packed flat result layout — the contract with foreign callers.
//!
//! The execution boundary may not share a memory model (or a garbage
//! collector) with the host, so results are exchanged as one contiguous
//! region the caller copies out without further parsing logic:
//!
//! ```text
//! [count: u32 LE] ( [len: u32 LE] [len bytes] )*
//! ```
//!
//! `count` is the number of entries; each entry is a length-prefixed byte
//! span holding a name or module specifier verbatim (UTF-8).

/// Encode names into the packed layout.
pub fn pack_names<S: AsRef<str>>(names: &[S]) -> Vec<u8> {
    let mut buf = Vec::new();
    pack_names_into(&mut buf, names);
    buf
}

/// Encode names into `buf`, reusing its allocation. The buffer is cleared
/// first; on return it holds exactly one packed region.
#[allow(
    clippy::cast_possible_truncation,
    reason = "entry count and lengths are bounded by the u32 source length"
)]
pub fn pack_names_into<S: AsRef<str>>(buf: &mut Vec<u8>, names: &[S]) {
    let total: usize = names.iter().map(|n| 4 + n.as_ref().len()).sum();
    buf.clear();
    buf.reserve(4 + total);
    buf.extend_from_slice(&(names.len() as u32).to_le_bytes());
    for name in names {
        let bytes = name.as_ref().as_bytes();
        buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(bytes);
    }
}

/// Decode a packed region back into names.
///
/// Returns `None` when the region is truncated, over-long, or an entry is
/// not valid UTF-8. Used by tests and host-side readers; the scanner
/// itself only ever produces well-formed regions.
pub fn unpack_names(buf: &[u8]) -> Option<Vec<String>> {
    let (count_bytes, mut rest) = buf.split_at_checked(4)?;
    let count = u32::from_le_bytes(count_bytes.try_into().ok()?);
    let mut names = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (len_bytes, tail) = rest.split_at_checked(4)?;
        let len = u32::from_le_bytes(len_bytes.try_into().ok()?) as usize;
        let (entry, tail) = tail.split_at_checked(len)?;
        names.push(std::str::from_utf8(entry).ok()?.to_owned());
        rest = tail;
    }
    if rest.is_empty() {
        Some(names)
    } else {
        None
    }
}

#[cfg(test)]
mod tests;
