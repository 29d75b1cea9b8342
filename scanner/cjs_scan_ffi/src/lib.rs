//! `cjs_scan_ffi` — C-ABI surface for the CommonJS export scanner.
//!
//! This crate exposes a stable C API (`extern "C"`, `#[no_mangle]`) so
//! that embedders can link the scanner without depending on Rust tooling.
//! The execution boundary offers no structured error propagation, so every
//! outcome is a status code and results are read back through flat packed
//! memory regions (see [`cjs_scan_core::flat`] for the exact layout:
//! `[count: u32 LE] ([len: u32 LE][bytes])*`).
//!
//! # Design
//!
//! The one opaque handle type is [`CjsScanner`], obtained from
//! [`cjs_scanner_create`] and released with [`cjs_scanner_destroy`].
//! Memory is always owned by the scanner side: the packed result regions
//! returned by the accessor functions live inside the handle and stay
//! valid until the next scan or the handle's destruction. The handle's
//! buffers are reused across scans, so a long-lived handle settles into a
//! fixed working set.
//!
//! No panic crosses this boundary: the core scanner degrades on malformed
//! input instead of failing, and every entry point null-checks its
//! pointers before touching them.

#![allow(
    unsafe_code,
    reason = "C ABI surface: raw pointers and extern functions throughout"
)]

use cjs_scan_core::{flat, scan_bytes, ScanError, ScanFlags, ScanMode, ScanOptions};

/// Option bit for [`cjs_scanner_scan`]: stop recording detections after
/// the first structural desync instead of continuing best-effort.
pub const CJS_SCAN_STRICT: u32 = 1;

/// Status code returned by [`cjs_scanner_scan`].
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CjsScanStatus {
    /// Scan completed with no degradation.
    Ok = 0,
    /// Scan completed but degraded along the way (nesting ceiling,
    /// bracket desync, unterminated literal). Results are valid but may
    /// be incomplete; see [`cjs_scanner_result_flags`].
    OkPartial = 1,
    /// A null scanner or data pointer was passed.
    ErrInvalidArgument = -1,
    /// The source exceeds the supported maximum length.
    ErrSourceTooLarge = -2,
}

/// An opaque scanner handle.
///
/// Holds per-scan options plus the packed result regions of the most
/// recent scan. Handles are not thread-safe; access from multiple threads
/// requires external synchronisation. Independent handles share nothing.
pub struct CjsScanner {
    max_depth: u32,
    exports: Vec<u8>,
    reexports: Vec<u8>,
    export_count: u32,
    reexport_count: u32,
    flags: ScanFlags,
}

impl CjsScanner {
    fn new() -> Self {
        Self {
            max_depth: 0,
            exports: flat::pack_names::<&str>(&[]),
            reexports: flat::pack_names::<&str>(&[]),
            export_count: 0,
            reexport_count: 0,
            flags: ScanFlags::empty(),
        }
    }
}

/// Create a new scanner handle.
///
/// The returned pointer must eventually be passed to
/// [`cjs_scanner_destroy`] to free all associated resources.
#[no_mangle]
pub extern "C" fn cjs_scanner_create() -> *mut CjsScanner {
    Box::into_raw(Box::new(CjsScanner::new()))
}

/// Destroy a scanner previously created with [`cjs_scanner_create`].
///
/// After this call the pointer is invalid and must not be used.
///
/// # Safety
/// - `scanner` must be null or a pointer returned by `cjs_scanner_create`.
/// - `scanner` must not be used again after this call.
/// - This function must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_destroy(scanner: *mut CjsScanner) {
    if !scanner.is_null() {
        // SAFETY: pointer was created by `Box::into_raw` in `cjs_scanner_create`.
        drop(unsafe { Box::from_raw(scanner) });
    }
}

/// Set the bracket nesting ceiling for subsequent scans. `0` restores the
/// built-in default. Does nothing if `scanner` is null.
///
/// # Safety
/// `scanner` must be null or a valid, live [`CjsScanner`] pointer.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_set_max_depth(scanner: *mut CjsScanner, max_depth: u32) {
    if !scanner.is_null() {
        // SAFETY: caller guarantees `scanner` is valid.
        unsafe { (*scanner).max_depth = max_depth };
    }
}

/// Scan `len` bytes of module source at `data`.
///
/// On return the handle's result regions describe the detected exports
/// and re-export specifiers; read them with [`cjs_scanner_exports`] and
/// [`cjs_scanner_reexports`]. A failed scan (negative status) leaves the
/// regions empty.
///
/// `flags` is a bit set; the only defined bit is [`CJS_SCAN_STRICT`].
/// A zero-length scan with a non-null `data` pointer is valid and yields
/// empty results.
///
/// # Safety
/// - `scanner` must be null or a valid, live [`CjsScanner`] pointer.
/// - `data` must be null or valid for reads of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_scan(
    scanner: *mut CjsScanner,
    data: *const u8,
    len: usize,
    flags: u32,
) -> CjsScanStatus {
    if scanner.is_null() || data.is_null() {
        return CjsScanStatus::ErrInvalidArgument;
    }
    // SAFETY: caller guarantees `scanner` is valid.
    let scanner = unsafe { &mut *scanner };
    // SAFETY: caller guarantees `data` is valid for `len` bytes.
    let source = unsafe { std::slice::from_raw_parts(data, len) };

    let mode = if flags & CJS_SCAN_STRICT != 0 {
        ScanMode::Strict
    } else {
        ScanMode::Tolerant
    };
    let options = ScanOptions {
        mode,
        max_depth: scanner.max_depth,
    };

    match scan_bytes(source, &options) {
        Ok(output) => {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "distinct names are bounded by the u32 source length"
            )]
            {
                scanner.export_count = output.exports.len() as u32;
                scanner.reexport_count = output.reexports.len() as u32;
            }
            flat::pack_names_into(&mut scanner.exports, &output.exports);
            flat::pack_names_into(&mut scanner.reexports, &output.reexports);
            scanner.flags = output.flags;
            if output.is_complete() {
                CjsScanStatus::Ok
            } else {
                CjsScanStatus::OkPartial
            }
        }
        Err(ScanError::SourceTooLarge { .. }) => {
            scanner.export_count = 0;
            scanner.reexport_count = 0;
            flat::pack_names_into::<&str>(&mut scanner.exports, &[]);
            flat::pack_names_into::<&str>(&mut scanner.reexports, &[]);
            scanner.flags = ScanFlags::empty();
            CjsScanStatus::ErrSourceTooLarge
        }
    }
}

/// Packed export-name region of the most recent scan.
///
/// Writes the region's byte length to `out_len` (when non-null) and
/// returns a pointer to its first byte. The region is valid until the
/// next scan on this handle or its destruction. Returns null when
/// `scanner` is null.
///
/// # Safety
/// - `scanner` must be null or a valid, live [`CjsScanner`] pointer.
/// - `out_len` must be null or valid for one `usize` write.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_exports(
    scanner: *const CjsScanner,
    out_len: *mut usize,
) -> *const u8 {
    if scanner.is_null() {
        return std::ptr::null();
    }
    // SAFETY: caller guarantees `scanner` is valid.
    let region = unsafe { &(*scanner).exports };
    if !out_len.is_null() {
        // SAFETY: caller guarantees `out_len` is writable.
        unsafe { *out_len = region.len() };
    }
    region.as_ptr()
}

/// Packed re-export-specifier region of the most recent scan.
///
/// Same contract as [`cjs_scanner_exports`].
///
/// # Safety
/// - `scanner` must be null or a valid, live [`CjsScanner`] pointer.
/// - `out_len` must be null or valid for one `usize` write.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_reexports(
    scanner: *const CjsScanner,
    out_len: *mut usize,
) -> *const u8 {
    if scanner.is_null() {
        return std::ptr::null();
    }
    // SAFETY: caller guarantees `scanner` is valid.
    let region = unsafe { &(*scanner).reexports };
    if !out_len.is_null() {
        // SAFETY: caller guarantees `out_len` is writable.
        unsafe { *out_len = region.len() };
    }
    region.as_ptr()
}

/// Number of distinct export names found by the most recent scan.
/// Returns 0 when `scanner` is null.
///
/// # Safety
/// `scanner` must be null or a valid, live [`CjsScanner`] pointer.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_export_count(scanner: *const CjsScanner) -> u32 {
    if scanner.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees `scanner` is valid.
    unsafe { (*scanner).export_count }
}

/// Number of distinct re-export specifiers found by the most recent scan.
/// Returns 0 when `scanner` is null.
///
/// # Safety
/// `scanner` must be null or a valid, live [`CjsScanner`] pointer.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_reexport_count(scanner: *const CjsScanner) -> u32 {
    if scanner.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees `scanner` is valid.
    unsafe { (*scanner).reexport_count }
}

/// Raw degradation flag bits of the most recent scan (see the core
/// crate's `ScanFlags`). `0` means the scan was clean. Returns 0 when
/// `scanner` is null.
///
/// # Safety
/// `scanner` must be null or a valid, live [`CjsScanner`] pointer.
#[no_mangle]
pub unsafe extern "C" fn cjs_scanner_result_flags(scanner: *const CjsScanner) -> u32 {
    if scanner.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees `scanner` is valid.
    unsafe { (*scanner).flags.bits() }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests {
    use super::*;
    use cjs_scan_core::flat::unpack_names;
    use pretty_assertions::assert_eq;

    /// RAII wrapper so a failing assertion still frees the handle.
    struct Handle(*mut CjsScanner);

    impl Handle {
        fn new() -> Self {
            let ptr = cjs_scanner_create();
            assert!(!ptr.is_null());
            Self(ptr)
        }

        fn scan(&self, source: &str, flags: u32) -> CjsScanStatus {
            // SAFETY: the handle is live and the slice outlives the call.
            unsafe { cjs_scanner_scan(self.0, source.as_ptr(), source.len(), flags) }
        }

        fn exports(&self) -> Vec<String> {
            let mut len = 0usize;
            // SAFETY: the handle is live; `len` is a valid out pointer.
            let ptr = unsafe { cjs_scanner_exports(self.0, &mut len) };
            assert!(!ptr.is_null());
            // SAFETY: the accessor contract guarantees `len` readable bytes.
            let region = unsafe { std::slice::from_raw_parts(ptr, len) };
            unpack_names(region).expect("scanner produces well-formed regions")
        }

        fn reexports(&self) -> Vec<String> {
            let mut len = 0usize;
            // SAFETY: the handle is live; `len` is a valid out pointer.
            let ptr = unsafe { cjs_scanner_reexports(self.0, &mut len) };
            assert!(!ptr.is_null());
            // SAFETY: the accessor contract guarantees `len` readable bytes.
            let region = unsafe { std::slice::from_raw_parts(ptr, len) };
            unpack_names(region).expect("scanner produces well-formed regions")
        }
    }

    impl Drop for Handle {
        fn drop(&mut self) {
            // SAFETY: the pointer came from `cjs_scanner_create` and is
            // dropped exactly once.
            unsafe { cjs_scanner_destroy(self.0) };
        }
    }

    #[test]
    fn scan_and_read_back() {
        let h = Handle::new();
        let status = h.scan(r#"exports.a = 1; __export(require("./dep"));"#, 0);
        assert_eq!(status, CjsScanStatus::Ok);
        assert_eq!(h.exports(), ["a"]);
        assert_eq!(h.reexports(), ["./dep"]);
        // SAFETY: handle is live.
        assert_eq!(unsafe { cjs_scanner_export_count(h.0) }, 1);
        // SAFETY: handle is live.
        assert_eq!(unsafe { cjs_scanner_reexport_count(h.0) }, 1);
        // SAFETY: handle is live.
        assert_eq!(unsafe { cjs_scanner_result_flags(h.0) }, 0);
    }

    #[test]
    fn rescan_replaces_results() {
        let h = Handle::new();
        assert_eq!(h.scan("exports.first = 1;", 0), CjsScanStatus::Ok);
        assert_eq!(h.exports(), ["first"]);
        assert_eq!(h.scan("exports.second = 2;", 0), CjsScanStatus::Ok);
        assert_eq!(h.exports(), ["second"]);
    }

    #[test]
    fn empty_source_is_valid() {
        let h = Handle::new();
        assert_eq!(h.scan("", 0), CjsScanStatus::Ok);
        assert_eq!(h.exports(), Vec::<String>::new());
        assert_eq!(h.reexports(), Vec::<String>::new());
    }

    #[test]
    fn null_pointers_are_rejected_not_crashed() {
        let h = Handle::new();
        // SAFETY: null arguments are part of the documented contract.
        let status = unsafe { cjs_scanner_scan(std::ptr::null_mut(), b"x".as_ptr(), 1, 0) };
        assert_eq!(status, CjsScanStatus::ErrInvalidArgument);
        // SAFETY: null data pointer is part of the documented contract.
        let status = unsafe { cjs_scanner_scan(h.0, std::ptr::null(), 0, 0) };
        assert_eq!(status, CjsScanStatus::ErrInvalidArgument);
        // SAFETY: null accessors return sentinel values.
        unsafe {
            assert!(cjs_scanner_exports(std::ptr::null(), std::ptr::null_mut()).is_null());
            assert_eq!(cjs_scanner_export_count(std::ptr::null()), 0);
            assert_eq!(cjs_scanner_result_flags(std::ptr::null()), 0);
        }
    }

    #[test]
    fn degraded_scan_reports_partial() {
        let h = Handle::new();
        let status = h.scan("exports.kept = 1; var s = \"runs off", 0);
        assert_eq!(status, CjsScanStatus::OkPartial);
        assert_eq!(h.exports(), ["kept"]);
        // SAFETY: handle is live.
        assert_ne!(unsafe { cjs_scanner_result_flags(h.0) }, 0);
    }

    #[test]
    fn depth_ceiling_reports_partial() {
        let h = Handle::new();
        // SAFETY: handle is live.
        unsafe { cjs_scanner_set_max_depth(h.0, 4) };
        let source = format!("{}exports.x = 1;", "(".repeat(10));
        assert_eq!(h.scan(&source, 0), CjsScanStatus::OkPartial);
        assert_eq!(h.exports(), ["x"]);
    }

    #[test]
    fn strict_flag_changes_mode() {
        let source = "exports.a = 1; } exports.b = 2;";
        let h = Handle::new();
        assert_eq!(h.scan(source, 0), CjsScanStatus::OkPartial);
        assert_eq!(h.exports(), ["a", "b"]);
        assert_eq!(h.scan(source, CJS_SCAN_STRICT), CjsScanStatus::OkPartial);
        assert_eq!(h.exports(), ["a"]);
    }

    #[test]
    fn destroy_null_is_a_no_op() {
        // SAFETY: null is explicitly permitted.
        unsafe { cjs_scanner_destroy(std::ptr::null_mut()) };
    }
}
