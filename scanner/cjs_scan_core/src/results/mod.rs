//! Result accumulators: insertion-ordered, deduplicated, append-only.

use bitflags::bitflags;
use rustc_hash::FxHashSet;

bitflags! {
    /// Degradation conditions encountered during a scan.
    ///
    /// None of these is an error: the scan always runs to end-of-buffer
    /// and returns whatever it found. Callers that need to distrust
    /// partial results inspect these bits (the FFI surface reports them
    /// as an `OkPartial` status).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ScanFlags: u32 {
        /// Bracket nesting exceeded the configured ceiling; the tracker
        /// resynchronized. Results may be incomplete.
        const DEPTH_LIMIT_REACHED = 1 << 0;
        /// A closer appeared with no (or the wrong kind of) opener; the
        /// tracker resynchronized.
        const BRACKET_DESYNC = 1 << 1;
        /// A string/template/regex literal or block comment ran into a
        /// newline or end-of-buffer without its terminator.
        const UNTERMINATED_LITERAL = 1 << 2;
        /// Template interpolations nested past the tracked ceiling and
        /// were scanned as literal text.
        const TEMPLATE_DEPTH_LIMIT = 1 << 3;
    }
}

/// Insertion-ordered set of distinct names.
///
/// Entries are only ever appended; recording a duplicate is a no-op, so
/// the accumulator is idempotent. There is no removal — detection answers
/// "could this name be exported", not "what is its final value".
#[derive(Debug, Default)]
pub struct NameSet {
    order: Vec<String>,
    seen: FxHashSet<String>,
}

impl NameSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name. Returns `true` if it was new.
    ///
    /// Empty or non-UTF-8 names are dropped — they can never become
    /// synthesized bindings.
    pub fn record(&mut self, name: &[u8]) -> bool {
        if name.is_empty() {
            return false;
        }
        let Ok(name) = std::str::from_utf8(name) else {
            return false;
        };
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_owned());
        self.order.push(name.to_owned());
        true
    }

    /// The recorded names in first-seen order.
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    /// Number of distinct names recorded.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consume the set, keeping first-seen order.
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// The outcome of one scan: detected exports, detected re-export
/// specifiers, and any degradation flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanOutput {
    /// Exported names, first-seen order, deduplicated.
    pub exports: Vec<String>,
    /// Re-exported module specifiers, exactly as written, first-seen
    /// order, deduplicated.
    pub reexports: Vec<String>,
    /// Degradation flags; empty means a fully clean scan.
    pub flags: ScanFlags,
}

impl ScanOutput {
    /// Returns `true` when no degradation occurred.
    pub fn is_complete(&self) -> bool {
        self.flags.is_empty()
    }
}
