//! Export-pattern matcher: one forward pass over the token stream.
//!
//! The matcher pulls tokens from the raw scanner, feeds every delimiter
//! to the bracket tracker, and attempts pattern recognition whenever an
//! identifier matches the trigger table. Lookahead is small and bounded:
//! a failed pattern simply resumes from the token that broke it. No
//! pattern failure is fatal, and later assignments never remove earlier
//! detections.
//!
//! Depth policy: property-style exports (`exports.x =`, helper calls)
//! match at any nesting depth, since CommonJS modules frequently export
//! conditionally. Whole-object forms (`module.exports = {...}`,
//! `module.exports = require(...)`) match only at unconditional top level
//! — a clean tracker at depth zero — because a conditional overwrite of
//! the entire exports object is rare and ambiguous.

use crate::nesting::BracketStack;
use crate::patterns::{self, PatternKind};
use crate::raw_scanner::RawScanner;
use crate::results::{NameSet, ScanOutput};
use crate::tag::{RawTag, RawToken};
use crate::{ScanFlags, ScanMode, ScanOptions};

/// The export matcher. Create one per scan; all state is private to the
/// invocation.
pub struct ExportScanner<'a> {
    lexer: RawScanner<'a>,
    nesting: BracketStack,
    exports: NameSet,
    reexports: NameSet,
    mode: ScanMode,
    /// Tag of the significant token preceding the most recently read one.
    prev_tag: Option<RawTag>,
    /// Tag of the most recently read significant token.
    last_tag: Option<RawTag>,
}

impl<'a> ExportScanner<'a> {
    /// Create a matcher over `lexer` with the given options.
    pub fn new(lexer: RawScanner<'a>, options: &ScanOptions) -> Self {
        Self {
            lexer,
            nesting: BracketStack::new(options.max_depth),
            exports: NameSet::new(),
            reexports: NameSet::new(),
            mode: options.mode,
            prev_tag: None,
            last_tag: None,
        }
    }

    /// Run the scan to end-of-buffer and return the accumulated results.
    pub fn run(mut self) -> ScanOutput {
        // A pattern handler may stop on an identifier that itself needs
        // dispatch (`module.exports = exports = {}`); it hands the token
        // back here instead of dropping it.
        let mut reprocess: Option<RawToken> = None;
        loop {
            let tok = match reprocess.take() {
                Some(t) => t,
                None => self.next_sig(),
            };
            if tok.tag == RawTag::Eof {
                break;
            }
            if tok.tag != RawTag::Ident {
                continue;
            }
            let Some(trigger) = patterns::lookup(self.lexer.text(tok)) else {
                continue;
            };
            // In member position (`foo.exports`) the name belongs to some
            // other object; only helpers opt in to dotted access.
            if self.prev_tag == Some(RawTag::Dot) && !trigger.allow_after_dot {
                continue;
            }
            if self.mode == ScanMode::Strict && self.desynced() {
                continue;
            }
            reprocess = match trigger.kind {
                PatternKind::ExportsMember => self.member_assignment(),
                PatternKind::ModuleExports => self.module_exports(),
                PatternKind::DefineHost => self.define_host(),
                PatternKind::ReexportHelper => self.reexport_helper(),
            };
        }

        let flags = self.lexer.flags() | self.nesting.flags();
        ScanOutput {
            exports: self.exports.into_vec(),
            reexports: self.reexports.into_vec(),
            flags,
        }
    }

    /// Structural desync so far: bracket trouble or a literal that ran off
    /// the end. Strict mode stops trusting new detections past this point.
    fn desynced(&self) -> bool {
        !self.nesting.is_clean()
            || self
                .lexer
                .flags()
                .intersects(ScanFlags::UNTERMINATED_LITERAL)
    }

    /// Next significant token: skips trivia, feeds the bracket tracker,
    /// and maintains the previous-token tag used for member-position
    /// checks.
    fn next_sig(&mut self) -> RawToken {
        let tok = loop {
            let t = self.lexer.next_token();
            if !t.tag.is_trivia() {
                break t;
            }
        };
        self.nesting.observe(tok.tag);
        self.prev_tag = self.last_tag;
        if tok.tag != RawTag::Eof {
            self.last_tag = Some(tok.tag);
        }
        tok
    }

    /// Hand an identifier back to the main loop for re-dispatch; every
    /// other tag carries no trigger and is simply dropped.
    fn leftover(tok: RawToken) -> Option<RawToken> {
        (tok.tag == RawTag::Ident).then_some(tok)
    }

    /// The content bytes of a string literal token (quotes stripped).
    fn string_content(&self, tok: RawToken) -> &'a [u8] {
        let text = self.lexer.text(tok);
        &text[1..text.len() - 1]
    }

    fn record_export_ident(&mut self, tok: RawToken) {
        let text = self.lexer.text(tok);
        self.exports.record(text);
    }

    fn record_export_string(&mut self, tok: RawToken) {
        let content = self.string_content(tok);
        self.exports.record(content);
    }

    fn record_reexport_string(&mut self, tok: RawToken) {
        let content = self.string_content(tok);
        self.reexports.record(content);
    }

    // === Pattern family 1-2: exports.name = / exports["name"] = ===

    /// Position: an exports binding has just been read. Matches `.name =`
    /// and `["name"] =`; anything else aborts without recording.
    fn member_assignment(&mut self) -> Option<RawToken> {
        let tok = self.next_sig();
        self.member_assignment_from(tok)
    }

    // === Pattern family 3 (+ member forms): module.exports ===

    fn module_exports(&mut self) -> Option<RawToken> {
        // Unconditional-top-level check happens before any lookahead: the
        // depth at the `module` token decides the whole-object forms.
        let at_top = self.nesting.is_top_level() && self.nesting.is_clean();

        let dot = self.next_sig();
        if dot.tag != RawTag::Dot {
            return Self::leftover(dot);
        }
        let prop = self.next_sig();
        if prop.tag != RawTag::Ident || self.lexer.text(prop) != b"exports" {
            // `module.id`, `module.loaded`, ... — nothing to do. The
            // property is in member position, so it cannot re-trigger.
            return None;
        }

        let tok = self.next_sig();
        match tok.tag {
            // module.exports.name = / module.exports["name"] =
            RawTag::Dot | RawTag::LeftBracket => {
                // Same shapes as the exports binding itself; rewind one
                // step by treating `module.exports` as the binding.
                self.member_assignment_from(tok)
            }
            RawTag::Equal => {
                let val = self.next_sig();
                match val.tag {
                    RawTag::LeftBrace if at_top => {
                        self.object_literal();
                        None
                    }
                    RawTag::Ident if self.lexer.text(val) == b"require" && at_top => {
                        if let Some(spec) = self.require_specifier() {
                            self.record_reexport_string(spec);
                        }
                        None
                    }
                    _ => Self::leftover(val),
                }
            }
            _ => Self::leftover(tok),
        }
    }

    /// Core of families 1-2 with the `.` or `[` token already read; also
    /// reached through `module.exports.<name> =`.
    fn member_assignment_from(&mut self, opener: RawToken) -> Option<RawToken> {
        match opener.tag {
            RawTag::Dot => {
                let name = self.next_sig();
                if name.tag != RawTag::Ident {
                    return None;
                }
                let eq = self.next_sig();
                if eq.tag == RawTag::Equal {
                    self.record_export_ident(name);
                    return None;
                }
                // `exports.foo.bar =` exports nothing; `exports.foo =
                // exports.bar = 1` re-enters via the leftover path.
                Self::leftover(eq)
            }
            RawTag::LeftBracket => {
                let key = self.next_sig();
                if key.tag != RawTag::String {
                    return Self::leftover(key);
                }
                let close = self.next_sig();
                if close.tag != RawTag::RightBracket {
                    return Self::leftover(close);
                }
                let eq = self.next_sig();
                if eq.tag == RawTag::Equal {
                    self.record_export_string(key);
                    return None;
                }
                Self::leftover(eq)
            }
            _ => Self::leftover(opener),
        }
    }

    /// Walk a `module.exports = { ... }` object literal, recording each
    /// property key. The opening brace is already consumed. Malformed
    /// properties skip to the next sibling without aborting the walk.
    fn object_literal(&mut self) {
        // Depth including the object's own brace; the walk ends when the
        // tracker drops below it (closing brace, or resync on bad input).
        let inner_depth = self.nesting.depth();
        loop {
            let tok = self.next_sig();
            if tok.tag == RawTag::Eof || self.nesting.depth() < inner_depth {
                return;
            }
            match tok.tag {
                RawTag::Comma => {}
                RawTag::Ident => {
                    if !self.object_property(tok, inner_depth, true) {
                        return;
                    }
                }
                RawTag::String => {
                    if !self.object_property(tok, inner_depth, false) {
                        return;
                    }
                }
                RawTag::Ellipsis => {
                    if !self.object_spread(inner_depth) {
                        return;
                    }
                }
                // Computed keys, numeric keys, and anything unrecognized:
                // skip the property, keep walking siblings. Brackets and
                // braces balance through the tracker.
                _ => {
                    if !self.skip_to_sibling(inner_depth) {
                        return;
                    }
                }
            }
        }
    }

    /// One property whose key token has been read. Returns `false` when
    /// the object was closed in the process.
    fn object_property(&mut self, key_tok: RawToken, inner_depth: u32, ident_key: bool) -> bool {
        let mut key = key_tok;
        let mut key_is_ident = ident_key;
        let mut after = self.next_sig();

        // `get name() {...}` / `set name(v) {...}` accessor properties.
        if ident_key
            && matches!(self.lexer.text(key_tok), b"get" | b"set")
            && matches!(after.tag, RawTag::Ident | RawTag::String)
        {
            key = after;
            key_is_ident = after.tag == RawTag::Ident;
            after = self.next_sig();
        }

        if after.tag == RawTag::Eof || self.nesting.depth() < inner_depth {
            // `{ a }` shorthand as the final property.
            self.record_key(key, key_is_ident);
            return false;
        }

        match after.tag {
            RawTag::Colon | RawTag::LeftParen => {
                // Explicit value or method shorthand — the key is a name
                // either way; the value is skipped structurally.
                self.record_key(key, key_is_ident);
                self.skip_to_sibling(inner_depth)
            }
            RawTag::Comma => {
                self.record_key(key, key_is_ident);
                true
            }
            _ => {
                // Not a recognizable property shape; drop it, keep going.
                self.skip_to_sibling(inner_depth)
            }
        }
    }

    fn record_key(&mut self, key: RawToken, is_ident: bool) {
        if is_ident {
            self.record_export_ident(key);
        } else {
            self.record_export_string(key);
        }
    }

    /// `...require("spec")` spread inside the exports object forwards
    /// another module's bindings. Returns `false` when the object closed.
    fn object_spread(&mut self, inner_depth: u32) -> bool {
        let tok = self.next_sig();
        if tok.tag == RawTag::Ident && self.lexer.text(tok) == b"require" {
            if let Some(spec) = self.require_specifier() {
                self.record_reexport_string(spec);
            }
        }
        if self.nesting.depth() < inner_depth {
            return false;
        }
        self.skip_to_sibling(inner_depth)
    }

    /// Consume tokens until the next sibling comma (true) or until the
    /// object closes / input ends (false). Nested structures balance via
    /// the bracket tracker.
    fn skip_to_sibling(&mut self, inner_depth: u32) -> bool {
        loop {
            let tok = self.next_sig();
            if tok.tag == RawTag::Eof || self.nesting.depth() < inner_depth {
                return false;
            }
            if tok.tag == RawTag::Comma && self.nesting.depth() == inner_depth {
                return true;
            }
        }
    }

    // === Pattern families 4 & 6: Object.defineProperty / Object.keys ===

    fn define_host(&mut self) -> Option<RawToken> {
        let dot = self.next_sig();
        if dot.tag != RawTag::Dot {
            return Self::leftover(dot);
        }
        let prop = self.next_sig();
        if prop.tag != RawTag::Ident {
            return None;
        }
        match self.lexer.text(prop) {
            b"defineProperty" => self.define_property(),
            b"keys" => self.keys_require(),
            _ => None,
        }
    }

    /// `Object.defineProperty(<exports-binding>, "name", ...)`.
    /// The descriptor argument is left to the main loop.
    fn define_property(&mut self) -> Option<RawToken> {
        let open = self.next_sig();
        if open.tag != RawTag::LeftParen {
            return Self::leftover(open);
        }
        if !self.exports_binding() {
            return None;
        }
        let comma = self.next_sig();
        if comma.tag != RawTag::Comma {
            return Self::leftover(comma);
        }
        let name = self.next_sig();
        if name.tag == RawTag::String {
            self.record_export_string(name);
        }
        None
    }

    /// Reads `exports` or `module.exports` as a call argument.
    fn exports_binding(&mut self) -> bool {
        let host = self.next_sig();
        if host.tag != RawTag::Ident {
            return false;
        }
        match self.lexer.text(host) {
            b"exports" => true,
            b"module" => {
                let dot = self.next_sig();
                if dot.tag != RawTag::Dot {
                    return false;
                }
                let prop = self.next_sig();
                prop.tag == RawTag::Ident && self.lexer.text(prop) == b"exports"
            }
            _ => false,
        }
    }

    /// `Object.keys(require("spec"))` — the enumerate-and-forward idiom.
    fn keys_require(&mut self) -> Option<RawToken> {
        let open = self.next_sig();
        if open.tag != RawTag::LeftParen {
            return Self::leftover(open);
        }
        let callee = self.next_sig();
        if callee.tag != RawTag::Ident || self.lexer.text(callee) != b"require" {
            return Self::leftover(callee);
        }
        if let Some(spec) = self.require_specifier() {
            self.record_reexport_string(spec);
        }
        None
    }

    // === Pattern family 5: re-export helper calls ===

    /// `<helper>(require("spec"), ...)` with the helper identifier
    /// already consumed. Remaining arguments flow back to the main loop.
    fn reexport_helper(&mut self) -> Option<RawToken> {
        let open = self.next_sig();
        if open.tag != RawTag::LeftParen {
            return Self::leftover(open);
        }
        let callee = self.next_sig();
        if callee.tag != RawTag::Ident || self.lexer.text(callee) != b"require" {
            return Self::leftover(callee);
        }
        if let Some(spec) = self.require_specifier() {
            self.record_reexport_string(spec);
        }
        None
    }

    /// `("spec")` with the `require` identifier already consumed. Returns
    /// the string token on the strict shape only — dynamic specifiers
    /// (`require(x)`, `require("a" + b)`) are undetectable lexically and
    /// yield `None`.
    fn require_specifier(&mut self) -> Option<RawToken> {
        let open = self.next_sig();
        if open.tag != RawTag::LeftParen {
            return None;
        }
        let spec = self.next_sig();
        if spec.tag != RawTag::String {
            return None;
        }
        let close = self.next_sig();
        if close.tag != RawTag::RightParen {
            return None;
        }
        Some(spec)
    }
}

#[cfg(test)]
mod tests;
