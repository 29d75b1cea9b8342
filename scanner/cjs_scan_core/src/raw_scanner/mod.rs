//! Hand-written raw scanner producing [`RawToken`]s over CommonJS source.
//!
//! The scanner operates on a sentinel-terminated [`Cursor`] and advances in
//! a single forward pass, recognizing exactly as much JavaScript lexical
//! structure as export detection needs: string/template/regex literals and
//! comments are consumed whole so the export matcher never sees their
//! bytes as code; everything else is tagged coarsely.
//!
//! # Design
//!
//! Main dispatch covers all 256 byte values. Each arm calls a focused
//! method that advances the cursor and returns a token. The sentinel byte
//! (`0x00`) naturally dispatches to `eof()`. Malformed input never aborts:
//! unterminated literals produce degraded tail tokens and set a flag.
//!
//! Bytes `0x80..=0xFF` are treated as identifier bytes — non-ASCII source
//! in code position is almost always an identifier, and misreading exotic
//! Unicode whitespace merely widens one token.

use smallvec::SmallVec;

use crate::cursor::Cursor;
use crate::tag::{RawTag, RawToken};
use crate::ScanFlags;

/// Ceiling on tracked `${...}` interpolation nesting. Interpolations
/// opening beyond this depth are scanned as template text instead
/// (degradation flag set), keeping memory bounded.
pub const TEMPLATE_DEPTH_LIMIT: usize = 16;

/// Classification of the most recent significant token, as consumed by
/// [`slash_starts_regex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrevSignificant {
    /// Identifier that produces a value, including the value keywords
    /// `this`, `super`, `true`, `false`, `null`.
    ValueIdent,
    /// Keyword after which an expression restarts (`return`, `typeof`,
    /// `in`, `of`, ...).
    ExprKeyword,
    /// Numeric literal.
    Number,
    /// String literal (terminated or not).
    StringLit,
    /// Complete template or template tail — produces a value.
    TemplateEnd,
    /// Template head or middle — ends in `${`, an expression restart.
    TemplateExpr,
    /// Regex literal.
    RegexLit,
    /// `)`
    RightParen,
    /// `]`
    RightBracket,
    /// `}`
    RightBrace,
    /// `++` or `--` (postfix position).
    Postfix,
    /// Any other punctuator or operator.
    Operator,
}

/// Returns `true` when a `/` at the current position starts a regular
/// expression literal rather than a division operator, given the most
/// recent significant token.
///
/// The heuristic: `/` is *division* only after tokens that produce a value
/// (identifier, literal, `)`, `]`, postfix `++`/`--`). Every other context
/// — operators, openers, expression keywords, start of input — begins a
/// regex. A `}` is treated as a block end (regex follows), the more common
/// case in statement-oriented CommonJS prologues; this misfires on
/// division applied to an object literal, which is documented best-effort.
pub fn slash_starts_regex(prev: Option<PrevSignificant>) -> bool {
    match prev {
        None => true,
        Some(p) => !matches!(
            p,
            PrevSignificant::ValueIdent
                | PrevSignificant::Number
                | PrevSignificant::StringLit
                | PrevSignificant::TemplateEnd
                | PrevSignificant::RegexLit
                | PrevSignificant::RightParen
                | PrevSignificant::RightBracket
                | PrevSignificant::Postfix
        ),
    }
}

/// Keywords after which an expression (and therefore a regex literal)
/// may start. Value keywords (`this`, `true`, ...) are deliberately
/// absent — they behave like identifiers.
fn is_expression_keyword(text: &[u8]) -> bool {
    matches!(
        text,
        b"await"
            | b"break"
            | b"case"
            | b"catch"
            | b"delete"
            | b"do"
            | b"else"
            | b"finally"
            | b"for"
            | b"if"
            | b"in"
            | b"instanceof"
            | b"new"
            | b"of"
            | b"return"
            | b"switch"
            | b"throw"
            | b"typeof"
            | b"void"
            | b"while"
            | b"with"
            | b"yield"
    )
}

/// Single forward-pass scanner with bounded interpolation state.
///
/// Produces one token at a time; [`flags()`](Self::flags) reports any
/// degradation encountered (unterminated literals, interpolation ceiling).
pub struct RawScanner<'a> {
    cursor: Cursor<'a>,
    /// Brace depth recorded at each open `${` interpolation. A `}` seen
    /// while the top entry equals the current depth closes the
    /// interpolation and resumes template scanning.
    template_stack: SmallVec<[u32; TEMPLATE_DEPTH_LIMIT]>,
    /// Depth of plain `{`/`}` braces as counted by this scanner.
    brace_depth: u32,
    /// Most recent significant token classification.
    prev: Option<PrevSignificant>,
    /// Degradation flags accumulated over the scan.
    flags: ScanFlags,
}

impl<'a> RawScanner<'a> {
    /// Create a new scanner from a cursor.
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            template_stack: SmallVec::new(),
            brace_depth: 0,
            prev: None,
            flags: ScanFlags::empty(),
        }
    }

    /// Degradation flags accumulated so far.
    pub fn flags(&self) -> ScanFlags {
        self.flags
    }

    /// The bytes of `token` in the source.
    pub fn text(&self, token: RawToken) -> &'a [u8] {
        self.cursor.slice(token.start, token.end())
    }

    /// Produce the next raw token.
    ///
    /// Returns `RawTag::Eof` with `len == 0` when the source is exhausted.
    /// Subsequent calls after EOF continue to return `Eof`.
    pub fn next_token(&mut self) -> RawToken {
        let start = self.cursor.pos();
        let tok = match self.cursor.current() {
            0 => self.eof_or_null(start),
            b' ' | b'\t' => self.whitespace(start),
            b'\r' => self.carriage_return(start),
            b'\n' => self.newline(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' | 0x80..=0xFF => self.identifier(start),
            b'0'..=b'9' => self.number(start),
            b'"' | b'\'' => self.string(start),
            b'`' => self.template_literal(start),
            b'/' => self.slash_or_comment(start),
            b'.' => self.dot(start),
            b'=' => self.equal(start),
            b'+' => self.plus_or_minus(start, b'+', RawTag::PlusPlus),
            b'-' => self.plus_or_minus(start, b'-', RawTag::MinusMinus),
            b',' => self.single(start, RawTag::Comma),
            b':' => self.single(start, RawTag::Colon),
            b';' => self.single(start, RawTag::Semicolon),
            b'(' => self.single(start, RawTag::LeftParen),
            b')' => self.single(start, RawTag::RightParen),
            b'[' => self.single(start, RawTag::LeftBracket),
            b']' => self.single(start, RawTag::RightBracket),
            b'{' => self.left_brace(start),
            b'}' => self.right_brace(start),
            b'*' | b'%' | b'^' | b'&' | b'|' | b'<' | b'>' | b'!' | b'~' | b'?' => {
                self.operator_run(start)
            }
            // `@`, `#`, `\`, control bytes — single punctuator, no meaning here.
            _ => self.single(start, RawTag::Punct),
        };
        if !tok.tag.is_trivia() && tok.tag != RawTag::Eof {
            self.prev = Some(self.classify(tok));
        }
        tok
    }

    /// Map a just-produced token to its [`PrevSignificant`] class.
    fn classify(&self, tok: RawToken) -> PrevSignificant {
        match tok.tag {
            RawTag::Ident => {
                if is_expression_keyword(self.text(tok)) {
                    PrevSignificant::ExprKeyword
                } else {
                    PrevSignificant::ValueIdent
                }
            }
            RawTag::Number => PrevSignificant::Number,
            RawTag::String | RawTag::UnterminatedString => PrevSignificant::StringLit,
            RawTag::TemplateComplete | RawTag::TemplateTail | RawTag::UnterminatedTemplate => {
                PrevSignificant::TemplateEnd
            }
            RawTag::TemplateHead | RawTag::TemplateMiddle => PrevSignificant::TemplateExpr,
            RawTag::Regex | RawTag::UnterminatedRegex => PrevSignificant::RegexLit,
            RawTag::RightParen => PrevSignificant::RightParen,
            RawTag::RightBracket => PrevSignificant::RightBracket,
            RawTag::RightBrace => PrevSignificant::RightBrace,
            RawTag::PlusPlus | RawTag::MinusMinus => PrevSignificant::Postfix,
            _ => PrevSignificant::Operator,
        }
    }

    fn token(&self, tag: RawTag, start: u32) -> RawToken {
        RawToken {
            tag,
            start,
            len: self.cursor.pos() - start,
        }
    }

    // === EOF ===

    fn eof_or_null(&mut self, start: u32) -> RawToken {
        if self.cursor.is_eof() {
            RawToken {
                tag: RawTag::Eof,
                start,
                len: 0,
            }
        } else {
            // Interior null byte: binary garbage, consumed as a punctuator.
            self.cursor.advance();
            self.token(RawTag::Punct, start)
        }
    }

    // === Whitespace & newlines ===

    fn whitespace(&mut self, start: u32) -> RawToken {
        self.cursor.eat_whitespace();
        self.token(RawTag::Whitespace, start)
    }

    fn carriage_return(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume '\r'
        if self.cursor.current() == b'\n' {
            // CRLF normalization: \r\n -> single Newline with len=2
            self.cursor.advance();
            self.token(RawTag::Newline, start)
        } else {
            self.token(RawTag::Whitespace, start)
        }
    }

    fn newline(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        self.token(RawTag::Newline, start)
    }

    // === Identifiers ===

    fn identifier(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume first byte (already validated)
        self.cursor.eat_while(is_ident_continue);
        self.token(RawTag::Ident, start)
    }

    // === Numbers ===

    fn number(&mut self, start: u32) -> RawToken {
        let first = self.cursor.current();
        self.cursor.advance();

        if first == b'0' && matches!(self.cursor.current(), b'x' | b'X') {
            self.cursor.advance();
            self.cursor
                .eat_while(|b| b.is_ascii_hexdigit() || b == b'_');
        } else if first == b'0' && matches!(self.cursor.current(), b'o' | b'O' | b'b' | b'B') {
            self.cursor.advance();
            self.cursor
                .eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            return self.token(RawTag::Number, start);
        } else {
            self.eat_decimal_digits();
            if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
                self.cursor.advance();
                self.eat_decimal_digits();
            }
            self.eat_exponent();
        }

        // BigInt suffix.
        if self.cursor.current() == b'n' {
            self.cursor.advance();
        }
        self.token(RawTag::Number, start)
    }

    /// Number starting with `.` (e.g. `.5`); the dot is not yet consumed.
    fn number_from_dot(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume '.'
        self.eat_decimal_digits();
        self.eat_exponent();
        self.token(RawTag::Number, start)
    }

    fn eat_decimal_digits(&mut self) {
        self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
    }

    fn eat_exponent(&mut self) {
        if matches!(self.cursor.current(), b'e' | b'E')
            && (self.cursor.peek().is_ascii_digit()
                || (matches!(self.cursor.peek(), b'+' | b'-') && self.cursor.peek2().is_ascii_digit()))
        {
            self.cursor.advance();
            if matches!(self.cursor.current(), b'+' | b'-') {
                self.cursor.advance();
            }
            self.eat_decimal_digits();
        }
    }

    // === Punctuation ===

    /// Single-byte token: advance one byte and emit the given tag.
    fn single(&mut self, start: u32, tag: RawTag) -> RawToken {
        self.cursor.advance();
        self.token(tag, start)
    }

    fn dot(&mut self, start: u32) -> RawToken {
        if self.cursor.peek().is_ascii_digit() {
            return self.number_from_dot(start);
        }
        self.cursor.advance(); // consume '.'
        if self.cursor.current() == b'.' && self.cursor.peek() == b'.' {
            self.cursor.advance_n(2);
            return self.token(RawTag::Ellipsis, start);
        }
        self.token(RawTag::Dot, start)
    }

    fn equal(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume '='
        match self.cursor.current() {
            b'=' => {
                self.cursor.advance();
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                }
                self.token(RawTag::EqualEqual, start)
            }
            b'>' => {
                self.cursor.advance();
                self.token(RawTag::FatArrow, start)
            }
            _ => self.token(RawTag::Equal, start),
        }
    }

    fn plus_or_minus(&mut self, start: u32, byte: u8, double_tag: RawTag) -> RawToken {
        self.cursor.advance();
        if self.cursor.current() == byte {
            self.cursor.advance();
            return self.token(double_tag, start);
        }
        if self.cursor.current() == b'=' {
            self.cursor.advance();
        }
        self.token(RawTag::Punct, start)
    }

    /// Compound operator run (`**=`, `&&=`, `>>>=`, `!==`, `??`, ...).
    ///
    /// Munching every trailing operator byte keeps a compound assignment
    /// from shedding a bare `=` token, which the export matcher would
    /// otherwise mistake for plain assignment. `/` is never munched — it
    /// may start a regex or comment.
    fn operator_run(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        self.cursor.eat_while(|b| {
            matches!(
                b,
                b'*' | b'%' | b'^' | b'&' | b'|' | b'<' | b'>' | b'!' | b'~' | b'?' | b'='
            )
        });
        self.token(RawTag::Punct, start)
    }

    // === Braces (template-aware) ===

    fn left_brace(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        self.brace_depth += 1;
        self.token(RawTag::LeftBrace, start)
    }

    fn right_brace(&mut self, start: u32) -> RawToken {
        if self.template_stack.last() == Some(&self.brace_depth) {
            // This `}` closes the interpolation — resume template scanning.
            self.template_stack.pop();
            return self.template_middle_or_tail(start);
        }
        self.cursor.advance();
        self.brace_depth = self.brace_depth.saturating_sub(1);
        self.token(RawTag::RightBrace, start)
    }

    // === Comments / division / regex ===

    fn slash_or_comment(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume first '/'
        match self.cursor.current() {
            b'/' => {
                self.cursor.advance();
                self.cursor.eat_until_newline_or_eof();
                self.token(RawTag::LineComment, start)
            }
            b'*' => {
                self.cursor.advance();
                self.block_comment(start)
            }
            _ => {
                if slash_starts_regex(self.prev) {
                    self.regex(start)
                } else if self.cursor.current() == b'=' {
                    self.cursor.advance(); // `/=`
                    self.token(RawTag::Punct, start)
                } else {
                    self.token(RawTag::Slash, start)
                }
            }
        }
    }

    fn block_comment(&mut self, start: u32) -> RawToken {
        loop {
            match self.cursor.skip_to_block_comment_star() {
                b'*' => {
                    if self.cursor.peek() == b'/' {
                        self.cursor.advance_n(2);
                        return self.token(RawTag::BlockComment, start);
                    }
                    self.cursor.advance();
                }
                _ => {
                    // EOF: the comment extends to end-of-buffer.
                    self.flags |= ScanFlags::UNTERMINATED_LITERAL;
                    return self.token(RawTag::UnterminatedComment, start);
                }
            }
        }
    }

    /// Regex literal; the opening `/` is already consumed.
    ///
    /// Tracks `[...]` character-class state: an unescaped `/` inside a
    /// class does not terminate the literal.
    fn regex(&mut self, start: u32) -> RawToken {
        let mut in_class = false;
        loop {
            match self.cursor.current() {
                0 if self.cursor.is_eof() => {
                    self.flags |= ScanFlags::UNTERMINATED_LITERAL;
                    return self.token(RawTag::UnterminatedRegex, start);
                }
                b'\n' | b'\r' => {
                    self.flags |= ScanFlags::UNTERMINATED_LITERAL;
                    return self.token(RawTag::UnterminatedRegex, start);
                }
                b'[' => {
                    in_class = true;
                    self.cursor.advance();
                }
                b']' => {
                    in_class = false;
                    self.cursor.advance();
                }
                b'/' if !in_class => {
                    self.cursor.advance(); // closing '/'
                    self.cursor.eat_while(is_ident_continue); // flags
                    return self.token(RawTag::Regex, start);
                }
                b'\\' => {
                    self.cursor.advance();
                    if !matches!(self.cursor.current(), b'\n' | b'\r')
                        && !(self.cursor.current() == 0 && self.cursor.is_eof())
                    {
                        self.cursor.advance();
                    }
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    // === String literals ===

    fn string(&mut self, start: u32) -> RawToken {
        let quote = self.cursor.current();
        self.cursor.advance(); // consume opening quote
        loop {
            let b = self.cursor.skip_to_quote_delim(quote);
            match b {
                b'\\' => {
                    self.cursor.advance(); // consume '\'
                    let escaped = self.cursor.current();
                    if escaped != 0 || !self.cursor.is_eof() {
                        self.cursor.advance(); // skip escaped byte
                        // `\` CRLF line continuation spans both bytes
                        if escaped == b'\r' && self.cursor.current() == b'\n' {
                            self.cursor.advance();
                        }
                    }
                }
                b'\n' | b'\r' => {
                    self.flags |= ScanFlags::UNTERMINATED_LITERAL;
                    return self.token(RawTag::UnterminatedString, start);
                }
                0 => {
                    if self.cursor.is_eof() {
                        self.flags |= ScanFlags::UNTERMINATED_LITERAL;
                        return self.token(RawTag::UnterminatedString, start);
                    }
                    self.cursor.advance(); // interior null is string content
                }
                _ => {
                    // The closing quote.
                    self.cursor.advance();
                    return self.token(RawTag::String, start);
                }
            }
        }
    }

    // === Template literals ===

    fn template_literal(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume opening '`'
        self.template_body(start, RawTag::TemplateComplete, RawTag::TemplateHead)
    }

    fn template_middle_or_tail(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume closing '}'
        self.template_body(start, RawTag::TemplateTail, RawTag::TemplateMiddle)
    }

    /// Shared template scanning: runs to the closing backtick (`end_tag`)
    /// or to a `${` interpolation opener (`open_tag`).
    fn template_body(&mut self, start: u32, end_tag: RawTag, open_tag: RawTag) -> RawToken {
        loop {
            let b = self.cursor.skip_to_template_delim();
            match b {
                b'`' => {
                    self.cursor.advance();
                    return self.token(end_tag, start);
                }
                b'$' => {
                    if self.cursor.peek() != b'{' {
                        self.cursor.advance(); // lone '$' is template text
                        continue;
                    }
                    if self.template_stack.len() >= TEMPLATE_DEPTH_LIMIT {
                        // Ceiling: treat `${` as literal text. The matching
                        // `}` is then also text, so scanning stays coherent.
                        self.flags |= ScanFlags::TEMPLATE_DEPTH_LIMIT;
                        self.cursor.advance_n(2);
                        continue;
                    }
                    self.cursor.advance_n(2);
                    self.template_stack.push(self.brace_depth);
                    return self.token(open_tag, start);
                }
                b'\\' => {
                    self.cursor.advance();
                    if self.cursor.current() != 0 || !self.cursor.is_eof() {
                        self.cursor.advance();
                    }
                }
                0 => {
                    if self.cursor.is_eof() {
                        self.flags |= ScanFlags::UNTERMINATED_LITERAL;
                        return self.token(RawTag::UnterminatedTemplate, start);
                    }
                    self.cursor.advance();
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}

impl Iterator for RawScanner<'_> {
    type Item = RawToken;

    fn next(&mut self) -> Option<RawToken> {
        let tok = self.next_token();
        if tok.tag == RawTag::Eof {
            None
        } else {
            Some(tok)
        }
    }
}

/// 256-byte lookup table for identifier continuation bytes.
/// `true` for a-z, A-Z, 0-9, `_`, `$`, and every byte >= 0x80.
/// Table lookup replaces the multi-range `matches!` with a single indexed
/// read. The sentinel byte (0x00) maps to `false`, terminating loops.
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static IS_IDENT_CONTINUE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0u16;
    while i < 256 {
        table[i as usize] = matches!(
            i as u8,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$' | 0x80..=0xFF
        );
        i += 1;
    }
    table
};

/// Returns `true` if `b` is a valid identifier continuation byte.
#[inline]
fn is_ident_continue(b: u8) -> bool {
    IS_IDENT_CONTINUE_TABLE[b as usize]
}
