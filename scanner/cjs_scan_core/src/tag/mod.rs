//! Raw token tags produced by the scanner.
//!
//! Tags are deliberately coarse: the export matcher only needs to tell
//! identifiers, literals, and a handful of punctuators apart. Everything
//! else collapses into [`RawTag::Punct`].

/// Tag identifying the kind of a raw token.
///
/// `#[repr(u8)]` with discriminants grouped into semantic ranges:
/// identifiers/literals (0-15), template pieces (16-31), punctuation
/// (32-79), delimiters (80-111), trivia (112-239), degraded tails
/// (240-254), control (255).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RawTag {
    // === Identifiers & Literals: 0-15 ===
    /// Identifier or keyword (keywords are not resolved at this layer).
    Ident = 0,
    /// Numeric literal (integer, float, hex/octal/binary, bigint).
    Number = 1,
    /// Single- or double-quoted string literal, including quotes.
    String = 2,
    /// Regular-expression literal, including flags.
    Regex = 3,

    // === Template Literal Pieces: 16-31 ===
    /// `` `...` `` with no interpolation.
    TemplateComplete = 16,
    /// `` `...${ `` opening a first interpolation.
    TemplateHead = 17,
    /// `}...${` between two interpolations.
    TemplateMiddle = 18,
    /// `` }...` `` closing the last interpolation.
    TemplateTail = 19,

    // === Operators & Punctuation: 32-79 ===
    /// `.` member access.
    Dot = 32,
    /// `...` spread / rest.
    Ellipsis = 33,
    /// `=` plain assignment (never `==`, `===`, or `=>`).
    Equal = 34,
    /// `==` or `===`.
    EqualEqual = 35,
    /// `=>` arrow.
    FatArrow = 36,
    /// `++` increment.
    PlusPlus = 37,
    /// `--` decrement.
    MinusMinus = 38,
    /// `,`
    Comma = 39,
    /// `:`
    Colon = 40,
    /// `;`
    Semicolon = 41,
    /// `/` as division (regex starts become [`RawTag::Regex`]).
    Slash = 42,
    /// Any other operator byte or compound operator.
    Punct = 43,

    // === Delimiters: 80-111 ===
    /// `(`
    LeftParen = 80,
    /// `)`
    RightParen = 81,
    /// `[`
    LeftBracket = 82,
    /// `]`
    RightBracket = 83,
    /// `{`
    LeftBrace = 84,
    /// `}` (interpolation-closing braces become template pieces instead).
    RightBrace = 85,

    // === Trivia: 112-239 ===
    /// Spaces, tabs, lone carriage returns.
    Whitespace = 112,
    /// `\n` or `\r\n`.
    Newline = 113,
    /// `// ...` to end of line.
    LineComment = 114,
    /// `/* ... */`.
    BlockComment = 115,

    // === Degraded tails: 240-254 ===
    /// String literal cut off by a newline or EOF; extends best-effort.
    UnterminatedString = 240,
    /// Template literal missing its closing backtick; extends to EOF.
    UnterminatedTemplate = 241,
    /// Regex literal cut off by a newline or EOF.
    UnterminatedRegex = 242,
    /// Block comment missing `*/`; extends to EOF.
    UnterminatedComment = 243,

    // === Control: 255 ===
    /// End of input. Zero length.
    Eof = 255,
}

impl RawTag {
    /// Returns `true` for tokens the export matcher skips entirely.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            RawTag::Whitespace
                | RawTag::Newline
                | RawTag::LineComment
                | RawTag::BlockComment
                | RawTag::UnterminatedComment
        )
    }

    /// Human-readable description for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            RawTag::Ident => "identifier",
            RawTag::Number => "numeric literal",
            RawTag::String => "string literal",
            RawTag::Regex => "regex literal",
            RawTag::TemplateComplete => "template literal",
            RawTag::TemplateHead => "template head",
            RawTag::TemplateMiddle => "template middle",
            RawTag::TemplateTail => "template tail",
            RawTag::Dot => "`.`",
            RawTag::Ellipsis => "`...`",
            RawTag::Equal => "`=`",
            RawTag::EqualEqual => "equality operator",
            RawTag::FatArrow => "`=>`",
            RawTag::PlusPlus => "`++`",
            RawTag::MinusMinus => "`--`",
            RawTag::Comma => "`,`",
            RawTag::Colon => "`:`",
            RawTag::Semicolon => "`;`",
            RawTag::Slash => "`/`",
            RawTag::Punct => "punctuator",
            RawTag::LeftParen => "`(`",
            RawTag::RightParen => "`)`",
            RawTag::LeftBracket => "`[`",
            RawTag::RightBracket => "`]`",
            RawTag::LeftBrace => "`{`",
            RawTag::RightBrace => "`}`",
            RawTag::Whitespace => "whitespace",
            RawTag::Newline => "newline",
            RawTag::LineComment => "line comment",
            RawTag::BlockComment => "block comment",
            RawTag::UnterminatedString => "unterminated string",
            RawTag::UnterminatedTemplate => "unterminated template",
            RawTag::UnterminatedRegex => "unterminated regex",
            RawTag::UnterminatedComment => "unterminated comment",
            RawTag::Eof => "end of file",
        }
    }
}

/// A raw token: tag plus byte span into the source buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawToken {
    /// What kind of token this is.
    pub tag: RawTag,
    /// Byte offset of the first byte of the token.
    pub start: u32,
    /// Byte length of the token. Zero only for [`RawTag::Eof`].
    pub len: u32,
}

impl RawToken {
    /// Byte offset one past the last byte of the token.
    pub fn end(self) -> u32 {
        self.start + self.len
    }
}

/// Size assertions: the scanner produces these by value on a hot loop.
const _: () = assert!(std::mem::size_of::<RawTag>() == 1);
const _: () = assert!(std::mem::size_of::<RawToken>() <= 12);
