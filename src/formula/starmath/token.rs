//! Lexical tokens of the StarMath linear notation.

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Digit run, optionally with one decimal point or a folded exponent
    Number,
    /// The `<?>` placeholder
    Placeholder,
    /// Operator, bracket or other punctuation
    Special,
    /// Plain spaces, `~` or `` ` ``
    Space,
    /// Double-quoted literal text, or an escaped letter-led bracket name
    String,
    /// Identifier: keyword, function name or variable
    Unknown,
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Whether this token is the identifier or special `text`.
    #[inline]
    pub fn is(&self, text: &str) -> bool {
        matches!(self.kind, TokenKind::Unknown | TokenKind::Special) && self.text == text
    }

    #[inline]
    pub fn is_space(&self) -> bool {
        self.kind == TokenKind::Space
    }
}
