//! StarMath tokenizer.
//!
//! Tokenizing never fails: anything that is not a letter, digit, quote or
//! space becomes a one-character `Special` token, and control characters are
//! dropped.

use super::keywords::{BRACKETS, percent_symbol};
use super::token::{Token, TokenKind};
use phf::phf_set;

/// Two-character operators that merge when their halves are adjacent.
static DIGRAPHS: phf::Set<&'static str> = phf_set! {
    "##", "+-", "-+", "<=", ">=", "<>", "<<", ">>",
};

/// Tokenize a StarMath formula.
///
/// # Examples
///
/// ```
/// use stoff::formula::starmath::{tokenize, TokenKind};
///
/// let tokens = tokenize("2e-3");
/// assert_eq!(tokens.len(), 1);
/// assert_eq!(tokens[0].kind, TokenKind::Number);
/// assert_eq!(tokens[0].text, "2e-3");
/// ```
pub fn tokenize(formula: &str) -> Vec<Token> {
    let tokens = Lexer::new(formula).run();
    merge_compounds(tokens)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    identifier: String,
}

#[inline]
fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (c as u32) >= 0x80
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::with_capacity(src.len() / 2 + 1),
            identifier: String::new(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    #[inline]
    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            if is_letter(c) {
                self.identifier.push(c);
                self.bump(c);
                continue;
            }
            self.flush_identifier();

            match c {
                '"' => self.lex_string(),
                ' ' | '\t' => self.lex_spaces(),
                '~' | '`' => {
                    self.bump(c);
                    self.tokens.push(Token::new(TokenKind::Space, c));
                },
                '0'..='9' => self.lex_number(),
                '.' if self.peek_second().is_some_and(|d| d.is_ascii_digit()) => {
                    self.lex_number()
                },
                c if (c as u32) < 0x1f => self.bump(c),
                '<' if self.src[self.pos..].starts_with("<?>") => {
                    self.pos += 3;
                    self.tokens.push(Token::new(TokenKind::Placeholder, "<?>"));
                },
                _ => self.lex_special(c),
            }
        }
        self.flush_identifier();
        self.tokens
    }

    fn flush_identifier(&mut self) {
        if !self.identifier.is_empty() {
            let text = std::mem::take(&mut self.identifier);
            self.tokens.push(Token::new(TokenKind::Unknown, text));
        }
    }

    fn lex_string(&mut self) {
        // skip the opening quote
        self.pos += 1;
        let rest = &self.src[self.pos..];
        let (content, consumed) = match memchr::memchr(b'"', rest.as_bytes()) {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.tokens.push(Token::new(TokenKind::String, content));
        self.pos += consumed;
    }

    fn lex_spaces(&mut self) {
        let mut text = String::new();
        while let Some(c @ (' ' | '\t')) = self.peek() {
            text.push(' ');
            self.bump(c);
        }
        self.tokens.push(Token::new(TokenKind::Space, text));
    }

    fn lex_number(&mut self) {
        if let Some(mut merged) = self.take_exponent_prefix() {
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                merged.push(c);
                self.bump(c);
            }
            self.tokens.push(Token::new(TokenKind::Number, merged));
            return;
        }

        let mut text = String::new();
        let mut seen_point = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => text.push(c),
                '.' if !seen_point => {
                    seen_point = true;
                    text.push(c);
                },
                _ => break,
            }
            self.bump(c);
        }
        self.tokens.push(Token::new(TokenKind::Number, text));
    }

    /// Fold `Number e [-]` at the end of the token list back into a prefix
    /// for the exponent digits about to be read.
    fn take_exponent_prefix(&mut self) -> Option<String> {
        let is_exponent = |t: &Token| t.kind == TokenKind::Unknown && (t.text == "e" || t.text == "E");
        let start = match self.tokens.as_slice() {
            [.., number, e, minus]
                if number.kind == TokenKind::Number && is_exponent(e) && minus.is("-") =>
            {
                self.tokens.len() - 3
            },
            [.., number, e] if number.kind == TokenKind::Number && is_exponent(e) => {
                self.tokens.len() - 2
            },
            _ => return None,
        };
        if self.tokens[start].text.contains(['e', 'E']) {
            return None;
        }
        let tail = self.tokens.split_off(start);
        Some(tail.into_iter().map(|t| t.text).collect())
    }

    fn lex_special(&mut self, c: char) {
        self.bump(c);
        if let Some(last) = self.tokens.last_mut() {
            if last.kind == TokenKind::Special {
                let mut merged = last.text.clone();
                merged.push(c);
                if DIGRAPHS.contains(merged.as_str()) {
                    last.text = merged;
                    return;
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::Special, c));
    }
}

/// Merge `%name` symbols and `\bracket` escapes into single tokens.
fn merge_compounds(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if token.kind == TokenKind::Special {
            let merged = match (token.text.as_str(), iter.peek()) {
                ("%", Some(next))
                    if next.kind == TokenKind::Unknown && percent_symbol(&next.text).is_some() =>
                {
                    Some(TokenKind::Special)
                },
                ("\\", Some(next))
                    if next.kind == TokenKind::Unknown
                        && next.text != "none"
                        && BRACKETS.contains_key(next.text.as_str()) =>
                {
                    Some(TokenKind::String)
                },
                ("\\", Some(next))
                    if next.kind == TokenKind::Special && BRACKETS.contains_key(next.text.as_str()) =>
                {
                    Some(TokenKind::Special)
                },
                _ => None,
            };
            if let Some(kind) = merged {
                if let Some(next) = iter.next() {
                    out.push(Token::new(kind, format!("{}{}", token.text, next.text)));
                    continue;
                }
            }
        }
        out.push(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds_and_texts(formula: &str) -> Vec<(TokenKind, String)> {
        tokenize(formula)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_scientific_notation_merge() {
        assert_eq!(kinds_and_texts("2e3"), vec![tok(TokenKind::Number, "2e3")]);
        assert_eq!(kinds_and_texts("2e-3"), vec![tok(TokenKind::Number, "2e-3")]);
        assert_eq!(kinds_and_texts("1.5E10"), vec![tok(TokenKind::Number, "1.5E10")]);
    }

    #[test]
    fn test_scientific_notation_has_no_second_point() {
        assert_eq!(
            kinds_and_texts("2e3.2"),
            vec![tok(TokenKind::Number, "2e3"), tok(TokenKind::Number, ".2")]
        );
    }

    #[test]
    fn test_plus_exponent_is_not_merged() {
        assert_eq!(
            kinds_and_texts("2e+3"),
            vec![
                tok(TokenKind::Number, "2"),
                tok(TokenKind::Unknown, "e"),
                tok(TokenKind::Special, "+"),
                tok(TokenKind::Number, "3"),
            ]
        );
    }

    #[test]
    fn test_exponent_needs_adjacent_e() {
        assert_eq!(
            kinds_and_texts("2 e3"),
            vec![
                tok(TokenKind::Number, "2"),
                tok(TokenKind::Space, " "),
                tok(TokenKind::Unknown, "e"),
                tok(TokenKind::Number, "3"),
            ]
        );
    }

    #[test]
    fn test_placeholder_collapse() {
        assert_eq!(kinds_and_texts("<?>"), vec![tok(TokenKind::Placeholder, "<?>")]);
        assert_eq!(
            kinds_and_texts("<?"),
            vec![tok(TokenKind::Special, "<"), tok(TokenKind::Special, "?")]
        );
    }

    #[test]
    fn test_digraphs() {
        assert_eq!(
            kinds_and_texts("a<=b##c+-d"),
            vec![
                tok(TokenKind::Unknown, "a"),
                tok(TokenKind::Special, "<="),
                tok(TokenKind::Unknown, "b"),
                tok(TokenKind::Special, "##"),
                tok(TokenKind::Unknown, "c"),
                tok(TokenKind::Special, "+-"),
                tok(TokenKind::Unknown, "d"),
            ]
        );
        assert_eq!(
            kinds_and_texts("###"),
            vec![tok(TokenKind::Special, "##"), tok(TokenKind::Special, "#")]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds_and_texts("\"a b\"c"),
            vec![tok(TokenKind::String, "a b"), tok(TokenKind::Unknown, "c")]
        );
        assert_eq!(kinds_and_texts("\"open"), vec![tok(TokenKind::String, "open")]);
    }

    #[test]
    fn test_spaces() {
        assert_eq!(
            kinds_and_texts("a \t b~~`c"),
            vec![
                tok(TokenKind::Unknown, "a"),
                tok(TokenKind::Space, "   "),
                tok(TokenKind::Unknown, "b"),
                tok(TokenKind::Space, "~"),
                tok(TokenKind::Space, "~"),
                tok(TokenKind::Space, "`"),
                tok(TokenKind::Unknown, "c"),
            ]
        );
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(
            kinds_and_texts("a\r\nb"),
            vec![tok(TokenKind::Unknown, "a"), tok(TokenKind::Unknown, "b")]
        );
    }

    #[test]
    fn test_extended_characters_are_letters() {
        assert_eq!(kinds_and_texts("\u{00E9}t\u{00E9}"), vec![tok(TokenKind::Unknown, "\u{00E9}t\u{00E9}")]);
    }

    #[test]
    fn test_percent_symbols() {
        assert_eq!(kinds_and_texts("%alpha"), vec![tok(TokenKind::Special, "%alpha")]);
        assert_eq!(kinds_and_texts("%ibeta"), vec![tok(TokenKind::Special, "%ibeta")]);
        assert_eq!(
            kinds_and_texts("%foo"),
            vec![tok(TokenKind::Special, "%"), tok(TokenKind::Unknown, "foo")]
        );
    }

    #[test]
    fn test_escaped_brackets() {
        assert_eq!(kinds_and_texts("\\("), vec![tok(TokenKind::Special, "\\(")]);
        assert_eq!(kinds_and_texts("\\langle"), vec![tok(TokenKind::String, "\\langle")]);
        assert_eq!(
            kinds_and_texts("\\x"),
            vec![tok(TokenKind::Special, "\\"), tok(TokenKind::Unknown, "x")]
        );
    }

    proptest! {
        #[test]
        fn prop_tokens_cover_input(formula in "[a-z0-9 .~`_^{}()<>?#%+*=\\\\\t\n-]{0,40}") {
            let dropped = formula.chars().filter(|&c| (c as u32) < 0x1f && c != '\t').count();
            let covered: usize = tokenize(&formula).iter().map(|t| t.text.chars().count()).sum();
            prop_assert_eq!(covered + dropped, formula.chars().count());
        }
    }
}
