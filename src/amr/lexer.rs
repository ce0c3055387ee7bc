//! AMR lexer: tokenizes bracketed graph text.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextSpan,
    pub text: String,
}

/// Byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    Slash,
    /// `:ARG0`, `:op1`, `:ARG1-of` ... (text keeps the colon)
    Role,
    /// Any other run of printable non-delimiter characters.
    Symbol,
    /// `"..."` constant (text is unquoted).
    Quoted,
    Eof,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '/' | '"')
}

/// Tokenize AMR text.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => { chars.next(); }

            '(' => { chars.next(); tokens.push(punct(TokenKind::LParen, pos, "(")); }
            ')' => { chars.next(); tokens.push(punct(TokenKind::RParen, pos, ")")); }
            '/' => { chars.next(); tokens.push(punct(TokenKind::Slash, pos, "/")); }

            '"' => {
                chars.next(); // opening quote
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => match chars.next() {
                            Some((_, 'n')) => s.push('\n'),
                            Some((_, 'r')) => s.push('\r'),
                            Some((_, 't')) => s.push('\t'),
                            Some((_, escaped)) => s.push(escaped),
                            None => {}
                        },
                        Some((end, '"')) => {
                            tokens.push(Token {
                                kind: TokenKind::Quoted,
                                span: TextSpan { start: pos, end: end + 1 },
                                text: s,
                            });
                            break;
                        }
                        Some((_, c)) => s.push(c),
                        None => return Err(Error::SyntaxError {
                            position: pos,
                            message: "Unterminated string literal".into(),
                        }),
                    }
                }
            }

            c if c.is_control() => {
                return Err(Error::SyntaxError {
                    position: pos,
                    message: format!("Unexpected character: {c:?}"),
                });
            }

            _ => {
                let mut text = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if is_delimiter(c) || c.is_control() {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                let kind = if text.starts_with(':') {
                    if text.len() == 1 {
                        return Err(Error::SyntaxError {
                            position: pos,
                            message: "Empty role name".into(),
                        });
                    }
                    TokenKind::Role
                } else {
                    TokenKind::Symbol
                };
                tokens.push(Token {
                    kind,
                    span: TextSpan { start: pos, end: pos + text.len() },
                    text,
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: TextSpan { start: input.len(), end: input.len() },
        text: String::new(),
    });

    Ok(tokens)
}

fn punct(kind: TokenKind, pos: usize, text: &str) -> Token {
    Token {
        kind,
        span: TextSpan { start: pos, end: pos + text.len() },
        text: text.to_string(),
    }
}
