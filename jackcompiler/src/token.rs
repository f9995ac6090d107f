//! Tokenizer for the Jack language.
//!
//! Operates over the full character stream (not pre-split into lines) so
//! that `//` and `/*` inside a string constant are never mistaken for the
//! start of a comment.

use phf::phf_set;

use crate::error::JackError;

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "class", "constructor", "function", "method", "field", "static", "var",
    "int", "char", "boolean", "void", "true", "false", "null", "this",
    "let", "do", "if", "else", "while", "return",
};

static SYMBOLS: phf::Set<char> = phf_set! {
    '{', '}', '(', ')', '[', ']', '.', ',', ';',
    '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Symbol,
    IntConst,
    StringConst,
    Identifier,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

/// Tokenizes the full source text up front into a flat list of tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, JackError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut line = 1usize;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start_line = line;
            i += 2;
            loop {
                if i >= chars.len() {
                    return Err(JackError::UnterminatedComment { line: start_line });
                }
                if chars[i] == '\n' {
                    line += 1;
                }
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            tokens.push(Token {
                kind: TokenKind::IntConst,
                text,
                line,
            });
            continue;
        }

        if c == '"' {
            let start_line = line;
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\n' {
                    return Err(JackError::UnterminatedString { line: start_line });
                }
                i += 1;
            }
            if i >= chars.len() {
                return Err(JackError::UnterminatedString { line: start_line });
            }
            let text: String = chars[start..i].iter().collect();
            i += 1;
            tokens.push(Token {
                kind: TokenKind::StringConst,
                text,
                line: start_line,
            });
            continue;
        }

        if SYMBOLS.contains(&c) {
            tokens.push(Token {
                kind: TokenKind::Symbol,
                text: c.to_string(),
                line,
            });
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let kind = if KEYWORDS.contains(text.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token { kind, text, line });
            continue;
        }

        return Err(JackError::InvalidCharacter { line, ch: c });
    }

    Ok(tokens)
}
