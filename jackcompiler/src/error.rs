//! Error type for the Jack compiler crate.

use std::fmt;

#[derive(Debug)]
pub enum JackError {
    Io(std::io::Error),
    UnterminatedString { line: usize },
    UnterminatedComment { line: usize },
    InvalidCharacter { line: usize, ch: char },
    UnexpectedToken { line: usize, found: String, expected: &'static str },
    UnexpectedEof { expected: &'static str },
    UndefinedSymbol { line: usize, name: String },
}

impl fmt::Display for JackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnterminatedString { line } => {
                write!(f, "line {line}: unterminated string constant")
            }
            Self::UnterminatedComment { line } => {
                write!(f, "line {line}: unterminated block comment")
            }
            Self::InvalidCharacter { line, ch } => {
                write!(f, "line {line}: invalid character `{ch}`")
            }
            Self::UnexpectedToken {
                line,
                found,
                expected,
            } => write!(f, "line {line}: expected {expected}, found `{found}`"),
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            Self::UndefinedSymbol { line, name } => {
                write!(f, "line {line}: undefined identifier `{name}`")
            }
        }
    }
}

impl std::error::Error for JackError {}

impl From<std::io::Error> for JackError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
