//! Error type for the assembler crate.

use std::fmt;

use crate::parser::ParserError;

/// Errors that can terminate an assembly run.
#[derive(Debug)]
pub enum AssemblerError {
    /// Wraps a lower-level parser failure (I/O or malformed parser state).
    Parser(ParserError),
    /// A C-instruction's dest/comp/jump mnemonics did not resolve to any
    /// known code table entry.
    MalformedInstruction { line: usize, mnemonic: String },
    /// A label pseudo-instruction survived into the emission pass; this
    /// indicates the two passes disagree about where labels live.
    UnexpectedLabel { line: usize },
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parser(e) => write!(f, "{e}"),
            Self::MalformedInstruction { line, mnemonic } => {
                write!(f, "line {line}: malformed instruction `{mnemonic}`")
            }
            Self::UnexpectedLabel { line } => {
                write!(f, "line {line}: label encountered during code emission")
            }
        }
    }
}

impl std::error::Error for AssemblerError {}

impl From<ParserError> for AssemblerError {
    fn from(e: ParserError) -> Self {
        Self::Parser(e)
    }
}

impl From<std::io::Error> for AssemblerError {
    fn from(e: std::io::Error) -> Self {
        Self::Parser(ParserError::IoError(e))
    }
}
