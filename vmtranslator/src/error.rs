//! Error type for the VM translator crate.

use std::fmt;

#[derive(Debug)]
pub enum VmError {
    Io(std::io::Error),
    UnknownSegment { line: usize, segment: String },
    UnknownArithmetic { line: usize, command: String },
    MalformedCommand { line: usize, command: String },
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnknownSegment { line, segment } => {
                write!(f, "line {line}: unknown memory segment `{segment}`")
            }
            Self::UnknownArithmetic { line, command } => {
                write!(f, "line {line}: unknown arithmetic command `{command}`")
            }
            Self::MalformedCommand { line, command } => {
                write!(f, "line {line}: malformed VM command `{command}`")
            }
        }
    }
}

impl std::error::Error for VmError {}

impl From<std::io::Error> for VmError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
