//! Formats stack-VM text. The single place that concatenates VM syntax;
//! callers describe intent (segment, index, op) rather than strings.

use std::fmt;

#[derive(Debug, Clone, Copy)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constant => "constant",
            Self::Argument => "argument",
            Self::Local => "local",
            Self::Static => "static",
            Self::This => "this",
            Self::That => "that",
            Self::Pointer => "pointer",
            Self::Temp => "temp",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        };
        write!(f, "{s}")
    }
}

#[derive(Default)]
pub struct VmWriter {
    buf: String,
}

impl VmWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) {
        self.buf.push_str(&format!("push {segment} {index}\n"));
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) {
        self.buf.push_str(&format!("pop {segment} {index}\n"));
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) {
        self.buf.push_str(&format!("{op}\n"));
    }

    pub fn write_label(&mut self, label: &str) {
        self.buf.push_str(&format!("label {label}\n"));
    }

    pub fn write_goto(&mut self, label: &str) {
        self.buf.push_str(&format!("goto {label}\n"));
    }

    pub fn write_if(&mut self, label: &str) {
        self.buf.push_str(&format!("if-goto {label}\n"));
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) {
        self.buf.push_str(&format!("call {name} {n_args}\n"));
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) {
        self.buf.push_str(&format!("function {name} {n_locals}\n"));
    }

    pub fn write_return(&mut self) {
        self.buf.push_str("return\n");
    }
}
