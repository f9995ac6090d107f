//! Translates parsed VM commands into Hack assembly text.
//!
//! Arithmetic is emitted with the in-place technique: the stack pointer is
//! decremented once per binary operation and the result is written directly
//! into the slot that was the second-from-top element, rather than routed
//! through scratch registers.

use crate::error::VmError;

#[derive(Clone, Copy)]
enum Segment {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl Segment {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "temp" => Some(Self::Temp),
            "pointer" => Some(Self::Pointer),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            _ => None,
        }
    }

    fn base_symbol(self) -> Option<&'static str> {
        match self {
            Self::Local => Some("LCL"),
            Self::Argument => Some("ARG"),
            Self::This => Some("THIS"),
            Self::That => Some("THAT"),
            _ => None,
        }
    }
}

pub struct CodeWriter {
    buf: String,
    filename: String,
    cmp_counter: usize,
    call_counter: usize,
    current_function: String,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            filename: String::new(),
            cmp_counter: 0,
            call_counter: 0,
            current_function: String::new(),
        }
    }

    /// Sets the base name used to qualify `static` references for commands
    /// translated from here on, until the next call.
    pub fn set_filename(&mut self, filename: &str) {
        self.filename.clear();
        self.filename.push_str(filename);
    }

    /// Consumes the writer, returning the accumulated assembly text.
    #[must_use]
    pub fn finish(self) -> String {
        self.buf
    }

    /// Emits the program bootstrap: SP=256, and, when `call_sys_init` is
    /// set, `call Sys.init 0`.
    pub fn write_init(&mut self, call_sys_init: bool) {
        self.buf.push_str("@256\nD=A\n@SP\nM=D\n");
        if call_sys_init {
            self.write_call("Sys.init", 0);
        }
    }

    pub fn write_arithmetic(&mut self, line: usize, command: &str) -> Result<(), VmError> {
        self.buf.push_str(&format!("// {command}\n"));
        match command {
            "add" => self.write_binary("M=D+M"),
            "sub" => self.write_binary("M=M-D"),
            "and" => self.write_binary("M=D&M"),
            "or" => self.write_binary("M=D|M"),
            "neg" => self.write_unary("M=-M"),
            "not" => self.write_unary("M=!M"),
            "eq" => self.write_comparison("JEQ"),
            "gt" => self.write_comparison("JGT"),
            "lt" => self.write_comparison("JLT"),
            other => {
                return Err(VmError::UnknownArithmetic {
                    line,
                    command: other.to_string(),
                });
            }
        }
        Ok(())
    }

    fn write_binary(&mut self, op: &str) {
        self.buf
            .push_str(&format!("@SP\nM=M-1\nA=M\nD=M\nA=A-1\n{op}\n"));
    }

    fn write_unary(&mut self, op: &str) {
        self.buf.push_str(&format!("@SP\nA=M-1\n{op}\n"));
    }

    fn write_comparison(&mut self, jump: &str) {
        let n = self.cmp_counter;
        self.cmp_counter += 1;
        let label_base = match jump {
            "JEQ" => "EQ",
            "JGT" => "GT",
            _ => "LT",
        };
        self.buf.push_str(&format!(
            "@SP\nM=M-1\nA=M\nD=M\nA=A-1\nD=M-D\n\
             @{label_base}{n}\nD;{jump}\n\
             @SP\nA=M-1\nM=0\n\
             @END{label_base}{n}\n0;JMP\n\
             ({label_base}{n})\n\
             @SP\nA=M-1\nM=-1\n\
             (END{label_base}{n})\n"
        ));
    }

    pub fn write_push_pop(
        &mut self,
        line: usize,
        is_push: bool,
        segment: &str,
        index: i32,
    ) -> Result<(), VmError> {
        self.buf.push_str(&format!(
            "// {} {segment} {index}\n",
            if is_push { "push" } else { "pop" }
        ));
        let seg = Segment::from_str(segment).ok_or_else(|| VmError::UnknownSegment {
            line,
            segment: segment.to_string(),
        })?;
        if is_push {
            self.write_push(seg, index);
        } else {
            self.write_pop(line, seg, index)?;
        }
        Ok(())
    }

    fn write_push(&mut self, seg: Segment, index: i32) {
        match seg {
            Segment::Constant => {
                self.buf.push_str(&format!("@{index}\nD=A\n"));
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = seg.base_symbol().unwrap();
                self.buf
                    .push_str(&format!("@{base}\nD=M\n@{index}\nA=D+A\nD=M\n"));
            }
            Segment::Temp => {
                self.buf
                    .push_str(&format!("@5\nD=A\n@{index}\nA=D+A\nD=M\n"));
            }
            Segment::Pointer => {
                let symbol = if index == 0 { "THIS" } else { "THAT" };
                self.buf.push_str(&format!("@{symbol}\nD=M\n"));
            }
            Segment::Static => {
                self.buf
                    .push_str(&format!("@{}.{index}\nD=M\n", self.filename));
            }
        }
        self.write_push_d();
    }

    fn write_pop(&mut self, line: usize, seg: Segment, index: i32) -> Result<(), VmError> {
        match seg {
            Segment::Constant => {
                return Err(VmError::UnknownSegment {
                    line,
                    segment: "constant".to_string(),
                });
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = seg.base_symbol().unwrap();
                self.buf
                    .push_str(&format!("@{base}\nD=M\n@{index}\nD=D+A\n@R13\nM=D\n"));
                self.write_pop_to_d();
                self.buf.push_str("@R13\nA=M\nM=D\n");
            }
            Segment::Temp => {
                self.buf
                    .push_str(&format!("@5\nD=A\n@{index}\nD=D+A\n@R13\nM=D\n"));
                self.write_pop_to_d();
                self.buf.push_str("@R13\nA=M\nM=D\n");
            }
            Segment::Pointer => {
                let symbol = if index == 0 { "THIS" } else { "THAT" };
                self.write_pop_to_d();
                self.buf.push_str(&format!("@{symbol}\nM=D\n"));
            }
            Segment::Static => {
                self.write_pop_to_d();
                self.buf
                    .push_str(&format!("@{}.{index}\nM=D\n", self.filename));
            }
        }
        Ok(())
    }

    fn write_push_d(&mut self) {
        self.buf.push_str("@SP\nA=M\nM=D\n@SP\nM=M+1\n");
    }

    fn write_pop_to_d(&mut self) {
        self.buf.push_str("@SP\nM=M-1\nA=M\nD=M\n");
    }

    /// Records the function whose labels/returns are currently being
    /// emitted, so `label`/`goto`/`if-goto` can be scoped to it.
    pub fn set_current_function(&mut self, name: &str) {
        self.current_function.clear();
        self.current_function.push_str(name);
    }

    fn scoped_label(&self, name: &str) -> String {
        format!("{}${name}", self.current_function)
    }

    pub fn write_label(&mut self, name: &str) {
        let label = self.scoped_label(name);
        self.buf.push_str(&format!("({label})\n"));
    }

    pub fn write_goto(&mut self, name: &str) {
        let label = self.scoped_label(name);
        self.buf.push_str(&format!("@{label}\n0;JMP\n"));
    }

    pub fn write_if(&mut self, name: &str) {
        let label = self.scoped_label(name);
        self.write_pop_to_d();
        self.buf.push_str(&format!("@{label}\nD;JNE\n"));
    }

    pub fn write_function(&mut self, name: &str, n_vars: i32) {
        self.set_current_function(name);
        self.buf.push_str(&format!("({name})\n"));
        for _ in 0..n_vars {
            self.buf.push_str("@0\nD=A\n");
            self.write_push_d();
        }
    }

    pub fn write_call(&mut self, name: &str, n_args: i32) {
        let ret_label = format!("{}$ret.{}", self.current_function, self.call_counter);
        self.call_counter += 1;

        self.buf.push_str(&format!("@{ret_label}\nD=A\n"));
        self.write_push_d();
        for seg in ["LCL", "ARG", "THIS", "THAT"] {
            self.buf.push_str(&format!("@{seg}\nD=M\n"));
            self.write_push_d();
        }
        self.buf.push_str(&format!(
            "@SP\nD=M\n@5\nD=D-A\n@{n_args}\nD=D-A\n@ARG\nM=D\n\
             @SP\nD=M\n@LCL\nM=D\n\
             @{name}\n0;JMP\n\
             ({ret_label})\n"
        ));
    }

    pub fn write_return(&mut self) {
        self.buf.push_str(
            "@LCL\nD=M\n@R13\nM=D\n\
             @R13\nD=M\n@5\nA=D-A\nD=M\n@R14\nM=D\n",
        );
        self.write_pop_to_d();
        self.buf.push_str("@ARG\nA=M\nM=D\n");
        self.buf.push_str("@ARG\nD=M+1\n@SP\nM=D\n");
        for (offset, dest) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            self.buf.push_str(&format!(
                "@R13\nD=M\n@{offset}\nA=D-A\nD=M\n@{dest}\nM=D\n"
            ));
        }
        self.buf.push_str("@R14\nA=M\n0;JMP\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_constant_then_add() {
        let mut w = CodeWriter::new();
        w.write_push_pop(1, true, "constant", 7).unwrap();
        w.write_push_pop(2, true, "constant", 8).unwrap();
        w.write_arithmetic(3, "add").unwrap();
        let asm = w.finish();
        assert!(asm.contains("@7"));
        assert!(asm.contains("@8"));
        assert!(asm.contains("M=D+M"));
    }

    #[test]
    fn pointer_segment_uses_direct_addressing() {
        let mut w = CodeWriter::new();
        w.write_push_pop(1, true, "pointer", 0).unwrap();
        let asm = w.finish();
        // Must read THIS directly, never index off it.
        assert!(asm.contains("@THIS\nD=M\n"));
        assert!(!asm.contains("A=D+A"));
    }

    #[test]
    fn unknown_segment_is_an_error() {
        let mut w = CodeWriter::new();
        let err = w.write_push_pop(1, true, "bogus", 0).unwrap_err();
        assert!(matches!(err, VmError::UnknownSegment { .. }));
    }

    #[test]
    fn call_and_return_labels_are_scoped_and_unique() {
        let mut w = CodeWriter::new();
        w.set_current_function("Main.main");
        w.write_call("Foo.bar", 2);
        w.write_call("Foo.bar", 1);
        let asm = w.finish();
        assert!(asm.contains("Main.main$ret.0"));
        assert!(asm.contains("Main.main$ret.1"));
    }
}
