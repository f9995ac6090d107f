//! Recursive-descent compiler from Jack source to stack VM code.
//!
//! No AST is materialized: VM instructions are emitted in-order as the
//! grammar is descended, driven by the current token and one-token
//! lookahead.

use crate::error::JackError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::token::{Token, TokenKind, tokenize};
use crate::vm_writer::{ArithmeticOp, Segment, VmWriter};

/// Compiles one Jack class source file into VM text.
pub fn compile(source: &str) -> Result<String, JackError> {
    let tokens = tokenize(source)?;
    let mut compiler = Compiler::new(&tokens);
    compiler.compile_class()?;
    Ok(compiler.vm.finish())
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.line)
    }

    fn text(&self) -> &str {
        self.peek().map_or("<eof>", |t| t.text.as_str())
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        self.pos += 1;
        t
    }

    fn is_symbol(&self, s: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Symbol && t.text == s)
    }

    fn is_keyword(&self, s: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Keyword && t.text == s)
    }

    fn is_keyword_any(&self, options: &[&str]) -> bool {
        options.iter().any(|s| self.is_keyword(s))
    }

    fn is_identifier(&self) -> bool {
        self.peek().is_some_and(|t| t.kind == TokenKind::Identifier)
    }

    fn unexpected(&self, expected: &'static str) -> JackError {
        if self.peek().is_none() {
            JackError::UnexpectedEof { expected }
        } else {
            JackError::UnexpectedToken {
                line: self.line(),
                found: self.text().to_string(),
                expected,
            }
        }
    }

    fn expect_symbol(&mut self, s: &'static str) -> Result<(), JackError> {
        if self.is_symbol(s) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(s))
        }
    }

    fn expect_keyword(&mut self, s: &'static str) -> Result<(), JackError> {
        if self.is_keyword(s) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(s))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, JackError> {
        if self.is_identifier() {
            Ok(self.advance().text)
        } else {
            Err(self.unexpected("identifier"))
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

struct Compiler<'a> {
    cursor: Cursor<'a>,
    symbols: SymbolTable,
    vm: VmWriter,
    class_name: String,
    label_counter: usize,
}

impl<'a> Compiler<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            cursor: Cursor::new(tokens),
            symbols: SymbolTable::new(),
            vm: VmWriter::new(),
            class_name: String::new(),
            label_counter: 0,
        }
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!("{prefix}{n}")
    }

    fn compile_class(&mut self) -> Result<(), JackError> {
        self.cursor.expect_keyword("class")?;
        self.class_name = self.cursor.expect_identifier()?;
        self.cursor.expect_symbol("{")?;

        while self.cursor.is_keyword_any(&["static", "field"]) {
            self.compile_class_var_dec()?;
        }
        while self
            .cursor
            .is_keyword_any(&["constructor", "function", "method"])
        {
            self.compile_subroutine()?;
        }

        self.cursor.expect_symbol("}")?;
        Ok(())
    }

    fn compile_type(&mut self) -> Result<String, JackError> {
        if self.cursor.is_identifier() {
            return Ok(self.cursor.advance().text);
        }
        for kw in ["int", "char", "boolean"] {
            if self.cursor.is_keyword(kw) {
                self.cursor.advance();
                return Ok(kw.to_string());
            }
        }
        Err(self.cursor.unexpected("type"))
    }

    fn compile_class_var_dec(&mut self) -> Result<(), JackError> {
        let kind = if self.cursor.is_keyword("static") {
            Kind::Static
        } else {
            Kind::Field
        };
        self.cursor.advance();

        let type_name = self.compile_type()?;
        loop {
            let name = self.cursor.expect_identifier()?;
            self.symbols.define(&name, &type_name, kind);
            if self.cursor.is_symbol(",") {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.cursor.expect_symbol(";")?;
        Ok(())
    }

    fn compile_subroutine(&mut self) -> Result<(), JackError> {
        let kind = if self.cursor.is_keyword("constructor") {
            SubroutineKind::Constructor
        } else if self.cursor.is_keyword("method") {
            SubroutineKind::Method
        } else {
            SubroutineKind::Function
        };
        self.cursor.advance();

        self.symbols.start_subroutine();
        if kind == SubroutineKind::Method {
            self.symbols.define("this", &self.class_name, Kind::Arg);
        }

        if self.cursor.is_keyword("void") {
            self.cursor.advance();
        } else {
            self.compile_type()?;
        }

        let name = self.cursor.expect_identifier()?;
        let full_name = format!("{}.{name}", self.class_name);

        self.cursor.expect_symbol("(")?;
        self.compile_parameter_list()?;
        self.cursor.expect_symbol(")")?;

        self.cursor.expect_symbol("{")?;
        while self.cursor.is_keyword("var") {
            self.compile_var_dec()?;
        }

        let n_locals = self.symbols.var_count(Kind::Var);
        self.vm.write_function(&full_name, n_locals);

        match kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.vm.write_push(Segment::Constant, n_fields);
                self.vm.write_call("Memory.alloc", 1);
                self.vm.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Method => {
                self.vm.write_push(Segment::Argument, 0);
                self.vm.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.cursor.expect_symbol("}")?;
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<(), JackError> {
        if self.cursor.is_symbol(")") {
            return Ok(());
        }
        loop {
            let type_name = self.compile_type()?;
            let name = self.cursor.expect_identifier()?;
            self.symbols.define(&name, &type_name, Kind::Arg);
            if self.cursor.is_symbol(",") {
                self.cursor.advance();
            } else {
                break;
            }
        }
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<(), JackError> {
        self.cursor.expect_keyword("var")?;
        let type_name = self.compile_type()?;
        loop {
            let name = self.cursor.expect_identifier()?;
            self.symbols.define(&name, &type_name, Kind::Var);
            if self.cursor.is_symbol(",") {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.cursor.expect_symbol(";")?;
        Ok(())
    }

    fn compile_statements(&mut self) -> Result<(), JackError> {
        loop {
            if self.cursor.is_keyword("let") {
                self.compile_let()?;
            } else if self.cursor.is_keyword("if") {
                self.compile_if()?;
            } else if self.cursor.is_keyword("while") {
                self.compile_while()?;
            } else if self.cursor.is_keyword("do") {
                self.compile_do()?;
            } else if self.cursor.is_keyword("return") {
                self.compile_return()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), JackError> {
        self.cursor.expect_keyword("let")?;
        let line = self.cursor.line();
        let name = self.cursor.expect_identifier()?;

        let has_index = self.cursor.is_symbol("[");
        if has_index {
            self.cursor.advance();
            self.push_variable(line, &name)?;
            self.compile_expression()?;
            self.vm.write_arithmetic(ArithmeticOp::Add);
            self.cursor.expect_symbol("]")?;
        }

        self.cursor.expect_symbol("=")?;
        self.compile_expression()?;
        self.cursor.expect_symbol(";")?;

        if has_index {
            self.vm.write_pop(Segment::Temp, 0);
            self.vm.write_pop(Segment::Pointer, 1);
            self.vm.write_push(Segment::Temp, 0);
            self.vm.write_pop(Segment::That, 0);
        } else {
            self.pop_variable(line, &name)?;
        }
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), JackError> {
        let label_top = self.fresh_label("WHILE_EXP");
        let label_end = self.fresh_label("WHILE_END");

        self.cursor.expect_keyword("while")?;
        self.vm.write_label(&label_top);
        self.cursor.expect_symbol("(")?;
        self.compile_expression()?;
        self.cursor.expect_symbol(")")?;
        self.vm.write_arithmetic(ArithmeticOp::Not);
        self.vm.write_if(&label_end);

        self.cursor.expect_symbol("{")?;
        self.compile_statements()?;
        self.cursor.expect_symbol("}")?;

        self.vm.write_goto(&label_top);
        self.vm.write_label(&label_end);
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), JackError> {
        let label_false = self.fresh_label("IF_FALSE");
        let label_end = self.fresh_label("IF_END");

        self.cursor.expect_keyword("if")?;
        self.cursor.expect_symbol("(")?;
        self.compile_expression()?;
        self.cursor.expect_symbol(")")?;
        self.vm.write_arithmetic(ArithmeticOp::Not);
        self.vm.write_if(&label_false);

        self.cursor.expect_symbol("{")?;
        self.compile_statements()?;
        self.cursor.expect_symbol("}")?;

        // Always emitted, even without an else branch.
        self.vm.write_goto(&label_end);
        self.vm.write_label(&label_false);

        if self.cursor.is_keyword("else") {
            self.cursor.advance();
            self.cursor.expect_symbol("{")?;
            self.compile_statements()?;
            self.cursor.expect_symbol("}")?;
        }

        self.vm.write_label(&label_end);
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), JackError> {
        self.cursor.expect_keyword("do")?;
        self.compile_subroutine_call()?;
        self.cursor.expect_symbol(";")?;
        self.vm.write_pop(Segment::Temp, 0);
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), JackError> {
        self.cursor.expect_keyword("return")?;
        if self.cursor.is_symbol(";") {
            self.vm.write_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
        }
        self.cursor.expect_symbol(";")?;
        self.vm.write_return();
        Ok(())
    }

    fn compile_expression(&mut self) -> Result<(), JackError> {
        self.compile_term()?;
        loop {
            let op = if self.cursor.is_symbol("+") {
                Some("+")
            } else if self.cursor.is_symbol("-") {
                Some("-")
            } else if self.cursor.is_symbol("*") {
                Some("*")
            } else if self.cursor.is_symbol("/") {
                Some("/")
            } else if self.cursor.is_symbol("&") {
                Some("&")
            } else if self.cursor.is_symbol("|") {
                Some("|")
            } else if self.cursor.is_symbol("<") {
                Some("<")
            } else if self.cursor.is_symbol(">") {
                Some(">")
            } else if self.cursor.is_symbol("=") {
                Some("=")
            } else {
                None
            };

            let Some(op) = op else { break };
            self.cursor.advance();
            self.compile_term()?;

            match op {
                "+" => self.vm.write_arithmetic(ArithmeticOp::Add),
                "-" => self.vm.write_arithmetic(ArithmeticOp::Sub),
                "&" => self.vm.write_arithmetic(ArithmeticOp::And),
                "|" => self.vm.write_arithmetic(ArithmeticOp::Or),
                "<" => self.vm.write_arithmetic(ArithmeticOp::Lt),
                ">" => self.vm.write_arithmetic(ArithmeticOp::Gt),
                "=" => self.vm.write_arithmetic(ArithmeticOp::Eq),
                "*" => self.vm.write_call("Math.multiply", 2),
                "/" => self.vm.write_call("Math.divide", 2),
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<u16, JackError> {
        if self.cursor.is_symbol(")") {
            return Ok(0);
        }
        let mut count = 1u16;
        self.compile_expression()?;
        while self.cursor.is_symbol(",") {
            self.cursor.advance();
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }

    fn compile_term(&mut self) -> Result<(), JackError> {
        let line = self.cursor.line();

        if let Some(tok) = self.cursor.peek() {
            match tok.kind {
                TokenKind::IntConst => {
                    let value: u16 = tok.text.parse().map_err(|_| JackError::UnexpectedToken {
                        line,
                        found: tok.text.clone(),
                        expected: "integer constant in range",
                    })?;
                    self.cursor.advance();
                    self.vm.write_push(Segment::Constant, value);
                    return Ok(());
                }
                TokenKind::StringConst => {
                    let text = tok.text.clone();
                    self.cursor.advance();
                    self.compile_string_constant(&text);
                    return Ok(());
                }
                TokenKind::Keyword => match tok.text.as_str() {
                    "true" => {
                        self.cursor.advance();
                        self.vm.write_push(Segment::Constant, 0);
                        self.vm.write_arithmetic(ArithmeticOp::Not);
                        return Ok(());
                    }
                    "false" | "null" => {
                        self.cursor.advance();
                        self.vm.write_push(Segment::Constant, 0);
                        return Ok(());
                    }
                    "this" => {
                        self.cursor.advance();
                        self.vm.write_push(Segment::Pointer, 0);
                        return Ok(());
                    }
                    _ => {
                        return Err(JackError::UnexpectedToken {
                            line,
                            found: tok.text.clone(),
                            expected: "term",
                        });
                    }
                },
                TokenKind::Symbol if tok.text == "(" => {
                    self.cursor.advance();
                    self.compile_expression()?;
                    self.cursor.expect_symbol(")")?;
                    return Ok(());
                }
                TokenKind::Symbol if tok.text == "-" => {
                    self.cursor.advance();
                    self.compile_term()?;
                    self.vm.write_arithmetic(ArithmeticOp::Neg);
                    return Ok(());
                }
                TokenKind::Symbol if tok.text == "~" => {
                    self.cursor.advance();
                    self.compile_term()?;
                    self.vm.write_arithmetic(ArithmeticOp::Not);
                    return Ok(());
                }
                TokenKind::Identifier => {
                    return self.compile_identifier_term(line);
                }
                _ => {}
            }
        }

        Err(self.cursor.unexpected("term"))
    }

    fn compile_identifier_term(&mut self, line: usize) -> Result<(), JackError> {
        let name = self.cursor.expect_identifier()?;

        if self.cursor.is_symbol("[") {
            self.cursor.advance();
            self.push_variable(line, &name)?;
            self.compile_expression()?;
            self.vm.write_arithmetic(ArithmeticOp::Add);
            self.cursor.expect_symbol("]")?;
            self.vm.write_pop(Segment::Pointer, 1);
            self.vm.write_push(Segment::That, 0);
            return Ok(());
        }

        if self.cursor.is_symbol("(") {
            self.cursor.advance();
            self.vm.write_push(Segment::Pointer, 0);
            let n = self.compile_expression_list()?;
            self.cursor.expect_symbol(")")?;
            self.vm.write_call(&format!("{}.{name}", self.class_name), n + 1);
            return Ok(());
        }

        if self.cursor.is_symbol(".") {
            self.cursor.advance();
            let method_name = self.cursor.expect_identifier()?;
            self.cursor.expect_symbol("(")?;

            if self.symbols.has_var(&name) {
                let type_name = self.symbols.type_of(&name).unwrap().to_string();
                self.push_variable(line, &name)?;
                let n = self.compile_expression_list()?;
                self.cursor.expect_symbol(")")?;
                self.vm.write_call(&format!("{type_name}.{method_name}"), n + 1);
            } else {
                let n = self.compile_expression_list()?;
                self.cursor.expect_symbol(")")?;
                self.vm.write_call(&format!("{name}.{method_name}"), n);
            }
            return Ok(());
        }

        self.push_variable(line, &name)
    }

    fn compile_subroutine_call(&mut self) -> Result<(), JackError> {
        // `do` always calls a subroutine, which is exactly a term that
        // starts with an identifier followed by `(` or `.`.
        let line = self.cursor.line();
        self.compile_identifier_term(line)
    }

    fn compile_string_constant(&mut self, text: &str) {
        self.vm.write_push(Segment::Constant, text.chars().count() as u16);
        self.vm.write_call("String.new", 1);
        for ch in text.chars() {
            self.vm.write_push(Segment::Constant, ch as u16);
            self.vm.write_call("String.appendChar", 2);
        }
    }

    fn push_variable(&mut self, line: usize, name: &str) -> Result<(), JackError> {
        let kind = self
            .symbols
            .kind_of(name)
            .ok_or_else(|| JackError::UndefinedSymbol {
                line,
                name: name.to_string(),
            })?;
        let index = self.symbols.index_of(name).unwrap();
        self.vm.write_push(segment_for(kind), index);
        Ok(())
    }

    fn pop_variable(&mut self, line: usize, name: &str) -> Result<(), JackError> {
        let kind = self
            .symbols
            .kind_of(name)
            .ok_or_else(|| JackError::UndefinedSymbol {
                line,
                name: name.to_string(),
            })?;
        let index = self.symbols.index_of(name).unwrap();
        self.vm.write_pop(segment_for(kind), index);
        Ok(())
    }
}

fn segment_for(kind: Kind) -> Segment {
    match kind {
        Kind::Static => Segment::Static,
        Kind::Field => Segment::This,
        Kind::Arg => Segment::Argument,
        Kind::Var => Segment::Local,
    }
}
