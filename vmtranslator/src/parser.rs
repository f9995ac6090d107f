//! Parser module for the Hack VM language.
//!
//! Strips comments and whitespace, then classifies and splits each command
//! into its constituent tokens.

use crate::error::VmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

/// One parsed VM command together with the 1-based source line it came from.
pub struct Command {
    pub line: usize,
    pub command_type: CommandType,
    parts: Vec<String>,
}

impl Command {
    /// For `Arithmetic`, the operator name itself (`add`, `eq`, ...).
    /// For everything but `Return`, the first operand (segment or name).
    pub fn arg1(&self) -> &str {
        match self.command_type {
            CommandType::Arithmetic => &self.parts[0],
            CommandType::Return => panic!("arg1 is not defined for Return"),
            _ => &self.parts[1],
        }
    }

    /// The second operand (index / nVars / nArgs). Only valid for
    /// `Push`, `Pop`, `Function`, `Call`.
    pub fn arg2(&self) -> Result<i32, VmError> {
        match self.command_type {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                self.parts[2]
                    .parse()
                    .map_err(|_| VmError::MalformedCommand {
                        line: self.line,
                        command: self.parts.join(" "),
                    })
            }
            _ => panic!("arg2 is not defined for this command type"),
        }
    }
}

pub struct Parser {
    lines: Vec<(usize, String)>,
    cursor: usize,
}

impl Parser {
    /// Builds a parser over already-read source text, tagging each
    /// retained line with its 1-based position in the original file.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let lines = source
            .lines()
            .enumerate()
            .filter_map(|(i, raw)| {
                let stripped = raw.find("//").map_or(raw, |pos| &raw[..pos]);
                let trimmed = stripped.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some((i + 1, trimmed.to_string()))
                }
            })
            .collect();

        Self { lines, cursor: 0 }
    }

    pub fn has_more_commands(&self) -> bool {
        self.cursor < self.lines.len()
    }

    pub fn advance(&mut self) -> Result<Command, VmError> {
        let (line, text) = &self.lines[self.cursor];
        self.cursor += 1;

        let parts: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        if parts.is_empty() {
            return Err(VmError::MalformedCommand {
                line: *line,
                command: text.clone(),
            });
        }

        let command_type = match parts[0].as_str() {
            "push" => CommandType::Push,
            "pop" => CommandType::Pop,
            "label" => CommandType::Label,
            "goto" => CommandType::Goto,
            "if-goto" => CommandType::If,
            "function" => CommandType::Function,
            "return" => CommandType::Return,
            "call" => CommandType::Call,
            _ => CommandType::Arithmetic,
        };

        Ok(Command {
            line: *line,
            command_type,
            parts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let mut p = Parser::from_source("// header\n\npush constant 7 // literal\nadd\n");
        assert!(p.has_more_commands());
        let c = p.advance().unwrap();
        assert_eq!(c.command_type, CommandType::Push);
        assert_eq!(c.arg1(), "constant");
        assert_eq!(c.arg2().unwrap(), 7);

        let c = p.advance().unwrap();
        assert_eq!(c.command_type, CommandType::Arithmetic);
        assert_eq!(c.arg1(), "add");
        assert!(!p.has_more_commands());
    }

    #[test]
    fn classifies_every_command_kind() {
        let src = "\
            push constant 1\n\
            pop local 0\n\
            label LOOP\n\
            goto LOOP\n\
            if-goto LOOP\n\
            function Foo.bar 2\n\
            call Foo.bar 1\n\
            return\n";
        let mut p = Parser::from_source(src);
        let expected = [
            CommandType::Push,
            CommandType::Pop,
            CommandType::Label,
            CommandType::Goto,
            CommandType::If,
            CommandType::Function,
            CommandType::Call,
            CommandType::Return,
        ];
        for want in expected {
            assert_eq!(p.advance().unwrap().command_type, want);
        }
    }
}
