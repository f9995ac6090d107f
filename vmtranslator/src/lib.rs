//! VM Translator for the Hack platform.
//!
//! Translates Hack VM stack-machine code into symbolic Hack assembly.
//! Consumes an ordered sequence of (base name, source text) units and
//! produces a single assembly text stream — how those units reach the
//! filesystem is the concern of `main`, not of this library.

#![warn(clippy::all)]

pub mod code_writer;
pub mod error;
pub mod parser;

use code_writer::CodeWriter;
use error::VmError;
use parser::{Command, CommandType, Parser};

/// One VM input: a base name (used for static-segment scoping and to
/// detect the `Sys` bootstrap unit) and its source text.
pub struct VmUnit<'a> {
    pub base_name: &'a str,
    pub source: &'a str,
}

/// Translates an ordered batch of VM units into one assembly stream.
///
/// If any unit is named `Sys`, the emitted bootstrap calls `Sys.init`;
/// otherwise only the stack pointer is initialized.
pub fn translate(units: &[VmUnit]) -> Result<String, VmError> {
    let mut writer = CodeWriter::new();
    let has_sys = units.iter().any(|u| u.base_name == "Sys");
    writer.write_init(has_sys);

    for unit in units {
        writer.set_filename(unit.base_name);
        translate_unit(unit.source, &mut writer)?;
    }

    Ok(writer.finish())
}

fn translate_unit(source: &str, writer: &mut CodeWriter) -> Result<(), VmError> {
    let mut parser = Parser::from_source(source);
    while parser.has_more_commands() {
        let command = parser.advance()?;
        apply(&command, writer)?;
    }
    Ok(())
}

fn apply(command: &Command, writer: &mut CodeWriter) -> Result<(), VmError> {
    match command.command_type {
        CommandType::Arithmetic => writer.write_arithmetic(command.line, command.arg1())?,
        CommandType::Push => {
            writer.write_push_pop(command.line, true, command.arg1(), command.arg2()?)?;
        }
        CommandType::Pop => {
            writer.write_push_pop(command.line, false, command.arg1(), command.arg2()?)?;
        }
        CommandType::Label => writer.write_label(command.arg1()),
        CommandType::Goto => writer.write_goto(command.arg1()),
        CommandType::If => writer.write_if(command.arg1()),
        CommandType::Function => writer.write_function(command.arg1(), command.arg2()?),
        CommandType::Call => writer.write_call(command.arg1(), command.arg2()?),
        CommandType::Return => writer.write_return(),
    }
    Ok(())
}
