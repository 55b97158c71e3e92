//! Canonical block emission.
//!
//! Words are emitted in a fixed order (F I J K L N P R S T X Y Z, then the
//! modal groups in ascending group order), with no separators; g-code words
//! are self-delimiting. Values print with up to four decimals, trailing
//! zeros trimmed, which keeps the 0.1 um resolution the transformers work at.

use std::io::{self, Write};

use crate::block::{CommandWords, ParserBlock, ValueWords};
use crate::modal::CoolantMode;

/// Formats a numeric word value: fixed four decimals, then trailing zeros
/// and a dangling point removed.
pub fn format_value(value: f64) -> String {
    let mut text = format!("{value:.4}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text.truncate(0);
        text.push('0');
    }
    text
}

/// Writes one block as a line of g-code, without the trailing newline.
pub fn print_block<W: Write + ?Sized>(block: &ParserBlock, out: &mut W) -> io::Result<()> {
    let words = block.value_words;
    let values = &block.values;

    if words.contains(ValueWords::F) {
        write!(out, "F{}", format_value(values.f))?;
    }
    if words.contains(ValueWords::I) {
        write!(out, "I{}", format_value(values.ijk[0]))?;
    }
    if words.contains(ValueWords::J) {
        write!(out, "J{}", format_value(values.ijk[1]))?;
    }
    if words.contains(ValueWords::K) {
        write!(out, "K{}", format_value(values.ijk[2]))?;
    }
    if words.contains(ValueWords::L) {
        write!(out, "L{}", values.l)?;
    }
    if words.contains(ValueWords::N) {
        write!(out, "N{}", values.n)?;
    }
    if words.contains(ValueWords::P) {
        write!(out, "P{}", format_value(values.p))?;
    }
    if words.contains(ValueWords::R) {
        write!(out, "R{}", format_value(values.r))?;
    }
    if words.contains(ValueWords::S) {
        write!(out, "S{}", format_value(values.s))?;
    }
    if words.contains(ValueWords::T) {
        write!(out, "T{}", values.t)?;
    }
    if words.contains(ValueWords::X) {
        write!(out, "X{}", format_value(values.xyz[0]))?;
    }
    if words.contains(ValueWords::Y) {
        write!(out, "Y{}", format_value(values.xyz[1]))?;
    }
    if words.contains(ValueWords::Z) {
        write!(out, "Z{}", format_value(values.xyz[2]))?;
    }

    let commands = block.command_words;
    if commands.contains(CommandWords::G0) {
        write!(out, "{}", block.non_modal.gcode())?;
    }
    if commands.contains(CommandWords::G1) {
        write!(out, "{}", block.modal.motion.gcode())?;
    }
    if commands.contains(CommandWords::G2) {
        write!(out, "{}", block.modal.plane.gcode())?;
    }
    if commands.contains(CommandWords::G3) {
        write!(out, "{}", block.modal.distance.gcode())?;
    }
    if commands.contains(CommandWords::G4) {
        write!(out, "G91.1")?;
    }
    if commands.contains(CommandWords::G5) {
        write!(out, "{}", block.modal.feed_rate.gcode())?;
    }
    if commands.contains(CommandWords::G6) {
        write!(out, "{}", block.modal.units.gcode())?;
    }
    if commands.contains(CommandWords::G7) {
        write!(out, "G40")?;
    }
    if commands.contains(CommandWords::G8) {
        write!(out, "{}", block.modal.tool_length.gcode())?;
    }
    if commands.contains(CommandWords::G12) {
        write!(out, "{}", block.modal.coord_system.gcode())?;
    }
    if commands.contains(CommandWords::G13) {
        write!(out, "G61")?;
    }
    if commands.contains(CommandWords::M4) {
        if let Some(mcode) = block.modal.program_flow.mcode() {
            write!(out, "{mcode}")?;
        }
    }
    if commands.contains(CommandWords::M7) {
        write!(out, "{}", block.modal.spindle.mcode())?;
    }
    if commands.contains(CommandWords::M8) {
        let coolant = block.modal.coolant;
        if coolant.contains(CoolantMode::MIST) {
            write!(out, "M7")?;
        }
        if coolant.contains(CoolantMode::FLOOD) {
            write!(out, "M8")?;
        }
        if coolant.is_empty() {
            write!(out, "M9")?;
        }
    }
    if commands.contains(CommandWords::M9) {
        write!(out, "M56")?;
    }

    Ok(())
}

/// Renders one block to a string, mostly for tests and tracing.
pub fn block_to_string(block: &ParserBlock) -> String {
    let mut buf = Vec::new();
    print_block(block, &mut buf).expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("printer emits ASCII")
}
