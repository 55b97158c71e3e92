//! RS-274/NGC block parser.
//!
//! Accepts one pre-scrubbed line (uppercased, whitespace and comments
//! removed) and produces a [`ParserBlock`], enforcing the modal-group
//! rules along the way: one command per group, no repeated value words,
//! no negative values where the standard forbids them, and no more than
//! one axis-command class per block.

use crate::block::{CommandWords, NonModal, ParserBlock, ValueWords, X_AXIS, Y_AXIS, Z_AXIS};
use crate::modal::{
    CoolantMode, CoordSystem, DistanceMode, FeedRateMode, Motion, OverrideMode, ProgramFlow,
    SpindleMode, ToolLengthMode, UnitsMode,
};
use crate::status::Status;

/// Largest accepted N word. The g-code standard says 99999, but senders
/// routinely number far past that; the cap is where float precision stops
/// round-tripping integers exactly.
const MAX_LINE_NUMBER: f64 = 10_000_000.0;

/// Largest accepted T word.
const MAX_TOOL_NUMBER: f64 = 255.0;

/// Which axis-command class already occupies the block. G10/G28/G30/G92,
/// any motion mode, and a tool length change all command axis motion, and
/// only one of them may appear per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisCommand {
    None,
    NonModal,
    MotionMode,
    ToolLengthOffset,
}

/// Parses one scrubbed line into a block.
///
/// Lines starting with `$J=` are jog requests: parsing begins after the
/// prefix with linear motion and units-per-minute feed enforced. Any other
/// `$` line is a system command and not a g-code block.
pub fn parse_line(line: &str) -> Result<ParserBlock, Status> {
    let mut block = ParserBlock::default();
    let mut axis_command = AxisCommand::None;

    let bytes = line.as_bytes();
    let mut pos = 0;

    if bytes.first() == Some(&b'$') {
        if !line.starts_with("$J=") {
            return Err(Status::ExpectedCommandLetter);
        }
        block.modal.motion = Motion::Linear;
        block.modal.feed_rate = FeedRateMode::UnitsPerMin;
        pos = 3;
    }

    while pos < bytes.len() {
        let letter = bytes[pos];
        if !letter.is_ascii_uppercase() {
            return Err(Status::ExpectedCommandLetter);
        }
        pos += 1;
        let value = read_float(bytes, &mut pos).ok_or(Status::BadNumberFormat)?;

        // Split into significand and a x100 mantissa so Gxx.x commands can
        // be told apart from integer commands despite float noise. Rounding
        // is required to catch small representation errors.
        let int_value = value.trunc() as i32;
        let mantissa = (100.0 * (value - value.trunc())).round() as i32;

        match letter {
            b'G' => parse_g(&mut block, &mut axis_command, int_value, mantissa)?,
            b'M' => parse_m(&mut block, int_value, mantissa)?,
            _ => parse_value_word(&mut block, letter, value, int_value)?,
        }
    }

    Ok(block)
}

/// Reads `[+-]?digits[.digits]` starting at `*pos`, advancing past it.
fn read_float(bytes: &[u8], pos: &mut usize) -> Option<f64> {
    let start = *pos;
    let mut end = *pos;
    if matches!(bytes.get(end), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let mut digits = 0;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return None;
    }
    let text = std::str::from_utf8(&bytes[start..end]).ok()?;
    let value = text.parse::<f64>().ok()?;
    *pos = end;
    Some(value)
}

fn parse_g(
    block: &mut ParserBlock,
    axis_command: &mut AxisCommand,
    int_value: i32,
    mut mantissa: i32,
) -> Result<(), Status> {
    let group;
    match int_value {
        4 => {
            group = CommandWords::G0;
            block.non_modal = NonModal::Dwell;
        }
        53 => {
            group = CommandWords::G0;
            block.non_modal = NonModal::AbsoluteOverride;
        }
        10 | 28 | 30 | 92 => {
            // Plain G10/G28/G30/G92 command axis motion; the .1 variants
            // only store or reset state and stay compatible with a motion
            // mode on the same line.
            if mantissa == 0 {
                if *axis_command != AxisCommand::None {
                    return Err(Status::AxisCommandConflict);
                }
                *axis_command = AxisCommand::NonModal;
            }
            group = CommandWords::G0;
            block.non_modal = match int_value {
                10 => NonModal::SetCoordinateData,
                28 => NonModal::GoHome0,
                30 => NonModal::GoHome1,
                92 => NonModal::SetCoordinateOffset,
                _ => unreachable!(),
            };
            if int_value != 10 {
                match mantissa {
                    0 => {}
                    10 => {
                        block.non_modal = match int_value {
                            28 => NonModal::SetHome0,
                            30 => NonModal::SetHome1,
                            92 => NonModal::ResetCoordinateOffset,
                            _ => unreachable!(),
                        };
                        mantissa = 0;
                    }
                    _ => return Err(Status::UnsupportedCommand),
                }
            }
        }
        0 | 1 | 2 | 3 | 38 => {
            if *axis_command != AxisCommand::None {
                return Err(Status::AxisCommandConflict);
            }
            *axis_command = AxisCommand::MotionMode;
            group = CommandWords::G1;
            block.modal.motion = match int_value {
                0 => Motion::Seek,
                1 => Motion::Linear,
                2 => Motion::CwArc,
                3 => Motion::CcwArc,
                38 => {
                    let probe = match mantissa {
                        20 => Motion::ProbeToward,
                        30 => Motion::ProbeTowardNoError,
                        40 => Motion::ProbeAway,
                        50 => Motion::ProbeAwayNoError,
                        _ => return Err(Status::UnsupportedCommand),
                    };
                    mantissa = 0;
                    probe
                }
                _ => unreachable!(),
            };
        }
        80 => {
            group = CommandWords::G1;
            block.modal.motion = Motion::None;
        }
        17 | 18 | 19 => {
            group = CommandWords::G2;
            block.modal.plane = match int_value {
                17 => crate::modal::Plane::Xy,
                18 => crate::modal::Plane::Xz,
                _ => crate::modal::Plane::Yz,
            };
        }
        90 | 91 => {
            if mantissa == 0 {
                group = CommandWords::G3;
                block.modal.distance = if int_value == 90 {
                    DistanceMode::Absolute
                } else {
                    DistanceMode::Incremental
                };
            } else {
                group = CommandWords::G4;
                if mantissa != 10 || int_value == 90 {
                    // G90.1 (absolute arc offsets) is not supported;
                    // G91.1 restates the default and changes nothing.
                    return Err(Status::UnsupportedCommand);
                }
                mantissa = 0;
            }
        }
        93 | 94 => {
            group = CommandWords::G5;
            block.modal.feed_rate = if int_value == 93 {
                FeedRateMode::InverseTime
            } else {
                FeedRateMode::UnitsPerMin
            };
        }
        20 | 21 => {
            group = CommandWords::G6;
            block.modal.units = if int_value == 20 {
                UnitsMode::Inches
            } else {
                UnitsMode::Mm
            };
        }
        40 => {
            // Cutter radius compensation is permanently off; G40 is
            // accepted because program headers emit it to set defaults.
            group = CommandWords::G7;
        }
        43 | 49 => {
            // A tool length change is an explicit axis command whether or
            // not axis words accompany it.
            if *axis_command != AxisCommand::None {
                return Err(Status::AxisCommandConflict);
            }
            *axis_command = AxisCommand::ToolLengthOffset;
            group = CommandWords::G8;
            if int_value == 49 {
                block.modal.tool_length = ToolLengthMode::Cancel;
            } else if mantissa == 10 {
                block.modal.tool_length = ToolLengthMode::EnableDynamic;
            } else {
                return Err(Status::UnsupportedCommand);
            }
            mantissa = 0;
        }
        54..=59 => {
            group = CommandWords::G12;
            block.modal.coord_system =
                CoordSystem::from_gcode_number(int_value).expect("G54-G59 range checked");
        }
        61 => {
            group = CommandWords::G13;
            if mantissa != 0 {
                return Err(Status::UnsupportedCommand);
            }
        }
        _ => return Err(Status::UnsupportedCommand),
    }

    if mantissa != 0 {
        return Err(Status::CommandValueNotInteger);
    }
    if block.command_words.contains(group) {
        return Err(Status::ModalGroupViolation);
    }
    block.command_words.insert(group);
    Ok(())
}

fn parse_m(block: &mut ParserBlock, int_value: i32, mantissa: i32) -> Result<(), Status> {
    if mantissa != 0 {
        return Err(Status::CommandValueNotInteger);
    }
    let group;
    match int_value {
        0 | 1 | 2 | 30 => {
            // M1 (optional stop) is ignored outright.
            if int_value == 1 {
                return Ok(());
            }
            group = CommandWords::M4;
            block.modal.program_flow = match int_value {
                0 => ProgramFlow::Paused,
                2 => ProgramFlow::End,
                _ => ProgramFlow::EndReset,
            };
        }
        3 | 4 | 5 => {
            group = CommandWords::M7;
            block.modal.spindle = match int_value {
                3 => SpindleMode::EnableCw,
                4 => SpindleMode::EnableCcw,
                _ => SpindleMode::Disable,
            };
        }
        7 | 8 | 9 => {
            group = CommandWords::M8;
            match int_value {
                7 => block.modal.coolant |= CoolantMode::MIST,
                8 => block.modal.coolant |= CoolantMode::FLOOD,
                // M9 disables both mist and flood.
                _ => block.modal.coolant = CoolantMode::empty(),
            }
        }
        56 => {
            group = CommandWords::M9;
            block.modal.override_ctrl = OverrideMode::ParkingMotion;
        }
        _ => return Err(Status::UnsupportedCommand),
    }

    if block.command_words.contains(group) {
        return Err(Status::ModalGroupViolation);
    }
    block.command_words.insert(group);
    Ok(())
}

fn parse_value_word(
    block: &mut ParserBlock,
    letter: u8,
    value: f64,
    int_value: i32,
) -> Result<(), Status> {
    let word = match letter {
        b'F' => {
            block.values.f = value;
            ValueWords::F
        }
        b'I' => {
            block.values.ijk[X_AXIS] = value;
            ValueWords::I
        }
        b'J' => {
            block.values.ijk[Y_AXIS] = value;
            ValueWords::J
        }
        b'K' => {
            block.values.ijk[Z_AXIS] = value;
            ValueWords::K
        }
        b'L' => {
            block.values.l = int_value as u8;
            ValueWords::L
        }
        b'N' => {
            if value > MAX_LINE_NUMBER {
                return Err(Status::MaxValueExceeded);
            }
            block.values.n = value.trunc() as i32;
            ValueWords::N
        }
        b'P' => {
            block.values.p = value;
            ValueWords::P
        }
        b'R' => {
            block.values.r = value;
            ValueWords::R
        }
        b'S' => {
            block.values.s = value;
            ValueWords::S
        }
        b'T' => {
            if value > MAX_TOOL_NUMBER {
                return Err(Status::MaxValueExceeded);
            }
            block.values.t = int_value as u8;
            ValueWords::T
        }
        b'X' => {
            block.values.xyz[X_AXIS] = value;
            ValueWords::X
        }
        b'Y' => {
            block.values.xyz[Y_AXIS] = value;
            ValueWords::Y
        }
        b'Z' => {
            block.values.xyz[Z_AXIS] = value;
            ValueWords::Z
        }
        _ => return Err(Status::UnsupportedCommand),
    };

    if block.value_words.contains(word) {
        return Err(Status::WordRepeated);
    }
    const NON_NEGATIVE: ValueWords = ValueWords::F
        .union(ValueWords::N)
        .union(ValueWords::P)
        .union(ValueWords::T)
        .union(ValueWords::S);
    if NON_NEGATIVE.contains(word) && value < 0.0 {
        return Err(Status::NegativeValue);
    }
    block.value_words.insert(word);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::Plane;

    #[test]
    fn parses_linear_move_with_words() {
        let block = parse_line("G1X10Y-2.5F600").unwrap();
        assert!(block.command_words.contains(CommandWords::G1));
        assert_eq!(block.modal.motion, Motion::Linear);
        assert_eq!(block.values.xyz[X_AXIS], 10.0);
        assert_eq!(block.values.xyz[Y_AXIS], -2.5);
        assert_eq!(block.values.f, 600.0);
        assert!(block
            .value_words
            .contains(ValueWords::X | ValueWords::Y | ValueWords::F));
        assert!(!block.value_words.contains(ValueWords::Z));
    }

    #[test]
    fn two_motion_modes_violate_modal_group() {
        assert_eq!(parse_line("G0G1X5"), Err(Status::ModalGroupViolation));
    }

    #[test]
    fn repeated_word_is_rejected() {
        assert_eq!(parse_line("G0X1X2"), Err(Status::WordRepeated));
    }

    #[test]
    fn motion_mode_conflicts_with_non_modal_axis_command() {
        assert_eq!(parse_line("G28G1X5"), Err(Status::AxisCommandConflict));
        assert_eq!(parse_line("G1G92X5"), Err(Status::AxisCommandConflict));
        assert_eq!(parse_line("G1G43.1Z2"), Err(Status::AxisCommandConflict));
    }

    #[test]
    fn dotted_variants_do_not_command_axes() {
        // G28.1 stores a position instead of moving to one, so it is
        // allowed alongside a motion mode.
        let block = parse_line("G28.1").unwrap();
        assert_eq!(block.non_modal, NonModal::SetHome0);
        let block = parse_line("G30.1").unwrap();
        assert_eq!(block.non_modal, NonModal::SetHome1);
        let block = parse_line("G92.1").unwrap();
        assert_eq!(block.non_modal, NonModal::ResetCoordinateOffset);
    }

    #[test]
    fn probe_commands_need_known_mantissa() {
        assert_eq!(parse_line("G38.2").unwrap().modal.motion, Motion::ProbeToward);
        assert_eq!(
            parse_line("G38.5").unwrap().modal.motion,
            Motion::ProbeAwayNoError
        );
        assert_eq!(parse_line("G38.6"), Err(Status::UnsupportedCommand));
        assert_eq!(parse_line("G38"), Err(Status::UnsupportedCommand));
    }

    #[test]
    fn tool_length_variants() {
        assert_eq!(
            parse_line("G43.1Z-2").unwrap().modal.tool_length,
            ToolLengthMode::EnableDynamic
        );
        assert_eq!(
            parse_line("G49").unwrap().modal.tool_length,
            ToolLengthMode::Cancel
        );
        // Plain G43 needs an H word and tool table, neither of which exist here.
        assert_eq!(parse_line("G43"), Err(Status::UnsupportedCommand));
    }

    #[test]
    fn arc_ijk_mode_commands() {
        assert!(parse_line("G91.1")
            .unwrap()
            .command_words
            .contains(CommandWords::G4));
        assert_eq!(parse_line("G90.1"), Err(Status::UnsupportedCommand));
    }

    #[test]
    fn fractional_command_value_is_rejected() {
        assert_eq!(parse_line("G17.5"), Err(Status::CommandValueNotInteger));
        assert_eq!(parse_line("M3.5"), Err(Status::CommandValueNotInteger));
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert_eq!(parse_line("G33"), Err(Status::UnsupportedCommand));
        assert_eq!(parse_line("M6"), Err(Status::UnsupportedCommand));
        assert_eq!(parse_line("G61.1"), Err(Status::UnsupportedCommand));
    }

    #[test]
    fn negative_values_rejected_where_forbidden() {
        assert_eq!(parse_line("F-100"), Err(Status::NegativeValue));
        assert_eq!(parse_line("S-1"), Err(Status::NegativeValue));
        assert_eq!(parse_line("P-0.5"), Err(Status::NegativeValue));
        // Axis and arc offsets may be negative.
        assert!(parse_line("X-1Y-2Z-3I-4J-5K-6R-7").is_ok());
    }

    #[test]
    fn value_caps() {
        assert_eq!(parse_line("T256"), Err(Status::MaxValueExceeded));
        assert!(parse_line("T255").is_ok());
        assert_eq!(parse_line("N10000001"), Err(Status::MaxValueExceeded));
    }

    #[test]
    fn lexical_errors() {
        assert_eq!(parse_line("5X"), Err(Status::ExpectedCommandLetter));
        assert_eq!(parse_line("X"), Err(Status::BadNumberFormat));
        assert_eq!(parse_line("G1X."), Err(Status::BadNumberFormat));
    }

    #[test]
    fn modal_fields_land_in_block() {
        let block = parse_line("G18G91G93G20G55G61").unwrap();
        assert_eq!(block.modal.plane, Plane::Xz);
        assert_eq!(block.modal.distance, DistanceMode::Incremental);
        assert_eq!(block.modal.feed_rate, FeedRateMode::InverseTime);
        assert_eq!(block.modal.units, UnitsMode::Inches);
        assert_eq!(block.modal.coord_system, CoordSystem::P2);
        assert!(block.command_words.contains(CommandWords::G13));
    }

    #[test]
    fn spindle_and_coolant_commands() {
        assert_eq!(parse_line("M3S1000").unwrap().modal.spindle, SpindleMode::EnableCw);
        assert_eq!(parse_line("M4").unwrap().modal.spindle, SpindleMode::EnableCcw);
        assert_eq!(parse_line("M5").unwrap().modal.spindle, SpindleMode::Disable);
        assert_eq!(parse_line("M7").unwrap().modal.coolant, CoolantMode::MIST);
        assert_eq!(parse_line("M8").unwrap().modal.coolant, CoolantMode::FLOOD);
        assert!(parse_line("M9").unwrap().modal.coolant.is_empty());
        assert_eq!(parse_line("M3M5"), Err(Status::ModalGroupViolation));
    }

    #[test]
    fn program_flow_commands() {
        assert_eq!(parse_line("M0").unwrap().modal.program_flow, ProgramFlow::Paused);
        assert_eq!(parse_line("M2").unwrap().modal.program_flow, ProgramFlow::End);
        assert_eq!(parse_line("M30").unwrap().modal.program_flow, ProgramFlow::EndReset);
        // M1 is ignored entirely.
        let block = parse_line("M1").unwrap();
        assert!(block.command_words.is_empty());
    }

    #[test]
    fn override_command() {
        let block = parse_line("M56").unwrap();
        assert!(block.command_words.contains(CommandWords::M9));
        assert_eq!(block.modal.override_ctrl, OverrideMode::ParkingMotion);
    }

    #[test]
    fn jog_line_enforces_linear_per_minute() {
        let block = parse_line("$J=X10F600").unwrap();
        assert_eq!(block.modal.motion, Motion::Linear);
        assert_eq!(block.modal.feed_rate, FeedRateMode::UnitsPerMin);
        assert_eq!(block.values.xyz[X_AXIS], 10.0);
        // A bare `$` system command is not a g-code block.
        assert_eq!(parse_line("$X"), Err(Status::ExpectedCommandLetter));
    }

    #[test]
    fn read_float_accepts_usual_shapes() {
        let mut pos = 0;
        assert_eq!(read_float(b"1.5X", &mut pos), Some(1.5));
        assert_eq!(pos, 3);
        pos = 0;
        assert_eq!(read_float(b"-0.25", &mut pos), Some(-0.25));
        pos = 0;
        assert_eq!(read_float(b".5", &mut pos), Some(0.5));
        pos = 0;
        assert_eq!(read_float(b"-.", &mut pos), None);
        pos = 0;
        assert_eq!(read_float(b"+", &mut pos), None);
    }
}
