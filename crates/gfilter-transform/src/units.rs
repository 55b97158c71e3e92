//! Unit staging: canonicalize to millimeters, then restore on the way out.

use gfilter_core::{CommandWords, ParserBlock, UnitsMode};

use crate::{BlockBuffer, Transform};

const MM_PER_INCH: f64 = 25.4;

fn scale_block(block: &mut ParserBlock, factor: f64) {
    for i in 0..3 {
        block.values.xyz[i] *= factor;
        block.values.ijk[i] *= factor;
    }
    block.values.f *= factor;
    block.values.r *= factor;
}

/// Rewrites the stream to millimeters. Assumes the machine powers on in
/// G21; unit commands that restate the current mode are stripped, real
/// transitions are remembered and the block's units field is rewritten to
/// mm so downstream stages only ever see metric values.
#[derive(Debug, Default)]
pub struct ToMm {
    units: UnitsMode,
}

impl Transform for ToMm {
    fn name(&self) -> &'static str {
        "to-mm"
    }

    fn apply(&mut self, blocks: &mut BlockBuffer) {
        for block in blocks.iter_mut() {
            self.rewrite(block);
        }
    }
}

impl ToMm {
    fn rewrite(&mut self, block: &mut ParserBlock) {
        if block.command_words.contains(CommandWords::G6) {
            if self.units == block.modal.units {
                block.command_words.remove(CommandWords::G6);
            } else {
                self.units = block.modal.units;
                block.modal.units = UnitsMode::Mm;
            }
        }
        if self.units == UnitsMode::Inches {
            scale_block(block, MM_PER_INCH);
        }
    }
}

/// Restores the stream's unit modality after processing.
///
/// The canonical stream only carries a units command on a real transition,
/// so every surviving G20/G21 means "toggle". The first block decides the
/// initial state: if it carries no units command the stream started in mm
/// and a G21 is emitted to say so; if it does carry one, the shadow starts
/// at mm so that command itself performs the first transition to inches.
#[derive(Debug, Default)]
pub struct FromMm {
    units: Option<UnitsMode>,
}

impl Transform for FromMm {
    fn name(&self) -> &'static str {
        "from-mm"
    }

    fn apply(&mut self, blocks: &mut BlockBuffer) {
        for block in blocks.iter_mut() {
            self.rewrite(block);
        }
    }
}

impl FromMm {
    fn rewrite(&mut self, block: &mut ParserBlock) {
        match self.units {
            None => {
                let units = if block.command_words.contains(CommandWords::G6) {
                    UnitsMode::Inches
                } else {
                    block.command_words.insert(CommandWords::G6);
                    UnitsMode::Mm
                };
                self.units = Some(units);
                block.modal.units = units;
            }
            Some(units) if block.command_words.contains(CommandWords::G6) => {
                let toggled = units.toggled();
                self.units = Some(toggled);
                block.modal.units = toggled;
            }
            Some(_) => {}
        }

        if self.units == Some(UnitsMode::Inches) {
            scale_block(block, 1.0 / MM_PER_INCH);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfilter_core::parse_line;

    fn run(stage: &mut impl Transform, line: &str) -> ParserBlock {
        let mut buf = BlockBuffer::new(parse_line(line).unwrap());
        stage.apply(&mut buf);
        buf[0]
    }

    #[test]
    fn inch_values_scale_to_mm() {
        let mut to_mm = ToMm::default();
        let block = run(&mut to_mm, "G20");
        assert_eq!(block.modal.units, UnitsMode::Mm);
        assert!(block.command_words.contains(CommandWords::G6));

        let block = run(&mut to_mm, "G0X1");
        assert!((block.values.xyz[0] - 25.4).abs() < 1e-12);

        // Back to native mm: values pass through unscaled.
        let block = run(&mut to_mm, "G21");
        assert!(block.command_words.contains(CommandWords::G6));
        let block = run(&mut to_mm, "G0X1");
        assert_eq!(block.values.xyz[0], 1.0);
    }

    #[test]
    fn redundant_g21_is_stripped() {
        let mut to_mm = ToMm::default();
        let block = run(&mut to_mm, "G21X1");
        assert!(!block.command_words.contains(CommandWords::G6));
        assert_eq!(block.values.xyz[0], 1.0);
    }

    #[test]
    fn feed_and_arc_words_scale_too() {
        let mut to_mm = ToMm::default();
        run(&mut to_mm, "G20");
        let block = run(&mut to_mm, "G2X1Y0I0.5F10R2");
        assert!((block.values.f - 254.0).abs() < 1e-12);
        assert!((block.values.ijk[0] - 12.7).abs() < 1e-12);
        assert!((block.values.r - 50.8).abs() < 1e-12);
    }

    #[test]
    fn from_mm_emits_g21_when_stream_starts_metric() {
        let mut from_mm = FromMm::default();
        let block = run(&mut from_mm, "G0X5");
        assert!(block.command_words.contains(CommandWords::G6));
        assert_eq!(block.modal.units, UnitsMode::Mm);
        assert_eq!(block.values.xyz[0], 5.0);
    }

    #[test]
    fn from_mm_first_command_transitions_to_inches() {
        let mut from_mm = FromMm::default();
        // A surviving units command on the first block means the input
        // opened with G20; the values arrive in mm and go back to inches.
        let block = run(&mut from_mm, "G21X25.4");
        assert_eq!(block.modal.units, UnitsMode::Inches);
        assert!((block.values.xyz[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn later_units_commands_toggle() {
        let mut from_mm = FromMm::default();
        run(&mut from_mm, "G0X5");
        let block = run(&mut from_mm, "G21X25.4");
        assert_eq!(block.modal.units, UnitsMode::Inches);
        assert!((block.values.xyz[0] - 1.0).abs() < 1e-12);
        let block = run(&mut from_mm, "G21X3");
        assert_eq!(block.modal.units, UnitsMode::Mm);
        assert_eq!(block.values.xyz[0], 3.0);
    }
}
