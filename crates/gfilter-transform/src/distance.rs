//! Distance-mode staging: canonicalize to absolute coordinates, then
//! restore on the way out. Mirrors the unit staging pair, with a running
//! XYZ position instead of a scale factor.

use gfilter_core::{CommandWords, DistanceMode, ParserBlock, ValueWords};

use crate::{BlockBuffer, Transform};

/// Rewrites the stream to absolute targets. Assumes the machine powers on
/// in G90 with all axes at zero.
#[derive(Debug, Default)]
pub struct ToAbs {
    distance: DistanceMode,
    xyz: [f64; 3],
}

impl Transform for ToAbs {
    fn name(&self) -> &'static str {
        "to-abs"
    }

    fn apply(&mut self, blocks: &mut BlockBuffer) {
        for block in blocks.iter_mut() {
            self.rewrite(block);
        }
    }
}

impl ToAbs {
    fn rewrite(&mut self, block: &mut ParserBlock) {
        if block.command_words.contains(CommandWords::G3) {
            if self.distance == block.modal.distance {
                block.command_words.remove(CommandWords::G3);
            } else {
                self.distance = block.modal.distance;
                block.modal.distance = DistanceMode::Absolute;
            }
        }

        for i in 0..3 {
            if block.value_words.contains(ValueWords::axis(i)) {
                if self.distance == DistanceMode::Absolute {
                    self.xyz[i] = block.values.xyz[i];
                } else {
                    self.xyz[i] += block.values.xyz[i];
                    block.values.xyz[i] = self.xyz[i];
                }
            }
        }
    }
}

/// Restores the stream's distance modality after processing. Same toggle
/// FSM as [`crate::FromMm`]: the first block decides the initial state,
/// every later surviving G90/G91 flips it.
#[derive(Debug, Default)]
pub struct FromAbs {
    distance: Option<DistanceMode>,
    xyz: [f64; 3],
}

impl Transform for FromAbs {
    fn name(&self) -> &'static str {
        "from-abs"
    }

    fn apply(&mut self, blocks: &mut BlockBuffer) {
        for block in blocks.iter_mut() {
            self.rewrite(block);
        }
    }
}

impl FromAbs {
    fn rewrite(&mut self, block: &mut ParserBlock) {
        match self.distance {
            None => {
                let distance = if block.command_words.contains(CommandWords::G3) {
                    DistanceMode::Incremental
                } else {
                    block.command_words.insert(CommandWords::G3);
                    DistanceMode::Absolute
                };
                self.distance = Some(distance);
                block.modal.distance = distance;
            }
            Some(distance) if block.command_words.contains(CommandWords::G3) => {
                let toggled = distance.toggled();
                self.distance = Some(toggled);
                block.modal.distance = toggled;
            }
            Some(_) => {}
        }

        for i in 0..3 {
            if block.value_words.contains(ValueWords::axis(i)) {
                if self.distance == Some(DistanceMode::Absolute) {
                    self.xyz[i] = block.values.xyz[i];
                } else {
                    block.values.xyz[i] -= self.xyz[i];
                    self.xyz[i] += block.values.xyz[i];
                }
            }
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
    fn incremental_moves_fold_to_absolute() {
        let mut to_abs = ToAbs::default();
        let block = run(&mut to_abs, "G91");
        assert_eq!(block.modal.distance, DistanceMode::Absolute);
        assert!(block.command_words.contains(CommandWords::G3));

        let block = run(&mut to_abs, "G0X10");
        assert_eq!(block.values.xyz[0], 10.0);
        let block = run(&mut to_abs, "G0X5");
        assert_eq!(block.values.xyz[0], 15.0);

        let block = run(&mut to_abs, "G90");
        assert!(block.command_words.contains(CommandWords::G3));
        let block = run(&mut to_abs, "G0X0");
        assert_eq!(block.values.xyz[0], 0.0);
    }

    #[test]
    fn redundant_g90_is_stripped() {
        let mut to_abs = ToAbs::default();
        let block = run(&mut to_abs, "G90X2");
        assert!(!block.command_words.contains(CommandWords::G3));
        assert_eq!(block.values.xyz[0], 2.0);
    }

    #[test]
    fn partial_axis_words_leave_other_axes_alone() {
        let mut to_abs = ToAbs::default();
        run(&mut to_abs, "G91");
        run(&mut to_abs, "G0X10Y10");
        let block = run(&mut to_abs, "G0Y-4");
        assert!(!block.value_words.contains(ValueWords::X));
        assert_eq!(block.values.xyz[1], 6.0);
    }

    #[test]
    fn from_abs_emits_g90_when_stream_starts_absolute() {
        let mut from_abs = FromAbs::default();
        let block = run(&mut from_abs, "G0X5");
        assert!(block.command_words.contains(CommandWords::G3));
        assert_eq!(block.modal.distance, DistanceMode::Absolute);
        assert_eq!(block.values.xyz[0], 5.0);
    }

    #[test]
    fn from_abs_restores_incremental_deltas() {
        let mut from_abs = FromAbs::default();
        // A surviving distance command on the first block means the input
        // opened with G91; absolute targets turn back into deltas.
        let block = run(&mut from_abs, "G90X10");
        assert_eq!(block.modal.distance, DistanceMode::Incremental);
        assert_eq!(block.values.xyz[0], 10.0);

        let block = run(&mut from_abs, "G0X15");
        assert_eq!(block.values.xyz[0], 5.0);

        // Toggle back to absolute: targets pass through again.
        let block = run(&mut from_abs, "G90X0");
        assert_eq!(block.modal.distance, DistanceMode::Absolute);
        assert_eq!(block.values.xyz[0], 0.0);
    }

    #[test]
    fn round_trip_preserves_targets() {
        let mut to_abs = ToAbs::default();
        let mut from_abs = FromAbs::default();
        let lines = ["G91", "G0X10", "G0X5", "G90", "G0X0"];
        let mut restored_pos = 0.0;
        let mut incremental = false;
        let mut targets = Vec::new();
        for line in lines {
            let mut buf = BlockBuffer::new(parse_line(line).unwrap());
            to_abs.apply(&mut buf);
            from_abs.apply(&mut buf);
            let block = buf[0];
            if block.command_words.contains(CommandWords::G3) {
                incremental = block.modal.distance == DistanceMode::Incremental;
            }
            if block.value_words.contains(ValueWords::X) {
                if incremental {
                    restored_pos += block.values.xyz[0];
                } else {
                    restored_pos = block.values.xyz[0];
                }
                targets.push(restored_pos);
            }
        }
        assert_eq!(targets, vec![10.0, 15.0, 0.0]);
    }
}
