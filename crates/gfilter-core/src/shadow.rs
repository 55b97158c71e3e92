//! Modal shadow: a transformer's private running copy of the stream state.
//!
//! Folding a block into the shadow does two jobs at once: it advances the
//! shadow to the state after the block, and it strips words and commands
//! from the block that restate what the shadow already holds. Fields are
//! `Option` so a shadow can also start out knowing nothing, in which case
//! the first command in every group survives unconditionally.

use crate::block::{CommandWords, ParserBlock, ValueWords};
use crate::modal::{
    CoolantMode, CoordSystem, DistanceMode, FeedRateMode, ModalState, Motion, ProgramFlow,
    SpindleMode, ToolLengthMode, UnitsMode,
};

/// Running modal state plus last-seen word values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalShadow {
    pub motion: Option<Motion>,
    pub plane: Option<crate::modal::Plane>,
    pub distance: Option<DistanceMode>,
    pub feed_rate: Option<FeedRateMode>,
    pub units: Option<UnitsMode>,
    pub tool_length: Option<ToolLengthMode>,
    pub coord_system: Option<CoordSystem>,
    pub program_flow: Option<ProgramFlow>,
    pub spindle: Option<SpindleMode>,
    pub coolant: Option<CoolantMode>,
    /// Last-seen scalar and axis word values. XYZ is the running position
    /// in whatever distance mode the stream is in.
    pub values: crate::block::BlockValues,
}

impl ModalShadow {
    /// Shadow primed with the machine power-on modes and a zeroed position.
    pub fn initialized() -> Self {
        let modal = ModalState::default();
        Self {
            motion: Some(modal.motion),
            plane: Some(modal.plane),
            distance: Some(modal.distance),
            feed_rate: Some(modal.feed_rate),
            units: Some(modal.units),
            tool_length: Some(modal.tool_length),
            coord_system: Some(modal.coord_system),
            program_flow: Some(modal.program_flow),
            spindle: Some(modal.spindle),
            coolant: Some(modal.coolant),
            values: Default::default(),
        }
    }

    /// Shadow with every modal field unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Current motion mode, defaulting to rapid when not yet seen.
    pub fn motion(&self) -> Motion {
        self.motion.unwrap_or_default()
    }

    /// Current spindle state, defaulting to disabled when not yet seen.
    pub fn spindle(&self) -> SpindleMode {
        self.spindle.unwrap_or_default()
    }

    /// Folds `block` into the shadow and strips redundant words/commands.
    pub fn update(&mut self, block: &mut ParserBlock) {
        let words = &mut block.value_words;
        let values = &mut block.values;

        if words.contains(ValueWords::F) {
            if values.f == self.values.f {
                words.remove(ValueWords::F);
            } else {
                self.values.f = values.f;
            }
        }

        // Zero arc offsets and radii are implicit.
        if words.contains(ValueWords::I) && values.ijk[0] == 0.0 {
            words.remove(ValueWords::I);
        }
        if words.contains(ValueWords::J) && values.ijk[1] == 0.0 {
            words.remove(ValueWords::J);
        }
        if words.contains(ValueWords::K) && values.ijk[2] == 0.0 {
            words.remove(ValueWords::K);
        }
        if words.contains(ValueWords::R) && values.r == 0.0 {
            words.remove(ValueWords::R);
        }

        if words.contains(ValueWords::L) {
            if values.l == self.values.l {
                words.remove(ValueWords::L);
            } else {
                self.values.l = values.l;
            }
        }
        if words.contains(ValueWords::N) {
            if values.n == self.values.n {
                words.remove(ValueWords::N);
            } else {
                self.values.n = values.n;
            }
        }
        if words.contains(ValueWords::P) {
            if values.p == self.values.p {
                words.remove(ValueWords::P);
            } else {
                self.values.p = values.p;
            }
        }
        if words.contains(ValueWords::S) {
            if values.s == self.values.s {
                words.remove(ValueWords::S);
            } else {
                self.values.s = values.s;
            }
        }
        if words.contains(ValueWords::T) {
            if values.t == self.values.t {
                words.remove(ValueWords::T);
            } else {
                self.values.t = values.t;
            }
        }

        let commands = &mut block.command_words;
        let modal = &block.modal;

        if commands.contains(CommandWords::G1) {
            if self.motion == Some(modal.motion) {
                commands.remove(CommandWords::G1);
            } else {
                self.motion = Some(modal.motion);
            }
        }
        if commands.contains(CommandWords::G2) {
            if self.plane == Some(modal.plane) {
                commands.remove(CommandWords::G2);
            } else {
                self.plane = Some(modal.plane);
            }
        }
        if commands.contains(CommandWords::G3) {
            if self.distance == Some(modal.distance) {
                commands.remove(CommandWords::G3);
            } else {
                self.distance = Some(modal.distance);
            }
        }
        if commands.contains(CommandWords::G5) {
            if self.feed_rate == Some(modal.feed_rate) {
                commands.remove(CommandWords::G5);
            } else {
                self.feed_rate = Some(modal.feed_rate);
            }
        }
        if commands.contains(CommandWords::G6) {
            if self.units == Some(modal.units) {
                commands.remove(CommandWords::G6);
            } else {
                self.units = Some(modal.units);
            }
        }
        if commands.contains(CommandWords::G8) {
            if self.tool_length == Some(modal.tool_length) {
                commands.remove(CommandWords::G8);
            } else {
                self.tool_length = Some(modal.tool_length);
            }
        }
        if commands.contains(CommandWords::G12) {
            if self.coord_system == Some(modal.coord_system) {
                commands.remove(CommandWords::G12);
            } else {
                self.coord_system = Some(modal.coord_system);
            }
        }
        if commands.contains(CommandWords::M4) {
            if self.program_flow == Some(modal.program_flow) {
                commands.remove(CommandWords::M4);
            } else {
                self.program_flow = Some(modal.program_flow);
            }
        }
        if commands.contains(CommandWords::M7) {
            if self.spindle == Some(modal.spindle) {
                commands.remove(CommandWords::M7);
            } else {
                self.spindle = Some(modal.spindle);
            }
        }
        if commands.contains(CommandWords::M8) {
            if self.coolant == Some(modal.coolant) {
                commands.remove(CommandWords::M8);
            } else {
                self.coolant = Some(modal.coolant);
            }
        }

        // Axis words fold differently by distance mode: absolute targets
        // are redundant when unchanged, incremental deltas never are. A
        // delta only accumulates when the block actually carries the word;
        // synthesized blocks reuse value slots without setting the bits.
        let words = &mut block.value_words;
        if self.distance == Some(DistanceMode::Absolute) {
            for i in 0..3 {
                let word = ValueWords::axis(i);
                if words.contains(word) {
                    if block.values.xyz[i] == self.values.xyz[i] {
                        words.remove(word);
                    } else {
                        self.values.xyz[i] = block.values.xyz[i];
                    }
                }
            }
        } else {
            for i in 0..3 {
                let word = ValueWords::axis(i);
                if words.contains(word) {
                    if block.values.xyz[i] == 0.0 {
                        words.remove(word);
                    } else {
                        self.values.xyz[i] += block.values.xyz[i];
                    }
                }
            }
        }
    }
}
