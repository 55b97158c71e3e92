//! Drag-knife kinematics.
//!
//! A drag knife's blade tip trails the machine's commanded position by a
//! fixed offset in whatever direction the blade last cut. This stage
//! treats the incoming stream as the desired blade-tip path and rewrites
//! every target so the machine leads the tip by the offset: machine =
//! tip + d*v. Arc parameters shift with the same translation.
//!
//! At a corner sharper than the swivel threshold the blade cannot follow;
//! the stage inserts a pivot arc first: the machine sweeps a circle of
//! radius d around the stationary blade tip until the blade points down
//! the new leg. With the blade out of the material (Z >= 0) no swiveling
//! happens and the heading is carried through unchanged.

use gfilter_core::{CommandWords, ModalShadow, Motion, ValueWords, Z_AXIS};

use crate::geom::{normalize_arc, tangents};
use crate::{BlockBuffer, Transform};

/// Drag-knife stage parameters.
#[derive(Debug, Clone)]
pub struct DragConfig {
    /// Blade tip trailing offset in mm.
    pub offset: f64,
    /// Initial blade direction in degrees (0 = +x, 90 = +y).
    pub initial_angle_deg: f64,
    /// Smallest direction change (degrees) that forces a pivot arc.
    pub min_angle_deg: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            offset: 0.25,
            initial_angle_deg: 0.0,
            min_angle_deg: 2.0,
        }
    }
}

/// The drag-knife stage.
pub struct Drag {
    /// Shadow tracking the desired blade-tip state.
    shadow: ModalShadow,
    /// Unit vector from blade tip to machine position.
    v: [f64; 2],
    offset: f64,
    cos_min_angle: f64,
}

impl Drag {
    pub fn new(config: DragConfig) -> Self {
        let angle = config.initial_angle_deg.to_radians();
        let v = [angle.cos(), angle.sin()];
        let mut shadow = ModalShadow::initialized();
        // The machine starts at the origin, so the blade tip starts one
        // offset behind it.
        shadow.values.xyz[0] = -v[0] * config.offset;
        shadow.values.xyz[1] = -v[1] * config.offset;
        Self {
            shadow,
            v,
            offset: config.offset,
            cos_min_angle: config.min_angle_deg.to_radians().cos(),
        }
    }
}

impl Transform for Drag {
    fn name(&self) -> &'static str {
        "drag"
    }

    fn apply(&mut self, buf: &mut BlockBuffer) {
        debug_assert_eq!(buf.len(), 1, "drag expects the freshly parsed block");

        let mut block = buf[0];

        // A knife has no spindle; drop any spindle command outright.
        block.command_words.remove(CommandWords::M7);

        let old = self.shadow;
        let old_v = self.v;
        self.shadow.update(&mut block);

        let motion = self.shadow.motion();
        let dx = self.shadow.values.xyz[0] - old.values.xyz[0];
        let dy = self.shadow.values.xyz[1] - old.values.xyz[1];

        normalize_arc(&mut block, motion, dx, dy);
        let (v0, v_end) = tangents(&block, motion, dx, dy, old_v);
        self.v = v_end;

        // Out of the material at either end the blade cannot swivel; it
        // keeps pointing where it did.
        if self.shadow.values.xyz[Z_AXIS] >= 0.0 || old.values.xyz[Z_AXIS] >= 0.0 {
            self.v = old_v;
        }

        // The machine leads the blade tip by the offset.
        for i in 0..2 {
            block.values.xyz[i] = self.shadow.values.xyz[i] + self.v[i] * self.offset;
        }

        // Arc parameters move with the same translation: the radius grows
        // to hypot(r, d), the center shifts by the old offset vector.
        if block.value_words.contains(ValueWords::R) {
            let r = block.values.r;
            block.values.r = (r * r + self.offset * self.offset).sqrt();
        } else if block
            .value_words
            .intersects(ValueWords::I | ValueWords::J)
        {
            if !block.value_words.contains(ValueWords::I) {
                block.values.ijk[0] = 0.0;
            }
            if !block.value_words.contains(ValueWords::J) {
                block.values.ijk[1] = 0.0;
            }
            block.value_words.insert(ValueWords::I | ValueWords::J);
            for i in 0..2 {
                block.values.ijk[i] -= old_v[i] * self.offset;
            }
        }

        block.value_words.insert(ValueWords::X | ValueWords::Y);

        let bend = v0[0] * old_v[0] + v0[1] * old_v[1];
        let cutting = self.shadow.values.xyz[Z_AXIS] < 0.0 && old.values.xyz[Z_AXIS] < 0.0;

        if bend < self.cos_min_angle && cutting {
            // The blade has to swivel before the move: sweep the machine
            // around the stationary tip until the blade points down the
            // new leg. Cross product sign picks the short way around.
            let mut pivot = block;
            let cross = v0[0] * old_v[1] - v0[1] * old_v[0];
            pivot.modal.motion = if cross > 0.0 {
                Motion::CwArc
            } else {
                Motion::CcwArc
            };
            pivot.command_words = CommandWords::G1;
            pivot.values.xyz[0] = old.values.xyz[0] + v0[0] * self.offset;
            pivot.values.xyz[1] = old.values.xyz[1] + v0[1] * self.offset;
            pivot.values.r = self.offset;
            pivot.value_words = ValueWords::R | ValueWords::X | ValueWords::Y;

            block.modal.motion = motion;
            block.command_words.insert(CommandWords::G1);

            tracing::debug!(
                x = pivot.values.xyz[0],
                y = pivot.values.xyz[1],
                cw = cross > 0.0,
                "pivot arc at junction"
            );

            buf.clear();
            buf.push(pivot);
            buf.push(block);
        } else {
            buf[0] = block;
        }
    }
}
