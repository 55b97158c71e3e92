//! Laser lead-move insertion.
//!
//! A laser head cannot reach its commanded feed instantaneously. If the
//! beam switches on while the head is still accelerating, the start of the
//! cut gets more energy per millimeter than the rest. This stage watches
//! for junctions where the cut cannot continue at speed (the path bends
//! more than the continuity threshold, the feed changes, or the beam
//! state changes) and inserts zero-power lead moves so the head crosses
//! the junction at full speed with the beam off:
//!
//! - a lead-out extending the previous cut past the junction,
//! - a lead-in approaching the junction from behind along the new
//!   direction,
//! - and the traversal back to the junction itself.
//!
//! Lead length is the stopping distance `(F/60)^2 / 2a` for the feed on
//! that side of the junction.

use gfilter_core::{
    CommandWords, ModalShadow, Motion, ParserBlock, SpindleMode, ValueWords,
};

use crate::geom::{normalize_arc, tangents};
use crate::{BlockBuffer, Transform};

/// Laser stage parameters.
#[derive(Debug, Clone)]
pub struct LaserConfig {
    /// Head acceleration in mm/s^2.
    pub acceleration: f64,
    /// Largest deflection angle (degrees) still treated as a continuous
    /// curve; junctions bending less than this need no leads.
    pub max_angle_deg: f64,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            acceleration: 1000.0,
            max_angle_deg: 2.0,
        }
    }
}

/// The laser lead-move stage.
pub struct Laser {
    shadow: ModalShadow,
    /// Exit tangent of the previous move.
    v: [f64; 2],
    acceleration: f64,
    /// Continuity threshold compared against the junction dot product:
    /// `cos^2` of the maximum continuous-curve angle.
    continuity: f64,
}

impl Laser {
    pub fn new(config: LaserConfig) -> Self {
        let cos = config.max_angle_deg.to_radians().cos();
        Self {
            shadow: ModalShadow::initialized(),
            v: [0.0, 0.0],
            acceleration: config.acceleration,
            continuity: cos * cos,
        }
    }

    /// Stopping/starting distance for a feed in mm/min.
    fn lead_distance(&self, feed: f64) -> f64 {
        let v = feed / 60.0;
        v * v / (2.0 * self.acceleration)
    }
}

impl Transform for Laser {
    fn name(&self) -> &'static str {
        "laser"
    }

    fn apply(&mut self, buf: &mut BlockBuffer) {
        debug_assert_eq!(buf.len(), 1, "laser expects the freshly parsed block");

        let mut block = buf[0];
        let old = self.shadow;
        let old_v = self.v;
        self.shadow.update(&mut block);
        buf[0] = block;

        let motion = self.shadow.motion();
        let dx = self.shadow.values.xyz[0] - old.values.xyz[0];
        let dy = self.shadow.values.xyz[1] - old.values.xyz[1];

        normalize_arc(&mut buf[0], motion, dx, dy);
        let (v0, v_end) = tangents(&buf[0], motion, dx, dy, old_v);
        self.v = v_end;

        let bend = v0[0] * old_v[0] + v0[1] * old_v[1];
        let feed_changed = self.shadow.values.f != old.values.f;
        let power_toggled = (self.shadow.values.s == 0.0) != (old.values.s == 0.0);
        let spindle_changed = self.shadow.spindle != old.spindle;

        let mut ext_prev = false;
        let mut ext_next = false;
        if bend < self.continuity || feed_changed || power_toggled || spindle_changed {
            // Each side only needs an extension if it is actually cutting.
            ext_prev = old.values.s != 0.0
                && old.spindle() != SpindleMode::Disable
                && old.motion() != Motion::Seek;
            ext_next = self.shadow.values.s != 0.0
                && self.shadow.spindle() != SpindleMode::Disable
                && motion != Motion::Seek;
        }

        if !ext_prev && !ext_next {
            return;
        }

        let original = buf[0];

        // The real move, with its power and motion restated since the
        // lead moves below changed both.
        let mut cut = original;
        cut.value_words.insert(ValueWords::S);
        cut.values.s = self.shadow.values.s;
        cut.command_words.insert(CommandWords::G1);
        cut.modal.motion = motion;

        let junction = [old.values.xyz[0], old.values.xyz[1]];
        let new_feed = self.shadow.values.f;

        buf.clear();
        if ext_prev {
            let d = self.lead_distance(old.values.f);
            let lead_out = [junction[0] + d * old_v[0], junction[1] + d * old_v[1]];
            buf.push(zero_power_move(&original, lead_out, original.values.f));
            tracing::debug!(
                distance = d,
                x = lead_out[0],
                y = lead_out[1],
                "lead-out past junction"
            );
        }
        if ext_next {
            let d = self.lead_distance(new_feed);
            let lead_in = [junction[0] - d * v0[0], junction[1] - d * v0[1]];
            buf.push(zero_power_move(&original, lead_in, new_feed));
            tracing::debug!(
                distance = d,
                x = lead_in[0],
                y = lead_in[1],
                "lead-in behind junction"
            );
        }
        // Shared traversal back to the junction, still at zero power.
        buf.push(zero_power_move(&original, junction, new_feed));
        buf.push(cut);
    }
}

/// A linear zero-power move to `target`, derived from the current block so
/// untouched value slots stay consistent for downstream folds.
fn zero_power_move(template: &ParserBlock, target: [f64; 2], feed: f64) -> ParserBlock {
    let mut lead = *template;
    lead.value_words = (lead.value_words & ValueWords::F)
        | ValueWords::X
        | ValueWords::Y
        | ValueWords::S;
    lead.values.s = 0.0;
    lead.values.f = feed;
    lead.values.xyz[0] = target[0];
    lead.values.xyz[1] = target[1];
    lead.command_words = CommandWords::G1;
    lead.modal.motion = Motion::Linear;
    lead
}
