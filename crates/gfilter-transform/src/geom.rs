//! Arc normalization and tangent extraction.
//!
//! Both device stages need every arc in a single form: IJK center offsets
//! plus a positive radius, regardless of whether the program wrote R-form
//! or IJK-form. They also need unit tangent vectors at both ends of every
//! move to detect direction discontinuities at junctions.
//!
//! Geometry that violates the producer's contract (a chord longer than the
//! arc diameter, IJK and endpoint disagreeing on the radius) aborts: such
//! input is a bug in whatever generated the program, not a recoverable
//! stream condition.

use gfilter_core::{Motion, ParserBlock, ValueWords};

/// Absolute tolerance for the IJK target-radius consistency check (mm).
const ARC_RADIUS_TOLERANCE_MM: f64 = 0.5;

/// Relative tolerance for the IJK target-radius consistency check.
const ARC_RADIUS_TOLERANCE: f64 = 0.001;

/// Normalizes the arc parameters of `block` for a move spanning
/// `(dx, dy)`.
///
/// R-form arcs get their center offsets computed into the IJK slots (the
/// word bits stay untouched; the slots are scratch for [`tangents`]), and
/// a negative long-way radius is made positive. IJK-form arcs get the
/// radius computed into the R slot and checked against the endpoint.
/// Straight moves pass through unchanged.
pub fn normalize_arc(block: &mut ParserBlock, motion: Motion, dx: f64, dy: f64) {
    if !motion.is_arc() {
        return;
    }

    if block.value_words.contains(ValueWords::R) {
        let r = block.values.r;
        // h * 2 / d per the standard chord-height construction: the
        // center sits on the perpendicular bisector of the chord, offset
        // by h = sqrt(r^2 - (d/2)^2).
        let disc = 4.0 * r * r - dx * dx - dy * dy;
        assert!(
            disc >= 0.0,
            "arc chord ({:.3}) exceeds diameter ({:.3})",
            dx.hypot(dy),
            2.0 * r.abs()
        );
        let mut h_x2_div_d = -disc.sqrt() / dx.hypot(dy);
        if motion == Motion::CcwArc {
            h_x2_div_d = -h_x2_div_d;
        }
        if block.values.r < 0.0 {
            // Negative R selects the long way around; normalize it away.
            h_x2_div_d = -h_x2_div_d;
            block.values.r = -block.values.r;
        }
        block.values.ijk[0] = 0.5 * (dx - dy * h_x2_div_d);
        block.values.ijk[1] = 0.5 * (dy + dx * h_x2_div_d);
    } else if block
        .value_words
        .intersects(ValueWords::I | ValueWords::J)
    {
        let ex = dx - block.values.ijk[0];
        let ey = dy - block.values.ijk[1];
        let target_radius = ex.hypot(ey);
        block.values.r = block.values.ijk[0].hypot(block.values.ijk[1]);

        let delta = (target_radius - block.values.r).abs();
        assert!(
            delta < ARC_RADIUS_TOLERANCE_MM && delta < ARC_RADIUS_TOLERANCE * block.values.r,
            "arc endpoints disagree on radius by {delta:.4}mm"
        );
    }
}

/// Unit tangents at the start and end of a move spanning `(dx, dy)`.
///
/// Arcs must have been normalized first so the IJK and R slots are
/// populated. A zero-length straight move has no direction of its own and
/// keeps `prev` at both ends.
pub fn tangents(
    block: &ParserBlock,
    motion: Motion,
    dx: f64,
    dy: f64,
    prev: [f64; 2],
) -> ([f64; 2], [f64; 2]) {
    if motion.is_arc() && block.values.r != 0.0 {
        let r = block.values.r;
        let (i, j) = (block.values.ijk[0], block.values.ijk[1]);

        let mut v0 = [-j / r, i / r];
        if motion == Motion::CcwArc {
            v0 = [-v0[0], -v0[1]];
        }
        let v1 = [(dy - j) / r, (-dx + i) / r];
        (v0, v1)
    } else {
        let length = dx.hypot(dy);
        if length == 0.0 {
            (prev, prev)
        } else {
            let v = [dx / length, dy / length];
            (v, v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfilter_core::parse_line;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn r_form_quarter_arc_center() {
        // CW quarter circle from (0,0) to (5,5), radius 5: center at (5,0),
        // so I=5, J=0 relative to the start.
        let mut block = parse_line("G2X5Y5R5").unwrap();
        normalize_arc(&mut block, Motion::CwArc, 5.0, 5.0);
        assert!(close(block.values.ijk[0], 5.0), "I = {}", block.values.ijk[0]);
        assert!(close(block.values.ijk[1], 0.0), "J = {}", block.values.ijk[1]);
        assert!(close(block.values.r, 5.0));
    }

    #[test]
    fn r_form_ccw_mirrors_center() {
        // Same chord counter-clockwise: center on the other side, at (0,5).
        let mut block = parse_line("G3X5Y5R5").unwrap();
        normalize_arc(&mut block, Motion::CcwArc, 5.0, 5.0);
        assert!(close(block.values.ijk[0], 0.0));
        assert!(close(block.values.ijk[1], 5.0));
    }

    #[test]
    fn negative_r_selects_long_way_and_normalizes() {
        let mut block = parse_line("G2X5Y5R-5").unwrap();
        normalize_arc(&mut block, Motion::CwArc, 5.0, 5.0);
        // Long-way CW center mirrors the short-way one.
        assert!(close(block.values.ijk[0], 0.0));
        assert!(close(block.values.ijk[1], 5.0));
        assert!(close(block.values.r, 5.0), "radius made positive");
    }

    #[test]
    fn ijk_form_computes_radius() {
        let mut block = parse_line("G2X10Y0I5J0").unwrap();
        normalize_arc(&mut block, Motion::CwArc, 10.0, 0.0);
        assert!(close(block.values.r, 5.0));
    }

    #[test]
    fn r_to_ijk_to_r_is_stable() {
        // Normalize an R-form arc, then recompute R from the produced IJK
        // the way an IJK-form block would; both radii agree within 0.1%.
        let (dx, dy, r) = (7.0, 3.0, 6.5);
        let mut block = parse_line("G2X7Y3R6.5").unwrap();
        normalize_arc(&mut block, Motion::CwArc, dx, dy);

        let recomputed = block.values.ijk[0].hypot(block.values.ijk[1]);
        assert!(
            (recomputed - r).abs() < 0.001 * r,
            "recomputed {recomputed} vs {r}"
        );
        let target_radius = (dx - block.values.ijk[0]).hypot(dy - block.values.ijk[1]);
        assert!((target_radius - r).abs() < 0.001 * r);
    }

    #[test]
    #[should_panic(expected = "exceeds diameter")]
    fn impossible_chord_aborts() {
        let mut block = parse_line("G2X20Y0R5").unwrap();
        normalize_arc(&mut block, Motion::CwArc, 20.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "disagree on radius")]
    fn inconsistent_ijk_aborts() {
        let mut block = parse_line("G2X10Y0I2J0").unwrap();
        normalize_arc(&mut block, Motion::CwArc, 10.0, 0.0);
    }

    #[test]
    fn straight_moves_pass_through() {
        let mut block = parse_line("G1X10R5").unwrap();
        let before = block;
        normalize_arc(&mut block, Motion::Linear, 10.0, 0.0);
        assert_eq!(block, before);
    }

    #[test]
    fn straight_move_tangents() {
        let block = parse_line("G1X3Y4").unwrap();
        let (v0, v1) = tangents(&block, Motion::Linear, 3.0, 4.0, [1.0, 0.0]);
        assert!(close(v0[0], 0.6) && close(v0[1], 0.8));
        assert_eq!(v0, v1);
    }

    #[test]
    fn zero_length_move_keeps_previous_direction() {
        let block = parse_line("G1Z-1").unwrap();
        let prev = [0.0, 1.0];
        let (v0, v1) = tangents(&block, Motion::Linear, 0.0, 0.0, prev);
        assert_eq!(v0, prev);
        assert_eq!(v1, prev);
    }

    #[test]
    fn cw_quarter_arc_tangents() {
        // CW from (0,0) to (5,5) around (5,0): entering straight up,
        // leaving in +x.
        let mut block = parse_line("G2X5Y5R5").unwrap();
        normalize_arc(&mut block, Motion::CwArc, 5.0, 5.0);
        let (v0, v1) = tangents(&block, Motion::CwArc, 5.0, 5.0, [0.0, 0.0]);
        assert!(close(v0[0], 0.0) && close(v0[1], 1.0), "entry {v0:?}");
        assert!(close(v1[0], 1.0) && close(v1[1], 0.0), "exit {v1:?}");
    }
}
