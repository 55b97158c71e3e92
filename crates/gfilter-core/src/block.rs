//! Parser block: the structured form of one G-code line.

use bitflags::bitflags;

use crate::modal::ModalState;

/// Axis indices into the XYZ and IJK value arrays.
pub const X_AXIS: usize = 0;
pub const Y_AXIS: usize = 1;
pub const Z_AXIS: usize = 2;

bitflags! {
    /// Modal-group occupancy for one block. At most one command per group
    /// may appear on a line (RS-274/NGC Table 4); group names follow the
    /// NIST numbering with the letter of the commands they contain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandWords: u16 {
        /// Non-modal commands (G4, G10, G28, G28.1, G30, G30.1, G53, G92, G92.1)
        const G0 = 1 << 0;
        /// Motion (G0-G3, G38.x, G80)
        const G1 = 1 << 1;
        /// Plane selection (G17-G19)
        const G2 = 1 << 2;
        /// Distance mode (G90, G91)
        const G3 = 1 << 3;
        /// Arc IJK distance mode (G91.1)
        const G4 = 1 << 4;
        /// Feed rate mode (G93, G94)
        const G5 = 1 << 5;
        /// Units (G20, G21)
        const G6 = 1 << 6;
        /// Cutter radius compensation (G40 only)
        const G7 = 1 << 7;
        /// Tool length offset (G43.1, G49)
        const G8 = 1 << 8;
        /// Coordinate system selection (G54-G59)
        const G12 = 1 << 9;
        /// Path control mode (G61 only)
        const G13 = 1 << 10;
        /// Program flow (M0, M2, M30)
        const M4 = 1 << 11;
        /// Spindle (M3, M4, M5)
        const M7 = 1 << 12;
        /// Coolant (M7, M8, M9)
        const M8 = 1 << 13;
        /// Override switches (M56)
        const M9 = 1 << 14;
    }
}

bitflags! {
    /// Value-word occupancy for one block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ValueWords: u16 {
        const F = 1 << 0;
        const I = 1 << 1;
        const J = 1 << 2;
        const K = 1 << 3;
        const L = 1 << 4;
        const N = 1 << 5;
        const P = 1 << 6;
        const R = 1 << 7;
        const S = 1 << 8;
        const T = 1 << 9;
        const X = 1 << 10;
        const Y = 1 << 11;
        const Z = 1 << 12;
    }
}

impl Default for CommandWords {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for ValueWords {
    fn default() -> Self {
        Self::empty()
    }
}

impl ValueWords {
    /// X/Y/Z word for axis index 0/1/2.
    pub fn axis(index: usize) -> ValueWords {
        match index {
            X_AXIS => ValueWords::X,
            Y_AXIS => ValueWords::Y,
            Z_AXIS => ValueWords::Z,
            _ => panic!("axis index out of range: {index}"),
        }
    }

    /// I/J/K word for axis index 0/1/2.
    pub fn offset(index: usize) -> ValueWords {
        match index {
            X_AXIS => ValueWords::I,
            Y_AXIS => ValueWords::J,
            Z_AXIS => ValueWords::K,
            _ => panic!("axis index out of range: {index}"),
        }
    }
}

/// Non-modal commands (group 0). Exactly one may appear per block, and it
/// may not share the block with a motion mode or tool length change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonModal {
    #[default]
    None,
    /// G4 dwell
    Dwell,
    /// G10 set coordinate data
    SetCoordinateData,
    /// G28 go to predefined position
    GoHome0,
    /// G28.1 set predefined position
    SetHome0,
    /// G30 go to predefined position
    GoHome1,
    /// G30.1 set predefined position
    SetHome1,
    /// G53 machine coordinate override for the current block
    AbsoluteOverride,
    /// G92 set coordinate offset
    SetCoordinateOffset,
    /// G92.1 reset coordinate offset
    ResetCoordinateOffset,
}

impl NonModal {
    pub fn gcode(self) -> &'static str {
        match self {
            NonModal::None => "",
            NonModal::Dwell => "G4",
            NonModal::SetCoordinateData => "G10",
            NonModal::GoHome0 => "G28",
            NonModal::SetHome0 => "G28.1",
            NonModal::GoHome1 => "G30",
            NonModal::SetHome1 => "G30.1",
            NonModal::AbsoluteOverride => "G53",
            NonModal::SetCoordinateOffset => "G92",
            NonModal::ResetCoordinateOffset => "G92.1",
        }
    }
}

/// Numeric word slots for one block. Slots are plain storage; whether a
/// slot is meaningful is decided by the matching bit in
/// [`ParserBlock::value_words`]. Transformers reuse unset slots as
/// scratch space (notably R and IJK during arc normalization).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockValues {
    /// F feed rate
    pub f: f64,
    /// I, J, K arc center offsets from the start point
    pub ijk: [f64; 3],
    /// L G10/canned-cycle parameter
    pub l: u8,
    /// N line number
    pub n: i32,
    /// P dwell time or G10 coordinate system index
    pub p: f64,
    /// R arc radius
    pub r: f64,
    /// S spindle speed (laser power)
    pub s: f64,
    /// T tool number
    pub t: u8,
    /// X, Y, Z axis targets
    pub xyz: [f64; 3],
}

/// The structured representation of one G-code line, ready for the
/// transformer chain. Plain value data, cheap to copy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParserBlock {
    /// Which modal groups this block carries a command in.
    pub command_words: CommandWords,
    /// Which value words this block assigns.
    pub value_words: ValueWords,
    /// The non-modal command, meaningful when `command_words` has `G0`.
    pub non_modal: NonModal,
    /// Modal values carried by this block. Only the fields whose group bit
    /// is set in `command_words` were actually commanded on this line.
    pub modal: ModalState,
    /// Numeric word values.
    pub values: BlockValues,
}
