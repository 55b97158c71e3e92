//! Modal state tracking
//!
//! Modal groups are persistent states that affect all subsequent commands
//! until changed by another command in the same group. Each group is a
//! proper enum whose variants map one-to-one onto the G/M text they were
//! parsed from, so a block can be printed back without lookup tables.

use serde::{Deserialize, Serialize};

/// Motion mode - Group 1 (G0, G1, G2, G3, G38.x, G80)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    /// G0 rapid positioning
    #[default]
    Seek,
    /// G1 linear interpolation
    Linear,
    /// G2 clockwise arc
    CwArc,
    /// G3 counter-clockwise arc
    CcwArc,
    /// G38.2 probe toward workpiece, signal error on failure
    ProbeToward,
    /// G38.3 probe toward workpiece, no error
    ProbeTowardNoError,
    /// G38.4 probe away from workpiece, signal error on failure
    ProbeAway,
    /// G38.5 probe away from workpiece, no error
    ProbeAwayNoError,
    /// G80 motion mode cancel
    None,
}

impl Motion {
    /// True for G2/G3 circular interpolation.
    pub fn is_arc(self) -> bool {
        matches!(self, Motion::CwArc | Motion::CcwArc)
    }

    pub fn gcode(self) -> &'static str {
        match self {
            Motion::Seek => "G0",
            Motion::Linear => "G1",
            Motion::CwArc => "G2",
            Motion::CcwArc => "G3",
            Motion::ProbeToward => "G38.2",
            Motion::ProbeTowardNoError => "G38.3",
            Motion::ProbeAway => "G38.4",
            Motion::ProbeAwayNoError => "G38.5",
            Motion::None => "G80",
        }
    }
}

/// Plane selection - Group 2 (G17=XY, G18=XZ, G19=YZ)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    #[default]
    Xy,
    Xz,
    Yz,
}

impl Plane {
    pub fn gcode(self) -> &'static str {
        match self {
            Plane::Xy => "G17",
            Plane::Xz => "G18",
            Plane::Yz => "G19",
        }
    }
}

/// Distance mode - Group 3 (G90=absolute, G91=incremental)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMode {
    #[default]
    Absolute,
    Incremental,
}

impl DistanceMode {
    /// The other mode. A G90/G91 that survives canonicalization always
    /// means a transition, so restoring stages treat it as a toggle.
    pub fn toggled(self) -> Self {
        match self {
            DistanceMode::Absolute => DistanceMode::Incremental,
            DistanceMode::Incremental => DistanceMode::Absolute,
        }
    }

    pub fn gcode(self) -> &'static str {
        match self {
            DistanceMode::Absolute => "G90",
            DistanceMode::Incremental => "G91",
        }
    }
}

/// Feed rate mode - Group 5 (G93=inverse time, G94=units per minute)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedRateMode {
    #[default]
    UnitsPerMin,
    InverseTime,
}

impl FeedRateMode {
    pub fn gcode(self) -> &'static str {
        match self {
            FeedRateMode::UnitsPerMin => "G94",
            FeedRateMode::InverseTime => "G93",
        }
    }
}

/// Units mode - Group 6 (G20=inches, G21=millimeters)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitsMode {
    #[default]
    Mm,
    Inches,
}

impl UnitsMode {
    /// The other mode; see [`DistanceMode::toggled`].
    pub fn toggled(self) -> Self {
        match self {
            UnitsMode::Mm => UnitsMode::Inches,
            UnitsMode::Inches => UnitsMode::Mm,
        }
    }

    pub fn gcode(self) -> &'static str {
        match self {
            UnitsMode::Mm => "G21",
            UnitsMode::Inches => "G20",
        }
    }
}

/// Tool length offset mode - Group 8 (G43.1=dynamic, G49=cancel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolLengthMode {
    #[default]
    Cancel,
    EnableDynamic,
}

impl ToolLengthMode {
    pub fn gcode(self) -> &'static str {
        match self {
            ToolLengthMode::Cancel => "G49",
            ToolLengthMode::EnableDynamic => "G43.1",
        }
    }
}

/// Work coordinate system - Group 12 (G54-G59)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordSystem {
    #[default]
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
}

impl CoordSystem {
    pub fn from_gcode_number(n: i32) -> Option<Self> {
        match n {
            54 => Some(CoordSystem::P1),
            55 => Some(CoordSystem::P2),
            56 => Some(CoordSystem::P3),
            57 => Some(CoordSystem::P4),
            58 => Some(CoordSystem::P5),
            59 => Some(CoordSystem::P6),
            _ => None,
        }
    }

    pub fn gcode(self) -> &'static str {
        match self {
            CoordSystem::P1 => "G54",
            CoordSystem::P2 => "G55",
            CoordSystem::P3 => "G56",
            CoordSystem::P4 => "G57",
            CoordSystem::P5 => "G58",
            CoordSystem::P6 => "G59",
        }
    }
}

/// Program flow - Group M4 (M0, M2, M30)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramFlow {
    #[default]
    Running,
    /// M0 program pause
    Paused,
    /// M2 program end
    End,
    /// M30 program end and reset
    EndReset,
}

impl ProgramFlow {
    /// M-code text; `Running` is the implicit state and has none.
    pub fn mcode(self) -> Option<&'static str> {
        match self {
            ProgramFlow::Running => None,
            ProgramFlow::Paused => Some("M0"),
            ProgramFlow::End => Some("M2"),
            ProgramFlow::EndReset => Some("M30"),
        }
    }
}

/// Spindle state - Group M7 (M3, M4, M5)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpindleMode {
    #[default]
    Disable,
    EnableCw,
    EnableCcw,
}

impl SpindleMode {
    pub fn mcode(self) -> &'static str {
        match self {
            SpindleMode::EnableCw => "M3",
            SpindleMode::EnableCcw => "M4",
            SpindleMode::Disable => "M5",
        }
    }
}

bitflags::bitflags! {
    /// Coolant state - Group M8. M7 and M8 accumulate; M9 clears both.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CoolantMode: u8 {
        const MIST = 1 << 0;
        const FLOOD = 1 << 1;
    }
}

impl Default for CoolantMode {
    fn default() -> Self {
        Self::empty()
    }
}

/// Override switches - Group M9 (M56)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideMode {
    #[default]
    None,
    /// M56 parking motion override
    ParkingMotion,
}

/// The full set of modal field values carried by one block, or tracked as a
/// transformer's running state. Defaults are the machine power-on modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalState {
    pub motion: Motion,
    pub plane: Plane,
    pub distance: DistanceMode,
    pub feed_rate: FeedRateMode,
    pub units: UnitsMode,
    pub tool_length: ToolLengthMode,
    pub coord_system: CoordSystem,
    pub program_flow: ProgramFlow,
    pub spindle: SpindleMode,
    pub coolant: CoolantMode,
    pub override_ctrl: OverrideMode,
}
