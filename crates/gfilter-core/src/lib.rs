//! Core G-code machinery for gfilter.
//!
//! This crate owns the data model and the line-level machinery the
//! transformer stages build on:
//!
//! - [`ParserBlock`] and its word bitsets - the structured form of one line
//! - [`parse_line`] - the RS-274/NGC block parser with modal-group checks
//! - [`print_block`] - canonical word-ordered emission
//! - [`ModalShadow`] - running modal state with redundancy stripping
//! - [`scrub_line`] - whitespace/comment conditioning ahead of the parser
//!
//! Parse failures are per-line [`Status`] values; the stream as a whole
//! never fails on bad input lines.

pub mod block;
pub mod modal;
pub mod parse;
pub mod print;
pub mod scrub;
pub mod shadow;
pub mod status;

pub use block::{
    BlockValues, CommandWords, NonModal, ParserBlock, ValueWords, X_AXIS, Y_AXIS, Z_AXIS,
};
pub use modal::{
    CoolantMode, CoordSystem, DistanceMode, FeedRateMode, ModalState, Motion, OverrideMode, Plane,
    ProgramFlow, SpindleMode, ToolLengthMode, UnitsMode,
};
pub use parse::parse_line;
pub use print::{block_to_string, format_value, print_block};
pub use scrub::{scrub_line, LINE_BUFFER_SIZE};
pub use shadow::ModalShadow;
pub use status::Status;
