//! # gfilter
//!
//! A streaming G-code rewriter for two-axis cutting machines. Reads
//! RS-274/NGC-flavored G-code and emits semantically equivalent G-code
//! tailored for the output device:
//!
//! - **Laser cutters** get zero-power lead-in/lead-out moves around every
//!   feed, power, or direction discontinuity, so the beam only touches
//!   material at nominal feed rate.
//! - **Drag knives** get their targets offset so the trailing blade tip
//!   traces the programmed path, with pivot arcs inserted at corners too
//!   sharp for the blade to follow.
//!
//! ## Architecture
//!
//! The workspace is organized as:
//!
//! 1. **gfilter-core** - parser-block data model, block parser/printer,
//!    modal shadow, line scrubbing
//! 2. **gfilter-transform** - the stateful transformer stages and arc
//!    geometry
//! 3. **gfilter** - this crate: the CLI binary and the per-line driver
//!    loop
//!
//! Lines flow through `parse -> to-mm -> to-abs -> {laser | drag} ->
//! from-abs -> from-mm -> cleanup -> print`, one line at a time, with
//! parse errors reported per line on the status stream (stderr) without
//! stopping the run.

pub mod driver;

pub use driver::{Filter, Mode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - stderr output, keeping stdout free for the rewritten G-code
/// - RUST_LOG environment variable support, defaulting to warnings so
///   per-line parse errors are visible
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
