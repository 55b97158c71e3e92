//! The per-line driver loop.
//!
//! Owns the transformer chain and the per-line block buffer. Each input
//! line is scrubbed, parsed, pushed through every stage, and printed
//! before the next line is read; there is no lookahead and no global
//! buffering, so arbitrarily long programs stream in constant memory.

use std::io::{BufRead, Write};

use anyhow::Context;
use gfilter_core::{parse_line, print_block, scrub_line, Status};
use gfilter_transform::{
    BlockBuffer, Cleanup, Drag, DragConfig, FromAbs, FromMm, Laser, LaserConfig, ToAbs, ToMm,
    Transform,
};

/// Which output device the stream is rewritten for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Laser cutter with the given head acceleration in mm/s^2.
    Laser { acceleration: f64 },
    /// Drag knife with the given blade offset in mm.
    Drag { offset: f64 },
}

/// The assembled filter: stage chain plus per-line state.
pub struct Filter {
    stages: Vec<Box<dyn Transform>>,
}

impl Filter {
    /// Builds the stage chain for `mode`. `max_angle_deg` is the largest
    /// path deflection treated as a continuous curve (laser) or not
    /// worth a swivel (drag knife).
    pub fn new(mode: Mode, max_angle_deg: f64) -> Self {
        let device: Box<dyn Transform> = match mode {
            Mode::Laser { acceleration } => Box::new(Laser::new(LaserConfig {
                acceleration,
                max_angle_deg,
            })),
            Mode::Drag { offset } => Box::new(Drag::new(DragConfig {
                offset,
                initial_angle_deg: 0.0,
                min_angle_deg: max_angle_deg,
            })),
        };

        let stages: Vec<Box<dyn Transform>> = vec![
            Box::new(ToMm::default()),
            Box::new(ToAbs::default()),
            device,
            Box::new(FromAbs::default()),
            Box::new(FromMm::default()),
            Box::new(Cleanup::default()),
        ];
        Self { stages }
    }

    /// Runs one scrubbed, non-empty g-code line through the stage chain.
    pub fn process_line(&mut self, line: &str) -> Result<BlockBuffer, Status> {
        let block = parse_line(line)?;
        let mut buffer = BlockBuffer::new(block);
        for stage in &mut self.stages {
            stage.apply(&mut buffer);
            tracing::trace!(stage = stage.name(), blocks = buffer.len(), "stage applied");
        }
        Ok(buffer)
    }

    /// Streams `input` to `output` line by line until EOF.
    ///
    /// Blank and comment-only lines come out blank, `$` system commands
    /// pass through untouched, and lines the parser rejects are reported
    /// and dropped without disturbing the rest of the stream. I/O errors
    /// are fatal.
    pub fn run<R, W>(&mut self, input: R, output: &mut W) -> anyhow::Result<()>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        for (number, line) in input.lines().enumerate() {
            let raw = line.context("reading input")?;
            match scrub_line(&raw) {
                Err(status) => report(number + 1, status),
                Ok(line) if line.is_empty() => {
                    writeln!(output).context("writing output")?;
                }
                Ok(line) if line.starts_with('$') => {
                    writeln!(output, "{line}").context("writing output")?;
                }
                Ok(line) => match self.process_line(&line) {
                    Ok(buffer) => {
                        for block in buffer.iter() {
                            print_block(block, output).context("writing output")?;
                            writeln!(output).context("writing output")?;
                        }
                    }
                    Err(status) => report(number + 1, status),
                },
            }
        }
        Ok(())
    }
}

/// Status-stream reporting for a rejected line.
fn report(line_number: usize, status: Status) {
    tracing::warn!(
        line = line_number,
        code = status.code(),
        "discarding line: {status}"
    );
}
