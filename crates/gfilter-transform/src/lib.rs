//! Stateful block transformers for gfilter.
//!
//! The pipeline is a linear chain of [`Transform`] stages. Each stage owns
//! private running state (its modal shadow) and rewrites the blocks of the
//! current line in place through a shared [`BlockBuffer`]. Most stages map
//! one block to one block; the device stages expand a block into the lead
//! moves (laser) or pivot arc (drag knife) the output device needs.
//!
//! Stage order for a full run:
//!
//! ```text
//! ToMm -> ToAbs -> {Laser | Drag} -> FromAbs -> FromMm -> Cleanup
//! ```
//!
//! The staging pairs canonicalize the stream to absolute millimeters so the
//! device stages can do plain euclidean geometry, then restore the input's
//! unit and distance modality on the way out.

pub mod cleanup;
pub mod distance;
pub mod drag;
pub mod geom;
pub mod laser;
pub mod units;

use std::ops::{Index, IndexMut};

use gfilter_core::ParserBlock;

pub use cleanup::Cleanup;
pub use distance::{FromAbs, ToAbs};
pub use drag::{Drag, DragConfig};
pub use laser::{Laser, LaserConfig};
pub use units::{FromMm, ToMm};

/// Upper bound on blocks one input line can expand into. The laser stage
/// peaks at four, the drag stage at two; the slack is headroom for
/// composing stages, not a promise.
pub const MAX_BLOCKS: usize = 6;

/// A stateful rewrite stage in the block pipeline.
pub trait Transform {
    /// Short stage name for tracing.
    fn name(&self) -> &'static str;

    /// Rewrites the blocks of the current line in place. A stage may grow
    /// the buffer up to its fixed capacity; it never reorders blocks it
    /// did not create.
    fn apply(&mut self, blocks: &mut BlockBuffer);
}

/// Fixed-capacity inline scratch buffer holding the blocks of one line.
#[derive(Debug, Clone, Copy)]
pub struct BlockBuffer {
    blocks: [ParserBlock; MAX_BLOCKS],
    len: usize,
}

impl BlockBuffer {
    /// Buffer holding a single freshly parsed block.
    pub fn new(first: ParserBlock) -> Self {
        let mut blocks = [ParserBlock::default(); MAX_BLOCKS];
        blocks[0] = first;
        Self { blocks, len: 1 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Appends a block. Panics on overflow; stages are sized against
    /// [`MAX_BLOCKS`] and exceeding it is a stage bug, not an input error.
    pub fn push(&mut self, block: ParserBlock) {
        assert!(self.len < MAX_BLOCKS, "block buffer overflow");
        self.blocks[self.len] = block;
        self.len += 1;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParserBlock> {
        self.blocks[..self.len].iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ParserBlock> {
        self.blocks[..self.len].iter_mut()
    }

    pub fn as_slice(&self) -> &[ParserBlock] {
        &self.blocks[..self.len]
    }
}

impl Index<usize> for BlockBuffer {
    type Output = ParserBlock;

    fn index(&self, index: usize) -> &ParserBlock {
        &self.as_slice()[index]
    }
}

impl IndexMut<usize> for BlockBuffer {
    fn index_mut(&mut self, index: usize) -> &mut ParserBlock {
        &mut self.blocks[..self.len][index]
    }
}
