//! Tail-end redundancy eliminator.
//!
//! One more shadow fold over the outgoing stream, with a shadow that
//! starts out knowing nothing: whatever a block restates relative to what
//! was already emitted is stripped, whatever is new survives. Running the
//! pass twice changes nothing the second time.

use gfilter_core::ModalShadow;

use crate::{BlockBuffer, Transform};

pub struct Cleanup {
    shadow: ModalShadow,
}

impl Default for Cleanup {
    fn default() -> Self {
        Self {
            shadow: ModalShadow::unknown(),
        }
    }
}

impl Transform for Cleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn apply(&mut self, blocks: &mut BlockBuffer) {
        for block in blocks.iter_mut() {
            self.shadow.update(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfilter_core::{block_to_string, parse_line, ParserBlock};

    fn run_pass(lines: &[&str]) -> Vec<ParserBlock> {
        let mut cleanup = Cleanup::default();
        lines
            .iter()
            .map(|line| {
                let mut buf = BlockBuffer::new(parse_line(line).unwrap());
                cleanup.apply(&mut buf);
                buf[0]
            })
            .collect()
    }

    #[test]
    fn strips_restated_words_across_lines() {
        let blocks = run_pass(&["G1X10F600", "G1X10Y5F600"]);
        assert_eq!(block_to_string(&blocks[0]), "F600X10G1");
        assert_eq!(block_to_string(&blocks[1]), "Y5");
    }

    #[test]
    fn first_occurrence_always_survives() {
        let blocks = run_pass(&["G90G21"]);
        // Power-on defaults still print once; the shadow starts unknown.
        assert_eq!(block_to_string(&blocks[0]), "G90G21");
    }

    #[test]
    fn idempotent_over_a_stream() {
        let lines = ["G21G90", "G1X10F600", "G1X10F600", "G0Z5"];
        let once = run_pass(&lines);

        // Feed the cleaned blocks through a second fresh pass.
        let mut second = Cleanup::default();
        let twice: Vec<ParserBlock> = once
            .iter()
            .map(|block| {
                let mut buf = BlockBuffer::new(*block);
                second.apply(&mut buf);
                buf[0]
            })
            .collect();

        let once_text: Vec<String> = once.iter().map(block_to_string).collect();
        let twice_text: Vec<String> = twice.iter().map(block_to_string).collect();
        assert_eq!(once_text, twice_text);
    }
}
