//! Per-line parse status codes.
//!
//! Every input line produces a status. Parse failures are per-line and
//! non-fatal: the line is reported and discarded, and the stream continues.
//! The numeric codes match the Grbl error vocabulary so existing senders
//! can interpret the status stream.

use thiserror::Error;

/// A reason a G-code line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Status {
    /// A word did not start with an A-Z letter.
    #[error("expected command letter")]
    ExpectedCommandLetter,

    /// A word letter was not followed by a valid number.
    #[error("bad number format")]
    BadNumberFormat,

    /// A G or M command outside the supported set.
    #[error("unsupported or invalid g-code command")]
    UnsupportedCommand,

    /// A G or M command with an unexpected fractional part.
    #[error("g-code command value not an integer")]
    CommandValueNotInteger,

    /// Two commands from the same modal group on one line.
    #[error("modal group violation")]
    ModalGroupViolation,

    /// The same value word twice on one line.
    #[error("word repeated")]
    WordRepeated,

    /// A non-modal axis command, motion mode, or tool length change
    /// sharing a block with another of those.
    #[error("axis words/command conflict")]
    AxisCommandConflict,

    /// A value word above its allowed maximum (tool number, line number).
    #[error("value word exceeds maximum")]
    MaxValueExceeded,

    /// A negative value for a word that must be non-negative (F, N, P, T, S).
    #[error("value word cannot be negative")]
    NegativeValue,

    /// Input line longer than the line buffer.
    #[error("line overflow")]
    Overflow,
}

impl Status {
    /// Grbl-compatible numeric error code.
    pub fn code(self) -> u8 {
        match self {
            Status::ExpectedCommandLetter => 1,
            Status::BadNumberFormat => 2,
            Status::NegativeValue => 4,
            Status::Overflow => 11,
            Status::UnsupportedCommand => 20,
            Status::ModalGroupViolation => 21,
            Status::CommandValueNotInteger => 23,
            Status::AxisCommandConflict => 24,
            Status::WordRepeated => 25,
            Status::MaxValueExceeded => 38,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let statuses = [
            Status::ExpectedCommandLetter,
            Status::BadNumberFormat,
            Status::UnsupportedCommand,
            Status::CommandValueNotInteger,
            Status::ModalGroupViolation,
            Status::WordRepeated,
            Status::AxisCommandConflict,
            Status::MaxValueExceeded,
            Status::NegativeValue,
            Status::Overflow,
        ];
        for (i, a) in statuses.iter().enumerate() {
            for b in &statuses[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a} and {b} share a code");
            }
        }
    }

    #[test]
    fn display_matches_grbl_wording() {
        assert_eq!(
            Status::ExpectedCommandLetter.to_string(),
            "expected command letter"
        );
        assert_eq!(
            Status::ModalGroupViolation.to_string(),
            "modal group violation"
        );
    }
}
