//! Input line conditioning.
//!
//! Raw lines are conditioned before parsing: whitespace and control
//! characters go away, `(...)` and `;` comments are removed, the
//! block-delete character is dropped, and letters are uppercased. The
//! conditioned line is capped at a fixed buffer size; longer lines are
//! rejected without affecting the rest of the stream.

use crate::status::Status;

/// Fixed input line buffer size, including the terminator position.
pub const LINE_BUFFER_SIZE: usize = 1024;

/// Conditions one raw input line.
///
/// Returns the scrubbed line, which may be empty (blank or comment-only
/// input). `(...)` comments end at the closing parenthesis, `;` comments
/// run to end of line. An over-long line yields [`Status::Overflow`].
pub fn scrub_line(raw: &str) -> Result<String, Status> {
    let mut line = String::new();
    let mut in_comment = false;

    for c in raw.chars() {
        if in_comment {
            if c == ')' {
                in_comment = false;
            }
            continue;
        }
        match c {
            ';' => break,
            '(' => in_comment = true,
            // Block delete is not supported; the marker is dropped.
            '/' => {}
            c if (c as u32) <= 0x20 => {}
            c => {
                if line.len() >= LINE_BUFFER_SIZE - 1 {
                    return Err(Status::Overflow);
                }
                line.push(c.to_ascii_uppercase());
            }
        }
    }

    Ok(line)
}
