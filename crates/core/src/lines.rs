//! Line boundary scanning over the raw dump, in both directions.
//!
//! Nothing here allocates: spans are byte ranges into the original text,
//! and [`ReverseLines`] walks a trace of any size bottom-up in O(1) memory.
//! Only `\n` is treated as a line break.

use std::ops::Range;

/// Span of the line that starts at `start`, excluding its `\n`.
///
/// Returns `None` when no newline follows `start`; callers treat that as
/// "nothing left to read".
pub fn line_starting_at(text: &str, start: usize) -> Option<Range<usize>> {
    let rest = text.get(start..)?;
    rest.find('\n').map(|len| start..start + len)
}

/// Span of the line whose last byte is at `offset`, excluding delimiters.
///
/// If `offset` lands on a `\n` the scan steps back one byte first, so the
/// delimiter that ended the previous call is never reprocessed. Returns
/// `None` when no newline precedes the line, i.e. for the first line of the
/// text. A blank line yields an empty span.
///
/// `offset` must be the last byte of a line or a newline.
pub fn line_ending_at(text: &str, offset: usize) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    let mut end = offset;
    if *bytes.get(end)? == b'\n' {
        end = end.checked_sub(1)?;
    }
    let newline = bytes[..=end].iter().rposition(|&b| b == b'\n')?;
    Some(newline + 1..end + 1)
}

/// Iterates the lines of a text from last to first, never yielding the
/// first line.
///
/// The first line of a dump is its header; the frames all follow it, so a
/// backward walk that stops short of the header sees exactly the trace.
pub struct ReverseLines<'a> {
    text: &'a str,
    cursor: Option<usize>,
}

impl<'a> ReverseLines<'a> {
    pub fn new(text: &'a str) -> Self {
        ReverseLines {
            text,
            cursor: text.len().checked_sub(1),
        }
    }
}

impl<'a> Iterator for ReverseLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let offset = self.cursor?;
        match line_ending_at(self.text, offset) {
            Some(span) => {
                // Always >= 1: a newline precedes every span.
                self.cursor = span.start.checked_sub(1);
                Some(&self.text[span])
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }
}
