//! Top-level entry point: header chain first, then a single backward walk
//! over the trace that hands each frame section to its exception.

use crate::error::ParseError;
use crate::frame::parse_frame;
use crate::header::{parse_header, LogMessagePolicy};
use crate::lines::{line_starting_at, ReverseLines};
use crate::model::{ExceptionMethod, ExceptionResult};

/// Literal every dump must contain somewhere.
const EXCEPTION_PROBE: &str = "Exception";

/// Separator Mono prints between an inner exception's frames and the frames
/// of the exception that wrapped it.
pub const INNER_BOUNDARY: &str = "--- End of inner exception stack trace ---";

/// Parse a Mono exception dump into its exception chain.
///
/// Returns `Ok(None)` when the first line is empty or the text has no line
/// break at all: there is no header to parse. Malformed headers, and text
/// that never mentions an exception, are errors.
///
/// Lines are split on `\n` only; callers holding `\r\n` text must
/// normalize it first.
pub fn parse(text: &str) -> Result<Option<ExceptionResult>, ParseError> {
    if !text.contains(EXCEPTION_PROBE) {
        return Err(ParseError::NotAnException);
    }

    let header = match line_starting_at(text, 0) {
        Some(span) if !span.is_empty() => &text[span],
        _ => {
            log::debug!("no header line, nothing to parse");
            return Ok(None);
        }
    };

    let mut root = parse_header(header, LogMessagePolicy::Allow)?;
    attach_frames(&mut root, ReverseLines::new(text));
    Ok(Some(root))
}

/// Walk trace lines bottom-up. The bottom section belongs to the outermost
/// exception; each boundary hands over to the next inner one.
fn attach_frames<'a>(root: &mut ExceptionResult, lines: impl Iterator<Item = &'a str>) {
    let mut current = Some(root);
    let mut frames: Vec<ExceptionMethod> = Vec::new();

    for line in lines {
        let Some(node) = current.take() else {
            log::debug!("trace has more sections than the header has exceptions");
            break;
        };

        if is_inner_boundary(line) {
            log::debug!(
                "inner boundary: {} frames for {}",
                frames.len(),
                node.type_name
            );
            node.stacktrace = std::mem::take(&mut frames);
            current = node.inner_exception.as_deref_mut();
            continue;
        }

        match parse_frame(line) {
            Some(frame) => frames.push(frame),
            None if line.trim().is_empty() => {}
            None => log::debug!("skipping unrecognized trace line: {:?}", line),
        }
        current = Some(node);
    }

    if let Some(node) = current {
        if !frames.is_empty() {
            node.stacktrace = frames;
        }
    }
}

fn is_inner_boundary(line: &str) -> bool {
    line.trim_start()
        .starts_with(INNER_BOUNDARY.trim_end_matches(" ---"))
}
