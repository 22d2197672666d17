//! Header line parsing: log message, exception type, message, and the chain
//! of inner exceptions introduced by `--->`.

use crate::error::ParseError;
use crate::model::ExceptionResult;

/// Separates an exception's header from the header of the exception it wraps.
pub const INNER_EXCEPTION_MARKER: &str = "--->";

/// Whether a header segment may start with a log message.
///
/// Only the outermost segment can carry one; inner segments always start
/// with the exception type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMessagePolicy {
    Allow,
    Suppress,
}

/// Field currently being read from a header segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    Leading,
    ExceptionType,
    ExceptionMessage,
}

/// Parse a header line into an exception chain. Every node comes back with
/// an empty `stacktrace`; frames are attached by the orchestrator.
pub fn parse_header(header: &str, policy: LogMessagePolicy) -> Result<ExceptionResult, ParseError> {
    parse_segment(header, policy, 0)
}

fn parse_segment(
    segment: &str,
    policy: LogMessagePolicy,
    index: usize,
) -> Result<ExceptionResult, ParseError> {
    let (own, inner) = match segment.find(INNER_EXCEPTION_MARKER) {
        Some(pos) => (
            &segment[..pos],
            Some(&segment[pos + INNER_EXCEPTION_MARKER.len()..]),
        ),
        None => (segment, None),
    };

    let mut result = parse_fields(own, policy, index)?;
    if let Some(inner) = inner {
        let inner = parse_segment(inner, LogMessagePolicy::Suppress, index + 1)?;
        result.inner_exception = Some(Box::new(inner));
    }
    Ok(result)
}

fn parse_fields(
    text: &str,
    policy: LogMessagePolicy,
    segment: usize,
) -> Result<ExceptionResult, ParseError> {
    let mut state = HeaderField::Leading;
    let mut start = 0;
    let mut log_message: Option<String> = None;
    let mut type_name: Option<String> = None;

    for delimiter in FieldDelimiters::new(text) {
        let field = text[start..delimiter].trim();
        match state {
            HeaderField::Leading
                if policy == LogMessagePolicy::Allow && !looks_like_exception_type(field) =>
            {
                log_message = Some(field.to_owned());
                state = HeaderField::ExceptionType;
            }
            HeaderField::Leading | HeaderField::ExceptionType => {
                type_name = Some(field.to_owned());
                state = HeaderField::ExceptionMessage;
            }
            // The message runs to the end of the segment, colons included.
            HeaderField::ExceptionMessage => break,
        }
        start = delimiter + 1;
    }

    match state {
        HeaderField::Leading => {
            return Err(ParseError::MissingTypeDelimiter {
                segment,
                header: text.trim().to_owned(),
            });
        }
        // Only one delimiter: what looked like a log message is the type.
        HeaderField::ExceptionType => type_name = log_message.take(),
        HeaderField::ExceptionMessage => {}
    }

    let type_name = match type_name {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ParseError::EmptyExceptionType { segment }),
    };

    Ok(ExceptionResult {
        log_message,
        type_name,
        message: text[start..].trim().to_owned(),
        inner_exception: None,
        stacktrace: Vec::new(),
    })
}

/// A single word ending in `Exception` is taken as a type even where a log
/// message is allowed, so `System.Exception: a: b` keeps its full message.
fn looks_like_exception_type(field: &str) -> bool {
    field.ends_with("Exception") && !field.contains(char::is_whitespace)
}

/// Byte offsets of the `:` characters that separate header fields. A `::`
/// pair is part of a name, never a separator.
struct FieldDelimiters<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldDelimiters<'a> {
    fn new(text: &'a str) -> Self {
        FieldDelimiters {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }
}

impl Iterator for FieldDelimiters<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.pos < self.bytes.len() {
            let i = self.pos;
            if self.bytes[i] == b':' {
                if self.bytes.get(i + 1) == Some(&b':') {
                    self.pos = i + 2;
                    continue;
                }
                self.pos = i + 1;
                return Some(i);
            }
            self.pos += 1;
        }
        None
    }
}
