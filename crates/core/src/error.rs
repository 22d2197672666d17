/// A parse failure. Distinct from the "nothing to parse" outcome, which is
/// reported as `Ok(None)` by [`crate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The text never mentions an exception, so it cannot be a dump.
    #[error("an exception with a stacktrace wasn't passed")]
    NotAnException,

    /// A header segment has no `:` separating the exception type from the
    /// rest of the line. `segment` is 0 for the outermost exception and
    /// increases by one per `--->` marker.
    #[error("header segment {segment} has no exception type delimiter: '{header}'")]
    MissingTypeDelimiter { segment: usize, header: String },

    /// The exception type field was found but is blank.
    #[error("header segment {segment} has an empty exception type")]
    EmptyExceptionType { segment: usize },
}

impl ParseError {
    /// Stable machine-readable name for the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::NotAnException => "not_an_exception",
            ParseError::MissingTypeDelimiter { .. } => "missing_type_delimiter",
            ParseError::EmptyExceptionType { .. } => "empty_exception_type",
        }
    }

    /// Header segment the error was raised for, if any.
    pub fn segment(&self) -> Option<usize> {
        match self {
            ParseError::NotAnException => None,
            ParseError::MissingTypeDelimiter { segment, .. }
            | ParseError::EmptyExceptionType { segment } => Some(*segment),
        }
    }

    /// Serialize to the JSON shape the CLI prints on failure.
    /// All fields are always present (null for missing).
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":    self.kind(),
            "message": self.to_string(),
            "segment": self.segment(),
        })
    }
}
