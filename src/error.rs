use thiserror::Error;

/// Failures raised by the conversion engine.
///
/// Content-level oddities (unknown override codes, unknown sections, lines
/// that strip down to nothing) never surface here; only structural problems
/// that make a row impossible to interpret do.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("line {line}: malformed timestamp '{value}'")]
    MalformedTimestamp { line: usize, value: String },

    #[error("line {line}: data row in {section} appears before its Format line")]
    MissingFormatHeader { line: usize, section: String },

    #[error("line {line}: Format line has no '{column}' column")]
    MissingColumn { line: usize, column: String },

    #[error("line {line}: row has {found} columns, Format declares at least {expected}")]
    TruncatedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("failed to parse input as {format}: {message}")]
    Passthrough {
        format: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
