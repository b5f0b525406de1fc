use std::{fmt, io};
use thiserror::Error;

/// Fatal errors of the parse → aggregate → render pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No valid records, or no stations, survived to this stage.
    #[error("no usable playlist data: {0}")]
    EmptyInput(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A malformed or incomplete input line.
///
/// These never escape the parser as errors; they are logged and counted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseIssue {
    /// One-based line number in the input stream.
    pub line: usize,
    pub kind: ParseIssueKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseIssueKind {
    Malformed(String),
    MissingField(&'static str),
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ParseIssueKind::Malformed(reason) => {
                write!(f, "line {}: malformed record: {}", self.line, reason)
            }
            ParseIssueKind::MissingField(field) => {
                write!(f, "line {}: missing required field '{}'", self.line, field)
            }
        }
    }
}
