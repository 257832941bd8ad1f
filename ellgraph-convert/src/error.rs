use std::fmt;

use ellgraph::GraphError;
use serde::Serialize;
use thiserror::Error;

/// Reason why an elision reference cannot be resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReferenceFault {
    /// The referenced identifier does not occur in the tree.
    Missing,

    /// The reference chain loops back on itself.
    Cycle,

    /// The reference chain is longer than the configured maximum.
    TooDeep,
}

impl fmt::Display for ReferenceFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReferenceFault::Missing => f.write_str("no such node"),
            ReferenceFault::Cycle => f.write_str("reference cycle"),
            ReferenceFault::TooDeep => f.write_str("reference chain is too long"),
        }
    }
}

/// Tree conversion error.
///
/// All conversion errors are specific to one sentence.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("malformed elision reference {reference:?}: {fault}")]
    MalformedTreeReference {
        reference: String,
        fault: ReferenceFault,
    },

    #[error("cannot resolve elided span {span:?} under node {parent:?}")]
    UnresolvableEllipsisSpan { parent: usize, span: Vec<usize> },

    #[error("node identifier {id:?} occurs more than once")]
    DuplicateId { id: String },

    #[error("offsets {start:?}..{end:?} of terminal {id:?} are outside the text")]
    InvalidOffset { id: String, start: usize, end: usize },

    #[error("the sentence does not have any terminals")]
    EmptySentence,

    #[error("constituent {id:?} does not have any children")]
    EmptyConstituent { id: String },

    #[error("encoded sentence length exceeds the maximum of {max:?}")]
    SentenceTooLong { max: usize },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ConversionError {
    /// Get the kind of failure, for aggregation over a batch.
    pub fn kind(&self) -> FailureKind {
        match self {
            ConversionError::MalformedTreeReference { .. } => FailureKind::MalformedTreeReference,
            ConversionError::UnresolvableEllipsisSpan { .. } => {
                FailureKind::UnresolvableEllipsisSpan
            }
            ConversionError::SentenceTooLong { .. } => FailureKind::SentenceTooLong,
            ConversionError::DuplicateId { .. }
            | ConversionError::InvalidOffset { .. }
            | ConversionError::EmptySentence
            | ConversionError::EmptyConstituent { .. }
            | ConversionError::Graph(_) => FailureKind::InvalidTree,
        }
    }
}

/// Kind of sentence conversion failure.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedTreeReference,
    UnresolvableEllipsisSpan,
    SentenceTooLong,
    InvalidTree,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FailureKind::MalformedTreeReference => "malformed tree reference",
            FailureKind::UnresolvableEllipsisSpan => "unresolvable ellipsis span",
            FailureKind::SentenceTooLong => "sentence too long",
            FailureKind::InvalidTree => "invalid tree",
        };
        f.write_str(name)
    }
}
