use thiserror::Error;

/// Annotation errors.
///
/// These errors indicate graphs that violate the structural invariants
/// that conversion guarantees.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum AnnotateError {
    #[error("cannot find the head of node {node:?}: {reason}")]
    HeadInvariantViolation { node: usize, reason: &'static str },
}
