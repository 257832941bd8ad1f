//! Annotation of ellipsis graphs with heads, dependencies and functions.

mod annotate;
pub use crate::annotate::Annotate;

mod error;
pub use crate::error::AnnotateError;

mod function;
pub use crate::function::{count_ellipsis_types, FunctionLabeler, FunctionRules, SubsumptionPolicy};

mod head;
pub use crate::head::{Dependency, HeadPercolator, HeadRules};

#[cfg(test)]
mod tests;
