//! Evaluation of ellipsis graphs and their dependencies.

mod deps;
pub use crate::deps::{DependencyScorer, DEFAULT_PUNCTUATION};

mod error;
pub use crate::error::{Alignment, EvalError};

mod graph;
pub use crate::graph::GraphScorer;

mod metrics;
pub use crate::metrics::{Counts, EvalMode, Metrics, Prf, TagMetrics};
