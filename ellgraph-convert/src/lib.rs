//! Conversion of constituency trees with elision markers to graphs.

mod error;
pub use crate::error::{ConversionError, FailureKind, ReferenceFault};

mod batch;
pub use crate::batch::{BatchConverter, BatchReport, FailureCounts, SentenceResult};

mod config;
pub use crate::config::ConverterConfig;

mod convert;
pub use crate::convert::TreeConverter;

mod decompose;

mod raw;
pub use crate::raw::{RawDocument, RawNode};

#[cfg(test)]
mod tests;
