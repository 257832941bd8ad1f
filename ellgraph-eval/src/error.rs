use std::fmt;

use thiserror::Error;

/// Units that must be aligned between gold and predicted data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Alignment {
    Sentences,
    Nodes { sentence: usize },
    Tokens { sentence: usize },
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Alignment::Sentences => f.write_str("sentences"),
            Alignment::Nodes { sentence } => write!(f, "nodes of sentence {}", sentence),
            Alignment::Tokens { sentence } => write!(f, "tokens of sentence {}", sentence),
        }
    }
}

/// Evaluation error.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum EvalError {
    /// Gold and predicted data cannot be compared index by index.
    #[error("misaligned {unit}: gold has {gold:?}, predicted has {predicted:?}")]
    MisalignedComparison {
        unit: Alignment,
        gold: usize,
        predicted: usize,
    },

    #[error("unknown evaluation mode: {value:?}")]
    UnknownMode { value: String },
}
