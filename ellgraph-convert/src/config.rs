use serde::{Deserialize, Serialize};

/// Tree converter configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Maximum number of elisions that are followed when an elision
    /// refers to another elision.
    pub max_reference_depth: usize,

    /// Elided spans with this many terminals or more are not decomposed.
    pub max_decomposition_span: usize,

    /// Decompositions must have fewer parts than this.
    pub max_decomposition_parts: usize,

    /// Fall back to attaching the individual terminals of an elided span
    /// when it cannot be decomposed into constituents.
    pub terminal_fallback: bool,

    /// Reject sentences with a longer bracketed encoding.
    pub max_encoded_length: Option<usize>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            max_reference_depth: 5,
            max_decomposition_span: 10,
            max_decomposition_parts: 3,
            terminal_fallback: true,
            max_encoded_length: None,
        }
    }
}
