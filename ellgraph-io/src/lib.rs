//! Readers and writers for ellipsis graphs.

mod error;
pub use crate::error::{IOError, ReadError};

pub mod json;

pub mod sdp;

pub mod tree;

#[cfg(test)]
mod tests;
