//! Constituency graphs with ellipsis edges.
//!
//! A [`graph::Graph`] is a constituency tree in which constituents that
//! are elided elsewhere in the sentence are attached to the elliptical
//! constituents through additional ellipsis edges.

mod error;
pub use crate::error::GraphError;

pub mod category;

pub mod graph;

pub mod node;
