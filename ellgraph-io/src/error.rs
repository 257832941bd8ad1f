use std::io;

use ellgraph::GraphError;
use thiserror::Error;

/// IO error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IOError {
    /// Error in file IO.
    #[error("error reading or writing data")]
    IO(#[from] io::Error),

    /// Error (de)serializing JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A sentence graph in a collection is invalid.
    #[error("invalid graph for sentence {sent:?} of document {doc:?}")]
    InvalidGraph {
        doc: String,
        sent: usize,
        #[source]
        source: ReadError,
    },

    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Errors in reading graphs.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReadError {
    /// Error constructing the graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Node identifiers must be the indices of the nodes.
    #[error("expected node identifier {expected:?}, found {found:?}")]
    NodeId { expected: usize, found: usize },

    /// A primary child does not have the node as its parent.
    #[error("node {child:?} is a child of {node:?}, but has parent {parent:?}")]
    InconsistentParent {
        node: usize,
        child: usize,
        parent: usize,
    },

    /// The ellipsed parents of a node do not list the node as a child.
    #[error("ellipsed parents of node {node:?} do not match the children of its parents")]
    AsymmetricEllipsis { node: usize },

    /// A bracketed tree could not be parsed.
    #[error("malformed bracketed tree: {value:?}")]
    MalformedTree { value: String },

    /// An ellipsis marker refers to a node that does not exist.
    #[error("ellipsis marker {marker:?} does not refer to a node")]
    UnknownEllipsisTarget { marker: String },
}
