use thiserror::Error;

/// Graph processing error.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("child {child:?} is out of bounds for graph with {node_count:?} vertices")]
    ChildOutOfBounds { child: usize, node_count: usize },

    #[error("parent {parent:?} is out of bounds for graph with {node_count:?} vertices")]
    ParentOutOfBounds { parent: usize, node_count: usize },

    #[error("node {child:?} already has primary parent {parent:?}")]
    MultiplePrimaryParents { child: usize, parent: usize },

    #[error("node {child:?} is already a child of {parent:?}")]
    DuplicateEdge { child: usize, parent: usize },

    #[error("node {node:?} cannot be a child of itself")]
    SelfLoop { node: usize },

    #[error("the root cannot have a primary parent")]
    RootWithParent,

    #[error("node {node:?} does not have a primary parent")]
    MissingPrimaryParent { node: usize },

    #[error("node {node:?} is not reachable from the root through primary edges")]
    Unreachable { node: usize },

    #[error("constituent {node:?} does not have primary children")]
    EmptyConstituent { node: usize },

    #[error("terminal {node:?} has children")]
    TerminalWithChildren { node: usize },

    #[error("graph does not have a root")]
    EmptyGraph,

    #[error("unknown constituent category: {value:?}")]
    UnknownCategory { value: String },
}
