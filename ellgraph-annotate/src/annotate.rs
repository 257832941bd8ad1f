use ellgraph::graph::Graph;

use crate::AnnotateError;

/// Graph annotator.
pub trait Annotate {
    /// Annotate a graph
    ///
    /// This method adds derived information to the nodes of a graph.
    /// Annotating a graph is deterministic, annotating an annotated graph
    /// again replaces the earlier annotations.
    fn annotate(&self, graph: &mut Graph) -> Result<(), AnnotateError>;
}
