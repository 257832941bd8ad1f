//! Constituency graphs with ellipsis edges.

use std::collections::BTreeSet;
use std::ops::{Index, IndexMut};

use petgraph::graph::{node_index, DiGraph, NodeIndices, NodeWeightsMut};
use petgraph::visit::{Dfs, EdgeFiltered, EdgeRef};
use petgraph::Direction;

use crate::error::GraphError;
use crate::node::Node;

/// Edge kind.
///
/// Every node except the root has exactly one primary parent. Nodes that
/// are elided elsewhere in the sentence are additionally attached to the
/// constituents in which they are elided through ellipsis edges.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EdgeKind {
    Primary,
    Ellipsis,
}

/// Graph edge: the edge kind and the slot of the child in the ordered
/// children of its parent.
pub type Edge = (EdgeKind, usize);

/// A constituency graph.
///
/// The nodes of the graph are constituents and terminals, numbered in
/// pre-order of the primary tree, with the root at index 0. The primary
/// edges form a tree over all nodes. Ellipsis edges attach elided nodes
/// to additional (secondary) parents, so that the graph is a DAG.
///
/// This data structure is a thin wrapper around the `petgraph` `DiGraph`
/// data structure that enforces the single primary parent of every node
/// and keeps the children of a node ordered. The `into_inner`/`get_ref`
/// methods can be used to unwrap or get a reference to the wrapped graph.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    graph: DiGraph<Node, Edge>,
}

#[allow(clippy::len_without_is_empty)]
impl Graph {
    /// Construct a new, empty graph.
    ///
    /// The first node that is pushed is the root.
    pub fn new() -> Self {
        Graph {
            graph: DiGraph::new(),
        }
    }

    /// Get a reference to the `DiGraph` of the graph.
    pub fn get_ref(&self) -> &DiGraph<Node, Edge> {
        &self.graph
    }

    /// Unwrap the `DiGraph` of the graph.
    pub fn into_inner(self) -> DiGraph<Node, Edge> {
        self.graph
    }

    /// Get an iterator over the nodes in the graph.
    pub fn iter(&self) -> Iter {
        Iter {
            inner: self.graph.node_indices(),
            graph: &self.graph,
        }
    }

    /// Get a mutable iterator over the nodes in the graph.
    pub fn iter_mut(&mut self) -> IterMut {
        IterMut(self.graph.node_weights_mut())
    }

    /// Add a node to the graph.
    ///
    /// Nodes should be pushed in pre-order. Returns the index of the node.
    pub fn push(&mut self, node: Node) -> usize {
        self.graph.add_node(node).index()
    }

    /// Get the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// A node can only have one primary parent and can be attached to a
    /// parent only once.
    pub fn add_child(
        &mut self,
        parent: usize,
        child: usize,
        kind: EdgeKind,
    ) -> Result<(), GraphError> {
        let node_count = self.len();

        if parent >= node_count {
            return Err(GraphError::ParentOutOfBounds { parent, node_count });
        }

        if child >= node_count {
            return Err(GraphError::ChildOutOfBounds { child, node_count });
        }

        if parent == child {
            return Err(GraphError::SelfLoop { node: child });
        }

        if kind == EdgeKind::Primary {
            if child == 0 {
                return Err(GraphError::RootWithParent);
            }

            if let Some(existing) = self.primary_parent(child) {
                return Err(GraphError::MultiplePrimaryParents {
                    child,
                    parent: existing,
                });
            }
        }

        if self
            .graph
            .find_edge(node_index(parent), node_index(child))
            .is_some()
        {
            return Err(GraphError::DuplicateEdge { child, parent });
        }

        let slot = self
            .graph
            .edges_directed(node_index(parent), Direction::Outgoing)
            .count();
        self.graph
            .add_edge(node_index(parent), node_index(child), (kind, slot));

        Ok(())
    }

    /// Get the ordered children of `node`, with the kind of the edge.
    pub fn child_edges(&self, node: usize) -> Vec<(usize, EdgeKind)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node_index(node), Direction::Outgoing)
            .map(|e| (e.weight().1, e.target().index(), e.weight().0))
            .collect();
        edges.sort_unstable_by_key(|&(slot, _, _)| slot);
        edges
            .into_iter()
            .map(|(_, child, kind)| (child, kind))
            .collect()
    }

    /// Get the ordered children of `node`, including elided children.
    pub fn children(&self, node: usize) -> Vec<usize> {
        self.child_edges(node)
            .into_iter()
            .map(|(child, _)| child)
            .collect()
    }

    /// Get the ordered children of `node` that are attached by a primary edge.
    pub fn primary_children(&self, node: usize) -> Vec<usize> {
        self.child_edges(node)
            .into_iter()
            .filter(|&(_, kind)| kind == EdgeKind::Primary)
            .map(|(child, _)| child)
            .collect()
    }

    /// Get the position of `child` among the children of `parent`.
    pub fn position(&self, parent: usize, child: usize) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Get the primary parent of `node`, `None` for the root.
    pub fn primary_parent(&self, node: usize) -> Option<usize> {
        self.graph
            .edges_directed(node_index(node), Direction::Incoming)
            .find(|e| e.weight().0 == EdgeKind::Primary)
            .map(|e| e.source().index())
    }

    /// Get the secondary parents of `node`, in increasing order.
    ///
    /// These are the constituents in which the node is elided.
    pub fn secondary_parents(&self, node: usize) -> Vec<usize> {
        let mut parents: Vec<_> = self
            .graph
            .edges_directed(node_index(node), Direction::Incoming)
            .filter(|e| e.weight().0 == EdgeKind::Ellipsis)
            .map(|e| e.source().index())
            .collect();
        parents.sort_unstable();
        parents
    }

    /// Returns `true` if the node is elided in at least one constituent.
    pub fn is_ellipsed(&self, node: usize) -> bool {
        self.graph
            .edges_directed(node_index(node), Direction::Incoming)
            .any(|e| e.weight().0 == EdgeKind::Ellipsis)
    }

    /// Returns `true` if the graph has at least one ellipsis edge.
    pub fn has_ellipsis(&self) -> bool {
        self.graph
            .edge_references()
            .any(|e| e.weight().0 == EdgeKind::Ellipsis)
    }

    /// Get an iterator over the indices of the terminals, in sentence order.
    pub fn terminals(&self) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .node_indices()
            .filter(move |&idx| self.graph[idx].is_terminal())
            .map(|idx| idx.index())
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals().count()
    }

    /// Get the terminals that `node` dominates through primary edges.
    pub fn span(&self, node: usize) -> BTreeSet<usize> {
        let primary = EdgeFiltered::from_fn(&self.graph, |e| e.weight().0 == EdgeKind::Primary);
        self.collect_terminals(&primary, node)
    }

    /// Get the terminals that are reachable from `node`, also through
    /// ellipsis edges.
    pub fn reachable_span(&self, node: usize) -> BTreeSet<usize> {
        self.collect_terminals(&self.graph, node)
    }

    fn collect_terminals<G>(&self, graph: G, node: usize) -> BTreeSet<usize>
    where
        G: petgraph::visit::IntoNeighbors<NodeId = petgraph::graph::NodeIndex>
            + petgraph::visit::Visitable<NodeId = petgraph::graph::NodeIndex>,
    {
        let mut span = BTreeSet::new();
        let mut dfs = Dfs::new(graph, node_index(node));
        while let Some(idx) = dfs.next(graph) {
            if self.graph[idx].is_terminal() {
                span.insert(idx.index());
            }
        }
        span
    }

    /// Get the sentence text: the surface forms of the terminals, separated
    /// by spaces. Elided material is not repeated.
    pub fn text(&self) -> String {
        self.terminals()
            .filter_map(|idx| self[idx].form())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Get the length of the bracketed encoding of the graph.
    ///
    /// Each terminal takes four symbols (brackets, tag, form), each
    /// constituent three (brackets, tag).
    pub fn encoded_length(&self) -> usize {
        self.iter()
            .map(|node| if node.is_terminal() { 4 } else { 3 })
            .sum()
    }

    /// Check the structure of the graph.
    ///
    /// Every node except the root must have exactly one primary parent and
    /// be reachable from the root through primary edges, constituents must
    /// have primary children, and terminals must not have children.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.len() == 0 {
            return Err(GraphError::EmptyGraph);
        }

        if self.primary_parent(0).is_some() {
            return Err(GraphError::RootWithParent);
        }

        for idx in 1..self.len() {
            if self.primary_parent(idx).is_none() {
                return Err(GraphError::MissingPrimaryParent { node: idx });
            }
        }

        for (idx, node) in self.iter().enumerate() {
            let n_children = self
                .graph
                .edges_directed(node_index(idx), Direction::Outgoing)
                .count();
            if node.is_terminal() && n_children != 0 {
                return Err(GraphError::TerminalWithChildren { node: idx });
            }

            if !node.is_terminal() && self.primary_children(idx).is_empty() {
                return Err(GraphError::EmptyConstituent { node: idx });
            }
        }

        // Each non-root node has exactly one primary parent, so the primary
        // edges form a tree iff every node is reachable from the root.
        let primary = EdgeFiltered::from_fn(&self.graph, |e| e.weight().0 == EdgeKind::Primary);
        let mut reached = vec![false; self.len()];
        let mut dfs = Dfs::new(&primary, node_index(0));
        while let Some(idx) = dfs.next(&primary) {
            reached[idx.index()] = true;
        }

        match reached.iter().position(|&r| !r) {
            Some(node) => Err(GraphError::Unreachable { node }),
            None => Ok(()),
        }
    }
}

/// Iterator over the nodes in a graph.
pub struct Iter<'a> {
    inner: NodeIndices,
    graph: &'a DiGraph<Node, Edge>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|idx| &self.graph[idx])
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Node;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Mutable iterator over the nodes in a graph.
pub struct IterMut<'a>(NodeWeightsMut<'a, Node>);

impl<'a> Iterator for IterMut<'a> {
    type Item = &'a mut Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<'a> IntoIterator for &'a mut Graph {
    type Item = &'a mut Node;
    type IntoIter = IterMut<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl From<Graph> for DiGraph<Node, Edge> {
    fn from(graph: Graph) -> Self {
        graph.into_inner()
    }
}

impl Index<usize> for Graph {
    type Output = Node;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.graph[node_index(idx)]
    }
}

impl IndexMut<usize> for Graph {
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        &mut self.graph[node_index(idx)]
    }
}

impl Eq for Graph {}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        // Cheap checks
        if self.graph.node_count() != other.graph.node_count()
            || self.graph.edge_count() != other.graph.edge_count()
        {
            return false;
        }

        for i in 0..self.len() {
            if self[i] != other[i] {
                return false;
            }

            // Children should be the same, in the same order.
            if self.child_edges(i) != other.child_edges(i) {
                return false;
            }
        }

        true
    }
}
