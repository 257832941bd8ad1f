//! Bracketed trees.
//!
//! Graphs are written as PTB-style bracketed trees, such as
//! `(CL (NG (PRP He)) (VG (VBD ate)))`. Ellipsis edges can be left out or
//! encoded in place as childless `(ellipsis<TAG><n>)` brackets, where `n`
//! is the occurrence index of the elided node among the nodes with the
//! same tag.

use std::fmt;

use ellgraph::category::Category;
use ellgraph::graph::{EdgeKind, Graph};
use ellgraph::node::Node;

use crate::json::assign_owning_clauses;
use crate::ReadError;

/// Prefix of in-place ellipsis markers.
pub const ELLIPSIS_PREFIX: &str = "ellipsis";

/// Encoding of ellipsis edges in bracketed trees.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EllipsisStrategy {
    /// Leave out elided children, giving the surface tree.
    Omit,

    /// Render elided children as markers at their slots.
    InPlace,
}

impl Default for EllipsisStrategy {
    fn default() -> Self {
        EllipsisStrategy::Omit
    }
}

/// Display wrapper that formats a graph as a bracketed tree.
pub struct BracketedTree<'a> {
    graph: &'a Graph,
    strategy: EllipsisStrategy,
}

impl<'a> BracketedTree<'a> {
    pub fn new(graph: &'a Graph, strategy: EllipsisStrategy) -> Self {
        BracketedTree { graph, strategy }
    }

    /// Get the occurrence index of a node among the nodes with its tag.
    fn occurrence(&self, node: usize) -> usize {
        let tag = self.graph[node].tag();
        self.graph
            .iter()
            .take(node)
            .filter(|other| other.tag() == tag)
            .count()
    }

    fn fmt_node(&self, f: &mut fmt::Formatter, node: usize) -> fmt::Result {
        let tag = self.graph[node].tag();

        if let Some(form) = self.graph[node].form() {
            return write!(f, "({} {})", tag, form);
        }

        write!(f, "({}", tag)?;
        for (child, kind) in self.graph.child_edges(node) {
            match (kind, self.strategy) {
                (EdgeKind::Primary, _) => {
                    f.write_str(" ")?;
                    self.fmt_node(f, child)?;
                }
                (EdgeKind::Ellipsis, EllipsisStrategy::InPlace) => write!(
                    f,
                    " ({}{}{})",
                    ELLIPSIS_PREFIX,
                    self.graph[child].tag(),
                    self.occurrence(child)
                )?,
                (EdgeKind::Ellipsis, EllipsisStrategy::Omit) => (),
            }
        }
        f.write_str(")")
    }
}

impl<'a> fmt::Display for BracketedTree<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.graph.len() == 0 {
            return Ok(());
        }

        self.fmt_node(f, 0)
    }
}

/// Parsed bracket.
enum Bracket {
    Constituent { tag: String, children: Vec<Bracket> },
    Terminal { tag: String, form: String },
    Marker { marker: String },
}

/// Child of a constituent, before markers are resolved.
enum Slot {
    Node(usize),
    Marker(String),
}

/// Parse a bracketed tree with in-place ellipsis markers.
///
/// Markers are resolved against the nodes of the tree, so that elided
/// material must also occur overtly in the tree. Features are not part of
/// the bracketed format, the nodes of the graph do not have features.
pub fn parse_bracketed(tree: &str) -> Result<Graph, ReadError> {
    let root = parse_brackets(tree)?;

    let mut graph = Graph::new();
    let mut children: Vec<Vec<Slot>> = Vec::new();

    // Pre-order traversal, children are visited in order. Markers are
    // visited too, so that they keep their slots among the children.
    let mut stack: Vec<(&Bracket, Option<usize>)> = vec![(&root, None)];
    while let Some((bracket, parent)) = stack.pop() {
        let node = match bracket {
            Bracket::Marker { marker } => {
                if let Some(parent) = parent {
                    children[parent].push(Slot::Marker(marker.clone()));
                }
                continue;
            }
            Bracket::Terminal { tag, form } => Node::terminal(tag.as_str(), form.as_str()),
            Bracket::Constituent { tag, .. } => Node::constituent(tag.parse::<Category>()?),
        };

        let idx = graph.push(node);
        children.push(Vec::new());
        if let Some(parent) = parent {
            children[parent].push(Slot::Node(idx));
        }

        if let Bracket::Constituent {
            children: brackets, ..
        } = bracket
        {
            stack.extend(brackets.iter().rev().map(|child| (child, Some(idx))));
        }
    }

    for (parent, slots) in children.into_iter().enumerate() {
        for slot in slots {
            match slot {
                Slot::Node(child) => graph.add_child(parent, child, EdgeKind::Primary)?,
                Slot::Marker(marker) => {
                    let target = resolve_marker(&graph, &marker)?;
                    graph.add_child(parent, target, EdgeKind::Ellipsis)?;
                }
            }
        }
    }

    graph.validate()?;
    assign_owning_clauses(&mut graph);

    Ok(graph)
}

/// Find the node that an ellipsis marker refers to.
fn resolve_marker(graph: &Graph, marker: &str) -> Result<usize, ReadError> {
    let unknown = || ReadError::UnknownEllipsisTarget {
        marker: marker.to_owned(),
    };

    let target = marker.strip_prefix(ELLIPSIS_PREFIX).ok_or_else(unknown)?;
    let split = target
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|idx| idx + 1)
        .ok_or_else(unknown)?;
    let (tag, occurrence) = target.split_at(split);
    let occurrence: usize = occurrence.parse().map_err(|_| unknown())?;

    graph
        .iter()
        .enumerate()
        .filter(|(_, node)| node.tag() == tag)
        .nth(occurrence)
        .map(|(idx, _)| idx)
        .ok_or_else(unknown)
}

fn parse_brackets(tree: &str) -> Result<Bracket, ReadError> {
    let malformed = || ReadError::MalformedTree {
        value: tree.to_owned(),
    };

    let spaced = tree.replace('(', " ( ").replace(')', " ) ");
    let mut tokens = spaced.split_whitespace();

    // Open brackets: tag and the children parsed so far.
    let mut open: Vec<(String, Vec<Bracket>, Vec<String>)> = Vec::new();
    let mut root = None;

    while let Some(token) = tokens.next() {
        match token {
            "(" => {
                if root.is_some() {
                    return Err(malformed());
                }
                let tag = tokens.next().filter(|&t| t != "(" && t != ")");
                let tag = tag.ok_or_else(malformed)?;
                open.push((tag.to_owned(), Vec::new(), Vec::new()));
            }
            ")" => {
                let (tag, children, atoms) = open.pop().ok_or_else(malformed)?;
                let bracket = match (children.is_empty(), atoms.len()) {
                    (true, 0) if tag.starts_with(ELLIPSIS_PREFIX) => Bracket::Marker { marker: tag },
                    (true, 1) => Bracket::Terminal {
                        tag,
                        form: atoms.into_iter().next().ok_or_else(malformed)?,
                    },
                    (false, 0) => Bracket::Constituent { tag, children },
                    _ => return Err(malformed()),
                };

                match open.last_mut() {
                    Some((_, siblings, _)) => siblings.push(bracket),
                    None => root = Some(bracket),
                }
            }
            atom => match open.last_mut() {
                Some((_, _, atoms)) => atoms.push(atom.to_owned()),
                None => return Err(malformed()),
            },
        }
    }

    match (root, open.is_empty()) {
        (Some(root @ Bracket::Constituent { .. }), true)
        | (Some(root @ Bracket::Terminal { .. }), true) => Ok(root),
        _ => Err(malformed()),
    }
}
