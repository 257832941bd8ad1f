//! Input trees.

use ellgraph::category::Category;
use serde::{Deserialize, Serialize};

/// Node of an input constituency tree.
///
/// Identifiers are those of the treebank, they are used by elision
/// markers to refer to the material that they elide.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawNode {
    /// Word or punctuation, with character offsets into the document text.
    Terminal {
        id: String,
        pos: String,
        start: usize,
        end: usize,
        #[serde(default)]
        punctuation: bool,
        #[serde(default)]
        features: Vec<String>,
    },

    Constituent {
        id: String,
        category: Category,
        #[serde(default)]
        features: Vec<String>,
        children: Vec<RawNode>,
    },

    /// Elision marker, referring to the elided terminals, constituents,
    /// or other elision markers.
    Elision { id: String, refs: Vec<String> },
}

impl RawNode {
    pub fn id(&self) -> &str {
        match self {
            RawNode::Terminal { id, .. }
            | RawNode::Constituent { id, .. }
            | RawNode::Elision { id, .. } => id,
        }
    }

    pub fn children(&self) -> &[RawNode] {
        match self {
            RawNode::Constituent { children, .. } => children,
            RawNode::Terminal { .. } | RawNode::Elision { .. } => &[],
        }
    }

    /// Returns `true` if the node only dominates elision markers.
    ///
    /// A constituent without children is not elided, it is an invalid
    /// tree.
    pub fn is_elided(&self) -> bool {
        match self {
            RawNode::Terminal { .. } => false,
            RawNode::Elision { .. } => true,
            RawNode::Constituent { children, .. } => {
                !children.is_empty() && children.iter().all(RawNode::is_elided)
            }
        }
    }

    /// Get a pre-order iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a tree.
pub struct Descendants<'a> {
    stack: Vec<&'a RawNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a RawNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// A document: the text and the trees of its sentences.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawDocument {
    pub name: String,
    pub text: String,
    pub sentences: Vec<RawNode>,
}
