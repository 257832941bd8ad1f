//! Head percolation and dependency extraction.

use std::collections::BTreeMap;

use ellgraph::category::Tag;
use ellgraph::graph::Graph;
use ellgraph::node::HeadAnnotation;
use serde::{Deserialize, Serialize};

use crate::{Annotate, AnnotateError};

/// Default precedence of head children, highest precedence first.
static DEFAULT_RANKS: &[(&str, usize)] = &[
    ("VGX", 0),
    ("VG", 1),
    ("CLX", 2),
    ("CL", 3),
    ("NGX", 4),
    ("NG", 5),
    ("PPX", 6),
    ("PP", 7),
    ("ADVX", 8),
    ("ADVG", 9),
    ("INTJX", 10),
    ("INTJ", 11),
    ("PRT", 12),
    ("CONJG", 13),
    ("VB", 14),
    ("VBD", 14),
    ("VBG", 14),
    ("VBN", 14),
    ("VBP", 14),
    ("VBZ", 14),
    ("MD", 15),
    ("NN", 16),
    ("NNS", 16),
    ("NNP", 16),
    ("NNPS", 16),
    ("PRP", 16),
    ("CD", 17),
    ("JJ", 18),
    ("RB", 19),
];

/// Head rules.
///
/// The head child of a constituent is the primary child whose tag has the
/// lowest rank. Tags that are not in the table get `default_rank`, ties
/// are broken by child order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct HeadRules {
    /// Rank per short category tag or part-of-speech tag.
    pub ranks: BTreeMap<String, usize>,

    /// Rank of tags that are not in the table.
    pub default_rank: usize,

    /// Dependency label of the head of the sentence.
    pub root_label: String,
}

impl HeadRules {
    /// Get the rank of a tag.
    pub fn rank(&self, tag: &Tag) -> usize {
        self.ranks
            .get(tag.as_str())
            .copied()
            .unwrap_or(self.default_rank)
    }
}

impl Default for HeadRules {
    fn default() -> Self {
        HeadRules {
            ranks: DEFAULT_RANKS
                .iter()
                .map(|&(tag, rank)| (tag.to_owned(), rank))
                .collect(),
            default_rank: 100,
            root_label: "ROOT".to_owned(),
        }
    }
}

/// Dependency of a terminal.
///
/// Heads are terminal positions, the root head is attached to itself.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Dependency {
    /// Position of the terminal.
    pub position: usize,

    /// Surface form of the terminal.
    pub form: String,

    pub head: usize,

    pub label: String,

    /// Heads of the constituents in which this terminal heads elided
    /// material.
    pub ellipsed_heads: Vec<usize>,

    pub ellipsed_labels: Vec<String>,

    /// Part-of-speech tag of the terminal.
    pub tag: String,
}

impl Dependency {
    /// Returns `true` if the terminal heads elided material.
    pub fn is_ellipsed(&self) -> bool {
        !self.ellipsed_heads.is_empty()
    }
}

/// Head percolator.
///
/// Assigns the lexical head to every node by following head children
/// through primary edges, then derives word-to-word dependencies from the
/// heads. A terminal that heads a node which is elided in other
/// constituents also receives an ellipsed dependency on each of those
/// constituents.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HeadPercolator {
    rules: HeadRules,
}

impl HeadPercolator {
    pub fn new(rules: HeadRules) -> Self {
        HeadPercolator { rules }
    }

    pub fn rules(&self) -> &HeadRules {
        &self.rules
    }

    /// Get the dependencies of the terminals of a graph, in sentence
    /// order.
    pub fn dependencies(&self, graph: &Graph) -> Result<Vec<Dependency>, AnnotateError> {
        let annotations = self.head_annotations(graph)?;

        graph
            .terminals()
            .enumerate()
            .map(|(position, idx)| {
                let node = &graph[idx];
                let heads = &annotations[idx];
                let (head, label) = match (heads.dep_head, &heads.dep_label) {
                    (Some(head), Some(label)) => (head, label.clone()),
                    _ => {
                        return Err(AnnotateError::HeadInvariantViolation {
                            node: idx,
                            reason: "terminal without dependency head",
                        })
                    }
                };

                Ok(Dependency {
                    position,
                    form: node.form().unwrap_or_default().to_owned(),
                    head,
                    label,
                    ellipsed_heads: heads.ellipsed_dep_heads.clone(),
                    ellipsed_labels: heads.ellipsed_dep_labels.clone(),
                    tag: node.tag().to_string(),
                })
            })
            .collect()
    }

    /// Compute the head annotations of all nodes.
    fn head_annotations(&self, graph: &Graph) -> Result<Vec<HeadAnnotation>, AnnotateError> {
        // Terminal position by node and node by terminal position.
        let mut positions = vec![None; graph.len()];
        let mut terminals = Vec::new();
        for (position, idx) in graph.terminals().enumerate() {
            positions[idx] = Some(position);
            terminals.push(idx);
        }

        let heads = (0..graph.len())
            .map(|idx| self.head_terminal(graph, &positions, idx))
            .collect::<Result<Vec<_>, _>>()?;

        let mut annotations: Vec<_> = heads.iter().map(|&head| HeadAnnotation::new(head)).collect();

        for &idx in &terminals {
            let (dep_head, dep_label) = self.dependency_head(graph, &heads, idx)?;
            annotations[idx].dep_head = Some(dep_head);
            annotations[idx].dep_label = Some(dep_label);
        }

        for idx in 0..graph.len() {
            let head_node = terminals[heads[idx]];
            for parent in graph.secondary_parents(idx) {
                let annotation = &mut annotations[head_node];
                annotation.ellipsed_dep_heads.push(heads[parent]);
                annotation
                    .ellipsed_dep_labels
                    .push(graph[parent].tag().to_string());
            }
        }

        Ok(annotations)
    }

    /// Find the head terminal of a node.
    fn head_terminal(
        &self,
        graph: &Graph,
        positions: &[Option<usize>],
        node: usize,
    ) -> Result<usize, AnnotateError> {
        let mut current = node;

        // A path through the primary tree visits every node at most once.
        for _ in 0..graph.len() {
            if let Some(position) = positions[current] {
                return Ok(position);
            }

            current = self.head_child(graph, current).ok_or(
                AnnotateError::HeadInvariantViolation {
                    node: current,
                    reason: "constituent without primary children",
                },
            )?;
        }

        Err(AnnotateError::HeadInvariantViolation {
            node,
            reason: "cycle in primary edges",
        })
    }

    fn head_child(&self, graph: &Graph, node: usize) -> Option<usize> {
        graph
            .primary_children(node)
            .into_iter()
            .min_by_key(|&child| self.rules.rank(graph[child].tag()))
    }

    /// Find the dependency head and label of a terminal.
    ///
    /// The governor is the lowest primary ancestor with a different head.
    fn dependency_head(
        &self,
        graph: &Graph,
        heads: &[usize],
        terminal: usize,
    ) -> Result<(usize, String), AnnotateError> {
        let position = heads[terminal];

        if heads[0] == position {
            return Ok((position, self.rules.root_label.clone()));
        }

        let mut ancestor = graph.primary_parent(terminal);
        while let Some(idx) = ancestor {
            if heads[idx] != position {
                return Ok((heads[idx], graph[idx].tag().to_string()));
            }
            ancestor = graph.primary_parent(idx);
        }

        Err(AnnotateError::HeadInvariantViolation {
            node: terminal,
            reason: "no governor before the root",
        })
    }
}

impl Annotate for HeadPercolator {
    fn annotate(&self, graph: &mut Graph) -> Result<(), AnnotateError> {
        let annotations = self.head_annotations(graph)?;
        for (node, heads) in graph.iter_mut().zip(annotations) {
            node.set_heads(Some(heads));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ellgraph::category::Category;
    use ellgraph::graph::{EdgeKind, Graph};
    use ellgraph::node::Node;
    use maplit::btreemap;

    use super::{Dependency, HeadPercolator, HeadRules};
    use crate::tests::HE_ATE_PIZZA;
    use crate::{Annotate, AnnotateError};

    fn dep(position: usize, form: &str, head: usize, label: &str, tag: &str) -> Dependency {
        Dependency {
            position,
            form: form.to_string(),
            head,
            label: label.to_string(),
            ellipsed_heads: Vec::new(),
            ellipsed_labels: Vec::new(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn percolates_heads() {
        let mut g = HE_ATE_PIZZA.clone();
        HeadPercolator::default().annotate(&mut g).unwrap();

        let heads: Vec<_> = g.iter().map(|node| node.heads().unwrap().head).collect();
        assert_eq!(heads, vec![1, 1, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 4, 5, 5]);

        let he = g[3].heads().unwrap();
        assert_eq!(he.dep_head, Some(1));
        assert_eq!(he.dep_label.as_deref(), Some("CL"));
        assert_eq!(he.ellipsed_dep_heads, vec![4]);
        assert_eq!(he.ellipsed_dep_labels, vec!["CL".to_string()]);

        // Constituents do not have dependency heads.
        assert_eq!(g[2].heads().unwrap().dep_head, None);
    }

    #[test]
    fn dependencies() {
        let deps = HeadPercolator::default()
            .dependencies(&HE_ATE_PIZZA)
            .unwrap();

        let mut he = dep(0, "He", 1, "CL", "PRP");
        he.ellipsed_heads = vec![4];
        he.ellipsed_labels = vec!["CL".to_string()];

        assert_eq!(
            deps,
            vec![
                he,
                dep(1, "ate", 1, "ROOT", "VBD"),
                dep(2, "pizza", 1, "CL", "NN"),
                dep(3, "and", 1, "CLX", "CC"),
                dep(4, "drank", 1, "CLX", "VBD"),
                dep(5, "beer", 4, "CL", "NN"),
            ]
        );
        assert!(deps[0].is_ellipsed());
        assert!(!deps[4].is_ellipsed());
    }

    #[test]
    fn annotation_is_deterministic() {
        let percolator = HeadPercolator::default();

        let mut g1 = HE_ATE_PIZZA.clone();
        percolator.annotate(&mut g1).unwrap();
        let mut g2 = g1.clone();
        percolator.annotate(&mut g2).unwrap();

        assert_eq!(g1, g2);
        assert_eq!(
            percolator.dependencies(&g1).unwrap(),
            percolator.dependencies(&HE_ATE_PIZZA).unwrap()
        );
    }

    #[test]
    fn unknown_tags_have_lowest_precedence() {
        let rules = HeadRules {
            ranks: btreemap! { "NN".to_string() => 0 },
            default_rank: 10,
            root_label: "TOP".to_string(),
        };

        let mut g = Graph::new();
        g.push(Node::constituent(Category::NominalGroup));
        g.push(Node::terminal("DT", "the"));
        g.push(Node::terminal("JJ", "red"));
        g.push(Node::terminal("NN", "car"));
        for child in 1..4 {
            g.add_child(0, child, EdgeKind::Primary).unwrap();
        }

        let deps = HeadPercolator::new(rules).dependencies(&g).unwrap();
        assert_eq!(
            deps.iter().map(|dep| (dep.head, dep.label.as_str())).collect::<Vec<_>>(),
            vec![(2, "NG"), (2, "NG"), (2, "TOP")]
        );

        // Without any ranks the first child is the head.
        let rules = HeadRules {
            ranks: btreemap! {},
            ..HeadRules::default()
        };
        let deps = HeadPercolator::new(rules).dependencies(&g).unwrap();
        assert_eq!(deps[0].label, "ROOT");
        assert_eq!(deps[2].head, 0);
    }

    #[test]
    fn elided_children_are_not_heads() {
        // The second clause elides the verb of the first, its head is the
        // object.
        let mut g = Graph::new();
        g.push(Node::constituent(Category::ClauseComplex));
        g.push(Node::constituent(Category::Clause));
        g.push(Node::constituent(Category::VerbalGroup));
        g.push(Node::terminal("VBD", "ate"));
        g.push(Node::constituent(Category::NominalGroup));
        g.push(Node::terminal("NN", "pizza"));
        g.push(Node::constituent(Category::Clause));
        g.push(Node::constituent(Category::NominalGroup));
        g.push(Node::terminal("NN", "beer"));
        for &(parent, child, kind) in &[
            (0, 1, EdgeKind::Primary),
            (1, 2, EdgeKind::Primary),
            (2, 3, EdgeKind::Primary),
            (1, 4, EdgeKind::Primary),
            (4, 5, EdgeKind::Primary),
            (0, 6, EdgeKind::Primary),
            (6, 2, EdgeKind::Ellipsis),
            (6, 7, EdgeKind::Primary),
            (7, 8, EdgeKind::Primary),
        ] {
            g.add_child(parent, child, kind).unwrap();
        }

        let deps = HeadPercolator::default().dependencies(&g).unwrap();
        assert_eq!(deps[2].head, 0);
        assert_eq!(deps[2].label, "CLX");
        assert_eq!(deps[0].ellipsed_heads, vec![2]);
        assert_eq!(deps[0].ellipsed_labels, vec!["CL".to_string()]);
    }

    #[test]
    fn empty_constituent_is_a_violation() {
        let mut g = Graph::new();
        g.push(Node::constituent(Category::Clause));
        g.push(Node::terminal("PRP", "He"));
        g.push(Node::constituent(Category::VerbalGroup));
        g.add_child(0, 1, EdgeKind::Primary).unwrap();
        g.add_child(0, 2, EdgeKind::Primary).unwrap();

        assert_eq!(
            HeadPercolator::default().annotate(&mut g),
            Err(AnnotateError::HeadInvariantViolation {
                node: 2,
                reason: "constituent without primary children"
            })
        );
    }
}
