//! Tree to graph conversion.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::iter;

use ellgraph::category::Tag;
use ellgraph::graph::{EdgeKind, Graph};
use ellgraph::node::{Features, Node, NodeBuilder};

use crate::decompose::min_partition;
use crate::{ConversionError, ConverterConfig, RawNode, ReferenceFault};

/// Child slot of a node under construction.
enum Slot {
    /// Child that is attached through a primary edge.
    Node(usize),

    /// Index of a pending elision.
    Elided(usize),
}

/// Elided constituent that still has to be resolved to graph nodes.
struct Pending<'a> {
    parent: usize,
    raw: &'a RawNode,
}

/// Converter from constituency trees with elision markers to graphs.
///
/// Constituents that do not dominate any terminal are elided. Rather than
/// adding nodes for them, the converter resolves the material that they
/// refer to and attaches the existing node(s) for that material to the
/// parent of the elided constituent through ellipsis edges.
#[derive(Clone, Debug, Default)]
pub struct TreeConverter {
    config: ConverterConfig,
}

impl TreeConverter {
    pub fn new(config: ConverterConfig) -> Self {
        TreeConverter { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert the tree of a sentence to a graph.
    ///
    /// `text` is the text into which the character offsets of the
    /// terminals point.
    pub fn convert(&self, tree: &RawNode, text: &str) -> Result<Graph, ConversionError> {
        if tree.is_elided() {
            return Err(ConversionError::EmptySentence);
        }

        let index = index_tree(tree)?;
        let builder = self.build(tree, text)?;
        let resolved = builder
            .pending
            .iter()
            .map(|pending| self.resolve(&index, &builder, pending))
            .collect::<Result<Vec<_>, _>>()?;

        let BuildState {
            mut graph, slots, ..
        } = builder;

        for (parent, parent_slots) in slots.into_iter().enumerate() {
            for slot in parent_slots {
                match slot {
                    Slot::Node(child) => graph.add_child(parent, child, EdgeKind::Primary)?,
                    Slot::Elided(pending) => {
                        for &child in &resolved[pending] {
                            // Two elisions in a constituent can resolve to the same node.
                            if graph.position(parent, child).is_none() {
                                graph.add_child(parent, child, EdgeKind::Ellipsis)?;
                            }
                        }
                    }
                }
            }
        }

        graph.validate()?;

        Ok(graph)
    }

    /// Add the nodes of the tree in pre-order, recording elided
    /// constituents as pending elisions.
    fn build<'a>(&self, tree: &'a RawNode, text: &str) -> Result<BuildState<'a>, ConversionError> {
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(iter::once(text.len()))
            .collect();

        let mut state = BuildState::default();
        let mut encoded_length = 0;

        // (node, parent, owning clause of the parent)
        let mut stack: Vec<(&RawNode, Option<usize>, usize)> = vec![(tree, None, 0)];
        while let Some((raw, parent, clause)) = stack.pop() {
            let parent = match parent {
                Some(parent) if raw.is_elided() => {
                    state.slots[parent].push(Slot::Elided(state.pending.len()));
                    state.pending.push(Pending { parent, raw });
                    continue;
                }
                parent => parent,
            };

            let idx = match raw {
                RawNode::Terminal {
                    id,
                    pos,
                    start,
                    end,
                    punctuation,
                    features,
                } => {
                    let form = surface(text, &bounds, *start, *end).ok_or_else(|| {
                        ConversionError::InvalidOffset {
                            id: id.clone(),
                            start: *start,
                            end: *end,
                        }
                    })?;
                    let idx = state.push(
                        NodeBuilder::terminal(pos.as_str(), form)
                            .features(features.iter().map(String::as_str).collect())
                            .owning_clause(clause)
                            .into(),
                        parent,
                    );
                    if !*punctuation {
                        state.terminals.insert(id.as_str(), idx);
                    }
                    encoded_length += 4;
                    idx
                }
                RawNode::Constituent {
                    id,
                    category,
                    features,
                    children,
                } => {
                    if children.is_empty() {
                        return Err(ConversionError::EmptyConstituent { id: id.clone() });
                    }

                    // The node index is the index that the node is about to get.
                    let idx = state.graph.len();
                    let clause = if category.is_clause() || parent.is_none() {
                        idx
                    } else {
                        clause
                    };
                    state.push(
                        NodeBuilder::constituent(*category)
                            .features(features.iter().map(String::as_str).collect::<Features>())
                            .owning_clause(clause)
                            .into(),
                        parent,
                    );
                    for child in children.iter().rev() {
                        stack.push((child, Some(idx), clause));
                    }
                    encoded_length += 3;
                    idx
                }
                RawNode::Elision { .. } => unreachable!("elision markers are always elided"),
            };

            if let Some(max) = self.config.max_encoded_length {
                if encoded_length > max {
                    return Err(ConversionError::SentenceTooLong { max });
                }
            }

            state.parents.push(parent);
            debug_assert_eq!(state.parents.len(), idx + 1);
        }

        state.compute_spans();

        Ok(state)
    }

    /// Resolve a pending elision to the node(s) that it elides.
    fn resolve(
        &self,
        index: &HashMap<&str, &RawNode>,
        state: &BuildState,
        pending: &Pending,
    ) -> Result<Vec<usize>, ConversionError> {
        let mut raw_span = BTreeSet::new();
        self.elided_terminals(index, pending.raw, 0, &mut Vec::new(), &mut raw_span)?;

        let span: BTreeSet<usize> = raw_span
            .iter()
            .filter_map(|id| state.terminals.get(id).copied())
            .collect();
        let unresolvable = || ConversionError::UnresolvableEllipsisSpan {
            parent: pending.parent,
            span: span.iter().copied().collect(),
        };

        if span.is_empty() {
            return Err(unresolvable());
        }

        // A node cannot be elided in itself, in one of its descendants, or
        // in a constituent that already contains it.
        let mut excluded = state.ancestors_or_self(pending.parent);
        excluded.extend(state.primary_subtree(pending.parent));
        let candidates: Vec<(usize, &BTreeSet<usize>)> = state
            .spans
            .iter()
            .enumerate()
            .filter(|(idx, _)| !excluded.contains(idx))
            .collect();

        if let Some(node) = exact_match(state, pending.raw, &span, &candidates) {
            return Ok(vec![node]);
        }

        if span.len() >= self.config.max_decomposition_span {
            return Err(unresolvable());
        }

        if let Some(parts) =
            min_partition(&span, &candidates, self.config.max_decomposition_parts)
        {
            return Ok(parts);
        }

        if self.config.terminal_fallback {
            if let Some(terminals) = terminal_fallback(&span, &candidates) {
                return Ok(terminals);
            }
        }

        Err(unresolvable())
    }

    /// Collect the identifiers of the word terminals that an elided node
    /// refers to, following references to other elided material.
    fn elided_terminals<'a>(
        &self,
        index: &HashMap<&'a str, &'a RawNode>,
        elided: &'a RawNode,
        depth: usize,
        chain: &mut Vec<&'a str>,
        span: &mut BTreeSet<&'a str>,
    ) -> Result<(), ConversionError> {
        for node in elided.descendants() {
            let refs = match node {
                RawNode::Elision { refs, .. } => refs,
                _ => continue,
            };

            for reference in refs {
                let malformed = |fault| ConversionError::MalformedTreeReference {
                    reference: reference.clone(),
                    fault,
                };

                let (&key, &target) = index
                    .get_key_value(reference.as_str())
                    .ok_or_else(|| malformed(ReferenceFault::Missing))?;

                if target.is_elided() {
                    if chain.contains(&key) {
                        return Err(malformed(ReferenceFault::Cycle));
                    }

                    if depth + 1 > self.config.max_reference_depth {
                        return Err(malformed(ReferenceFault::TooDeep));
                    }

                    chain.push(key);
                    self.elided_terminals(index, target, depth + 1, chain, span)?;
                    chain.pop();
                } else {
                    span.extend(word_terminals(target));
                }
            }
        }

        Ok(())
    }
}

/// Find the node whose span equals the elided span.
///
/// When several nodes share the span, prefer the first node with the
/// category of the elided constituent, a terminal for bare elision
/// markers, and the first node otherwise.
fn exact_match(
    state: &BuildState,
    elided: &RawNode,
    span: &BTreeSet<usize>,
    candidates: &[(usize, &BTreeSet<usize>)],
) -> Option<usize> {
    let matches: Vec<usize> = candidates
        .iter()
        .filter(|(_, candidate)| *candidate == span)
        .map(|&(idx, _)| idx)
        .collect();

    let preferred = match elided {
        RawNode::Constituent { category, .. } => matches
            .iter()
            .copied()
            .find(|&idx| state.graph[idx].tag() == &Tag::Category(*category)),
        RawNode::Elision { .. } => matches
            .iter()
            .copied()
            .find(|&idx| state.graph[idx].is_terminal()),
        RawNode::Terminal { .. } => None,
    };

    preferred.or_else(|| matches.first().copied())
}

/// Attach the terminals of the span individually.
///
/// Only applies when no candidate with more than one terminal lies within
/// the span, and every terminal of the span is a candidate.
fn terminal_fallback(
    span: &BTreeSet<usize>,
    candidates: &[(usize, &BTreeSet<usize>)],
) -> Option<Vec<usize>> {
    if candidates
        .iter()
        .any(|(_, candidate)| candidate.len() > 1 && candidate.is_subset(span))
    {
        return None;
    }

    span.iter()
        .map(|&terminal| {
            candidates
                .iter()
                .find(|&&(idx, _)| idx == terminal)
                .map(|&(idx, _)| idx)
        })
        .collect()
}

/// Index the nodes of a tree by their identifiers.
fn index_tree(tree: &RawNode) -> Result<HashMap<&str, &RawNode>, ConversionError> {
    let mut index = HashMap::new();
    for node in tree.descendants() {
        if index.insert(node.id(), node).is_some() {
            return Err(ConversionError::DuplicateId {
                id: node.id().to_owned(),
            });
        }
    }
    Ok(index)
}

/// Get the identifiers of the words that a node dominates.
fn word_terminals(node: &RawNode) -> impl Iterator<Item = &str> {
    node.descendants().filter_map(|node| match node {
        RawNode::Terminal {
            id,
            punctuation: false,
            ..
        } => Some(id.as_str()),
        _ => None,
    })
}

/// Get the text between character offsets.
fn surface<'a>(text: &'a str, bounds: &[usize], start: usize, end: usize) -> Option<&'a str> {
    if start > end || end >= bounds.len() {
        return None;
    }

    Some(&text[bounds[start]..bounds[end]])
}

#[derive(Default)]
struct BuildState<'a> {
    graph: Graph,

    /// Child slots per node.
    slots: Vec<Vec<Slot>>,

    /// Primary parent per node.
    parents: Vec<Option<usize>>,

    /// Word terminals that a node dominates through primary edges.
    spans: Vec<BTreeSet<usize>>,

    /// Graph node of each word terminal identifier.
    terminals: HashMap<&'a str, usize>,

    pending: Vec<Pending<'a>>,
}

impl<'a> BuildState<'a> {
    fn push(&mut self, node: Node, parent: Option<usize>) -> usize {
        let idx = self.graph.push(node);
        self.slots.push(Vec::new());
        if let Some(parent) = parent {
            self.slots[parent].push(Slot::Node(idx));
        }
        idx
    }

    fn compute_spans(&mut self) {
        let word_terminals: HashSet<usize> = self.terminals.values().copied().collect();
        self.spans = vec![BTreeSet::new(); self.graph.len()];

        // Children always have a larger index than their parents.
        for idx in (0..self.graph.len()).rev() {
            if word_terminals.contains(&idx) {
                self.spans[idx].insert(idx);
            }

            for slot in &self.slots[idx] {
                if let Slot::Node(child) = *slot {
                    let child_span = self.spans[child].clone();
                    self.spans[idx].extend(child_span);
                }
            }
        }
    }

    /// Nodes that are dominated by `node` through primary edges.
    fn primary_subtree(&self, node: usize) -> Vec<usize> {
        let mut subtree = Vec::new();
        let mut stack = vec![node];
        while let Some(idx) = stack.pop() {
            for slot in &self.slots[idx] {
                if let Slot::Node(child) = *slot {
                    subtree.push(child);
                    stack.push(child);
                }
            }
        }
        subtree
    }

    fn ancestors_or_self(&self, node: usize) -> HashSet<usize> {
        let mut ancestors = HashSet::new();
        let mut current = Some(node);
        while let Some(idx) = current {
            ancestors.insert(idx);
            current = self.parents[idx];
        }
        ancestors
    }
}

#[cfg(test)]
mod tests {
    use ellgraph::category::{Category, Tag};
    use ellgraph::graph::{EdgeKind, Graph};

    use super::{surface, TreeConverter};
    use crate::tests::{constituent, elided_vg, elision, john_ate_pizza, terminal, HE_ATE_PIZZA};
    use crate::{ConversionError, ConverterConfig, FailureKind, RawDocument, ReferenceFault};

    fn convert(doc: &RawDocument) -> Result<Graph, ConversionError> {
        TreeConverter::default().convert(&doc.sentences[0], &doc.text)
    }

    fn convert_with(config: ConverterConfig, doc: &RawDocument) -> Result<Graph, ConversionError> {
        TreeConverter::new(config).convert(&doc.sentences[0], &doc.text)
    }

    #[test]
    fn elided_subject_is_attached_to_second_clause() {
        let g = convert(&HE_ATE_PIZZA).unwrap();

        assert_eq!(g.len(), 15);
        assert_eq!(g.text(), "He ate pizza and drank beer");
        assert_eq!(g[2].tag(), &Tag::Category(Category::NominalGroup));
        assert_eq!(g.children(10), vec![2, 11, 13]);
        assert_eq!(g.child_edges(10)[0], (2, EdgeKind::Ellipsis));
        assert_eq!(g.secondary_parents(2), vec![10]);
        assert_eq!(g.primary_parent(2), Some(1));
        assert_eq!(g.validate(), Ok(()));
    }

    #[test]
    fn owning_clauses() {
        let g = convert(&HE_ATE_PIZZA).unwrap();
        let clauses: Vec<_> = g.iter().map(|node| node.owning_clause()).collect();
        assert_eq!(
            clauses,
            vec![0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 10, 10, 10, 10, 10]
        );
        assert!(g[2].features().contains("Subject"));
    }

    #[test]
    fn exact_match_prefers_category() {
        // Both the VG and its terminal span 'ate'.
        let g = convert(&john_ate_pizza(vec![elided_vg(&["w2"])])).unwrap();
        assert_eq!(g.children(10), vec![11, 4, 13]);
    }

    #[test]
    fn exact_match_prefers_terminal_for_elision_marker() {
        let g = convert(&john_ate_pizza(vec![elision("e1", &["w2"])])).unwrap();
        assert_eq!(g.children(10), vec![11, 5, 13]);
    }

    #[test]
    fn elided_span_is_decomposed() {
        let g = convert(&john_ate_pizza(vec![elided_vg(&["w2", "w3"])])).unwrap();
        assert_eq!(g.children(10), vec![11, 4, 6, 13]);
        assert_eq!(g.secondary_parents(4), vec![10]);
        assert_eq!(g.secondary_parents(6), vec![10]);
    }

    #[test]
    fn terminal_fallback() {
        // 'John pizza and' needs three constituents.
        let doc = john_ate_pizza(vec![elided_vg(&["w1", "w3", "w4"])]);
        let g = convert(&doc).unwrap();
        assert_eq!(g.children(10), vec![11, 3, 7, 9, 13]);

        let config = ConverterConfig {
            terminal_fallback: false,
            ..Default::default()
        };
        assert_eq!(
            convert_with(config, &doc),
            Err(ConversionError::UnresolvableEllipsisSpan {
                parent: 10,
                span: vec![3, 7, 9]
            })
        );
    }

    #[test]
    fn spans_needing_many_constituents_are_rejected() {
        // 'John ate pizza and Mary' would need the first clause, 'and' and
        // 'Mary', and 'Mary' is already part of the second clause.
        assert_eq!(
            convert(&john_ate_pizza(vec![elided_vg(&["w1", "w2", "w3", "w4", "w5"])])),
            Err(ConversionError::UnresolvableEllipsisSpan {
                parent: 10,
                span: vec![3, 5, 7, 9, 12]
            })
        );

        // The first clause lies within the span, so its terminals are not
        // attached one by one.
        let config = ConverterConfig {
            max_decomposition_parts: 2,
            ..Default::default()
        };
        assert_eq!(
            convert_with(config, &john_ate_pizza(vec![elided_vg(&["w1", "w2", "w3", "w4"])])),
            Err(ConversionError::UnresolvableEllipsisSpan {
                parent: 10,
                span: vec![3, 5, 7, 9]
            })
        );
    }

    #[test]
    fn constituents_are_not_elided_within_themselves() {
        // 'Mary' is a grandchild of the second clause.
        assert_eq!(
            convert(&john_ate_pizza(vec![elided_vg(&["w5"])])),
            Err(ConversionError::UnresolvableEllipsisSpan {
                parent: 10,
                span: vec![12]
            })
        );

        let g = convert(&john_ate_pizza(vec![elided_vg(&["w1", "w2", "w3", "w4"])])).unwrap();
        assert_eq!(g.children(10), vec![11, 1, 8, 13]);
        for node in 11..g.len() {
            assert!(g.secondary_parents(node).is_empty());
        }
    }

    #[test]
    fn empty_constituents_are_invalid() {
        let doc = john_ate_pizza(vec![constituent("c8", "VG", &[], vec![])]);
        let err = convert(&doc).unwrap_err();
        assert_eq!(
            err,
            ConversionError::EmptyConstituent {
                id: "c8".to_string()
            }
        );
        assert_eq!(err.kind(), FailureKind::InvalidTree);
    }

    #[test]
    fn large_spans_are_not_decomposed() {
        let config = ConverterConfig {
            max_decomposition_span: 2,
            ..Default::default()
        };
        assert_eq!(
            convert_with(config, &john_ate_pizza(vec![elided_vg(&["w2", "w3"])])),
            Err(ConversionError::UnresolvableEllipsisSpan {
                parent: 10,
                span: vec![5, 7]
            })
        );
    }

    #[test]
    fn punctuation_is_not_part_of_spans() {
        assert_eq!(
            convert(&john_ate_pizza(vec![elided_vg(&["w7"])])),
            Err(ConversionError::UnresolvableEllipsisSpan {
                parent: 10,
                span: vec![]
            })
        );
    }

    #[test]
    fn references_are_followed() {
        let doc = john_ate_pizza(vec![
            elided_vg(&["e2"]),
            constituent("c9", "NG", &["Complement"], vec![elision("e2", &["w3"])]),
        ]);
        let g = convert(&doc).unwrap();

        // Both elisions resolve to the object of the first clause.
        assert_eq!(g.children(10), vec![11, 6, 13]);
    }

    #[test]
    fn malformed_references() {
        assert_eq!(
            convert(&john_ate_pizza(vec![elided_vg(&["w9"])])),
            Err(ConversionError::MalformedTreeReference {
                reference: "w9".to_string(),
                fault: ReferenceFault::Missing,
            })
        );

        let cycle = john_ate_pizza(vec![
            elided_vg(&["e2"]),
            constituent("c9", "NG", &[], vec![elision("e2", &["e1"])]),
        ]);
        assert_eq!(
            convert(&cycle),
            Err(ConversionError::MalformedTreeReference {
                reference: "e2".to_string(),
                fault: ReferenceFault::Cycle,
            })
        );

        let chain = john_ate_pizza(vec![
            elided_vg(&["e2"]),
            constituent("c9", "NG", &[], vec![elision("e2", &["w3"])]),
        ]);
        let config = ConverterConfig {
            max_reference_depth: 0,
            ..Default::default()
        };
        assert_eq!(
            convert_with(config, &chain),
            Err(ConversionError::MalformedTreeReference {
                reference: "e2".to_string(),
                fault: ReferenceFault::TooDeep,
            })
        );
    }

    #[test]
    fn invalid_trees() {
        let mut doc = john_ate_pizza(vec![terminal("w8", "RB", 24, 99)]);
        assert_eq!(
            convert(&doc),
            Err(ConversionError::InvalidOffset {
                id: "w8".to_string(),
                start: 24,
                end: 99
            })
        );

        doc = john_ate_pizza(vec![terminal("w1", "RB", 24, 27)]);
        assert_eq!(
            convert(&doc),
            Err(ConversionError::DuplicateId {
                id: "w1".to_string()
            })
        );

        doc.sentences[0] = constituent("c0", "CL", &[], vec![elision("e1", &["w1"])]);
        assert_eq!(convert(&doc), Err(ConversionError::EmptySentence));
    }

    #[test]
    fn long_sentences_are_rejected() {
        let config = ConverterConfig {
            max_encoded_length: Some(20),
            ..Default::default()
        };
        assert_eq!(
            convert_with(config, &HE_ATE_PIZZA),
            Err(ConversionError::SentenceTooLong { max: 20 })
        );

        let config = ConverterConfig {
            max_encoded_length: Some(51),
            ..Default::default()
        };
        assert!(convert_with(config, &HE_ATE_PIZZA).is_ok());
    }

    #[test]
    fn surface_uses_character_offsets() {
        let text = "Él comió";
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(text.len()))
            .collect();
        assert_eq!(surface(text, &bounds, 0, 2), Some("Él"));
        assert_eq!(surface(text, &bounds, 3, 8), Some("comió"));
        assert_eq!(surface(text, &bounds, 3, 9), None);
        assert_eq!(surface(text, &bounds, 4, 3), None);
    }
}
