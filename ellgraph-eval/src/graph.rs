use std::collections::BTreeSet;

use ellgraph::graph::Graph;

use crate::metrics::Tally;
use crate::{Alignment, EvalError, EvalMode, Metrics};

/// Structural scorer for ellipsis graphs.
///
/// The edge of a node is correct when its primary and secondary parents
/// are the same in the gold and predicted graphs, and the node occupies
/// the same slot among the children of each predicted secondary parent.
/// A node with a correct edge is also labeled correctly when its tag is
/// the same.
///
/// In `EllipsisOnly`, recall is computed over the ellipsed gold nodes and
/// precision over the ellipsed predicted nodes. `ExcludeEllipsis` only
/// leaves out nodes that are ellipsed in both graphs, so a missing or
/// spurious ellipsis edge still counts against the node.
///
/// Graphs are compared node by node, so the node sequences of the gold
/// and predicted graphs must be aligned.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GraphScorer;

impl GraphScorer {
    pub fn new() -> Self {
        GraphScorer
    }

    /// Score a predicted graph against a gold graph.
    pub fn score(&self, gold: &Graph, predicted: &Graph, mode: EvalMode) -> Result<Metrics, EvalError> {
        let mut tally = Tally::default();
        self.add_sentence(&mut tally, 0, gold, predicted, mode)?;
        Ok(tally.into_metrics())
    }

    /// Score index-aligned sentences of gold and predicted graphs.
    pub fn score_collection(
        &self,
        gold: &[Graph],
        predicted: &[Graph],
        mode: EvalMode,
    ) -> Result<Metrics, EvalError> {
        if gold.len() != predicted.len() {
            return Err(EvalError::MisalignedComparison {
                unit: Alignment::Sentences,
                gold: gold.len(),
                predicted: predicted.len(),
            });
        }

        let mut tally = Tally::default();
        for (sentence, (gold, predicted)) in gold.iter().zip(predicted).enumerate() {
            self.add_sentence(&mut tally, sentence, gold, predicted, mode)?;
        }

        Ok(tally.into_metrics())
    }

    fn add_sentence(
        &self,
        tally: &mut Tally,
        sentence: usize,
        gold: &Graph,
        predicted: &Graph,
        mode: EvalMode,
    ) -> Result<(), EvalError> {
        if gold.len() != predicted.len() {
            return Err(EvalError::MisalignedComparison {
                unit: Alignment::Nodes { sentence },
                gold: gold.len(),
                predicted: predicted.len(),
            });
        }

        for node in 0..gold.len() {
            let gold_tag = gold[node].tag().as_str();
            let predicted_tag = predicted[node].tag().as_str();

            let (in_gold, in_predicted) = match mode {
                // A node that lost or gained an ellipsis edge is scored.
                EvalMode::ExcludeEllipsis => {
                    let scored = !(gold.is_ellipsed(node) && predicted.is_ellipsed(node));
                    (scored, scored)
                }
                _ => (
                    mode.includes(gold.is_ellipsed(node)),
                    mode.includes(predicted.is_ellipsed(node)),
                ),
            };

            if in_gold {
                tally.add_gold(gold_tag);
            }

            if in_predicted {
                tally.add_predicted(predicted_tag);
            }

            if in_gold && in_predicted && edge_is_correct(gold, predicted, node) {
                tally.add_correct(gold_tag, gold_tag == predicted_tag);
            }
        }

        Ok(())
    }
}

fn parents(graph: &Graph, node: usize) -> BTreeSet<usize> {
    graph
        .primary_parent(node)
        .into_iter()
        .chain(graph.secondary_parents(node))
        .collect()
}

/// Check the parents of a node and its slots among the children of the
/// constituents in which it is elided.
pub(crate) fn edge_is_correct(gold: &Graph, predicted: &Graph, node: usize) -> bool {
    if parents(gold, node) != parents(predicted, node) {
        return false;
    }

    predicted
        .secondary_parents(node)
        .into_iter()
        .all(|parent| predicted.position(parent, node) == gold.position(parent, node))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ellgraph::category::Category;

    use super::{edge_is_correct, GraphScorer};
    use crate::tests::{anchovies, ANCHOVIES, ANCHOVIES_WITHOUT_ELLIPSIS, SUBJECT};
    use crate::{Alignment, EvalError, EvalMode};

    #[test]
    fn identical_graphs_score_perfectly() {
        for graph in &[&*ANCHOVIES, &*ANCHOVIES_WITHOUT_ELLIPSIS] {
            for &mode in &EvalMode::all() {
                let metrics = GraphScorer.score(graph, graph, mode).unwrap();
                for prf in &[metrics.unlabeled, metrics.labeled] {
                    assert_abs_diff_eq!(prf.precision, 1.0);
                    assert_abs_diff_eq!(prf.recall, 1.0);
                    assert_abs_diff_eq!(prf.f1.unwrap(), 1.0);
                }
            }
        }
    }

    #[test]
    fn missing_ellipsis_edge() {
        let scorer = GraphScorer::new();

        let all = scorer
            .score(&ANCHOVIES, &ANCHOVIES_WITHOUT_ELLIPSIS, EvalMode::All)
            .unwrap();
        assert_eq!(all.counts.gold, 19);
        assert_eq!(all.counts.correct_unlabeled, 18);
        assert_abs_diff_eq!(all.unlabeled.recall, 18.0 / 19.0);
        assert_abs_diff_eq!(all.per_tag["NG"].unlabeled.recall, 0.75);

        let excluded = scorer
            .score(&ANCHOVIES, &ANCHOVIES_WITHOUT_ELLIPSIS, EvalMode::ExcludeEllipsis)
            .unwrap();
        assert_eq!(excluded.counts.gold, 19);
        assert_eq!(excluded.counts.predicted, 19);
        assert_eq!(excluded.counts.correct_unlabeled, 18);
        assert_abs_diff_eq!(excluded.unlabeled.recall, 18.0 / 19.0);
        let ng = &excluded.per_tag["NG"];
        assert_abs_diff_eq!(ng.unlabeled.precision, 0.75);
        assert_abs_diff_eq!(ng.unlabeled.recall, 0.75);

        // Nodes that are ellipsed on both sides are left out.
        let excluded = scorer
            .score(&ANCHOVIES, &ANCHOVIES, EvalMode::ExcludeEllipsis)
            .unwrap();
        assert_eq!(excluded.counts.gold, 18);
        assert_eq!(excluded.counts.predicted, 18);

        let ellipsis = scorer
            .score(&ANCHOVIES, &ANCHOVIES_WITHOUT_ELLIPSIS, EvalMode::EllipsisOnly)
            .unwrap();
        assert_eq!(ellipsis.counts.gold, 1);
        assert_eq!(ellipsis.counts.predicted, 0);
        assert_abs_diff_eq!(ellipsis.unlabeled.precision, 0.0);
        assert_abs_diff_eq!(ellipsis.unlabeled.recall, 0.0);
        assert_eq!(ellipsis.unlabeled.f1, None);
    }

    #[test]
    fn ellipsis_slot_must_match() {
        let misplaced = anchovies(Some(1), Category::NominalGroup);
        assert!(!edge_is_correct(&ANCHOVIES, &misplaced, SUBJECT));
        assert!(edge_is_correct(&ANCHOVIES, &misplaced, 15));

        let metrics = GraphScorer
            .score(&ANCHOVIES, &misplaced, EvalMode::EllipsisOnly)
            .unwrap();
        assert_eq!(metrics.counts.predicted, 1);
        assert_eq!(metrics.counts.correct_unlabeled, 0);
    }

    #[test]
    fn labels_are_scored_on_correct_edges() {
        let relabeled = anchovies(Some(0), Category::NominalGroupComplex);
        let metrics = GraphScorer
            .score(&ANCHOVIES, &relabeled, EvalMode::All)
            .unwrap();

        assert_eq!(metrics.counts.correct_unlabeled, 19);
        assert_eq!(metrics.counts.correct_labeled, 18);
        assert_eq!(metrics.per_tag["NG"].counts.predicted, 3);
        assert_eq!(metrics.per_tag["NGX"].counts.predicted, 1);
        assert_eq!(metrics.per_tag["NGX"].counts.gold, 0);
        assert_abs_diff_eq!(metrics.per_tag["NG"].labeled.recall, 0.75);
    }

    #[test]
    fn collections_are_aligned() {
        let gold = vec![ANCHOVIES.clone(), ANCHOVIES.clone()];
        let predicted = vec![ANCHOVIES.clone(), ANCHOVIES_WITHOUT_ELLIPSIS.clone()];

        let metrics = GraphScorer
            .score_collection(&gold, &predicted, EvalMode::All)
            .unwrap();
        assert_eq!(metrics.counts.gold, 38);
        assert_eq!(metrics.counts.correct_unlabeled, 37);

        assert_eq!(
            GraphScorer.score_collection(&gold, &predicted[..1], EvalMode::All),
            Err(EvalError::MisalignedComparison {
                unit: Alignment::Sentences,
                gold: 2,
                predicted: 1
            })
        );

        let mut truncated = ellgraph::graph::Graph::new();
        truncated.push(ellgraph::node::Node::constituent(Category::Clause));
        assert_eq!(
            GraphScorer.score_collection(&gold, &[ANCHOVIES.clone(), truncated], EvalMode::All),
            Err(EvalError::MisalignedComparison {
                unit: Alignment::Nodes { sentence: 1 },
                gold: 19,
                predicted: 1
            })
        );
    }
}
