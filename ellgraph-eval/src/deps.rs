use std::collections::BTreeSet;

use ellgraph_annotate::Dependency;
use itertools::Itertools;

use crate::metrics::Tally;
use crate::{Alignment, EvalError, EvalMode, Metrics};

/// Part-of-speech tags of tokens that are not scored by default.
pub static DEFAULT_PUNCTUATION: &[&str] = &[",", ":", "``", "\"", "-LRB-", "-RRB-"];

/// Scorer for word-to-word dependencies.
///
/// Tokens are compared position by position. Punctuation tokens, as
/// determined by their gold tag, are not scored.
///
/// * `All`: a token is correct when its head and its set of ellipsed heads
///   are correct. It is labeled correctly when its label and its set of
///   ellipsed (head, label) pairs are correct as well.
/// * `EllipsisOnly`: only tokens with ellipsed heads are scored, on their
///   ellipsed heads and labels.
/// * `ExcludeEllipsis`: tokens are scored on their heads and labels,
///   ignoring ellipsed dependencies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DependencyScorer {
    punctuation: BTreeSet<String>,
}

impl Default for DependencyScorer {
    fn default() -> Self {
        DependencyScorer::new(DEFAULT_PUNCTUATION.iter().copied())
    }
}

impl DependencyScorer {
    /// Construct a scorer that skips tokens with the given tags.
    pub fn new<I, S>(punctuation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DependencyScorer {
            punctuation: punctuation.into_iter().map(Into::into).collect(),
        }
    }

    pub fn score(
        &self,
        gold: &[Dependency],
        predicted: &[Dependency],
        mode: EvalMode,
    ) -> Result<Metrics, EvalError> {
        let mut tally = Tally::default();
        self.add_sentence(&mut tally, 0, gold, predicted, mode)?;
        Ok(tally.into_metrics())
    }

    /// Score index-aligned sentences.
    pub fn score_collection<G, P>(
        &self,
        gold: &[G],
        predicted: &[P],
        mode: EvalMode,
    ) -> Result<Metrics, EvalError>
    where
        G: AsRef<[Dependency]>,
        P: AsRef<[Dependency]>,
    {
        if gold.len() != predicted.len() {
            return Err(EvalError::MisalignedComparison {
                unit: Alignment::Sentences,
                gold: gold.len(),
                predicted: predicted.len(),
            });
        }

        let mut tally = Tally::default();
        for (sentence, (gold, predicted)) in gold.iter().zip(predicted).enumerate() {
            self.add_sentence(&mut tally, sentence, gold.as_ref(), predicted.as_ref(), mode)?;
        }

        Ok(tally.into_metrics())
    }

    fn add_sentence(
        &self,
        tally: &mut Tally,
        sentence: usize,
        gold: &[Dependency],
        predicted: &[Dependency],
        mode: EvalMode,
    ) -> Result<(), EvalError> {
        if gold.len() != predicted.len() {
            return Err(EvalError::MisalignedComparison {
                unit: Alignment::Tokens { sentence },
                gold: gold.len(),
                predicted: predicted.len(),
            });
        }

        for (gold, predicted) in gold.iter().zip(predicted) {
            if self.punctuation.contains(&gold.tag) {
                continue;
            }

            let (in_gold, in_predicted, correct, labeled) = match mode {
                EvalMode::All => {
                    let correct = gold.head == predicted.head
                        && ellipsed_heads_match(gold, predicted);
                    let labeled = correct
                        && gold.label == predicted.label
                        && ellipsed_labels_match(gold, predicted);
                    (true, true, correct, labeled)
                }
                EvalMode::EllipsisOnly => {
                    let correct = gold.is_ellipsed() && ellipsed_heads_match(gold, predicted);
                    let labeled = correct && ellipsed_labels_match(gold, predicted);
                    (gold.is_ellipsed(), predicted.is_ellipsed(), correct, labeled)
                }
                EvalMode::ExcludeEllipsis => {
                    let correct = gold.head == predicted.head;
                    (true, true, correct, correct && gold.label == predicted.label)
                }
            };

            if in_gold {
                tally.add_gold(&gold.tag);
            }

            if in_predicted {
                tally.add_predicted(&predicted.tag);
            }

            if correct {
                tally.add_correct(&gold.tag, labeled);
            }
        }

        Ok(())
    }
}

fn ellipsed_heads_match(gold: &Dependency, predicted: &Dependency) -> bool {
    gold.ellipsed_heads
        .iter()
        .sorted()
        .dedup()
        .eq(predicted.ellipsed_heads.iter().sorted().dedup())
}

fn ellipsed_labels_match(gold: &Dependency, predicted: &Dependency) -> bool {
    fn pairs(dep: &Dependency) -> Vec<(&usize, &String)> {
        dep.ellipsed_heads
            .iter()
            .zip(&dep.ellipsed_labels)
            .sorted()
            .dedup()
            .collect()
    }

    pairs(gold) == pairs(predicted)
}
