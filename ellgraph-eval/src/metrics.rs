use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EvalError;

/// Population of an evaluation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalMode {
    /// All nodes.
    All,

    /// Nodes that are elided in at least one constituent.
    EllipsisOnly,

    /// Nodes that are not elided anywhere.
    ExcludeEllipsis,
}

impl EvalMode {
    pub fn all() -> [EvalMode; 3] {
        [
            EvalMode::All,
            EvalMode::EllipsisOnly,
            EvalMode::ExcludeEllipsis,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvalMode::All => "all",
            EvalMode::EllipsisOnly => "ellipsis_only",
            EvalMode::ExcludeEllipsis => "exclude_ellipsis",
        }
    }

    /// Returns `true` if a node with the given ellipsis status is in the
    /// population of this mode.
    pub(crate) fn includes(self, ellipsed: bool) -> bool {
        match self {
            EvalMode::All => true,
            EvalMode::EllipsisOnly => ellipsed,
            EvalMode::ExcludeEllipsis => !ellipsed,
        }
    }
}

impl Default for EvalMode {
    fn default() -> Self {
        EvalMode::All
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvalMode {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EvalMode::all()
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s.replace('-', "_"))
            .ok_or_else(|| EvalError::UnknownMode {
                value: s.to_owned(),
            })
    }
}

/// Precision, recall and F1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Prf {
    pub precision: f64,
    pub recall: f64,

    /// F1 score, `None` when it is undefined.
    pub f1: Option<f64>,
}

impl Prf {
    /// Compute scores from counts.
    ///
    /// Empty gold and predicted populations agree trivially and score 1.
    /// Otherwise precision or recall is zero when its denominator is zero,
    /// F1 is undefined when a denominator or the sum of precision and
    /// recall is zero.
    pub fn new(correct: usize, predicted: usize, gold: usize) -> Self {
        if predicted == 0 && gold == 0 {
            return Prf {
                precision: 1.0,
                recall: 1.0,
                f1: Some(1.0),
            };
        }

        let ratio = |denominator: usize| {
            if denominator == 0 {
                0.0
            } else {
                correct as f64 / denominator as f64
            }
        };

        let precision = ratio(predicted);
        let recall = ratio(gold);
        let f1 = if predicted == 0 || gold == 0 || precision + recall == 0.0 {
            None
        } else {
            Some(2.0 * precision * recall / (precision + recall))
        };

        Prf {
            precision,
            recall,
            f1,
        }
    }
}

/// Node counts of an evaluation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Counts {
    /// Size of the gold population.
    pub gold: usize,

    /// Size of the predicted population.
    pub predicted: usize,

    /// Nodes with correct edges.
    pub correct_unlabeled: usize,

    /// Nodes with correct edges and labels.
    pub correct_labeled: usize,
}

impl Counts {
    pub fn unlabeled(&self) -> Prf {
        Prf::new(self.correct_unlabeled, self.predicted, self.gold)
    }

    pub fn labeled(&self) -> Prf {
        Prf::new(self.correct_labeled, self.predicted, self.gold)
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        self.gold += other.gold;
        self.predicted += other.predicted;
        self.correct_unlabeled += other.correct_unlabeled;
        self.correct_labeled += other.correct_labeled;
    }
}

/// Scores of the nodes with a particular tag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TagMetrics {
    pub unlabeled: Prf,
    pub labeled: Prf,
    pub counts: Counts,
}

impl From<Counts> for TagMetrics {
    fn from(counts: Counts) -> Self {
        TagMetrics {
            unlabeled: counts.unlabeled(),
            labeled: counts.labeled(),
            counts,
        }
    }
}

/// Evaluation scores.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub unlabeled: Prf,
    pub labeled: Prf,
    pub counts: Counts,

    /// Scores per tag.
    pub per_tag: BTreeMap<String, TagMetrics>,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let f1 = |prf: &Prf| match prf.f1 {
            Some(f1) => format!("{:.2}", f1 * 100.0),
            None => "-".to_string(),
        };

        writeln!(f, "Unlabeled precision: {:.2}", self.unlabeled.precision * 100.0)?;
        writeln!(f, "Unlabeled recall: {:.2}", self.unlabeled.recall * 100.0)?;
        writeln!(f, "Unlabeled F1: {}", f1(&self.unlabeled))?;
        writeln!(f, "Labeled precision: {:.2}", self.labeled.precision * 100.0)?;
        writeln!(f, "Labeled recall: {:.2}", self.labeled.recall * 100.0)?;
        write!(f, "Labeled F1: {}", f1(&self.labeled))
    }
}

/// Accumulator of counts, overall and per tag.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    overall: Counts,
    per_tag: BTreeMap<String, Counts>,
}

impl Tally {
    fn tag(&mut self, tag: &str) -> &mut Counts {
        self.per_tag.entry(tag.to_owned()).or_default()
    }

    pub fn add_gold(&mut self, tag: &str) {
        self.overall.gold += 1;
        self.tag(tag).gold += 1;
    }

    pub fn add_predicted(&mut self, tag: &str) {
        self.overall.predicted += 1;
        self.tag(tag).predicted += 1;
    }

    /// Count a node with a correct edge, under its gold tag.
    pub fn add_correct(&mut self, tag: &str, labeled: bool) {
        self.overall.correct_unlabeled += 1;
        self.tag(tag).correct_unlabeled += 1;

        if labeled {
            self.overall.correct_labeled += 1;
            self.tag(tag).correct_labeled += 1;
        }
    }

    pub fn into_metrics(self) -> Metrics {
        Metrics {
            unlabeled: self.overall.unlabeled(),
            labeled: self.overall.labeled(),
            counts: self.overall,
            per_tag: self
                .per_tag
                .into_iter()
                .map(|(tag, counts)| (tag, counts.into()))
                .collect(),
        }
    }
}
