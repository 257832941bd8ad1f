use std::collections::BTreeMap;
use std::ops::Deref;

use ellgraph::graph::Graph;
use rayon::prelude::*;
use serde::Serialize;

use crate::{ConversionError, ConverterConfig, FailureKind, RawDocument, TreeConverter};

/// Conversion result of a single sentence.
#[derive(Debug)]
pub struct SentenceResult {
    /// Index of the document in the batch.
    pub doc: usize,

    /// Index of the sentence in its document.
    pub index: usize,

    pub result: Result<Graph, ConversionError>,
}

/// Number of failed sentences per kind of failure.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FailureCounts {
    inner: BTreeMap<FailureKind, usize>,
}

impl FailureCounts {
    pub fn new() -> Self {
        FailureCounts::default()
    }

    pub fn count(&self, kind: FailureKind) -> usize {
        self.inner.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: FailureKind) {
        *self.inner.entry(kind).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.inner.values().sum()
    }
}

impl Deref for FailureCounts {
    type Target = BTreeMap<FailureKind, usize>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Result of converting a batch of documents.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-sentence results, in document and sentence order.
    ///
    /// Sentences that were skipped because they do not contain ellipsis
    /// are not included.
    pub sentences: Vec<SentenceResult>,

    pub failures: FailureCounts,

    /// Number of sentences that were skipped.
    pub skipped: usize,
}

impl BatchReport {
    /// Get an iterator over the successfully converted graphs.
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.sentences
            .iter()
            .filter_map(|sentence| sentence.result.as_ref().ok())
    }

    /// Consume the report, returning the successfully converted graphs.
    pub fn into_graphs(self) -> Vec<Graph> {
        self.sentences
            .into_iter()
            .filter_map(|sentence| sentence.result.ok())
            .collect()
    }
}

/// Converter for batches of documents.
///
/// Sentences are converted in parallel. A failure only affects the
/// sentence in which it occurs.
#[derive(Clone, Debug, Default)]
pub struct BatchConverter {
    converter: TreeConverter,
    ellipsis_only: bool,
}

impl BatchConverter {
    pub fn new(config: ConverterConfig) -> Self {
        BatchConverter {
            converter: TreeConverter::new(config),
            ellipsis_only: false,
        }
    }

    /// Only keep graphs that have at least one ellipsis edge.
    pub fn ellipsis_only(mut self, ellipsis_only: bool) -> Self {
        self.ellipsis_only = ellipsis_only;
        self
    }

    pub fn converter(&self) -> &TreeConverter {
        &self.converter
    }

    /// Convert all sentences of the given documents.
    pub fn convert_all(&self, docs: &[RawDocument]) -> BatchReport {
        let sentences: Vec<_> = docs
            .iter()
            .enumerate()
            .flat_map(|(doc_idx, doc)| {
                doc.sentences
                    .iter()
                    .enumerate()
                    .map(move |(idx, tree)| (doc_idx, doc, idx, tree))
            })
            .collect();

        let results: Vec<SentenceResult> = sentences
            .into_par_iter()
            .map(|(doc_idx, doc, idx, tree)| SentenceResult {
                doc: doc_idx,
                index: idx,
                result: self.converter.convert(tree, &doc.text),
            })
            .collect();

        let mut report = BatchReport::default();
        for sentence in results {
            match &sentence.result {
                Ok(graph) if self.ellipsis_only && !graph.has_ellipsis() => {
                    report.skipped += 1;
                    continue;
                }
                Ok(_) => (),
                Err(err) => {
                    tracing::debug!(
                        "cannot convert sentence {} of {}: {err}",
                        sentence.index,
                        docs[sentence.doc].name
                    );
                    report.failures.add(err.kind());
                }
            }

            report.sentences.push(sentence);
        }

        let n_failed = report.failures.total();
        if n_failed != 0 {
            tracing::warn!(
                "{n_failed} of {} sentences could not be converted",
                report.sentences.len()
            );
        }
        tracing::info!(
            "converted {} sentences, skipped {}",
            report.sentences.len() - n_failed,
            report.skipped
        );

        report
    }
}
