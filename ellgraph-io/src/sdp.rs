//! Semantic dependency (SDP) output.
//!
//! Each sentence starts with a `#<index>` line, followed by one line per
//! token with the columns id, form, lemma, part-of-speech, top, pred,
//! frame, and one argument column per predicate. Sentences are followed
//! by an empty line.

use std::collections::BTreeSet;
use std::fmt;
use std::io;

use ellgraph_annotate::Dependency;
use itertools::Itertools;

use crate::IOError;

/// Suffix of the labels of ellipsed dependencies.
pub const ELLIPSIS_SUFFIX: &str = "ellipsis";

const EMPTY: &str = "_";

/// Display wrapper for the dependencies of a sentence in SDP format.
pub struct SdpSentence<'a> {
    index: usize,
    deps: &'a [Dependency],
}

impl<'a> SdpSentence<'a> {
    pub fn new(index: usize, deps: &'a [Dependency]) -> Self {
        SdpSentence { index, deps }
    }

    /// Get the predicates of the sentence: tokens that govern at least one
    /// dependency, ellipsed dependencies included.
    ///
    /// The attachment of the root to itself does not make the root a
    /// predicate.
    pub fn predicates(&self) -> Vec<usize> {
        self.deps
            .iter()
            .flat_map(|dep| {
                let head = if dep.head != dep.position {
                    Some(dep.head)
                } else {
                    None
                };
                head.into_iter().chain(dep.ellipsed_heads.iter().copied())
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn argument(dep: &Dependency, predicate: usize) -> String {
        if dep.head == predicate && dep.head != dep.position {
            return dep.label.clone();
        }

        dep.ellipsed_heads
            .iter()
            .zip(&dep.ellipsed_labels)
            .find(|&(&head, _)| head == predicate)
            .map(|(_, label)| format!("{}{}", label, ELLIPSIS_SUFFIX))
            .unwrap_or_else(|| EMPTY.to_string())
    }
}

impl<'a> fmt::Display for SdpSentence<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "#{}", self.index)?;

        let predicates = self.predicates();

        for dep in self.deps {
            let top = if dep.head == dep.position { "+" } else { "-" };
            let pred = if predicates.binary_search(&dep.position).is_ok() {
                "+"
            } else {
                "-"
            };

            let columns = [
                (dep.position + 1).to_string(),
                dep.form.clone(),
                EMPTY.to_string(),
                EMPTY.to_string(),
                top.to_string(),
                pred.to_string(),
                EMPTY.to_string(),
            ];

            let args = predicates
                .iter()
                .map(|&predicate| Self::argument(dep, predicate));

            writeln!(f, "{}", columns.iter().cloned().chain(args).join("\t"))?;
        }

        writeln!(f)
    }
}

/// A trait for objects that can write the dependencies of sentences.
pub trait WriteDependencies {
    /// Write the dependencies of a sentence.
    fn write_dependencies(&mut self, deps: &[Dependency]) -> Result<(), IOError>;
}

/// A writer for dependencies in SDP format.
///
/// Sentences are numbered in the order in which they are written,
/// starting at zero.
pub struct SdpWriter<W> {
    write: W,
    index: usize,
}

impl<W: io::Write> SdpWriter<W> {
    pub fn new(write: W) -> SdpWriter<W> {
        SdpWriter { write, index: 0 }
    }

    /// Borrow the embedded writer.
    pub fn get_ref(&self) -> &W {
        &self.write
    }

    pub fn into_inner(self) -> W {
        self.write
    }
}

impl<W: io::Write> WriteDependencies for SdpWriter<W> {
    fn write_dependencies(&mut self, deps: &[Dependency]) -> Result<(), IOError> {
        write!(self.write, "{}", SdpSentence::new(self.index, deps))?;
        self.index += 1;

        Ok(())
    }
}
