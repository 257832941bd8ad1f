//! Nodes in the constituency graph.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};
use std::iter::FromIterator;
use std::mem;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::category::{Category, Tag};

/// A builder for `Node`s.
///
/// Nodes are usually constructed by the tree converter, which sets the
/// features and the owning clause along with the tag. This builder
/// provides a fluent interface for doing so.
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    /// Create a builder for a terminal with the given part-of-speech and form.
    pub fn terminal(pos: impl Into<String>, form: impl Into<String>) -> NodeBuilder {
        NodeBuilder {
            node: Node::terminal(pos, form),
        }
    }

    /// Create a builder for a constituent of the given category.
    pub fn constituent(category: Category) -> NodeBuilder {
        NodeBuilder {
            node: Node::constituent(category),
        }
    }

    /// Set the grammatical features of the node.
    pub fn features(mut self, features: Features) -> NodeBuilder {
        self.node.set_features(features);
        self
    }

    /// Set the clause that owns the node.
    pub fn owning_clause(mut self, clause: usize) -> NodeBuilder {
        self.node.set_owning_clause(clause);
        self
    }
}

impl From<Node> for NodeBuilder {
    fn from(node: Node) -> Self {
        NodeBuilder { node }
    }
}

impl From<NodeBuilder> for Node {
    fn from(builder: NodeBuilder) -> Self {
        builder.node
    }
}

/// Kind of node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    /// Constituent node.
    Constituent,

    /// Terminal node with its surface form.
    Terminal { form: String },
}

/// Graph node.
///
/// A node is a constituent or a terminal. Besides the primary data (tag,
/// surface form, features), a node stores the annotations that are added
/// after conversion: the function label, the head annotation, and for
/// clauses, the ellipsis tally.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    tag: Tag,
    kind: NodeKind,
    features: Features,
    owning_clause: usize,
    function: Option<FunctionLabel>,
    heads: Option<HeadAnnotation>,
    ellipsis_types: Option<EllipsisTally>,
}

impl Node {
    /// Create a terminal node.
    pub fn terminal(pos: impl Into<String>, form: impl Into<String>) -> Node {
        Node::new(
            Tag::Pos(pos.into()),
            NodeKind::Terminal { form: form.into() },
        )
    }

    /// Create a constituent node.
    pub fn constituent(category: Category) -> Node {
        Node::new(Tag::Category(category), NodeKind::Constituent)
    }

    fn new(tag: Tag, kind: NodeKind) -> Node {
        Node {
            tag,
            kind,
            features: Features::new(),
            owning_clause: 0,
            function: None,
            heads: None,
            ellipsis_types: None,
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_terminal(&self) -> bool {
        match self.kind {
            NodeKind::Terminal { .. } => true,
            NodeKind::Constituent => false,
        }
    }

    /// Get the surface form of a terminal.
    pub fn form(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Terminal { form } => Some(form),
            NodeKind::Constituent => None,
        }
    }

    /// Get the grammatical features of the node.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Get the grammatical features of the node mutably.
    pub fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    /// Get the nearest clause that dominates the node.
    ///
    /// This is the node itself for clauses and the root when no clause
    /// dominates the node.
    pub fn owning_clause(&self) -> usize {
        self.owning_clause
    }

    pub fn function(&self) -> Option<FunctionLabel> {
        self.function
    }

    /// Get the head annotation, if the node was annotated.
    pub fn heads(&self) -> Option<&HeadAnnotation> {
        self.heads.as_ref()
    }

    pub fn heads_mut(&mut self) -> Option<&mut HeadAnnotation> {
        self.heads.as_mut()
    }

    /// Get the ellipsis tally of a clause.
    pub fn ellipsis_types(&self) -> Option<&EllipsisTally> {
        self.ellipsis_types.as_ref()
    }

    /// Set the grammatical features.
    ///
    /// Returns the features that are replaced.
    pub fn set_features(&mut self, features: Features) -> Features {
        mem::replace(&mut self.features, features)
    }

    pub fn set_owning_clause(&mut self, clause: usize) -> usize {
        mem::replace(&mut self.owning_clause, clause)
    }

    /// Set the function label.
    ///
    /// Returns the label that is replaced.
    pub fn set_function(&mut self, function: Option<FunctionLabel>) -> Option<FunctionLabel> {
        mem::replace(&mut self.function, function)
    }

    /// Set the head annotation.
    ///
    /// Returns the annotation that is replaced.
    pub fn set_heads(&mut self, heads: Option<HeadAnnotation>) -> Option<HeadAnnotation> {
        mem::replace(&mut self.heads, heads)
    }

    /// Set the ellipsis tally.
    ///
    /// Returns the tally that is replaced.
    pub fn set_ellipsis_types(&mut self, tally: Option<EllipsisTally>) -> Option<EllipsisTally> {
        mem::replace(&mut self.ellipsis_types, tally)
    }
}

/// Head annotation of a node.
///
/// All heads are terminal positions: the index of a terminal among the
/// terminals of the graph, counted left to right.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HeadAnnotation {
    /// Lexical head of the node.
    pub head: usize,

    /// Dependency head (terminals only).
    pub dep_head: Option<usize>,

    /// Dependency label (terminals only).
    pub dep_label: Option<String>,

    /// Heads of the constituents in which the node is elided.
    pub ellipsed_dep_heads: Vec<usize>,

    /// Labels of the constituents in which the node is elided.
    pub ellipsed_dep_labels: Vec<String>,
}

impl HeadAnnotation {
    pub fn new(head: usize) -> Self {
        HeadAnnotation {
            head,
            ..Default::default()
        }
    }
}

/// Coarse grammatical function of a node.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionLabel {
    Subject,
    Auxiliary,
    Adjunct,
    Process,
    Preposition,
    RelativePronoun,
    Object,
    Other,
}

impl FunctionLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionLabel::Subject => "subject",
            FunctionLabel::Auxiliary => "auxiliary",
            FunctionLabel::Adjunct => "adjunct",
            FunctionLabel::Process => "process",
            FunctionLabel::Preposition => "preposition",
            FunctionLabel::RelativePronoun => "relative_pronoun",
            FunctionLabel::Object => "object",
            FunctionLabel::Other => "other",
        }
    }
}

impl Display for FunctionLabel {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// Grammatical features of a node.
///
/// In the systemic-functional treebank, these are the function and
/// verb-form features of a constituent, such as `Subject` or `Finite`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Features {
    inner: BTreeSet<String>,
}

impl Features {
    /// Construct an empty set of features.
    pub fn new() -> Self {
        Features {
            inner: BTreeSet::new(),
        }
    }

    /// Returns `true` if any of the given features is present.
    pub fn contains_any<S>(&self, features: &[S]) -> bool
    where
        S: AsRef<str>,
    {
        features.iter().any(|f| self.inner.contains(f.as_ref()))
    }

    /// Unwrap the contained feature set.
    pub fn into_inner(self) -> BTreeSet<String> {
        self.inner
    }
}

impl Deref for Features {
    type Target = BTreeSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Features {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<BTreeSet<String>> for Features {
    fn from(feature_set: BTreeSet<String>) -> Self {
        Features { inner: feature_set }
    }
}

impl<S> FromIterator<S> for Features
where
    S: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        Features {
            inner: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ellipsis counts of a clause, per function label.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EllipsisTally {
    inner: BTreeMap<FunctionLabel, usize>,
}

impl EllipsisTally {
    pub fn new() -> Self {
        EllipsisTally {
            inner: BTreeMap::new(),
        }
    }

    /// Get the count of a label, zero when absent.
    pub fn count(&self, label: FunctionLabel) -> usize {
        self.inner.get(&label).copied().unwrap_or(0)
    }

    /// Increment the count of a label.
    pub fn add(&mut self, label: FunctionLabel, n: usize) {
        if n > 0 {
            *self.inner.entry(label).or_insert(0) += n;
        }
    }

    /// Decrement the count of a label, saturating at zero.
    pub fn remove(&mut self, label: FunctionLabel, n: usize) {
        let remaining = self.count(label).saturating_sub(n);
        if remaining == 0 {
            self.inner.remove(&label);
        } else {
            self.inner.insert(label, remaining);
        }
    }

    /// Add all counts of another tally.
    pub fn merge(&mut self, other: &EllipsisTally) {
        for (&label, &n) in &other.inner {
            self.add(label, n);
        }
    }

    pub fn total(&self) -> usize {
        self.inner.values().sum()
    }

    pub fn into_inner(self) -> BTreeMap<FunctionLabel, usize> {
        self.inner
    }
}

impl Deref for EllipsisTally {
    type Target = BTreeMap<FunctionLabel, usize>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromIterator<(FunctionLabel, usize)> for EllipsisTally {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (FunctionLabel, usize)>,
    {
        let mut tally = EllipsisTally::new();
        for (label, n) in iter {
            tally.add(label, n);
        }
        tally
    }
}
