//! JSON graph collections.
//!
//! A collection consists of documents, each with a list of sentence
//! graphs. Nodes are stored as a flat list in which the position of a node
//! is its identifier:
//!
//! ```json
//! {"docs": [{"doc": "wsj_0001", "sents": [{"string": "...", "graph": [
//!   {"id": 0, "children": [1, 4], "parent": 0, "ellipsed_parents": [],
//!    "terminal": "no", "tag": "CLX", "text": ""}, ...],
//!   "ellipsis": "no", "bert_length": 42}]}]}
//! ```
//!
//! A child is elided in a node when the node is among the ellipsed parents
//! of the child. The parent of the root is written as `0`.

use std::io::{Read, Write};

use ellgraph::category::Category;
use ellgraph::graph::{EdgeKind, Graph};
use ellgraph::node::{Features, Node, NodeBuilder};
use ellgraph_convert::RawDocument;
use serde::{Deserialize, Serialize};

use crate::{IOError, ReadError};

/// Graph collection.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Collection {
    pub docs: Vec<JsonDocument>,
}

/// Graphs of the sentences of a document.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonDocument {
    pub doc: String,
    pub sents: Vec<JsonSentence>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonSentence {
    /// Sentence text, without repetition of elided material.
    pub string: String,

    pub graph: Vec<JsonNode>,

    #[serde(with = "yes_no")]
    pub ellipsis: bool,

    /// Length of the bracketed encoding.
    pub bert_length: usize,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonNode {
    pub id: usize,
    pub children: Vec<usize>,
    pub parent: usize,
    pub ellipsed_parents: Vec<usize>,
    #[serde(with = "yes_no")]
    pub terminal: bool,
    pub tag: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

mod yes_no {
    use serde::de::{self, Deserialize, Deserializer};
    use serde::Serializer;

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "yes" => Ok(true),
            "no" => Ok(false),
            _ => Err(de::Error::invalid_value(
                de::Unexpected::Str(&value),
                &"yes or no",
            )),
        }
    }
}

/// Graphs of a document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GraphDocument {
    pub name: String,
    pub graphs: Vec<Graph>,
}

impl GraphDocument {
    pub fn new(name: impl Into<String>, graphs: Vec<Graph>) -> Self {
        GraphDocument {
            name: name.into(),
            graphs,
        }
    }
}

/// Convert a graph to its JSON representation.
pub fn to_json(graph: &Graph) -> JsonSentence {
    let nodes = graph
        .iter()
        .enumerate()
        .map(|(idx, node)| JsonNode {
            id: idx,
            children: graph.children(idx),
            parent: graph.primary_parent(idx).unwrap_or(0),
            ellipsed_parents: graph.secondary_parents(idx),
            terminal: node.is_terminal(),
            tag: node.tag().to_string(),
            text: node.form().unwrap_or_default().to_owned(),
            features: node.features().iter().cloned().collect(),
        })
        .collect();

    JsonSentence {
        string: graph.text(),
        graph: nodes,
        ellipsis: graph.has_ellipsis(),
        bert_length: graph.encoded_length(),
    }
}

/// Construct a graph from its JSON representation.
pub fn from_json(nodes: &[JsonNode]) -> Result<Graph, ReadError> {
    let mut graph = Graph::new();

    for (idx, json_node) in nodes.iter().enumerate() {
        if json_node.id != idx {
            return Err(ReadError::NodeId {
                expected: idx,
                found: json_node.id,
            });
        }

        let builder = if json_node.terminal {
            NodeBuilder::terminal(json_node.tag.as_str(), json_node.text.as_str())
        } else {
            NodeBuilder::constituent(json_node.tag.parse::<Category>()?)
        };
        let node: Node = builder
            .features(json_node.features.iter().map(String::as_str).collect::<Features>())
            .into();
        graph.push(node);
    }

    for (idx, json_node) in nodes.iter().enumerate() {
        for &child in &json_node.children {
            let child_node = nodes.get(child).ok_or(ellgraph::GraphError::ChildOutOfBounds {
                child,
                node_count: nodes.len(),
            })?;

            let kind = if child_node.ellipsed_parents.contains(&idx) {
                EdgeKind::Ellipsis
            } else if child_node.parent == idx {
                EdgeKind::Primary
            } else {
                return Err(ReadError::InconsistentParent {
                    node: idx,
                    child,
                    parent: child_node.parent,
                });
            };

            graph.add_child(idx, child, kind)?;
        }
    }

    for (idx, json_node) in nodes.iter().enumerate() {
        let mut ellipsed_parents = json_node.ellipsed_parents.clone();
        ellipsed_parents.sort_unstable();
        ellipsed_parents.dedup();
        if ellipsed_parents != graph.secondary_parents(idx) {
            return Err(ReadError::AsymmetricEllipsis { node: idx });
        }
    }

    graph.validate()?;
    assign_owning_clauses(&mut graph);

    Ok(graph)
}

/// Set the owning clause of every node to its closest dominating clause,
/// or the root when no clause dominates it.
pub(crate) fn assign_owning_clauses(graph: &mut Graph) {
    for idx in 0..graph.len() {
        let mut clause = idx;
        while !graph[clause].tag().is_clause() {
            match graph.primary_parent(clause) {
                Some(parent) => clause = parent,
                None => break,
            }
        }

        graph[idx].set_owning_clause(clause);
    }
}

/// Read a graph collection.
pub fn read_collection<R>(read: R) -> Result<Vec<GraphDocument>, IOError>
where
    R: Read,
{
    let collection: Collection = serde_json::from_reader(read)?;

    collection
        .docs
        .into_iter()
        .map(|doc| {
            let graphs = doc
                .sents
                .iter()
                .enumerate()
                .map(|(sent, sentence)| {
                    from_json(&sentence.graph).map_err(|source| IOError::InvalidGraph {
                        doc: doc.doc.clone(),
                        sent,
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!("read {} graphs from {}", graphs.len(), doc.doc);

            Ok(GraphDocument {
                name: doc.doc,
                graphs,
            })
        })
        .collect()
}

/// Write a graph collection.
pub fn write_collection<W>(write: W, docs: &[GraphDocument]) -> Result<(), IOError>
where
    W: Write,
{
    let collection = Collection {
        docs: docs
            .iter()
            .map(|doc| JsonDocument {
                doc: doc.name.clone(),
                sents: doc.graphs.iter().map(to_json).collect(),
            })
            .collect(),
    };

    serde_json::to_writer(write, &collection)?;

    Ok(())
}

/// Read documents with raw constituency trees.
pub fn read_documents<R>(read: R) -> Result<Vec<RawDocument>, IOError>
where
    R: Read,
{
    Ok(serde_json::from_reader(read)?)
}
