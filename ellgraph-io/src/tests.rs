use std::fs::File;
use std::iter::FromIterator;

use ellgraph::category::Category;
use ellgraph::graph::{EdgeKind, Graph};
use ellgraph::node::{Features, Node, NodeBuilder};
use lazy_static::lazy_static;

use crate::json::read_collection;

lazy_static! {
    /// He ate pizza and [he] drank beer.
    pub static ref HE_ATE_PIZZA: Graph = he_ate_pizza();
}

/// Read the graphs of all documents in a collection.
pub fn read_graphs(path: &str) -> Vec<Graph> {
    read_collection(File::open(path).unwrap())
        .unwrap()
        .into_iter()
        .flat_map(|doc| doc.graphs)
        .collect()
}

fn constituent(category: Category, features: &[&str], clause: usize) -> Node {
    NodeBuilder::constituent(category)
        .features(Features::from_iter(features.iter().copied()))
        .owning_clause(clause)
        .into()
}

fn terminal(pos: &str, form: &str, clause: usize) -> Node {
    NodeBuilder::terminal(pos, form).owning_clause(clause).into()
}

fn he_ate_pizza() -> Graph {
    let mut g = Graph::new();

    g.push(constituent(Category::ClauseComplex, &[], 0));
    g.push(constituent(Category::Clause, &[], 1));
    g.push(constituent(Category::NominalGroup, &["Subject"], 1));
    g.push(terminal("PRP", "He", 1));
    g.push(constituent(Category::VerbalGroup, &["Finite", "Predicator"], 1));
    g.push(terminal("VBD", "ate", 1));
    g.push(constituent(Category::NominalGroup, &["Complement"], 1));
    g.push(terminal("NN", "pizza", 1));
    g.push(constituent(Category::ConjunctionGroup, &[], 0));
    g.push(terminal("CC", "and", 0));
    g.push(constituent(Category::Clause, &[], 10));
    g.push(constituent(Category::VerbalGroup, &["Finite", "Predicator"], 10));
    g.push(terminal("VBD", "drank", 10));
    g.push(constituent(Category::NominalGroup, &["Complement"], 10));
    g.push(terminal("NN", "beer", 10));

    for &(parent, child, kind) in &[
        (0, 1, EdgeKind::Primary),
        (1, 2, EdgeKind::Primary),
        (2, 3, EdgeKind::Primary),
        (1, 4, EdgeKind::Primary),
        (4, 5, EdgeKind::Primary),
        (1, 6, EdgeKind::Primary),
        (6, 7, EdgeKind::Primary),
        (0, 8, EdgeKind::Primary),
        (8, 9, EdgeKind::Primary),
        (0, 10, EdgeKind::Primary),
        (10, 2, EdgeKind::Ellipsis),
        (10, 11, EdgeKind::Primary),
        (11, 12, EdgeKind::Primary),
        (10, 13, EdgeKind::Primary),
        (13, 14, EdgeKind::Primary),
    ] {
        g.add_child(parent, child, kind).unwrap();
    }

    g
}
