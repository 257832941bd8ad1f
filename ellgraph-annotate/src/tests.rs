use std::iter::FromIterator;

use ellgraph::category::Category;
use ellgraph::graph::{EdgeKind, Graph};
use ellgraph::node::{Features, Node, NodeBuilder};
use lazy_static::lazy_static;

lazy_static! {
    /// He ate pizza and [he] drank beer.
    pub static ref HE_ATE_PIZZA: Graph = he_ate_pizza(true);

    pub static ref HE_ATE_PIZZA_WITHOUT_ELLIPSIS: Graph = he_ate_pizza(false);
}

fn constituent(category: Category, features: &[&str]) -> Node {
    NodeBuilder::constituent(category)
        .features(Features::from_iter(features.iter().copied()))
        .into()
}

fn he_ate_pizza(ellipsis: bool) -> Graph {
    let mut g = Graph::new();

    for node in vec![
        constituent(Category::ClauseComplex, &[]),
        constituent(Category::Clause, &[]),
        constituent(Category::NominalGroup, &["Subject"]),
        Node::terminal("PRP", "He"),
        constituent(Category::VerbalGroup, &["Finite", "Predicator"]),
        Node::terminal("VBD", "ate"),
        constituent(Category::NominalGroup, &["Complement"]),
        Node::terminal("NN", "pizza"),
        constituent(Category::ConjunctionGroup, &[]),
        Node::terminal("CC", "and"),
        constituent(Category::Clause, &[]),
        constituent(Category::VerbalGroup, &["Finite", "Predicator"]),
        Node::terminal("VBD", "drank"),
        constituent(Category::NominalGroup, &["Complement"]),
        Node::terminal("NN", "beer"),
    ] {
        g.push(node);
    }

    let mut edges = vec![
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
    ];
    if ellipsis {
        edges.push((10, 2, EdgeKind::Ellipsis));
    }
    edges.extend(vec![
        (10, 11, EdgeKind::Primary),
        (11, 12, EdgeKind::Primary),
        (10, 13, EdgeKind::Primary),
        (13, 14, EdgeKind::Primary),
    ]);

    for (parent, child, kind) in edges {
        g.add_child(parent, child, kind).unwrap();
    }

    g
}
