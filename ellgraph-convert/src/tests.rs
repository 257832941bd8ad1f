use lazy_static::lazy_static;

use crate::{RawDocument, RawNode};

lazy_static! {
    /// He ate pizza and [he] drank beer.
    pub static ref HE_ATE_PIZZA: RawDocument = RawDocument {
        name: "he-ate-pizza".to_string(),
        text: "He ate pizza and drank beer".to_string(),
        sentences: vec![constituent(
            "c0",
            "CLX",
            &[],
            vec![
                constituent(
                    "c1",
                    "CL",
                    &[],
                    vec![
                        constituent("c2", "NG", &["Subject"], vec![terminal("w1", "PRP", 0, 2)]),
                        constituent(
                            "c3",
                            "VG",
                            &["Finite", "Predicator"],
                            vec![terminal("w2", "VBD", 3, 6)],
                        ),
                        constituent("c4", "NG", &["Complement"], vec![terminal("w3", "NN", 7, 12)]),
                    ],
                ),
                constituent("c5", "CONJG", &[], vec![terminal("w4", "CC", 13, 16)]),
                constituent(
                    "c6",
                    "CL",
                    &[],
                    vec![
                        constituent("c7", "NG", &["Subject"], vec![elision("e1", &["w1"])]),
                        constituent(
                            "c8",
                            "VG",
                            &["Finite", "Predicator"],
                            vec![terminal("w5", "VBD", 17, 22)],
                        ),
                        constituent("c9", "NG", &["Complement"], vec![terminal("w6", "NN", 23, 27)]),
                    ],
                ),
            ],
        )],
    };
}

pub fn terminal(id: &str, pos: &str, start: usize, end: usize) -> RawNode {
    RawNode::Terminal {
        id: id.to_string(),
        pos: pos.to_string(),
        start,
        end,
        punctuation: false,
        features: Vec::new(),
    }
}

pub fn punctuation(id: &str, pos: &str, start: usize, end: usize) -> RawNode {
    RawNode::Terminal {
        id: id.to_string(),
        pos: pos.to_string(),
        start,
        end,
        punctuation: true,
        features: Vec::new(),
    }
}

pub fn constituent(id: &str, category: &str, features: &[&str], children: Vec<RawNode>) -> RawNode {
    RawNode::Constituent {
        id: id.to_string(),
        category: category.parse().unwrap(),
        features: features.iter().map(ToString::to_string).collect(),
        children,
    }
}

pub fn elision(id: &str, refs: &[&str]) -> RawNode {
    RawNode::Elision {
        id: id.to_string(),
        refs: refs.iter().map(ToString::to_string).collect(),
    }
}

/// John ate pizza and Mary [...] too.
///
/// The given (elided) nodes are placed in the second clause, after the
/// subject. Graph nodes: 0 CLX, 1 CL, 2 NG, 3 John, 4 VG, 5 ate, 6 NG,
/// 7 pizza, 8 CONJG, 9 and, 10 CL, 11 NG, 12 Mary, 13 ADVG, 14 too, 15 `.`.
pub fn john_ate_pizza(elided: Vec<RawNode>) -> RawDocument {
    let mut second_clause = vec![constituent(
        "c7",
        "NG",
        &["Subject"],
        vec![terminal("w5", "NNP", 19, 23)],
    )];
    second_clause.extend(elided);
    second_clause.push(constituent("c10", "ADVG", &["Adjunct"], vec![terminal("w6", "RB", 24, 27)]));

    RawDocument {
        name: "john-ate-pizza".to_string(),
        text: "John ate pizza and Mary too.".to_string(),
        sentences: vec![constituent(
            "c0",
            "CLX",
            &[],
            vec![
                constituent(
                    "c1",
                    "CL",
                    &[],
                    vec![
                        constituent("c2", "NG", &["Subject"], vec![terminal("w1", "NNP", 0, 4)]),
                        constituent(
                            "c3",
                            "VG",
                            &["Finite", "Predicator"],
                            vec![terminal("w2", "VBD", 5, 8)],
                        ),
                        constituent("c4", "NG", &["Complement"], vec![terminal("w3", "NN", 9, 14)]),
                    ],
                ),
                constituent("c5", "CONJG", &[], vec![terminal("w4", "CC", 15, 18)]),
                constituent("c6", "CL", &[], second_clause),
                punctuation("w7", ".", 27, 28),
            ],
        )],
    }
}

/// Elided verbal group with an elision marker that refers to `refs`.
pub fn elided_vg(refs: &[&str]) -> RawNode {
    constituent("c8", "VG", &["Finite", "Predicator"], vec![elision("e1", refs)])
}
