//! Constituent categories and node tags.

use std::convert::{Infallible, TryFrom};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Constituent category.
///
/// The categories of the systemic-functional treebank. Each category has a
/// long treebank name (e.g. `Nominal_Group`) and a short tag (e.g. `NG`).
/// Categories are serialized as their short tags.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    ClauseComplex,
    Clause,
    AdverbialGroupComplex,
    AdverbialGroup,
    ConjunctionGroup,
    InterjectionComplex,
    Interjection,
    NominalGroupComplex,
    NominalGroup,
    VerbalGroupComplex,
    VerbalGroup,
    Particle,
    PrepositionalPhraseComplex,
    PrepositionalPhrase,
}

static CATEGORIES: &[(Category, &str, &str)] = &[
    (Category::ClauseComplex, "Clause_Complex", "CLX"),
    (Category::Clause, "Clause", "CL"),
    (Category::AdverbialGroupComplex, "Adverbial_Group_Complex", "ADVX"),
    (Category::AdverbialGroup, "Adverbial_Group", "ADVG"),
    (Category::ConjunctionGroup, "Conjunction_Group", "CONJG"),
    (Category::InterjectionComplex, "Interjection_Complex", "INTJX"),
    (Category::Interjection, "Interjection", "INTJ"),
    (Category::NominalGroupComplex, "Nominal_Group_Complex", "NGX"),
    (Category::NominalGroup, "Nominal_Group", "NG"),
    (Category::VerbalGroupComplex, "Verbal_Group_Complex", "VGX"),
    (Category::VerbalGroup, "Verbal_Group", "VG"),
    (Category::Particle, "Particle", "PRT"),
    (
        Category::PrepositionalPhraseComplex,
        "Prepositional_Phrase_Complex",
        "PPX",
    ),
    (Category::PrepositionalPhrase, "Prepositional_Phrase", "PP"),
];

impl Category {
    /// Get an iterator over all categories.
    pub fn all() -> impl Iterator<Item = Category> {
        CATEGORIES.iter().map(|&(category, _, _)| category)
    }

    /// Get the short tag of the category, e.g. `NG`.
    pub fn short_tag(self) -> &'static str {
        self.entry().2
    }

    /// Get the treebank name of the category, e.g. `Nominal_Group`.
    pub fn treebank_name(self) -> &'static str {
        self.entry().1
    }

    /// Returns `true` for clauses.
    ///
    /// Clauses scope the ellipsis tallies of the nodes that they dominate.
    pub fn is_clause(self) -> bool {
        self == Category::Clause
    }

    fn entry(self) -> &'static (Category, &'static str, &'static str) {
        // CATEGORIES is in declaration order.
        &CATEGORIES[self as usize]
    }
}

impl Display for Category {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(self.short_tag())
    }
}

impl FromStr for Category {
    type Err = GraphError;

    /// Parse a category from its treebank name or its short tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATEGORIES
            .iter()
            .find(|(_, name, tag)| *name == s || *tag == s)
            .map(|&(category, _, _)| category)
            .ok_or_else(|| GraphError::UnknownCategory {
                value: s.to_owned(),
            })
    }
}

impl TryFrom<String> for Category {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.short_tag().to_owned()
    }
}

/// Node tag.
///
/// Constituents are tagged with a category, terminals with a
/// part-of-speech tag.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Tag {
    Category(Category),
    Pos(String),
}

impl Tag {
    /// Get the category of a constituent tag.
    pub fn category(&self) -> Option<Category> {
        match self {
            Tag::Category(category) => Some(*category),
            Tag::Pos(_) => None,
        }
    }

    /// Get the part-of-speech of a terminal tag.
    pub fn pos(&self) -> Option<&str> {
        match self {
            Tag::Category(_) => None,
            Tag::Pos(pos) => Some(pos),
        }
    }

    pub fn is_clause(&self) -> bool {
        self.category().map(Category::is_clause).unwrap_or(false)
    }

    /// Get the short tag of a category or the part-of-speech.
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Category(category) => category.short_tag(),
            Tag::Pos(pos) => pos,
        }
    }
}

impl Display for Tag {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

impl From<Category> for Tag {
    fn from(category: Category) -> Self {
        Tag::Category(category)
    }
}

impl FromStr for Tag {
    type Err = Infallible;

    /// Parse a tag, falling back to a part-of-speech tag when the string
    /// is not a known category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<Category>()
            .map(Tag::Category)
            .unwrap_or_else(|_| Tag::Pos(s.to_owned())))
    }
}

impl PartialEq<str> for Tag {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}
