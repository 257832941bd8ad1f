//! Function labels and ellipsis tallies.

use ellgraph::graph::{EdgeKind, Graph};
use ellgraph::node::{EllipsisTally, Features, FunctionLabel};
use serde::{Deserialize, Serialize};

use crate::{Annotate, AnnotateError};

/// Feature names that signal each function.
///
/// The rules are tested in a fixed order: subject, auxiliary, adjunct,
/// process, preposition, relative pronoun, object. The first rule with a
/// feature that is present determines the function.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FunctionRules {
    pub subject: Vec<String>,
    pub auxiliary: Vec<String>,
    pub adjunct: Vec<String>,
    pub process: Vec<String>,
    pub preposition: Vec<String>,
    pub relative_pronoun: Vec<String>,
    pub object: Vec<String>,
}

fn strings(features: &[&str]) -> Vec<String> {
    features.iter().map(|&f| f.to_owned()).collect()
}

impl Default for FunctionRules {
    fn default() -> Self {
        FunctionRules {
            subject: strings(&["Subject"]),
            auxiliary: strings(&["Finite", "Non-Finite"]),
            adjunct: strings(&[
                "Adjunct",
                "Circumstantial_Adjunct",
                "Conjunctive_Adjunct",
                "Modal_Adjunct",
            ]),
            process: strings(&["Predicator", "Process"]),
            preposition: strings(&["Preposition", "Minor_Predicator"]),
            relative_pronoun: strings(&["Relative_Pronoun"]),
            object: strings(&["Complement", "Object"]),
        }
    }
}

impl FunctionRules {
    /// Classify a feature set.
    pub fn label(&self, features: &Features) -> FunctionLabel {
        let rules = [
            (&self.subject, FunctionLabel::Subject),
            (&self.auxiliary, FunctionLabel::Auxiliary),
            (&self.adjunct, FunctionLabel::Adjunct),
            (&self.process, FunctionLabel::Process),
            (&self.preposition, FunctionLabel::Preposition),
            (&self.relative_pronoun, FunctionLabel::RelativePronoun),
            (&self.object, FunctionLabel::Object),
        ];

        rules
            .iter()
            .find(|(names, _)| features.contains_any(names.as_slice()))
            .map(|&(_, label)| label)
            .unwrap_or(FunctionLabel::Other)
    }
}

/// Policy for counting co-occurring ellipsis in a clause.
///
/// An elided adjunct absorbs one elided auxiliary and one elided subject,
/// an elided auxiliary absorbs one elided subject. The policy determines
/// which absorption is applied first.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsumptionPolicy {
    AdjunctFirst,
    AuxiliaryFirst,

    /// Report raw counts.
    Disabled,
}

impl Default for SubsumptionPolicy {
    fn default() -> Self {
        SubsumptionPolicy::AdjunctFirst
    }
}

impl SubsumptionPolicy {
    /// Apply the policy to the raw counts of a clause.
    pub fn apply(self, tally: &mut EllipsisTally) {
        match self {
            SubsumptionPolicy::AdjunctFirst => {
                absorb_by_adjunct(tally);
                absorb_by_auxiliary(tally);
            }
            SubsumptionPolicy::AuxiliaryFirst => {
                absorb_by_auxiliary(tally);
                absorb_by_adjunct(tally);
            }
            SubsumptionPolicy::Disabled => (),
        }
    }
}

fn absorb_by_adjunct(tally: &mut EllipsisTally) {
    let adjuncts = tally.count(FunctionLabel::Adjunct);
    tally.remove(FunctionLabel::Auxiliary, adjuncts);
    tally.remove(FunctionLabel::Subject, adjuncts);
}

fn absorb_by_auxiliary(tally: &mut EllipsisTally) {
    let auxiliaries = tally.count(FunctionLabel::Auxiliary);
    tally.remove(FunctionLabel::Subject, auxiliaries);
}

/// Function labeler.
///
/// Annotating a graph assigns a function label to every node and stores
/// the ellipsis tally on every clause.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FunctionLabeler {
    rules: FunctionRules,
    policy: SubsumptionPolicy,
}

impl FunctionLabeler {
    pub fn new(rules: FunctionRules) -> Self {
        FunctionLabeler {
            rules,
            policy: SubsumptionPolicy::default(),
        }
    }

    /// Set the subsumption policy of ellipsis tallies.
    pub fn subsumption(mut self, policy: SubsumptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn rules(&self) -> &FunctionRules {
        &self.rules
    }

    pub fn label(&self, features: &Features) -> FunctionLabel {
        self.rules.label(features)
    }

    /// Count the elided functions of every clause.
    ///
    /// The tally of each clause is stored on the clause node. Returns the
    /// sum of the tallies of all clauses.
    pub fn count_ellipsis_types(&self, graph: &mut Graph) -> EllipsisTally {
        let mut total = EllipsisTally::new();

        for idx in 0..graph.len() {
            if !graph[idx].tag().is_clause() {
                continue;
            }

            let mut tally: EllipsisTally = graph
                .child_edges(idx)
                .into_iter()
                .filter(|&(_, kind)| kind == EdgeKind::Ellipsis)
                .map(|(child, _)| (self.label(graph[child].features()), 1))
                .collect();
            self.policy.apply(&mut tally);

            total.merge(&tally);
            graph[idx].set_ellipsis_types(Some(tally));
        }

        total
    }
}

impl Annotate for FunctionLabeler {
    fn annotate(&self, graph: &mut Graph) -> Result<(), AnnotateError> {
        for node in graph.iter_mut() {
            let label = self.label(node.features());
            node.set_function(Some(label));
        }

        self.count_ellipsis_types(graph);

        Ok(())
    }
}

/// Count the elided functions of every clause with the default rules and
/// policy.
pub fn count_ellipsis_types(graph: &mut Graph) -> EllipsisTally {
    FunctionLabeler::default().count_ellipsis_types(graph)
}

#[cfg(test)]
mod tests {
    use std::iter::FromIterator;

    use ellgraph::category::Category;
    use ellgraph::graph::{EdgeKind, Graph};
    use ellgraph::node::{EllipsisTally, Features, FunctionLabel, NodeBuilder};
    use maplit::btreemap;

    use super::{count_ellipsis_types, FunctionLabeler, FunctionRules, SubsumptionPolicy};
    use crate::tests::{HE_ATE_PIZZA, HE_ATE_PIZZA_WITHOUT_ELLIPSIS};
    use crate::Annotate;

    fn label(features: &[&str]) -> FunctionLabel {
        FunctionRules::default().label(&Features::from_iter(features.iter().copied()))
    }

    #[test]
    fn rules_are_ordered() {
        assert_eq!(label(&["Subject"]), FunctionLabel::Subject);
        assert_eq!(label(&["Subject", "Finite", "Adjunct", "Complement"]), FunctionLabel::Subject);
        assert_eq!(label(&["Finite", "Predicator"]), FunctionLabel::Auxiliary);
        assert_eq!(label(&["Predicator", "Adjunct"]), FunctionLabel::Adjunct);
        assert_eq!(label(&["Predicator"]), FunctionLabel::Process);
        assert_eq!(label(&["Minor_Predicator", "Complement"]), FunctionLabel::Preposition);
        assert_eq!(label(&["Relative_Pronoun", "Complement"]), FunctionLabel::RelativePronoun);
        assert_eq!(label(&["Complement"]), FunctionLabel::Object);
        assert_eq!(label(&[]), FunctionLabel::Other);
        assert_eq!(label(&["Theme"]), FunctionLabel::Other);
    }

    #[test]
    fn annotate_labels_nodes() {
        let mut g = HE_ATE_PIZZA.clone();
        FunctionLabeler::default().annotate(&mut g).unwrap();

        assert_eq!(g[2].function(), Some(FunctionLabel::Subject));
        assert_eq!(g[4].function(), Some(FunctionLabel::Auxiliary));
        assert_eq!(g[6].function(), Some(FunctionLabel::Object));
        assert_eq!(g[3].function(), Some(FunctionLabel::Other));

        assert_eq!(g[1].ellipsis_types(), Some(&EllipsisTally::new()));
        assert_eq!(
            g[10].ellipsis_types().map(|tally| tally.count(FunctionLabel::Subject)),
            Some(1)
        );
        assert_eq!(g[0].ellipsis_types(), None);
    }

    #[test]
    fn tally_sums_clauses() {
        let mut g = HE_ATE_PIZZA.clone();
        assert_eq!(
            *count_ellipsis_types(&mut g),
            btreemap! { FunctionLabel::Subject => 1 }
        );

        let mut g = HE_ATE_PIZZA_WITHOUT_ELLIPSIS.clone();
        assert_eq!(count_ellipsis_types(&mut g).total(), 0);
    }

    /// Clause that elides two subjects, an auxiliary and an adjunct.
    fn elliptical_clause() -> Graph {
        let mut g = Graph::new();
        g.push(NodeBuilder::constituent(Category::ClauseComplex).into());
        g.push(NodeBuilder::constituent(Category::Clause).into());

        let elided = [
            (Category::NominalGroup, "Subject", "He"),
            (Category::NominalGroup, "Subject", "she"),
            (Category::VerbalGroup, "Finite", "will"),
            (Category::AdverbialGroup, "Adjunct", "soon"),
        ];
        for &(category, feature, form) in &elided {
            let constituent = g.push(
                NodeBuilder::constituent(category)
                    .features(Features::from_iter(vec![feature]))
                    .into(),
            );
            let terminal = g.push(NodeBuilder::terminal("XX", form).into());
            g.add_child(1, constituent, EdgeKind::Primary).unwrap();
            g.add_child(constituent, terminal, EdgeKind::Primary).unwrap();
        }

        let clause = g.push(NodeBuilder::constituent(Category::Clause).into());
        let verb = g.push(NodeBuilder::constituent(Category::VerbalGroup).into());
        let leave = g.push(NodeBuilder::terminal("VB", "leave").into());
        g.add_child(0, 1, EdgeKind::Primary).unwrap();
        g.add_child(0, clause, EdgeKind::Primary).unwrap();
        for &elided in &[2, 4, 6, 8] {
            g.add_child(clause, elided, EdgeKind::Ellipsis).unwrap();
        }
        g.add_child(clause, verb, EdgeKind::Primary).unwrap();
        g.add_child(verb, leave, EdgeKind::Primary).unwrap();

        g
    }

    #[test]
    fn subsumption_policies() {
        let counts = |policy| {
            let mut g = elliptical_clause();
            FunctionLabeler::default()
                .subsumption(policy)
                .count_ellipsis_types(&mut g)
                .into_inner()
        };

        assert_eq!(
            counts(SubsumptionPolicy::Disabled),
            btreemap! {
                FunctionLabel::Subject => 2,
                FunctionLabel::Auxiliary => 1,
                FunctionLabel::Adjunct => 1,
            }
        );

        // The adjunct absorbs the auxiliary and a subject, no auxiliary is
        // left to absorb the other subject.
        assert_eq!(
            counts(SubsumptionPolicy::AdjunctFirst),
            btreemap! {
                FunctionLabel::Subject => 1,
                FunctionLabel::Adjunct => 1,
            }
        );

        assert_eq!(
            counts(SubsumptionPolicy::AuxiliaryFirst),
            btreemap! {
                FunctionLabel::Adjunct => 1,
            }
        );
    }

    #[test]
    fn rules_are_read_with_defaults() {
        let rules: FunctionRules =
            serde_json::from_str(r#"{"subject": ["Subj"], "object": []}"#).unwrap();
        assert_eq!(rules.subject, vec!["Subj".to_string()]);
        assert!(rules.object.is_empty());
        assert_eq!(rules.process, FunctionRules::default().process);

        assert_eq!(
            serde_json::from_str::<SubsumptionPolicy>(r#""auxiliary_first""#).unwrap(),
            SubsumptionPolicy::AuxiliaryFirst
        );
    }
}
