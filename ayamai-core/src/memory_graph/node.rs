//! Concept nodes and their outgoing links.

use crate::id::ConceptId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relation label used when a caller does not name one.
pub const DEFAULT_RELATION: &str = "related_to";

/// All targets linked from a node under one relation label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationLinks {
    /// The relation label, e.g. `"explains"`.
    pub relation: String,
    /// Targets in link-insertion order. Duplicates are kept.
    pub targets: Vec<ConceptId>,
}

/// A concept remembered by the graph.
///
/// Nodes are only ever handed out by shared reference; the graph is the sole
/// writer and only appends links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptNode {
    /// Unique identifier, fixed at creation.
    pub id: ConceptId,
    /// Display name, unique within the owning graph.
    pub concept: String,
    /// Inherent properties, set at creation only.
    pub attributes: Vec<String>,
    /// Actions or tendencies, set at creation only.
    pub behaviors: Vec<String>,
    /// Outgoing links grouped by relation, in first-use order of the relation.
    links: Vec<RelationLinks>,
}

impl ConceptNode {
    pub(crate) fn new(
        concept: impl Into<String>,
        attributes: Vec<String>,
        behaviors: Vec<String>,
    ) -> Self {
        Self {
            id: ConceptId::new(),
            concept: concept.into(),
            attributes,
            behaviors,
            links: Vec::new(),
        }
    }

    /// Outgoing links, grouped by relation.
    pub fn links(&self) -> &[RelationLinks] {
        &self.links
    }

    /// Targets under one relation, or an empty slice.
    pub fn targets(&self, relation: &str) -> &[ConceptId] {
        self.links
            .iter()
            .find(|l| l.relation == relation)
            .map(|l| l.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Relation labels in first-use order.
    pub fn relation_types(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|l| l.relation.as_str())
    }

    /// Total number of outgoing links, counting duplicates.
    pub fn link_count(&self) -> usize {
        self.links.iter().map(|l| l.targets.len()).sum()
    }

    pub(crate) fn push_link(&mut self, relation: &str, target: ConceptId) {
        match self.links.iter_mut().find(|l| l.relation == relation) {
            Some(group) => group.targets.push(target),
            None => self.links.push(RelationLinks {
                relation: relation.to_string(),
                targets: vec![target],
            }),
        }
    }
}

impl fmt::Display for ConceptNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<U:{}>", self.concept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_order_is_first_use() {
        let mut node = ConceptNode::new("dreams", Vec::new(), Vec::new());
        let a = ConceptId::new();
        let b = ConceptId::new();

        node.push_link("enables", a);
        node.push_link("guides", b);
        node.push_link("enables", b);

        let relations: Vec<_> = node.relation_types().collect();
        assert_eq!(relations, vec!["enables", "guides"]);
        assert_eq!(node.targets("enables"), &[a, b]);
        assert_eq!(node.link_count(), 3);
        assert!(node.targets("missing").is_empty());
    }

    #[test]
    fn test_display() {
        let node = ConceptNode::new("entropy", Vec::new(), Vec::new());
        assert_eq!(node.to_string(), "<U:entropy>");
    }
}
