//! The concept graph: name-indexed nodes with labeled, append-only links.

use super::node::{ConceptNode, DEFAULT_RELATION};
use crate::id::ConceptId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A directed, labeled multigraph of concepts.
///
/// The graph owns every node. Links between nodes are stored as ids, so a
/// link is always a non-owning reference to a node of the same graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConceptNode>", into = "Vec<ConceptNode>")]
pub struct ConceptGraph {
    /// Authoritative node storage.
    nodes: HashMap<ConceptId, ConceptNode>,
    /// Concept name to node id. Every entry resolves in `nodes`.
    index: HashMap<String, ConceptId>,
    /// Creation order, for stable listing and serialization.
    order: Vec<ConceptId>,
}

impl ConceptGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Node Management
    // =========================================================================

    /// Add a concept, or return the existing node with that name.
    ///
    /// First write wins: when the concept already exists, `attributes` and
    /// `behaviors` are ignored and the node is returned unchanged.
    pub fn add_node(
        &mut self,
        concept: &str,
        attributes: Vec<String>,
        behaviors: Vec<String>,
    ) -> &ConceptNode {
        let id = self.ensure_node(concept, attributes, behaviors);
        &self.nodes[&id]
    }

    /// Add a concept with no attributes or behaviors.
    pub fn add_concept(&mut self, concept: &str) -> &ConceptNode {
        self.add_node(concept, Vec::new(), Vec::new())
    }

    fn ensure_node(
        &mut self,
        concept: &str,
        attributes: Vec<String>,
        behaviors: Vec<String>,
    ) -> ConceptId {
        if let Some(&id) = self.index.get(concept) {
            return id;
        }

        let node = ConceptNode::new(concept, attributes, behaviors);
        let id = node.id;
        self.index.insert(concept.to_string(), id);
        self.nodes.insert(id, node);
        self.order.push(id);
        debug!(concept, "new memory node");
        id
    }

    /// Get a node by concept name.
    pub fn get_node(&self, concept: &str) -> Option<&ConceptNode> {
        self.index.get(concept).and_then(|id| self.nodes.get(id))
    }

    /// Get a node by id.
    pub fn get_node_by_id(&self, id: ConceptId) -> Option<&ConceptNode> {
        self.nodes.get(&id)
    }

    /// Whether a concept is known.
    pub fn contains(&self, concept: &str) -> bool {
        self.index.contains_key(concept)
    }

    /// Concept names in creation order.
    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|n| n.concept.as_str())
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// Link `source` to `target` under `relation`, creating either concept if needed.
    ///
    /// Identical links are not deduplicated; linking twice records two entries.
    pub fn link(&mut self, source: &str, target: &str, relation: &str) {
        let src = self.ensure_node(source, Vec::new(), Vec::new());
        let tgt = self.ensure_node(target, Vec::new(), Vec::new());
        if let Some(node) = self.nodes.get_mut(&src) {
            node.push_link(relation, tgt);
        }
        debug!(source, target, relation, "linked concepts");
    }

    /// Link under the default `"related_to"` relation.
    pub fn link_related(&mut self, source: &str, target: &str) {
        self.link(source, target, DEFAULT_RELATION);
    }

    /// Nodes linked from `concept` under `relation`, in link order.
    ///
    /// Empty when either the concept or the relation is unknown.
    pub fn get_related(&self, concept: &str, relation: &str) -> Vec<&ConceptNode> {
        self.get_node(concept)
            .map(|node| {
                node.targets(relation)
                    .iter()
                    .filter_map(|id| self.nodes.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Relation labels used by a concept, in first-use order.
    pub fn relation_types(&self, concept: &str) -> Vec<&str> {
        self.get_node(concept)
            .map(|node| node.relation_types().collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Depth-first walk from `start`, returning concept names in visit order.
    ///
    /// Every relation is followed (first-use order, then link order). A concept
    /// is expanded at most once per walk, and only while `depth` remains, so
    /// `depth == 0` yields just `[start]`. An unknown start yields `[]`.
    pub fn traverse_memory(&self, start: &str, depth: usize) -> Vec<String> {
        self.traverse_memory_checked(start, depth).unwrap_or_default()
    }

    /// Like [`ConceptGraph::traverse_memory`], but `None` for an unknown start.
    pub fn traverse_memory_checked(&self, start: &str, depth: usize) -> Option<Vec<String>> {
        let start_id = *self.index.get(start)?;

        let mut visited: HashSet<ConceptId> = HashSet::new();
        let mut chain = Vec::new();
        let mut stack = vec![(start_id, depth)];

        while let Some((id, remaining)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            chain.push(node.concept.clone());

            if remaining == 0 {
                continue;
            }

            // Reverse push so the first link is popped (visited) first.
            for group in node.links().iter().rev() {
                for &target in group.targets.iter().rev() {
                    if !visited.contains(&target) {
                        stack.push((target, remaining - 1));
                    }
                }
            }
        }

        Some(chain)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Number of concepts.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links, counting duplicates.
    pub fn link_count(&self) -> usize {
        self.nodes.values().map(|n| n.link_count()).sum()
    }

    /// Whether the graph has no concepts.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<ConceptGraph> for Vec<ConceptNode> {
    fn from(mut graph: ConceptGraph) -> Self {
        graph
            .order
            .iter()
            .filter_map(|id| graph.nodes.remove(id))
            .collect()
    }
}

impl TryFrom<Vec<ConceptNode>> for ConceptGraph {
    type Error = String;

    fn try_from(nodes: Vec<ConceptNode>) -> Result<Self, Self::Error> {
        let mut graph = ConceptGraph::new();
        for node in nodes {
            if graph.index.contains_key(&node.concept) {
                return Err(format!("duplicate concept '{}'", node.concept));
            }
            if graph.nodes.contains_key(&node.id) {
                return Err(format!("duplicate concept id {}", node.id));
            }
            graph.index.insert(node.concept.clone(), node.id);
            graph.order.push(node.id);
            graph.nodes.insert(node.id, node);
        }

        for node in graph.nodes.values() {
            for group in node.links() {
                let dangling = group.targets.iter().find(|t| !graph.nodes.contains_key(*t));
                if let Some(missing) = dangling {
                    return Err(format!(
                        "concept '{}' links to unknown node {missing}",
                        node.concept
                    ));
                }
            }
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Every index entry resolves to a node carrying that name, and vice versa.
    fn assert_consistent(graph: &ConceptGraph) {
        assert_eq!(graph.index.len(), graph.nodes.len());
        for (name, id) in &graph.index {
            assert_eq!(&graph.nodes[id].concept, name);
        }
        for (id, node) in &graph.nodes {
            assert_eq!(graph.index.get(&node.concept), Some(id));
        }
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = ConceptGraph::new();

        let first = graph
            .add_node("Ayurveda", strings(&["ancient"]), strings(&["heals"]))
            .id;
        let again = graph.add_node("Ayurveda", strings(&["modern"]), Vec::new());

        assert_eq!(again.id, first);
        assert_eq!(again.attributes, strings(&["ancient"]));
        assert_eq!(again.behaviors, strings(&["heals"]));
        assert_eq!(graph.node_count(), 1);
        assert_consistent(&graph);
    }

    #[test]
    fn test_link_creates_missing_nodes() {
        let mut graph = ConceptGraph::new();
        graph.link("Ayurveda", "5-element theory", "embeds");

        assert!(graph.contains("Ayurveda"));
        assert!(graph.contains("5-element theory"));
        assert!(graph.get_node("5-element theory").unwrap().attributes.is_empty());
        assert_eq!(graph.link_count(), 1);
        assert_consistent(&graph);
    }

    #[test]
    fn test_duplicate_links_are_kept() {
        let mut graph = ConceptGraph::new();
        graph.link("A", "B", "x");
        graph.link("A", "B", "x");

        let related = graph.get_related("A", "x");
        assert_eq!(related.len(), 2);
        assert!(related.iter().all(|n| n.concept == "B"));
    }

    #[test]
    fn test_get_related_never_fails() {
        let mut graph = ConceptGraph::new();
        graph.link_related("dreams", "story generation");

        assert_eq!(graph.get_related("dreams", DEFAULT_RELATION).len(), 1);
        assert!(graph.get_related("dreams", "enables").is_empty());
        assert!(graph.get_related("nowhere", DEFAULT_RELATION).is_empty());
    }

    #[test]
    fn test_cycle_terminates_at_revisit() {
        let mut graph = ConceptGraph::new();
        graph.link("A", "B", "x");
        graph.link("B", "C", "y");
        graph.link("C", "A", "z");

        assert_eq!(graph.traverse_memory("A", 5), strings(&["A", "B", "C"]));
    }

    #[test]
    fn test_depth_zero_is_start_only() {
        let mut graph = ConceptGraph::new();
        graph.link("A", "B", "x");

        assert_eq!(graph.traverse_memory("A", 0), strings(&["A"]));
        assert!(graph.traverse_memory("Z", 0).is_empty());
    }

    #[test]
    fn test_unknown_start() {
        let graph = ConceptGraph::new();
        assert!(graph.traverse_memory("nonexistent", 3).is_empty());
        assert_eq!(graph.traverse_memory_checked("nonexistent", 3), None);
    }

    #[test]
    fn test_checked_distinguishes_known_leaf() {
        let mut graph = ConceptGraph::new();
        graph.add_concept("solitary");
        assert_eq!(
            graph.traverse_memory_checked("solitary", 3),
            Some(strings(&["solitary"]))
        );
    }

    #[test]
    fn test_depth_bounds_the_chain() {
        let mut graph = ConceptGraph::new();
        graph.link("Ayurveda", "5-element theory", "embeds");
        graph.link("5-element theory", "entropy", "explains");
        graph.link("entropy", "dreams", "guides");
        graph.link("dreams", "story generation", "enables");

        assert_eq!(
            graph.traverse_memory("Ayurveda", 2),
            strings(&["Ayurveda", "5-element theory", "entropy"])
        );
        assert_eq!(graph.traverse_memory("Ayurveda", 10).len(), 5);
    }

    #[test]
    fn test_order_follows_relation_then_link_insertion() {
        let mut graph = ConceptGraph::new();
        graph.link("root", "b1", "beta");
        graph.link("root", "a1", "alpha");
        graph.link("root", "b2", "beta");
        graph.link("b1", "leaf", "x");

        assert_eq!(
            graph.traverse_memory("root", 3),
            strings(&["root", "b1", "leaf", "b2", "a1"])
        );
    }

    #[test]
    fn test_shared_visited_set_across_branches() {
        // D is reachable from both B and C; it is expanded under B only.
        let mut graph = ConceptGraph::new();
        graph.link_related("A", "B");
        graph.link_related("A", "C");
        graph.link_related("B", "D");
        graph.link_related("C", "D");
        graph.link_related("D", "E");

        let chain = graph.traverse_memory("A", 5);
        assert_eq!(chain, strings(&["A", "B", "D", "E", "C"]));
    }

    #[test]
    fn test_first_reach_wins_even_when_shallower_later() {
        // C is first reached at the edge of the depth budget via B, so it is
        // not expanded, and the later direct link from A does not revisit it.
        let mut graph = ConceptGraph::new();
        graph.link_related("A", "B");
        graph.link_related("B", "C");
        graph.link_related("A", "C");
        graph.link_related("C", "D");

        assert_eq!(graph.traverse_memory("A", 2), strings(&["A", "B", "C"]));
    }

    #[test]
    fn test_traversal_has_no_duplicates_and_is_deterministic() {
        let mut graph = ConceptGraph::new();
        for (s, t) in [("a", "b"), ("b", "a"), ("a", "c"), ("c", "b"), ("c", "c")] {
            graph.link_related(s, t);
        }

        let first = graph.traverse_memory("a", 10);
        let mut unique = first.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), first.len());

        for _ in 0..10 {
            assert_eq!(graph.traverse_memory("a", 10), first);
        }
    }

    #[test]
    fn test_serde_round_trip_rebuilds_index() {
        let mut graph = ConceptGraph::new();
        graph.link("A", "B", "x");
        graph.link("B", "C", "y");

        let json = serde_json::to_string(&graph).unwrap();
        let restored: ConceptGraph = serde_json::from_str(&json).unwrap();

        assert_consistent(&restored);
        assert_eq!(restored.concepts().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(restored.traverse_memory("A", 5), graph.traverse_memory("A", 5));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_names() {
        let node = ConceptNode::new("A", Vec::new(), Vec::new());
        let mut twin = ConceptNode::new("A", Vec::new(), Vec::new());
        twin.push_link(DEFAULT_RELATION, node.id);

        assert!(ConceptGraph::try_from(vec![node, twin]).is_err());
    }

    #[test]
    fn test_deserialize_rejects_dangling_links() {
        let mut node = ConceptNode::new("A", Vec::new(), Vec::new());
        node.push_link(DEFAULT_RELATION, ConceptId::new());

        assert!(ConceptGraph::try_from(vec![node]).is_err());
    }
}
