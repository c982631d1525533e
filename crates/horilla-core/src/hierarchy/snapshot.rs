//! In-memory copy of one entity kind's parent links.
//!
//! A [`ForestSnapshot`] is what the guard validates against: the SQLite
//! adapter loads one inside a write transaction, tests build them directly.
//! The snapshot stores raw links exactly as given, so malformed data
//! (cycles, parents that point at missing rows) survives loading and can be
//! reported by [`audit_forest`](super::audit::audit_forest).

use std::collections::{BTreeMap, BTreeSet};

use super::guard::ValidAssignment;
use super::source::HierarchySource;
use crate::model::NodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForestSnapshot {
    parents: BTreeMap<NodeId, Option<NodeId>>,
    children: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl ForestSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(id, parent_id)` rows.
    ///
    /// A repeated id keeps its last parent.
    pub fn from_links<I>(links: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, Option<NodeId>)>,
    {
        let mut snapshot = Self::new();
        for (id, parent) in links {
            snapshot.set_parent(id, parent);
        }
        snapshot
    }

    /// Commit a validated edge. If the child had a parent it is moved.
    pub fn apply(&mut self, assignment: &ValidAssignment) {
        self.set_parent(assignment.child_id, Some(assignment.parent_id));
    }

    /// Make `id` a root again, returning its previous parent.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let previous = self.parents.get(&id).copied().flatten();
        if self.parents.contains_key(&id) {
            self.set_parent(id, None);
        }
        previous
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// All node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parents.keys().copied()
    }

    /// Nodes with no parent, in ascending order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parents
            .iter()
            .filter(|(_, parent)| parent.is_none())
            .map(|(id, _)| *id)
    }

    /// `(id, parent_id)` rows in ascending id order.
    pub fn links(&self) -> impl Iterator<Item = (NodeId, Option<NodeId>)> + '_ {
        self.parents.iter().map(|(id, parent)| (*id, *parent))
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(Some(old)) = self.parents.insert(id, parent) {
            if let Some(siblings) = self.children.get_mut(&old) {
                siblings.remove(&id);
                if siblings.is_empty() {
                    self.children.remove(&old);
                }
            }
        }
        if let Some(new_parent) = parent {
            self.children.entry(new_parent).or_default().insert(id);
        }
    }
}

impl HierarchySource for ForestSnapshot {
    fn contains(&self, id: NodeId) -> bool {
        self.parents.contains_key(&id)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied().flatten()
    }

    fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.children
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(raw: i64) -> NodeId {
        NodeId::new(raw)
    }

    #[test]
    fn from_links_builds_children_index() {
        let snap = ForestSnapshot::from_links([(n(1), None), (n(3), Some(n(1))), (n(2), Some(n(1)))]);
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.children_of(n(1)), vec![n(2), n(3)]);
        assert_eq!(snap.parent_of(n(2)), Some(n(1)));
        assert_eq!(snap.roots().collect::<Vec<_>>(), vec![n(1)]);
    }

    #[test]
    fn repeated_id_keeps_last_parent() {
        let snap = ForestSnapshot::from_links([(n(1), None), (n(2), None), (n(3), Some(n(1))), (n(3), Some(n(2)))]);
        assert!(snap.children_of(n(1)).is_empty());
        assert_eq!(snap.children_of(n(2)), vec![n(3)]);
    }

    #[test]
    fn duplicate_ids_keep_the_last_parent() {
        let snap = ForestSnapshot::from_links([(n(1), None), (n(2), Some(n(1))), (n(2), None)]);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.parent_of(n(2)), None);
        assert!(snap.children_of(n(1)).is_empty());
        assert!(ForestSnapshot::new().is_empty());
    }

    #[test]
    fn apply_moves_existing_child() {
        let mut snap = ForestSnapshot::from_links([(n(1), None), (n(2), None), (n(3), Some(n(1)))]);
        snap.apply(&ValidAssignment {
            parent_id: n(2),
            child_id: n(3),
        });
        assert!(snap.children_of(n(1)).is_empty());
        assert_eq!(snap.children_of(n(2)), vec![n(3)]);
        assert_eq!(snap.parent_of(n(3)), Some(n(2)));
    }

    #[test]
    fn detach_returns_previous_parent() {
        let mut snap = ForestSnapshot::from_links([(n(1), None), (n(2), Some(n(1)))]);
        assert_eq!(snap.detach(n(2)), Some(n(1)));
        assert_eq!(snap.parent_of(n(2)), None);
        assert!(snap.children_of(n(1)).is_empty());
        assert_eq!(snap.detach(n(2)), None);
    }

    #[test]
    fn detach_unknown_id_is_a_noop() {
        let mut snap = ForestSnapshot::from_links([(n(1), None)]);
        assert_eq!(snap.detach(n(9)), None);
        assert!(!snap.contains(n(9)));
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn unknown_ids_have_no_parent_or_children() {
        let snap = ForestSnapshot::new();
        assert!(!snap.contains(n(5)));
        assert_eq!(snap.parent_of(n(5)), None);
        assert!(snap.children_of(n(5)).is_empty());
    }
}
