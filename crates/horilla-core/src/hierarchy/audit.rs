//! Integrity audit for parent links that already exist in the store.
//!
//! # Overview
//!
//! The guard keeps new edges acyclic, but rows can arrive by other routes
//! (imports, manual SQL, older releases). This module checks a whole
//! [`ForestSnapshot`] and reports:
//!
//! - **Cycles**: parent chains that loop back on themselves.
//! - **Dangling parents**: `parent_id` values that name a missing node.
//!
//! # Design
//!
//! Every node has at most one parent, so the parent relation is a
//! functional graph: walking up from any node either reaches a root, leaves
//! the snapshot, or enters exactly one loop. A three-colour walk marks each
//! node finished once, giving O(V) overall.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::snapshot::ForestSnapshot;
use super::source::HierarchySource;
use crate::model::NodeId;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// One loop in the parent relation.
///
/// `nodes` follows parent links and repeats the first id at the end, e.g.
/// `[1, 3, 2, 1]` means 1's parent is 3, 3's parent is 2, 2's parent is 1.
/// The path is rotated to start at its smallest id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CyclePath {
    pub nodes: Vec<NodeId>,
}

impl CyclePath {
    /// Number of distinct nodes in the loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.len() == 1
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self_loop() {
            return write!(f, "self-loop on {}", self.nodes[0]);
        }
        let path = self
            .nodes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" → ");
        write!(f, "cycle ({} nodes): {path}", self.len())
    }
}

/// A node whose parent is not in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DanglingParent {
    pub node_id: NodeId,
    pub missing_parent: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForestReport {
    pub nodes: usize,
    pub roots: usize,
    pub cycles: Vec<CyclePath>,
    pub dangling: Vec<DanglingParent>,
}

impl ForestReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.cycles.is_empty() && self.dangling.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// On the walk currently in progress.
    Gray,
    /// Fully resolved.
    Black,
}

/// Check every node of `snapshot` and report cycles and dangling parents.
pub fn audit_forest(snapshot: &ForestSnapshot) -> ForestReport {
    let mut report = ForestReport {
        nodes: snapshot.len(),
        roots: snapshot.roots().count(),
        ..ForestReport::default()
    };

    for (id, parent) in snapshot.links() {
        if let Some(parent) = parent {
            if !snapshot.contains(parent) {
                report.dangling.push(DanglingParent {
                    node_id: id,
                    missing_parent: parent,
                });
            }
        }
    }

    walk_all(snapshot, |cycle| {
        report.cycles.push(cycle);
        true
    });

    if !report.is_healthy() {
        tracing::warn!(
            cycles = report.cycles.len(),
            dangling = report.dangling.len(),
            "hierarchy is not a forest"
        );
    }

    report
}

/// `true` if any parent chain loops. Stops at the first loop found.
pub fn has_cycles(snapshot: &ForestSnapshot) -> bool {
    let mut found = false;
    walk_all(snapshot, |_| {
        found = true;
        false
    });
    found
}

/// Walk parent chains from every node; call `on_cycle` for each loop.
///
/// `on_cycle` returns `false` to stop early.
fn walk_all(snapshot: &ForestSnapshot, mut on_cycle: impl FnMut(CyclePath) -> bool) {
    let mut color: HashMap<NodeId, Color> = HashMap::with_capacity(snapshot.len());

    for start in snapshot.ids() {
        if color.contains_key(&start) {
            continue;
        }

        let mut walk: Vec<NodeId> = Vec::new();
        let mut current = Some(start);

        while let Some(node) = current {
            if !snapshot.contains(node) {
                break;
            }
            match color.get(&node) {
                Some(Color::Black) => break,
                Some(Color::Gray) => {
                    if let Some(pos) = walk.iter().position(|n| *n == node) {
                        let keep_going = on_cycle(rotate_to_min(&walk[pos..]));
                        if !keep_going {
                            return;
                        }
                    }
                    break;
                }
                None => {
                    color.insert(node, Color::Gray);
                    walk.push(node);
                    current = snapshot.parent_of(node);
                }
            }
        }

        for node in walk {
            color.insert(node, Color::Black);
        }
    }
}

fn rotate_to_min(loop_nodes: &[NodeId]) -> CyclePath {
    let min_pos = loop_nodes
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map_or(0, |(pos, _)| pos);

    let mut nodes: Vec<NodeId> = loop_nodes[min_pos..]
        .iter()
        .chain(&loop_nodes[..min_pos])
        .copied()
        .collect();
    if let Some(first) = nodes.first().copied() {
        nodes.push(first);
    }
    CyclePath { nodes }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn n(raw: i64) -> NodeId {
        NodeId::new(raw)
    }

    fn forest(links: &[(i64, Option<i64>)]) -> ForestSnapshot {
        ForestSnapshot::from_links(links.iter().map(|(id, p)| (n(*id), p.map(n))))
    }

    #[test]
    fn empty_snapshot_is_healthy() {
        let report = audit_forest(&ForestSnapshot::new());
        assert!(report.is_healthy());
        assert_eq!(report.nodes, 0);
        assert!(!has_cycles(&ForestSnapshot::new()));
    }

    #[test]
    fn valid_forest_is_healthy() {
        let snap = forest(&[(1, None), (2, Some(1)), (3, Some(2)), (4, None)]);
        let report = audit_forest(&snap);
        assert!(report.is_healthy());
        assert_eq!(report.nodes, 4);
        assert_eq!(report.roots, 2);
        assert!(!has_cycles(&snap));
    }

    #[test]
    fn self_loop_is_reported() {
        let snap = forest(&[(1, Some(1)), (2, None)]);
        let report = audit_forest(&snap);
        assert_eq!(report.cycles.len(), 1);
        let cycle = &report.cycles[0];
        assert!(cycle.is_self_loop());
        assert_eq!(cycle.nodes, vec![n(1), n(1)]);
        assert!(cycle.to_string().contains("self-loop"));
    }

    #[test]
    fn three_node_cycle_starts_at_smallest_id() {
        // 2 -> 3 -> 1 -> 2 via parent links.
        let snap = forest(&[(2, Some(3)), (3, Some(1)), (1, Some(2))]);
        let report = audit_forest(&snap);
        assert_eq!(report.cycles.len(), 1);
        let cycle = &report.cycles[0];
        assert_eq!(cycle.nodes, vec![n(1), n(2), n(3), n(1)]);
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.to_string(), "cycle (3 nodes): 1 → 2 → 3 → 1");
    }

    #[test]
    fn tail_leading_into_cycle_is_not_part_of_it() {
        // 5 -> 4 -> (4 <-> 3)
        let snap = forest(&[(3, Some(4)), (4, Some(3)), (5, Some(4))]);
        let report = audit_forest(&snap);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].nodes, vec![n(3), n(4), n(3)]);
    }

    #[test]
    fn disjoint_cycles_are_each_reported_once() {
        let snap = forest(&[
            (1, Some(2)),
            (2, Some(1)),
            (3, Some(4)),
            (4, Some(3)),
            (5, None),
        ]);
        let report = audit_forest(&snap);
        assert_eq!(report.cycles.len(), 2);
        assert!(has_cycles(&snap));
    }

    #[test]
    fn dangling_parent_is_reported() {
        let snap = forest(&[(1, None), (2, Some(9))]);
        let report = audit_forest(&snap);
        assert!(!report.is_healthy());
        assert!(report.cycles.is_empty());
        assert_eq!(
            report.dangling,
            vec![DanglingParent {
                node_id: n(2),
                missing_parent: n(9)
            }]
        );
    }

    #[test]
    fn long_chain_is_linear_and_healthy() {
        let links: Vec<(i64, Option<i64>)> = (0..10_000)
            .map(|i| (i, if i == 0 { None } else { Some(i - 1) }))
            .collect();
        let snap = forest(&links);
        assert!(audit_forest(&snap).is_healthy());
    }

    #[test]
    fn long_cycle_is_found() {
        let links: Vec<(i64, Option<i64>)> = (0..1000).map(|i| (i, Some((i + 1) % 1000))).collect();
        let snap = forest(&links);
        let report = audit_forest(&snap);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].len(), 1000);
    }
}
