//! Cycle-safe parent/child assignment for self-referencing entities.
//!
//! [`HierarchyGuard`] answers one question: may `child` be attached under
//! `parent` without breaking the forest invariant (every node has at most
//! one parent, and following parent links never loops)?
//!
//! The guard is pure. It reads through a [`HierarchySource`] and never
//! writes; committing a [`ValidAssignment`] is the caller's job, ideally
//! under the same lock the snapshot was read under.
//!
//! # Rejection order
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. [`RejectionReason::NoChildSelected`]
//! 2. [`RejectionReason::ChildAlreadyHasParent`] (only under [`ReparentPolicy::Reject`])
//! 3. [`RejectionReason::SelfParenting`]
//! 4. [`RejectionReason::CycleWouldForm`]

#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::source::HierarchySource;
use crate::error::ErrorCode;
use crate::model::{EntityKind, NodeId};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A proposed edge that passed every check.
///
/// Only the guard constructs these outside of tests, so holding one means
/// the edge was valid against the snapshot it was checked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidAssignment {
    pub parent_id: NodeId,
    pub child_id: NodeId,
}

/// Why a proposed edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("no child selected")]
    NoChildSelected,

    #[error("node {child_id} already has parent {current_parent}")]
    ChildAlreadyHasParent {
        child_id: NodeId,
        current_parent: NodeId,
    },

    #[error("node {node_id} cannot be its own parent")]
    SelfParenting { node_id: NodeId },

    #[error("assigning {child_id} under {parent_id} would create a cycle")]
    CycleWouldForm { parent_id: NodeId, child_id: NodeId },
}

impl RejectionReason {
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::NoChildSelected => ErrorCode::NoChildSelected,
            Self::ChildAlreadyHasParent { .. } => ErrorCode::ChildAlreadyHasParent,
            Self::SelfParenting { .. } => ErrorCode::SelfParenting,
            Self::CycleWouldForm { .. } => ErrorCode::CycleWouldForm,
        }
    }

    /// Form-level validation message for the given entity kind.
    #[must_use]
    pub fn user_message(self, kind: EntityKind) -> String {
        match self {
            Self::NoChildSelected => format!("Please select a child {kind}."),
            Self::ChildAlreadyHasParent { .. } => {
                format!("This {kind} already has a parent {kind}.")
            }
            Self::SelfParenting { .. } => format!("A {kind} cannot be its own parent."),
            Self::CycleWouldForm { .. } => format!(
                "Cannot assign this {kind}: the selected parent is one of its own descendants."
            ),
        }
    }
}

/// What to do when the proposed child already has a parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReparentPolicy {
    /// Refuse with [`RejectionReason::ChildAlreadyHasParent`].
    #[default]
    Reject,
    /// Move the child; the old edge is replaced on commit.
    Detach,
}

impl fmt::Display for ReparentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reject => "reject",
            Self::Detach => "detach",
        })
    }
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HierarchyGuard<S> {
    source: S,
    policy: ReparentPolicy,
}

impl<S: HierarchySource> HierarchyGuard<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            policy: ReparentPolicy::Reject,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ReparentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn policy(&self) -> ReparentPolicy {
        self.policy
    }

    /// Every node reachable downward from `node_id`, excluding `node_id`.
    ///
    /// Depth-first over the children relation with an explicit work-list.
    /// Each node is expanded at most once, so malformed input that already
    /// contains a cycle still terminates.
    pub fn descendants_of(&self, node_id: NodeId) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        let mut stack = self.source.children_of(node_id);

        while let Some(current) = stack.pop() {
            if current == node_id || !seen.insert(current) {
                continue;
            }
            stack.extend(self.source.children_of(current));
        }

        tracing::trace!(node = %node_id, count = seen.len(), "collected descendants");
        seen
    }

    /// Decide whether `child_id` may be attached under `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RejectionReason`] that applies, in the order
    /// documented at module level.
    pub fn validate_assignment(
        &self,
        parent_id: NodeId,
        child_id: Option<NodeId>,
    ) -> Result<ValidAssignment, RejectionReason> {
        let Some(child_id) = child_id else {
            return Err(RejectionReason::NoChildSelected);
        };

        if self.policy == ReparentPolicy::Reject {
            if let Some(current_parent) = self.source.parent_of(child_id) {
                return Err(RejectionReason::ChildAlreadyHasParent {
                    child_id,
                    current_parent,
                });
            }
        }

        if parent_id == child_id {
            return Err(RejectionReason::SelfParenting { node_id: child_id });
        }

        if self.descendants_of(child_id).contains(&parent_id) {
            return Err(RejectionReason::CycleWouldForm {
                parent_id,
                child_id,
            });
        }

        Ok(ValidAssignment {
            parent_id,
            child_id,
        })
    }

    /// Nodes the UI may offer as a parent for `child_id`.
    ///
    /// Roots from `all_node_ids`, minus `child_id` and its descendants.
    pub fn eligible_parent_candidates<I>(&self, child_id: NodeId, all_node_ids: I) -> BTreeSet<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let excluded = self.descendants_of(child_id);
        all_node_ids
            .into_iter()
            .filter(|id| *id != child_id)
            .filter(|id| !excluded.contains(id))
            .filter(|id| self.source.parent_of(*id).is_none())
            .collect()
    }

    /// Ancestor chain from the immediate parent up to the root.
    ///
    /// Stops at the first repeated id, so a malformed cycle truncates the
    /// chain instead of looping.
    pub fn ancestors_of(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::from([node_id]);
        let mut current = self.source.parent_of(node_id);

        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.source.parent_of(parent);
        }

        chain
    }

    /// `node_id` followed by its descendants in depth-first pre-order.
    ///
    /// Siblings are visited in ascending id order. Unknown ids yield an
    /// empty list.
    pub fn subtree_of(&self, node_id: NodeId) -> Vec<NodeId> {
        if !self.source.contains(node_id) {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        let mut stack = vec![node_id];

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            let mut children = self.source.children_of(current);
            children.reverse();
            stack.extend(children);
        }

        order
    }

    pub fn is_root(&self, node_id: NodeId) -> bool {
        self.source.contains(node_id) && self.source.parent_of(node_id).is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
