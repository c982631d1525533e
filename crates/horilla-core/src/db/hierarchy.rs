//! Store-level hierarchy operations: the guard, run against SQLite.
//!
//! Writes follow one pattern: open an `IMMEDIATE` transaction (so the write
//! lock is held before anything is read), load a [`ForestSnapshot`], ask the
//! [`HierarchyGuard`], then write and commit. A rejected proposal drops the
//! transaction, which rolls it back. Because the check and the write share
//! one lock, two writers cannot both see a child as a root and both attach
//! it.
//!
//! Reads load a snapshot without a write lock; they are for display only.

#![allow(clippy::module_name_repetitions)]

use anyhow::Context as _;
use rusqlite::{Connection, TransactionBehavior};

use super::query;
use crate::error::ErrorCode;
use crate::hierarchy::{
    ForestReport, HierarchyGuard, RejectionReason, ReparentPolicy, ValidAssignment, audit_forest,
};
use crate::model::{EntityKind, HierarchyNode, NodeId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    /// A referenced id is not in the store. This is a caller precondition,
    /// not a guard outcome.
    #[error("{kind} {id} not found")]
    NodeNotFound { kind: EntityKind, id: NodeId },

    /// The guard refused the edge.
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl AssignError {
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NodeNotFound { .. } => ErrorCode::NodeNotFound,
            Self::Rejected(reason) => reason.code(),
            Self::Store(err) => {
                let busy = err.chain().any(|cause| {
                    matches!(
                        cause.downcast_ref::<rusqlite::Error>(),
                        Some(rusqlite::Error::SqliteFailure(e, _))
                            if e.code == rusqlite::ErrorCode::DatabaseBusy
                                || e.code == rusqlite::ErrorCode::DatabaseLocked
                    )
                });
                if busy {
                    ErrorCode::LockContention
                } else {
                    ErrorCode::StoreWriteFailed
                }
            }
        }
    }

    /// The rejection, if this error is a guard outcome.
    #[must_use]
    pub const fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Validate and commit `child_id` under `parent_id`.
///
/// # Errors
///
/// - [`AssignError::NodeNotFound`] if either id is unknown for `kind`.
/// - [`AssignError::Rejected`] with the first failing guard check.
/// - [`AssignError::Store`] for database failures.
pub fn assign_child(
    conn: &mut Connection,
    kind: EntityKind,
    parent_id: NodeId,
    child_id: Option<NodeId>,
    policy: ReparentPolicy,
) -> Result<ValidAssignment, AssignError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("begin assignment transaction")?;

    require_node(&tx, kind, parent_id)?;
    if let Some(child) = child_id {
        require_node(&tx, kind, child)?;
    }

    let snapshot = query::load_snapshot(&tx, kind)?;
    let guard = HierarchyGuard::new(&snapshot).with_policy(policy);

    let assignment = match guard.validate_assignment(parent_id, child_id) {
        Ok(assignment) => assignment,
        Err(reason) => {
            tracing::warn!(
                kind = %kind,
                parent = %parent_id,
                code = %reason.code(),
                "rejected assignment: {reason}"
            );
            return Err(reason.into());
        }
    };

    query::set_parent_unchecked(
        &tx,
        kind,
        assignment.child_id,
        Some(assignment.parent_id),
    )?;
    tx.commit().context("commit assignment")?;

    tracing::info!(
        kind = %kind,
        parent = %assignment.parent_id,
        child = %assignment.child_id,
        "assigned child"
    );
    Ok(assignment)
}

/// Make `child_id` a root again. Returns the parent it had, if any.
///
/// # Errors
///
/// [`AssignError::NodeNotFound`] if the id is unknown, or
/// [`AssignError::Store`] for database failures.
pub fn detach_child(
    conn: &mut Connection,
    kind: EntityKind,
    child_id: NodeId,
) -> Result<Option<NodeId>, AssignError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("begin detach transaction")?;

    let node = require_node(&tx, kind, child_id)?;
    if node.parent_id.is_some() {
        query::set_parent_unchecked(&tx, kind, child_id, None)?;
    }
    tx.commit().context("commit detach")?;

    if let Some(previous) = node.parent_id {
        tracing::info!(kind = %kind, child = %child_id, previous = %previous, "detached child");
    }
    Ok(node.parent_id)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Nodes that may be offered as a parent for `child_id`, ascending by id.
///
/// # Errors
///
/// [`AssignError::NodeNotFound`] if `child_id` is unknown, or
/// [`AssignError::Store`] for database failures.
pub fn parent_candidates(
    conn: &Connection,
    kind: EntityKind,
    child_id: NodeId,
) -> Result<Vec<HierarchyNode>, AssignError> {
    require_exists(conn, kind, child_id)?;
    let snapshot = query::load_snapshot(conn, kind)?;
    let guard = HierarchyGuard::new(&snapshot);
    let eligible =
        guard.eligible_parent_candidates(child_id, query::list_node_ids(conn, kind)?);

    Ok(query::list_nodes(conn, kind)?
        .into_iter()
        .filter(|node| eligible.contains(&node.id))
        .collect())
}

/// All descendants of `node_id` in depth-first pre-order (not including it).
///
/// # Errors
///
/// [`AssignError::NodeNotFound`] if `node_id` is unknown, or
/// [`AssignError::Store`] for database failures.
pub fn descendants(
    conn: &Connection,
    kind: EntityKind,
    node_id: NodeId,
) -> Result<Vec<HierarchyNode>, AssignError> {
    require_exists(conn, kind, node_id)?;
    let snapshot = query::load_snapshot(conn, kind)?;
    let order = HierarchyGuard::new(&snapshot).subtree_of(node_id);
    resolve_nodes(conn, kind, order.into_iter().skip(1))
}

/// Ancestors of `node_id`, immediate parent first.
///
/// # Errors
///
/// [`AssignError::NodeNotFound`] if `node_id` is unknown, or
/// [`AssignError::Store`] for database failures.
pub fn ancestors(
    conn: &Connection,
    kind: EntityKind,
    node_id: NodeId,
) -> Result<Vec<HierarchyNode>, AssignError> {
    require_exists(conn, kind, node_id)?;
    let snapshot = query::load_snapshot(conn, kind)?;
    let chain = HierarchyGuard::new(&snapshot).ancestors_of(node_id);
    resolve_nodes(conn, kind, chain)
}

/// Integrity report for every stored link of `kind`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded.
pub fn audit(conn: &Connection, kind: EntityKind) -> anyhow::Result<ForestReport> {
    let snapshot = query::load_snapshot(conn, kind)?;
    Ok(audit_forest(&snapshot))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_node(
    conn: &Connection,
    kind: EntityKind,
    id: NodeId,
) -> Result<HierarchyNode, AssignError> {
    query::get_node(conn, kind, id)?.ok_or(AssignError::NodeNotFound { kind, id })
}

fn require_exists(conn: &Connection, kind: EntityKind, id: NodeId) -> Result<(), AssignError> {
    if query::node_exists(conn, kind, id)? {
        Ok(())
    } else {
        Err(AssignError::NodeNotFound { kind, id })
    }
}

fn resolve_nodes(
    conn: &Connection,
    kind: EntityKind,
    ids: impl IntoIterator<Item = NodeId>,
) -> Result<Vec<HierarchyNode>, AssignError> {
    ids.into_iter().map(|id| require_node(conn, kind, id)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
