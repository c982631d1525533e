//! Assignment scenarios run through the SQLite adapter for both entity kinds.
//!
//! Contacts and campaigns must behave identically; every scenario runs once
//! per kind against a store on disk.

use horilla_core::db::hierarchy::{AssignError, assign_child, audit, parent_candidates};
use horilla_core::db::{open_store, query};
use horilla_core::hierarchy::{RejectionReason, ReparentPolicy};
use horilla_core::{EntityKind, ErrorCode, NodeId};
use rusqlite::Connection;
use tempfile::TempDir;

fn store() -> (TempDir, Connection) {
    let dir = tempfile::tempdir().expect("temp dir");
    let conn = open_store(&dir.path().join(".horilla").join("hierarchy.db")).expect("open store");
    (dir, conn)
}

fn roots(conn: &Connection, kind: EntityKind, count: usize) -> Vec<NodeId> {
    (0..count)
        .map(|i| query::insert_node(conn, kind, &format!("{kind} {i}")).expect("insert"))
        .collect()
}

fn assign(
    conn: &mut Connection,
    kind: EntityKind,
    parent: NodeId,
    child: Option<NodeId>,
) -> Result<(), AssignError> {
    assign_child(conn, kind, parent, child, ReparentPolicy::Reject).map(|_| ())
}

fn rejection(result: Result<(), AssignError>) -> RejectionReason {
    match result {
        Err(AssignError::Rejected(reason)) => reason,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[test]
fn scenario_a_two_roots() {
    for kind in EntityKind::ALL {
        let (_dir, mut conn) = store();
        let n = roots(&conn, kind, 2);
        assign(&mut conn, kind, n[0], Some(n[1])).expect("assign");
        let child = query::get_node(&conn, kind, n[1]).expect("query").expect("row");
        assert_eq!(child.parent_id, Some(n[0]), "{kind}");
    }
}

#[test]
fn scenario_b_reverse_edge_would_cycle() {
    for kind in EntityKind::ALL {
        let (_dir, mut conn) = store();
        let n = roots(&conn, kind, 2);
        assign(&mut conn, kind, n[0], Some(n[1])).expect("assign");
        let reason = rejection(assign(&mut conn, kind, n[1], Some(n[0])));
        assert_eq!(reason.code(), ErrorCode::CycleWouldForm, "{kind}");
    }
}

#[test]
fn scenario_c_self_parenting() {
    for kind in EntityKind::ALL {
        let (_dir, mut conn) = store();
        let n = roots(&conn, kind, 1);
        let reason = rejection(assign(&mut conn, kind, n[0], Some(n[0])));
        assert_eq!(reason, RejectionReason::SelfParenting { node_id: n[0] }, "{kind}");
        assert_eq!(reason.user_message(kind), format!("A {kind} cannot be its own parent."));
    }
}

#[test]
fn scenario_d_child_already_has_parent() {
    for kind in EntityKind::ALL {
        let (_dir, mut conn) = store();
        let n = roots(&conn, kind, 3);
        assign(&mut conn, kind, n[0], Some(n[1])).expect("assign");
        let reason = rejection(assign(&mut conn, kind, n[2], Some(n[1])));
        assert_eq!(
            reason,
            RejectionReason::ChildAlreadyHasParent {
                child_id: n[1],
                current_parent: n[0]
            },
            "{kind}"
        );
    }
}

#[test]
fn scenario_e_no_child_selected() {
    for kind in EntityKind::ALL {
        let (_dir, mut conn) = store();
        let n = roots(&conn, kind, 1);
        let reason = rejection(assign(&mut conn, kind, n[0], None));
        assert_eq!(reason, RejectionReason::NoChildSelected, "{kind}");
    }
}

#[test]
fn deep_chain_rejects_attaching_root_under_leaf() {
    for kind in EntityKind::ALL {
        let (_dir, mut conn) = store();
        let n = roots(&conn, kind, 6);
        for pair in n.windows(2) {
            assign(&mut conn, kind, pair[0], Some(pair[1])).expect("assign");
        }
        let reason = rejection(assign(&mut conn, kind, n[5], Some(n[0])));
        assert!(matches!(reason, RejectionReason::CycleWouldForm { .. }), "{kind}");
        assert!(audit(&conn, kind).expect("audit").is_healthy());
    }
}

#[test]
fn candidates_shrink_as_the_tree_grows() {
    let kind = EntityKind::Contact;
    let (_dir, mut conn) = store();
    let n = roots(&conn, kind, 4);

    let before: Vec<NodeId> = parent_candidates(&conn, kind, n[0])
        .expect("candidates")
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(before, vec![n[1], n[2], n[3]]);

    assign(&mut conn, kind, n[0], Some(n[1])).expect("assign");
    assign(&mut conn, kind, n[2], Some(n[3])).expect("assign");

    let after: Vec<NodeId> = parent_candidates(&conn, kind, n[0])
        .expect("candidates")
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(after, vec![n[2]]);
}

#[test]
fn writes_survive_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("hierarchy.db");
    let kind = EntityKind::Campaign;
    let (a, b) = {
        let mut conn = open_store(&path).expect("open");
        let n = roots(&conn, kind, 2);
        assign(&mut conn, kind, n[0], Some(n[1])).expect("assign");
        (n[0], n[1])
    };

    let conn = open_store(&path).expect("reopen");
    let child = query::get_node(&conn, kind, b).expect("query").expect("row");
    assert_eq!(child.parent_id, Some(a));
}
