//! Read and write helpers over the `contacts` / `campaigns` tables.
//!
//! Every function takes the [`EntityKind`] whose table it touches. Table
//! names come from [`EntityKind::table`], never from user input.

#![allow(clippy::module_name_repetitions)]

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::hierarchy::ForestSnapshot;
use crate::model::{EntityKind, HierarchyNode, NodeId};

/// Insert a new root node and return its store-assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. blank name).
pub fn insert_node(conn: &Connection, kind: EntityKind, name: &str) -> Result<NodeId> {
    let sql = format!(
        "INSERT INTO {} (name, parent_id, created_at_us) VALUES (?1, NULL, ?2)",
        kind.table()
    );
    let now_us = chrono::Utc::now().timestamp_micros();
    conn.execute(&sql, params![name, now_us])
        .with_context(|| format!("insert {kind} '{name}'"))?;
    Ok(NodeId::new(conn.last_insert_rowid()))
}

/// Fetch one node.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_node(conn: &Connection, kind: EntityKind, id: NodeId) -> Result<Option<HierarchyNode>> {
    let sql = format!(
        "SELECT id, name, parent_id, created_at_us FROM {} WHERE id = ?1",
        kind.table()
    );
    let mut stmt = conn.prepare(&sql).context("prepare get_node")?;
    stmt.query_row(params![id.get()], |row| row_to_node(row, kind))
        .optional()
        .with_context(|| format!("get_node for {kind} {id}"))
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn node_exists(conn: &Connection, kind: EntityKind, id: NodeId) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", kind.table());
    conn.query_row(&sql, params![id.get()], |row| row.get(0))
        .context("check node_exists")
}

/// Direct children of `parent_id`, ascending by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_children(
    conn: &Connection,
    kind: EntityKind,
    parent_id: NodeId,
) -> Result<Vec<HierarchyNode>> {
    let sql = format!(
        "SELECT id, name, parent_id, created_at_us FROM {} WHERE parent_id = ?1 ORDER BY id ASC",
        kind.table()
    );
    let mut stmt = conn.prepare(&sql).context("prepare get_children")?;
    let rows = stmt
        .query_map(params![parent_id.get()], |row| row_to_node(row, kind))
        .context("execute get_children")?;

    let mut children = Vec::new();
    for row in rows {
        children.push(row.context("read child row")?);
    }
    Ok(children)
}

/// All nodes of `kind`, ascending by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_nodes(conn: &Connection, kind: EntityKind) -> Result<Vec<HierarchyNode>> {
    let sql = format!(
        "SELECT id, name, parent_id, created_at_us FROM {} ORDER BY id ASC",
        kind.table()
    );
    let mut stmt = conn.prepare(&sql).context("prepare list_nodes")?;
    let rows = stmt
        .query_map([], |row| row_to_node(row, kind))
        .context("execute list_nodes")?;

    let mut nodes = Vec::new();
    for row in rows {
        nodes.push(row.context("read node row")?);
    }
    Ok(nodes)
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_node_ids(conn: &Connection, kind: EntityKind) -> Result<Vec<NodeId>> {
    let sql = format!("SELECT id FROM {} ORDER BY id ASC", kind.table());
    let mut stmt = conn.prepare(&sql).context("prepare list_node_ids")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, i64>(0))
        .context("execute list_node_ids")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(NodeId::new(row.context("read id row")?));
    }
    Ok(ids)
}

/// Read every `(id, parent_id)` pair of `kind` into a [`ForestSnapshot`].
///
/// Call inside the transaction that will commit the result so the snapshot
/// and the write see the same data.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn load_snapshot(conn: &Connection, kind: EntityKind) -> Result<ForestSnapshot> {
    let sql = format!("SELECT id, parent_id FROM {}", kind.table());
    let mut stmt = conn.prepare(&sql).context("prepare load_snapshot")?;
    let rows = stmt
        .query_map([], |row| {
            let id: i64 = row.get(0)?;
            let parent: Option<i64> = row.get(1)?;
            Ok((NodeId::new(id), parent.map(NodeId::new)))
        })
        .context("execute load_snapshot")?;

    let mut links = Vec::new();
    for row in rows {
        links.push(row.context("read link row")?);
    }

    tracing::debug!(kind = %kind, nodes = links.len(), "loaded hierarchy snapshot");
    Ok(ForestSnapshot::from_links(links))
}

/// Overwrite `parent_id` without any hierarchy checks.
///
/// Returns `true` if a row was updated. Callers outside this module should
/// go through [`assign_child`](super::hierarchy::assign_child) instead.
///
/// # Errors
///
/// Returns an error if the update fails (e.g. foreign key violation).
pub fn set_parent_unchecked(
    conn: &Connection,
    kind: EntityKind,
    id: NodeId,
    parent_id: Option<NodeId>,
) -> Result<bool> {
    let sql = format!("UPDATE {} SET parent_id = ?1 WHERE id = ?2", kind.table());
    let changed = conn
        .execute(&sql, params![parent_id.map(NodeId::get), id.get()])
        .with_context(|| format!("set parent of {kind} {id}"))?;
    Ok(changed == 1)
}

fn row_to_node(row: &rusqlite::Row<'_>, kind: EntityKind) -> rusqlite::Result<HierarchyNode> {
    let parent: Option<i64> = row.get(2)?;
    Ok(HierarchyNode {
        id: NodeId::new(row.get(0)?),
        kind,
        name: row.get(1)?,
        parent_id: parent.map(NodeId::new),
        created_at_us: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::hierarchy::HierarchySource;

    #[test]
    fn insert_assigns_increasing_ids_and_null_parent() {
        let conn = open_in_memory().expect("store");
        let a = insert_node(&conn, EntityKind::Contact, "Alice").expect("insert");
        let b = insert_node(&conn, EntityKind::Contact, "Bob").expect("insert");
        assert!(b > a);

        let node = get_node(&conn, EntityKind::Contact, a).expect("query").expect("exists");
        assert_eq!(node.name, "Alice");
        assert!(node.is_root());
        assert!(node.created_at_us > 0);
    }

    #[test]
    fn blank_name_is_rejected_by_schema() {
        let conn = open_in_memory().expect("store");
        assert!(insert_node(&conn, EntityKind::Campaign, "   ").is_err());
    }

    #[test]
    fn kinds_are_stored_separately() {
        let conn = open_in_memory().expect("store");
        let c = insert_node(&conn, EntityKind::Contact, "Alice").expect("insert");
        assert!(node_exists(&conn, EntityKind::Contact, c).expect("exists"));
        assert!(list_nodes(&conn, EntityKind::Campaign).expect("list").is_empty());
        assert!(get_node(&conn, EntityKind::Campaign, c).expect("query").is_none());
    }

    #[test]
    fn children_and_snapshot_follow_parent_links() {
        let conn = open_in_memory().expect("store");
        let kind = EntityKind::Campaign;
        let root = insert_node(&conn, kind, "Spring launch").expect("insert");
        let a = insert_node(&conn, kind, "Email wave").expect("insert");
        let b = insert_node(&conn, kind, "Webinar").expect("insert");
        assert!(set_parent_unchecked(&conn, kind, b, Some(root)).expect("update"));
        assert!(set_parent_unchecked(&conn, kind, a, Some(root)).expect("update"));

        let children: Vec<NodeId> = get_children(&conn, kind, root)
            .expect("children")
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(children, vec![a, b]);

        let snap = load_snapshot(&conn, kind).expect("snapshot");
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.children_of(root), vec![a, b]);
        assert_eq!(list_node_ids(&conn, kind).expect("ids"), vec![root, a, b]);
    }

    #[test]
    fn set_parent_on_missing_row_reports_false() {
        let conn = open_in_memory().expect("store");
        let changed =
            set_parent_unchecked(&conn, EntityKind::Contact, NodeId::new(99), None).expect("update");
        assert!(!changed);
    }

    #[test]
    fn foreign_key_blocks_missing_parent() {
        let conn = open_in_memory().expect("store");
        let a = insert_node(&conn, EntityKind::Contact, "Alice").expect("insert");
        let err = set_parent_unchecked(&conn, EntityKind::Contact, a, Some(NodeId::new(404)));
        assert!(err.is_err());
    }
}
